//! Outbound Ports (Driven Ports)
//!
//! The remote store that owns IP sets and their lock tokens.

use async_trait::async_trait;

use crate::domain::{IpSetRef, IpSetSnapshot, LockToken};
use crate::error::StoreError;

/// Remote IP set store (Driven Port)
///
/// Writes are conditional: `update_ip_set` must fail with
/// [`StoreError::VersionConflict`] when `lock_token` is not the token the
/// store currently holds, and with some other variant for every other failure.
#[async_trait]
pub trait IpSetStore: Send + Sync {
    /// Read the current addresses and lock token
    async fn get_ip_set(&self, target: &IpSetRef) -> Result<IpSetSnapshot, StoreError>;

    /// Replace the full address list if `lock_token` is still current
    async fn update_ip_set(
        &self,
        target: &IpSetRef,
        lock_token: &LockToken,
        addresses: Vec<String>,
    ) -> Result<(), StoreError>;
}
