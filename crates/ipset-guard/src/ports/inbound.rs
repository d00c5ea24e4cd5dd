//! Inbound Ports (Driving Ports)
//!
//! The API callers use to add or remove a single CIDR from a shared IP set.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::IpSetError;

/// Primary IP set mutation API (Driving Port)
///
/// Both operations are idempotent with respect to the requested change and
/// retry version conflicts internally. Any other failure is returned as is.
#[async_trait]
pub trait IpSetApi: Send + Sync {
    /// Append `cidr` to the IP set unless an identical entry already exists
    ///
    /// # Arguments
    /// * `cancel` - Aborts in-flight store calls and backoff sleeps
    /// * `ip_set_id` - Store-assigned ID of the target set
    /// * `ip_set_name` - Name of the target set
    /// * `cidr` - Entry to add, compared by exact string equality
    async fn append_to_ip_set(
        &self,
        cancel: &CancellationToken,
        ip_set_id: &str,
        ip_set_name: &str,
        cidr: &str,
    ) -> Result<(), IpSetError>;

    /// Remove the first entry equal to `cidr` from the IP set
    ///
    /// Succeeds when the entry is absent.
    async fn remove_from_ip_set(
        &self,
        cancel: &CancellationToken,
        ip_set_id: &str,
        ip_set_name: &str,
        cidr: &str,
    ) -> Result<(), IpSetError>;
}
