//! In-memory IP set store
//!
//! Every successful write replaces the lock token with a fresh UUID, and a
//! write carrying any other token is rejected with
//! [`StoreError::VersionConflict`], so concurrent writers contend the same
//! way they do against the remote store.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::domain::{IpSetRef, IpSetSnapshot, IpSetSummary, LockToken, Scope};
use crate::error::StoreError;
use crate::ports::IpSetStore;

#[derive(Clone, Debug)]
struct StoredIpSet {
    name: String,
    scope: Scope,
    addresses: Vec<String>,
    lock_token: LockToken,
}

impl StoredIpSet {
    fn matches(&self, target: &IpSetRef) -> bool {
        self.name == target.name && self.scope == target.scope
    }
}

fn fresh_token() -> LockToken {
    LockToken::new(Uuid::new_v4().to_string())
}

/// In-memory store keyed by IP set ID
#[derive(Default)]
pub struct InMemoryIpSetStore {
    sets: RwLock<HashMap<String, StoredIpSet>>,
    reads: AtomicU64,
    writes: AtomicU64,
}

impl InMemoryIpSetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an IP set; names are unique within a scope
    pub async fn create_ip_set(
        &self,
        name: &str,
        scope: Scope,
        addresses: Vec<String>,
    ) -> Result<IpSetSummary, StoreError> {
        let mut sets = self.sets.write().await;
        if sets.values().any(|s| s.name == name && s.scope == scope) {
            return Err(StoreError::InvalidParameter(format!(
                "ip set {name} already exists in {scope}"
            )));
        }

        let id = Uuid::new_v4().to_string();
        let lock_token = fresh_token();
        sets.insert(
            id.clone(),
            StoredIpSet {
                name: name.to_string(),
                scope,
                addresses,
                lock_token: lock_token.clone(),
            },
        );
        debug!(ip_set_id = %id, name, %scope, "Created IP set");

        Ok(IpSetSummary {
            id,
            name: name.to_string(),
            scope,
            lock_token,
        })
    }

    /// All IP sets in `scope`, ordered by name
    pub async fn list_ip_sets(&self, scope: Scope) -> Vec<IpSetSummary> {
        let sets = self.sets.read().await;
        let mut summaries: Vec<IpSetSummary> = sets
            .iter()
            .filter(|(_, s)| s.scope == scope)
            .map(|(id, s)| IpSetSummary {
                id: id.clone(),
                name: s.name.clone(),
                scope: s.scope,
                lock_token: s.lock_token.clone(),
            })
            .collect();
        summaries.sort_by(|a, b| a.name.cmp(&b.name));
        summaries
    }

    /// Delete an IP set; the lock token must be current
    pub async fn delete_ip_set(
        &self,
        target: &IpSetRef,
        lock_token: &LockToken,
    ) -> Result<(), StoreError> {
        let mut sets = self.sets.write().await;
        let stored = sets
            .get(&target.id)
            .filter(|s| s.matches(target))
            .ok_or_else(|| StoreError::NotFound {
                id: target.id.clone(),
            })?;
        if &stored.lock_token != lock_token {
            return Err(StoreError::VersionConflict {
                id: target.id.clone(),
            });
        }
        sets.remove(&target.id);
        Ok(())
    }

    /// Current addresses without counting as a store read
    pub async fn addresses(&self, target: &IpSetRef) -> Result<Vec<String>, StoreError> {
        let sets = self.sets.read().await;
        sets.get(&target.id)
            .filter(|s| s.matches(target))
            .map(|s| s.addresses.clone())
            .ok_or_else(|| StoreError::NotFound {
                id: target.id.clone(),
            })
    }

    /// Number of `get_ip_set` calls served
    pub fn read_count(&self) -> u64 {
        self.reads.load(Ordering::Relaxed)
    }

    /// Number of `update_ip_set` calls received, including rejected ones
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl IpSetStore for InMemoryIpSetStore {
    async fn get_ip_set(&self, target: &IpSetRef) -> Result<IpSetSnapshot, StoreError> {
        self.reads.fetch_add(1, Ordering::Relaxed);
        let sets = self.sets.read().await;
        sets.get(&target.id)
            .filter(|s| s.matches(target))
            .map(|s| IpSetSnapshot {
                addresses: s.addresses.clone(),
                lock_token: s.lock_token.clone(),
            })
            .ok_or_else(|| StoreError::NotFound {
                id: target.id.clone(),
            })
    }

    async fn update_ip_set(
        &self,
        target: &IpSetRef,
        lock_token: &LockToken,
        addresses: Vec<String>,
    ) -> Result<(), StoreError> {
        self.writes.fetch_add(1, Ordering::Relaxed);
        let mut sets = self.sets.write().await;
        let stored = sets
            .get_mut(&target.id)
            .filter(|s| s.matches(target))
            .ok_or_else(|| StoreError::NotFound {
                id: target.id.clone(),
            })?;

        if &stored.lock_token != lock_token {
            debug!(ip_set_id = %target.id, "Rejecting write with stale lock token");
            return Err(StoreError::VersionConflict {
                id: target.id.clone(),
            });
        }

        stored.addresses = addresses;
        stored.lock_token = fresh_token();
        Ok(())
    }
}
