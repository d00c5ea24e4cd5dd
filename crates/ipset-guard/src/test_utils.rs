//! Test doubles for the store port

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

use crate::adapters::InMemoryIpSetStore;
use crate::domain::{IpSetRef, IpSetSnapshot, LockToken, Scope};
use crate::error::StoreError;
use crate::ports::IpSetStore;

/// What another writer does right before one of our writes lands
#[derive(Clone, Debug)]
pub enum Interference {
    /// Rewrite the current list unchanged, only rotating the token
    Touch,
    /// Append a CIDR of its own
    Append(String),
}

/// Wraps [`InMemoryIpSetStore`] with scripted failures and racing writers
#[derive(Default)]
pub struct ScriptedStore {
    pub inner: InMemoryIpSetStore,
    read_failures: Mutex<VecDeque<StoreError>>,
    write_failures: Mutex<VecDeque<StoreError>>,
    interference: Mutex<VecDeque<Interference>>,
    stall_reads: AtomicBool,
    reads: Mutex<Vec<IpSetRef>>,
    writes: Mutex<Vec<Vec<String>>>,
}

impl ScriptedStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a regional IP set with the given entries
    pub async fn seed(&self, name: &str, addresses: &[&str]) -> IpSetRef {
        self.inner
            .create_ip_set(
                name,
                Scope::Regional,
                addresses.iter().map(|a| a.to_string()).collect(),
            )
            .await
            .expect("seed ip set")
            .to_ref()
    }

    pub async fn fail_next_read(&self, err: StoreError) {
        self.read_failures.lock().await.push_back(err);
    }

    pub async fn fail_next_write(&self, err: StoreError) {
        self.write_failures.lock().await.push_back(err);
    }

    /// Make another writer win the race before each of the next writes
    pub async fn interfere(&self, interference: Interference) {
        self.interference.lock().await.push_back(interference);
    }

    /// Make every subsequent read hang until the caller gives up
    pub fn stall_reads(&self) {
        self.stall_reads.store(true, Ordering::SeqCst);
    }

    pub async fn read_count(&self) -> usize {
        self.reads.lock().await.len()
    }

    pub async fn write_count(&self) -> usize {
        self.writes.lock().await.len()
    }

    /// Address lists submitted by our writes, in order
    pub async fn written(&self) -> Vec<Vec<String>> {
        self.writes.lock().await.clone()
    }

    pub async fn addresses(&self, target: &IpSetRef) -> Vec<String> {
        self.inner.addresses(target).await.expect("ip set exists")
    }
}

#[async_trait]
impl IpSetStore for ScriptedStore {
    async fn get_ip_set(&self, target: &IpSetRef) -> Result<IpSetSnapshot, StoreError> {
        self.reads.lock().await.push(target.clone());
        if self.stall_reads.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        if let Some(err) = self.read_failures.lock().await.pop_front() {
            return Err(err);
        }
        self.inner.get_ip_set(target).await
    }

    async fn update_ip_set(
        &self,
        target: &IpSetRef,
        lock_token: &LockToken,
        addresses: Vec<String>,
    ) -> Result<(), StoreError> {
        self.writes.lock().await.push(addresses.clone());
        if let Some(err) = self.write_failures.lock().await.pop_front() {
            return Err(err);
        }

        let interference = self.interference.lock().await.pop_front();
        if let Some(interference) = interference {
            let current = self.inner.get_ip_set(target).await?;
            let mut racing = current.addresses;
            if let Interference::Append(cidr) = interference {
                racing.push(cidr);
            }
            self.inner
                .update_ip_set(target, &current.lock_token, racing)
                .await?;
        }

        self.inner.update_ip_set(target, lock_token, addresses).await
    }
}
