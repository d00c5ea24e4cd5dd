//! Mutation Operation
//!
//! One fetch-modify-write cycle against the store: read the current list and
//! lock token, apply the mutation, then write the full list back with the
//! token from that same read.

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::cancel::until_cancelled;
use crate::domain::{IpSetRef, IpSetSnapshot, Mutation};
use crate::error::IpSetError;
use crate::metrics::MetricsRecorder;
use crate::ports::IpSetStore;

/// Single-attempt read-modify-write over an injected store
pub struct MutationOperation<S: IpSetStore> {
    store: Arc<S>,
    /// Skip the write when the list did not change
    skip_noop_writes: bool,
}

impl<S: IpSetStore> MutationOperation<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            skip_noop_writes: false,
        }
    }

    pub fn with_skip_noop_writes(mut self, skip: bool) -> Self {
        self.skip_noop_writes = skip;
        self
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Run one attempt
    ///
    /// Performs exactly one read and one write. With `skip_noop_writes` set,
    /// the write is left out when the mutation changed nothing.
    pub async fn run(
        &self,
        cancel: &CancellationToken,
        mutation: Mutation,
        target: &IpSetRef,
        cidr: &str,
        metrics: &dyn MetricsRecorder,
    ) -> Result<(), IpSetError> {
        metrics.record_attempt();

        let IpSetSnapshot {
            mut addresses,
            lock_token,
        } = until_cancelled(cancel, self.store.get_ip_set(target))
            .await?
            .map_err(|e| {
                metrics.record_read_failure();
                IpSetError::Read(e)
            })?;

        let changed = mutation.apply(&mut addresses, cidr);
        if !changed && self.skip_noop_writes {
            debug!(
                ip_set_id = %target.id,
                cidr,
                %mutation,
                "List unchanged, skipping write"
            );
            metrics.record_noop_write_skipped();
            return Ok(());
        }

        debug!(
            ip_set_id = %target.id,
            cidr,
            %mutation,
            changed,
            entries = addresses.len(),
            "Submitting conditional write"
        );

        until_cancelled(
            cancel,
            self.store.update_ip_set(target, &lock_token, addresses),
        )
        .await?
        .map_err(|e| {
            let err = IpSetError::Write(e);
            if err.is_version_conflict() {
                metrics.record_conflict();
            } else {
                metrics.record_write_failure();
            }
            err
        })
    }
}
