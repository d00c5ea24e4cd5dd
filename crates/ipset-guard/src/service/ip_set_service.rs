//! IP Set Service
//!
//! Wires the mutation operation into the retry controller and exposes the
//! result through the `IpSetApi` port.

use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::mutation::MutationOperation;
use super::retry::OptimisticRetry;
use crate::domain::{BackoffJitter, IpSetConfig, IpSetRef, Mutation, Scope};
use crate::error::IpSetError;
use crate::metrics::{MetricsRecorder, NoOpMetrics};
use crate::ports::{IpSetApi, IpSetStore};

/// IP set service implementation
///
/// Implements the `IpSetApi` port over an injected store. Holds no state
/// between calls apart from configuration, the jitter source and metrics.
pub struct IpSetService<S: IpSetStore> {
    operation: MutationOperation<S>,
    retry: OptimisticRetry,
    scope: Scope,
    metrics: Arc<dyn MetricsRecorder>,
}

impl<S: IpSetStore> IpSetService<S> {
    /// Create a service with the default configuration
    pub fn new(store: Arc<S>) -> Self {
        let config = IpSetConfig::default();
        Self {
            operation: MutationOperation::new(store),
            retry: OptimisticRetry::from_config(&config.retry),
            scope: config.scope,
            metrics: Arc::new(NoOpMetrics),
        }
    }

    /// Create with a custom configuration, validating it first
    pub fn with_config(store: Arc<S>, config: IpSetConfig) -> Result<Self, IpSetError> {
        config.validate()?;
        Ok(Self {
            operation: MutationOperation::new(store).with_skip_noop_writes(config.skip_noop_writes),
            retry: OptimisticRetry::from_config(&config.retry),
            scope: config.scope,
            metrics: Arc::new(NoOpMetrics),
        })
    }

    /// Replace the backoff delay source
    pub fn with_jitter(mut self, jitter: Arc<dyn BackoffJitter>) -> Self {
        self.retry = self.retry.with_jitter(jitter);
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<dyn MetricsRecorder>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn store(&self) -> &Arc<S> {
        self.operation.store()
    }

    /// Apply `mutation` for `cidr` to `target`, retrying version conflicts
    pub async fn mutate(
        &self,
        cancel: &CancellationToken,
        mutation: Mutation,
        target: &IpSetRef,
        cidr: &str,
    ) -> Result<(), IpSetError> {
        debug!(ip_set_id = %target.id, cidr, %mutation, "Mutating IP set");

        let result = self
            .retry
            .run(cancel, || {
                self.operation
                    .run(cancel, mutation, target, cidr, self.metrics.as_ref())
            })
            .await;

        match &result {
            Ok(()) => {
                self.metrics.record_success();
                info!(ip_set_id = %target.id, cidr, %mutation, "IP set updated");
            }
            Err(IpSetError::RetryExhausted { attempts, .. }) => {
                self.metrics.record_retries_exhausted();
                warn!(
                    ip_set_id = %target.id,
                    cidr,
                    %mutation,
                    attempts,
                    "Gave up after repeated version conflicts"
                );
            }
            Err(IpSetError::Cancelled) => {
                self.metrics.record_cancellation();
                debug!(ip_set_id = %target.id, cidr, %mutation, "IP set mutation cancelled");
            }
            Err(err) => {
                warn!(ip_set_id = %target.id, cidr, %mutation, error = %err, "IP set mutation failed");
            }
        }

        result
    }

    fn target(&self, ip_set_id: &str, ip_set_name: &str) -> IpSetRef {
        IpSetRef::new(ip_set_id, ip_set_name, self.scope)
    }
}

#[async_trait]
impl<S: IpSetStore + 'static> IpSetApi for IpSetService<S> {
    async fn append_to_ip_set(
        &self,
        cancel: &CancellationToken,
        ip_set_id: &str,
        ip_set_name: &str,
        cidr: &str,
    ) -> Result<(), IpSetError> {
        let target = self.target(ip_set_id, ip_set_name);
        self.mutate(cancel, Mutation::Append, &target, cidr).await
    }

    async fn remove_from_ip_set(
        &self,
        cancel: &CancellationToken,
        ip_set_id: &str,
        ip_set_name: &str,
        cidr: &str,
    ) -> Result<(), IpSetError> {
        let target = self.target(ip_set_id, ip_set_name);
        self.mutate(cancel, Mutation::Remove, &target, cidr).await
    }
}
