//! # End-to-End IP Set Lifecycle
//!
//! Drives `IpSetApi` against the in-memory store the way a deployment drives
//! it against the remote one: create a set, append, append again, remove.

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;

    use ipset_guard::test_utils::{Interference, ScriptedStore};
    use ipset_guard::{
        BackoffJitter, InMemoryIpSetStore, IpSetApi, IpSetConfig, IpSetError, IpSetService,
        Metrics, Scope, StoreError,
    };

    use crate::init_tracing;

    const IP_SET_NAME: &str = "test-ip-set";
    const CIDR: &str = "192.0.2.44/32";

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    /// Jitter that records every delay it hands out
    #[derive(Default)]
    struct RecordingJitter {
        delays: Mutex<Vec<Duration>>,
    }

    impl BackoffJitter for RecordingJitter {
        fn next_delay(&self) -> Duration {
            let delay = Duration::from_millis(1);
            self.delays.lock().push(delay);
            delay
        }
    }

    async fn setup_ip_set(store: &InMemoryIpSetStore) -> (String, String) {
        let summary = store
            .create_ip_set(IP_SET_NAME, Scope::Regional, vec![])
            .await
            .expect("create ip set");
        (summary.id, summary.name)
    }

    async fn exists_cidr(store: &InMemoryIpSetStore, id: &str, cidr: &str) -> bool {
        let target = ipset_guard::IpSetRef::new(id, IP_SET_NAME, Scope::Regional);
        store
            .addresses(&target)
            .await
            .expect("ip set exists")
            .iter()
            .any(|a| a == cidr)
    }

    // =============================================================================
    // LIFECYCLE
    // =============================================================================

    #[tokio::test]
    async fn test_append_twice_then_remove() {
        init_tracing();
        let store = Arc::new(InMemoryIpSetStore::new());
        let (id, name) = setup_ip_set(&store).await;
        let service = IpSetService::new(store.clone());
        let cancel = CancellationToken::new();
        let target = ipset_guard::IpSetRef::new(&id, &name, Scope::Regional);

        service.append_to_ip_set(&cancel, &id, &name, CIDR).await.unwrap();
        assert_eq!(store.addresses(&target).await.unwrap(), vec![CIDR.to_string()]);

        service.append_to_ip_set(&cancel, &id, &name, CIDR).await.unwrap();
        assert_eq!(store.addresses(&target).await.unwrap(), vec![CIDR.to_string()]);

        service.remove_from_ip_set(&cancel, &id, &name, CIDR).await.unwrap();
        assert!(store.addresses(&target).await.unwrap().is_empty());

        // Every call is one read and one write, even the no-op append.
        assert_eq!(store.read_count(), 3);
        assert_eq!(store.write_count(), 3);
    }

    #[tokio::test]
    async fn test_remove_absent_cidr_succeeds() {
        init_tracing();
        let store = Arc::new(InMemoryIpSetStore::new());
        let (id, name) = setup_ip_set(&store).await;
        let service = IpSetService::new(store.clone());

        service
            .remove_from_ip_set(&CancellationToken::new(), &id, &name, CIDR)
            .await
            .unwrap();

        assert!(!exists_cidr(&store, &id, CIDR).await);
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn test_skip_noop_writes_from_config() {
        init_tracing();
        let store = Arc::new(InMemoryIpSetStore::new());
        let (id, name) = setup_ip_set(&store).await;
        let config = IpSetConfig::from_lookup(|key| {
            (key == "IPSET_SKIP_NOOP_WRITES").then(|| "true".to_string())
        })
        .unwrap();
        let metrics = Arc::new(Metrics::new());
        let service = IpSetService::with_config(store.clone(), config)
            .unwrap()
            .with_metrics(metrics.clone());
        let cancel = CancellationToken::new();

        service.remove_from_ip_set(&cancel, &id, &name, CIDR).await.unwrap();
        service.append_to_ip_set(&cancel, &id, &name, CIDR).await.unwrap();
        service.append_to_ip_set(&cancel, &id, &name, CIDR).await.unwrap();

        assert_eq!(store.write_count(), 1);
        assert_eq!(metrics.snapshot().noop_writes_skipped, 2);
        assert!(exists_cidr(&store, &id, CIDR).await);
    }

    #[tokio::test]
    async fn test_deleted_set_reports_read_failure() {
        init_tracing();
        let store = Arc::new(InMemoryIpSetStore::new());
        let summary = store
            .create_ip_set(IP_SET_NAME, Scope::Regional, vec![])
            .await
            .unwrap();
        store
            .delete_ip_set(&summary.to_ref(), &summary.lock_token)
            .await
            .unwrap();
        let service = IpSetService::new(store.clone());

        let err = service
            .append_to_ip_set(&CancellationToken::new(), &summary.id, IP_SET_NAME, CIDR)
            .await
            .unwrap_err();

        assert!(matches!(err, IpSetError::Read(StoreError::NotFound { .. })));
        assert!(err.to_string().starts_with("ipset: get ip set:"));
    }

    // =============================================================================
    // OPTIMISTIC LOCK HANDLING
    // =============================================================================

    #[tokio::test]
    async fn test_append_handles_optimistic_lock_error() {
        init_tracing();
        let store = Arc::new(ScriptedStore::new());
        let target = store.seed(IP_SET_NAME, &[]).await;
        store.interfere(Interference::Touch).await;
        let jitter = Arc::new(RecordingJitter::default());
        let metrics = Arc::new(Metrics::new());
        let service = IpSetService::new(store.clone())
            .with_jitter(jitter.clone())
            .with_metrics(metrics.clone());

        service
            .append_to_ip_set(&CancellationToken::new(), &target.id, &target.name, CIDR)
            .await
            .unwrap();

        assert_eq!(store.addresses(&target).await, vec![CIDR.to_string()]);
        assert_eq!(jitter.delays.lock().len(), 1);
        assert_eq!(metrics.snapshot().conflicts, 1);
        assert_eq!(metrics.snapshot().successes, 1);
    }

    #[tokio::test]
    async fn test_remove_handles_optimistic_lock_error() {
        init_tracing();
        let store = Arc::new(ScriptedStore::new());
        let target = store.seed(IP_SET_NAME, &[CIDR]).await;
        store.interfere(Interference::Touch).await;
        store.interfere(Interference::Touch).await;
        let jitter = Arc::new(RecordingJitter::default());
        let service = IpSetService::new(store.clone()).with_jitter(jitter.clone());

        service
            .remove_from_ip_set(&CancellationToken::new(), &target.id, &target.name, CIDR)
            .await
            .unwrap();

        assert!(store.addresses(&target).await.is_empty());
        assert_eq!(jitter.delays.lock().len(), 2);
        assert_eq!(store.read_count().await, 3);
    }

    #[tokio::test]
    async fn test_persistent_conflicts_exhaust_budget() {
        init_tracing();
        let store = Arc::new(ScriptedStore::new());
        let target = store.seed(IP_SET_NAME, &[]).await;
        for _ in 0..10 {
            store.interfere(Interference::Touch).await;
        }
        let jitter = Arc::new(RecordingJitter::default());
        let service = IpSetService::new(store.clone()).with_jitter(jitter.clone());

        let err = service
            .append_to_ip_set(&CancellationToken::new(), &target.id, &target.name, CIDR)
            .await
            .unwrap_err();

        match err {
            IpSetError::RetryExhausted { attempts, source } => {
                assert_eq!(attempts, 4);
                assert!(matches!(source, StoreError::VersionConflict { .. }));
            }
            other => panic!("expected RetryExhausted, got {other:?}"),
        }
        assert_eq!(store.write_count().await, 4);
        assert_eq!(jitter.delays.lock().len(), 3);
    }

    #[tokio::test]
    async fn test_throttled_write_is_not_retried() {
        init_tracing();
        let store = Arc::new(ScriptedStore::new());
        let target = store.seed(IP_SET_NAME, &[]).await;
        store.fail_next_write(StoreError::Throttled).await;
        let jitter = Arc::new(RecordingJitter::default());
        let service = IpSetService::new(store.clone()).with_jitter(jitter.clone());

        let err = service
            .append_to_ip_set(&CancellationToken::new(), &target.id, &target.name, CIDR)
            .await
            .unwrap_err();

        assert!(matches!(err, IpSetError::Write(StoreError::Throttled)));
        assert_eq!(store.write_count().await, 1);
        assert!(jitter.delays.lock().is_empty());
    }
}
