//! # Contention on a Shared IP Set
//!
//! Independent callers mutate the same IP set concurrently. The only
//! coordination between them is the store's lock-token check, so every
//! lost race must be retried from a fresh read and no update may be lost.
//!
//! Each conflict a writer sees is caused by a different writer's accepted
//! write, so with `n` writers a retry budget of at least `n - 1` guarantees
//! every writer lands.

#[cfg(test)]
mod tests {
    use futures::future::join_all;
    use std::collections::HashSet;
    use std::sync::Arc;
    use tokio_util::sync::CancellationToken;

    use ipset_guard::{
        InMemoryIpSetStore, IpSetApi, IpSetConfigBuilder, IpSetRef, IpSetService, Metrics, Scope,
    };

    use crate::init_tracing;

    const IP_SET_NAME: &str = "shared-ip-set";

    fn cidr(i: usize) -> String {
        format!("203.0.113.{i}/32")
    }

    async fn shared_set(store: &InMemoryIpSetStore, seed: Vec<String>) -> IpSetRef {
        store
            .create_ip_set(IP_SET_NAME, Scope::Regional, seed)
            .await
            .expect("create ip set")
            .to_ref()
    }

    fn contended_service(
        store: Arc<InMemoryIpSetStore>,
        metrics: Arc<Metrics>,
    ) -> Arc<IpSetService<InMemoryIpSetStore>> {
        let config = IpSetConfigBuilder::new()
            .max_retries(10)
            .backoff_ms(1, 5)
            .build()
            .expect("valid config");
        Arc::new(
            IpSetService::with_config(store, config)
                .expect("valid service")
                .with_metrics(metrics),
        )
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_appends_all_land() {
        init_tracing();
        let store = Arc::new(InMemoryIpSetStore::new());
        let target = shared_set(&store, vec![]).await;
        let metrics = Arc::new(Metrics::new());
        let service = contended_service(store.clone(), metrics.clone());
        let cancel = CancellationToken::new();

        let writers = (0..8).map(|i| {
            let service = service.clone();
            let target = target.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move {
                service
                    .append_to_ip_set(&cancel, &target.id, &target.name, &cidr(i))
                    .await
            })
        });

        for result in join_all(writers).await {
            result.expect("writer task").expect("append lands");
        }

        let addresses = store.addresses(&target).await.unwrap();
        let stored: HashSet<String> = addresses.iter().cloned().collect();
        let expected: HashSet<String> = (0..8).map(cidr).collect();
        assert_eq!(addresses.len(), 8);
        assert_eq!(stored, expected);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.successes, 8);
        assert_eq!(snapshot.attempts, 8 + snapshot.conflicts);
        assert_eq!(snapshot.retries_exhausted, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_mixed_appends_and_removes() {
        init_tracing();
        let store = Arc::new(InMemoryIpSetStore::new());
        let seed: Vec<String> = (100..103).map(cidr).collect();
        let target = shared_set(&store, seed).await;
        let metrics = Arc::new(Metrics::new());
        let service = contended_service(store.clone(), metrics.clone());
        let cancel = CancellationToken::new();

        let mut writers = Vec::new();
        for i in 0..6 {
            let (service, target, cancel) = (service.clone(), target.clone(), cancel.clone());
            writers.push(tokio::spawn(async move {
                service
                    .append_to_ip_set(&cancel, &target.id, &target.name, &cidr(i))
                    .await
            }));
        }
        for i in 100..103 {
            let (service, target, cancel) = (service.clone(), target.clone(), cancel.clone());
            writers.push(tokio::spawn(async move {
                service
                    .remove_from_ip_set(&cancel, &target.id, &target.name, &cidr(i))
                    .await
            }));
        }

        for result in join_all(writers).await {
            result.expect("writer task").expect("mutation lands");
        }

        let stored: HashSet<String> = store
            .addresses(&target)
            .await
            .unwrap()
            .into_iter()
            .collect();
        let expected: HashSet<String> = (0..6).map(cidr).collect();
        assert_eq!(stored, expected);
        assert_eq!(metrics.snapshot().successes, 9);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_same_cidr_from_many_callers_stored_once() {
        init_tracing();
        let store = Arc::new(InMemoryIpSetStore::new());
        let target = shared_set(&store, vec![]).await;
        let service = contended_service(store.clone(), Arc::new(Metrics::new()));
        let cancel = CancellationToken::new();

        let writers = (0..6).map(|_| {
            let (service, target, cancel) = (service.clone(), target.clone(), cancel.clone());
            tokio::spawn(async move {
                service
                    .append_to_ip_set(&cancel, &target.id, &target.name, "192.0.2.44/32")
                    .await
            })
        });

        for result in join_all(writers).await {
            result.expect("writer task").expect("append lands");
        }

        assert_eq!(
            store.addresses(&target).await.unwrap(),
            vec!["192.0.2.44/32".to_string()]
        );
    }
}
