//! # IPSet Guard
//!
//! Idempotent add/remove of single CIDR entries on a remote, versioned IP
//! set whose store only supports conditional (compare-and-swap) writes.
//!
//! ## Architecture
//!
//! This crate follows Hexagonal Architecture (Ports & Adapters):
//!
//! - **Domain Layer** (`domain/`): Pure business logic, no I/O
//!   - `Mutation`: Append / Remove semantics over an address list
//!   - `IpSetConfig`: Configuration with validation
//!   - `BackoffJitter`: Randomized delay between conflicting attempts
//!
//! - **Ports Layer** (`ports/`): Trait definitions
//!   - `IpSetApi`: Driving port (inbound API)
//!   - `IpSetStore`: Driven port (remote store with lock tokens)
//!
//! - **Service Layer** (`service/`): Orchestration
//!   - `MutationOperation`: One read-modify-write cycle
//!   - `OptimisticRetry`: Retries version conflicts with jittered backoff
//!   - `IpSetService`: Implements `IpSetApi`
//!
//! - **Adapters Layer** (`adapters/`): Store implementations
//!   - `InMemoryIpSetStore`: Process-local store with real token checks
//!
//! ## Invariants
//!
//! - Every attempt reads the set fresh and writes with the token from that read.
//! - A version conflict is retried at most `max_retries` times (3 by default,
//!   4 attempts total); every other failure is returned immediately.
//! - A call never reports success without its write having been accepted,
//!   unless `skip_noop_writes` is enabled and the list was already in the
//!   requested state.
//!
//! ## Usage Example
//!
//! ```ignore
//! use ipset_guard::{InMemoryIpSetStore, IpSetApi, IpSetService, Scope};
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! let store = Arc::new(InMemoryIpSetStore::new());
//! let set = store.create_ip_set("blocklist", Scope::Regional, vec![]).await?;
//!
//! let service = IpSetService::new(store.clone());
//! let cancel = CancellationToken::new();
//! service.append_to_ip_set(&cancel, &set.id, &set.name, "192.0.2.44/32").await?;
//! service.remove_from_ip_set(&cancel, &set.id, &set.name, "192.0.2.44/32").await?;
//! ```

pub mod adapters;
pub mod domain;
pub mod error;
pub mod metrics;
pub mod ports;
pub mod service;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Re-exports for convenience
pub use adapters::InMemoryIpSetStore;
pub use domain::{
    BackoffJitter, ConfigError, FixedJitter, IpSetConfig, IpSetConfigBuilder, IpSetRef,
    IpSetSnapshot, IpSetSummary, LockToken, Mutation, RetryConfig, Scope, UniformJitter,
};
pub use error::{IpSetError, StoreError};
pub use metrics::{Metrics, MetricsRecorder, MetricsSnapshot, NoOpMetrics};
pub use ports::{IpSetApi, IpSetStore};
pub use service::{IpSetService, MutationOperation, OptimisticRetry};
