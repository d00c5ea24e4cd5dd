//! Domain Layer - Pure business logic
//!
//! This layer contains:
//! - IP set entities and identifiers
//! - Address list mutation semantics
//! - Configuration
//! - Backoff jitter
//!
//! RULES:
//! - No I/O operations
//! - No async code

pub mod config;
pub mod entities;
pub mod jitter;
pub mod mutation;

pub use config::{ConfigError, IpSetConfig, IpSetConfigBuilder, RetryConfig, MAX_RETRIES_LIMIT};
pub use entities::{IpSetRef, IpSetSnapshot, IpSetSummary, LockToken, Scope};
pub use jitter::{BackoffJitter, FixedJitter, UniformJitter};
pub use mutation::Mutation;
