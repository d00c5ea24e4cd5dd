//! Service Layer
//!
//! Orchestrates domain logic and coordinates with the store via ports.
//!
//! - `MutationOperation`: one fetch-modify-write cycle
//! - `OptimisticRetry`: re-runs cycles that lost a version race
//! - `IpSetService`: implements `IpSetApi` on top of both

mod cancel;
pub mod ip_set_service;
pub mod mutation;
pub mod retry;

pub use ip_set_service::IpSetService;
pub use mutation::MutationOperation;
pub use retry::OptimisticRetry;
