//! Adapters Layer (Driven Adapters)
//!
//! Implementations of the `IpSetStore` port.
//!
//! ## Adapters
//!
//! - `InMemoryIpSetStore` - Process-local store with real lock-token
//!   semantics, for tests and local wiring

pub mod memory;

pub use memory::InMemoryIpSetStore;
