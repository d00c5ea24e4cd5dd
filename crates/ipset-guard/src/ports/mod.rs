//! Ports Layer
//!
//! Defines the interfaces (traits) for:
//! - Driving Ports (inbound) - API for callers that mutate IP sets
//! - Driven Ports (outbound) - The remote IP set store

pub mod inbound;
pub mod outbound;

pub use inbound::IpSetApi;
pub use outbound::IpSetStore;
