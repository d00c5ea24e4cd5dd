//! Entities for remote IP sets
//!
//! The store owns every IP set and its lock token. These types only carry
//! what a single read or write needs; nothing here is cached between calls.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::config::ConfigError;

/// Scope an IP set lives in
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scope {
    /// Regional resources (the deployment default)
    #[default]
    #[serde(rename = "REGIONAL")]
    Regional,
    /// Global CDN distributions
    #[serde(rename = "CLOUDFRONT")]
    CloudFront,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Regional => "REGIONAL",
            Scope::CloudFront => "CLOUDFRONT",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "REGIONAL" => Ok(Scope::Regional),
            "CLOUDFRONT" => Ok(Scope::CloudFront),
            other => Err(ConfigError::InvalidScope(other.to_string())),
        }
    }
}

/// Identifiers of the IP set a mutation targets
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct IpSetRef {
    /// Opaque store-assigned ID
    pub id: String,
    /// Human-readable name
    pub name: String,
    pub scope: Scope,
}

impl IpSetRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>, scope: Scope) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            scope,
        }
    }
}

impl fmt::Display for IpSetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} ({})", self.name, self.id, self.scope)
    }
}

/// Opaque version stamp; changes on every successful write
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LockToken(String);

impl LockToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LockToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Current addresses of an IP set together with the token they were read at
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IpSetSnapshot {
    /// CIDR entries in store order
    pub addresses: Vec<String>,
    pub lock_token: LockToken,
}

/// Listing entry for an IP set
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IpSetSummary {
    pub id: String,
    pub name: String,
    pub scope: Scope,
    pub lock_token: LockToken,
}

impl IpSetSummary {
    /// Target identifiers for this IP set
    pub fn to_ref(&self) -> IpSetRef {
        IpSetRef::new(self.id.clone(), self.name.clone(), self.scope)
    }
}
