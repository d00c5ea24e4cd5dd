//! Address list mutation semantics
//!
//! Membership is exact string equality. `10.0.0.1/32` and `10.0.0.01/32`
//! are different entries.

use std::fmt;

/// A single-CIDR change to an IP set
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mutation {
    /// Add the CIDR unless it is already present
    Append,
    /// Remove the first occurrence of the CIDR
    Remove,
}

impl Mutation {
    /// Apply this mutation to `addresses` in place
    ///
    /// Returns `true` when the list changed.
    ///
    /// - `Append` pushes `cidr` to the end only if no entry equals it.
    ///   Duplicates already in the list are left alone.
    /// - `Remove` drops the first matching entry and stops. Later duplicates
    ///   stay, and the remaining entries keep their relative order.
    pub fn apply(&self, addresses: &mut Vec<String>, cidr: &str) -> bool {
        match self {
            Mutation::Append => {
                if addresses.iter().any(|a| a == cidr) {
                    return false;
                }
                addresses.push(cidr.to_string());
                true
            }
            Mutation::Remove => match addresses.iter().position(|a| a == cidr) {
                Some(index) => {
                    addresses.remove(index);
                    true
                }
                None => false,
            },
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mutation::Append => "append",
            Mutation::Remove => "remove",
        }
    }
}

impl fmt::Display for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
