//! The object-flavor discriminant.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Distinguishes whether a statement's object is a named resource (SPO)
/// or a literal value (SPL).
///
/// Flavor is a first-class, stored discriminant: it is supplied when the
/// statement is built and is never recomputed or reconciled afterwards.
/// Every query that filters on object identity must also filter on flavor,
/// since a resource and a literal may share a textual form and therefore a
/// key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Flavor {
    /// The object is a named resource.
    Resource = 0,
    /// The object is a literal value.
    Literal = 1,
}

impl Flavor {
    /// Returns the stored integer form of the flavor.
    pub fn as_i64(self) -> i64 {
        self as i64
    }

    /// Reconstructs a flavor from its stored integer form.
    pub fn from_i64(value: i64) -> Option<Self> {
        match value {
            0 => Some(Self::Resource),
            1 => Some(Self::Literal),
            _ => None,
        }
    }
}

impl fmt::Display for Flavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resource => f.write_str("SPO"),
            Self::Literal => f.write_str("SPL"),
        }
    }
}
