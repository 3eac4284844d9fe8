//! The Term Model boundary.
//!
//! A `Term` is a single RDF value (a context name, a resource, or a literal)
//! reduced to the two things the engine consumes: a canonical string and a
//! stable 64-bit key derived from it. Everything downstream treats both as
//! opaque.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum length of a canonical term string, in code units.
pub const MAX_TERM_LEN: usize = 1000;

/// A canonical RDF term: its string form plus a stable 64-bit key.
///
/// The constructor enforces the boundary contract: no embedded control
/// characters, at most [`MAX_TERM_LEN`] code units. An over-long term is
/// rejected rather than truncated, since truncation would silently change
/// every statement key derived from it.
///
/// # Examples
///
/// ```
/// use quadrel::Term;
///
/// let term = Term::new("ex:alice")?;
/// assert_eq!(term.as_str(), "ex:alice");
///
/// // The key is deterministic across processes.
/// assert_eq!(term.key(), Term::new("ex:alice")?.key());
/// # Ok::<(), quadrel::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Term {
    text: String,
    key: i64,
}

impl Term {
    /// Creates a term from its canonical string form.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTerm`] if the string contains control
    /// characters or exceeds [`MAX_TERM_LEN`] code units.
    pub fn new(text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        if text.chars().count() > MAX_TERM_LEN {
            return Err(Error::InvalidTerm(format!(
                "term exceeds {} code units",
                MAX_TERM_LEN
            )));
        }
        if let Some(c) = text.chars().find(|c| c.is_control()) {
            return Err(Error::InvalidTerm(format!(
                "term contains control character {:?}",
                c
            )));
        }
        let key = stable_key(&text);
        Ok(Self { text, key })
    }

    /// Returns the canonical string form of the term.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Returns the term's stable 64-bit key.
    pub fn key(&self) -> i64 {
        self.key
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl TryFrom<String> for Term {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl TryFrom<&str> for Term {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Term> for String {
    fn from(term: Term) -> Self {
        term.text
    }
}

/// Derives a stable 64-bit key from a canonical string.
///
/// First eight little-endian bytes of the blake3 digest. Deterministic
/// across processes; collision-resistant enough that an accidental collision
/// is treated as "same value" by the engine's idempotent merge.
pub(crate) fn stable_key(text: &str) -> i64 {
    let digest = blake3::hash(text.as_bytes());
    let mut eight = [0u8; 8];
    eight.copy_from_slice(&digest.as_bytes()[..8]);
    i64::from_le_bytes(eight)
}
