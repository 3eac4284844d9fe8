//! Statements (quadruples) and the identifier scheme.
//!
//! A `Statement` is a context-tagged RDF triple. Its key is content-derived:
//! identical statements always hash to the same key, which is what makes
//! merge idempotent.

use crate::term::stable_key;
use crate::{Flavor, Term};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The object position of a statement, tagged with its [`Flavor`].
///
/// # Examples
///
/// ```
/// use quadrel::{Flavor, Object, Term};
///
/// let resource = Object::resource(Term::new("ex:bob")?);
/// assert_eq!(resource.flavor(), Flavor::Resource);
///
/// let literal = Object::literal(Term::new("Bob Smith")?);
/// assert_eq!(literal.flavor(), Flavor::Literal);
/// # Ok::<(), quadrel::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Object {
    /// A named resource ("SPO" statement).
    Resource(Term),
    /// A literal value ("SPL" statement).
    Literal(Term),
}

impl Object {
    /// Creates a resource object.
    pub fn resource(term: Term) -> Self {
        Self::Resource(term)
    }

    /// Creates a literal object.
    pub fn literal(term: Term) -> Self {
        Self::Literal(term)
    }

    /// Returns the underlying term.
    pub fn term(&self) -> &Term {
        match self {
            Self::Resource(term) | Self::Literal(term) => term,
        }
    }

    /// Returns the flavor of this object.
    pub fn flavor(&self) -> Flavor {
        match self {
            Self::Resource(_) => Flavor::Resource,
            Self::Literal(_) => Flavor::Literal,
        }
    }
}

/// A quadruple: `(context, subject, predicate, object)`.
///
/// # Examples
///
/// ```
/// use quadrel::{Statement, Term};
///
/// let stmt = Statement::resource(
///     Term::new("ex:graph")?,
///     Term::new("ex:alice")?,
///     Term::new("foaf:knows")?,
///     Term::new("ex:bob")?,
/// );
///
/// // The key is a pure function of the four canonical strings.
/// let again = Statement::resource(
///     Term::new("ex:graph")?,
///     Term::new("ex:alice")?,
///     Term::new("foaf:knows")?,
///     Term::new("ex:bob")?,
/// );
/// assert_eq!(stmt.key(), again.key());
/// # Ok::<(), quadrel::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Statement {
    context: Term,
    subject: Term,
    predicate: Term,
    object: Object,
}

impl Statement {
    /// Creates a statement from its four parts.
    pub fn new(context: Term, subject: Term, predicate: Term, object: Object) -> Self {
        Self {
            context,
            subject,
            predicate,
            object,
        }
    }

    /// Creates a statement whose object is a named resource.
    pub fn resource(context: Term, subject: Term, predicate: Term, object: Term) -> Self {
        Self::new(context, subject, predicate, Object::Resource(object))
    }

    /// Creates a statement whose object is a literal.
    pub fn literal(context: Term, subject: Term, predicate: Term, object: Term) -> Self {
        Self::new(context, subject, predicate, Object::Literal(object))
    }

    /// Returns the naming context of the statement.
    pub fn context(&self) -> &Term {
        &self.context
    }

    /// Returns the subject of the statement.
    pub fn subject(&self) -> &Term {
        &self.subject
    }

    /// Returns the predicate of the statement.
    pub fn predicate(&self) -> &Term {
        &self.predicate
    }

    /// Returns the object of the statement.
    pub fn object(&self) -> &Object {
        &self.object
    }

    /// Returns the flavor of the statement's object.
    pub fn flavor(&self) -> Flavor {
        self.object.flavor()
    }

    /// Returns the canonical text the statement key is derived from:
    /// the four term strings joined with single spaces, in the fixed
    /// order context, subject, predicate, object.
    pub fn canonical_text(&self) -> String {
        format!(
            "{} {} {} {}",
            self.context.as_str(),
            self.subject.as_str(),
            self.predicate.as_str(),
            self.object.term().as_str()
        )
    }

    /// Returns the content-derived 64-bit statement key.
    ///
    /// Deterministic across processes. An accidental collision is treated
    /// as "same statement"; the design deliberately relies on this for
    /// idempotent merge. Note that the key does not cover the flavor: two
    /// statements that differ only in flavor share a key and collapse to
    /// one row.
    pub fn key(&self) -> i64 {
        stable_key(&self.canonical_text())
    }
}

// Display mirrors the canonical text, with the flavor appended so SPO and
// SPL statements that share a textual form remain distinguishable in logs.
impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.canonical_text(), self.flavor())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn term(text: &str) -> Term {
        Term::new(text).unwrap()
    }

    #[test]
    fn test_key_is_deterministic() {
        let a = Statement::resource(term("ex:c"), term("ex:s"), term("ex:p"), term("ex:o"));
        let b = Statement::resource(term("ex:c"), term("ex:s"), term("ex:p"), term("ex:o"));
        assert_eq!(a.key(), b.key());
    }

    #[test]
    fn test_key_depends_on_every_position() {
        let base = Statement::resource(term("c"), term("s"), term("p"), term("o"));
        let ctx = Statement::resource(term("c2"), term("s"), term("p"), term("o"));
        let subj = Statement::resource(term("c"), term("s2"), term("p"), term("o"));
        let pred = Statement::resource(term("c"), term("s"), term("p2"), term("o"));
        let obj = Statement::resource(term("c"), term("s"), term("p"), term("o2"));

        for other in [&ctx, &subj, &pred, &obj] {
            assert_ne!(base.key(), other.key());
        }
    }

    #[test]
    fn test_canonical_text_order() {
        let stmt = Statement::literal(term("c"), term("s"), term("p"), term("o"));
        assert_eq!(stmt.canonical_text(), "c s p o");
    }

    #[test]
    fn test_object_accessors() {
        let stmt = Statement::literal(term("c"), term("s"), term("p"), term("30"));
        assert_eq!(stmt.flavor(), Flavor::Literal);
        assert_eq!(stmt.object().term().as_str(), "30");
    }
}
