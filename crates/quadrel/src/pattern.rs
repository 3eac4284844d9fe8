//! Quad patterns.
//!
//! A `QuadPattern` is a partially-bound statement used as a query filter.
//! Any subset of its five slots (context, subject, predicate,
//! resource-object, literal-object) may be bound; unbound slots act as
//! wildcards. The resource-object and literal-object slots are mutually
//! exclusive by construction: binding one replaces the other.

use crate::{Object, Statement, Term};

/// A pattern for matching `(context, subject, predicate, object)` statements.
///
/// # Examples
///
/// Match all statements in a context with a given subject:
///
/// ```
/// use quadrel::{QuadPattern, Term};
///
/// let pattern = QuadPattern::context(Term::new("ex:graph")?)
///     .with_subject(Term::new("ex:alice")?);
/// assert_eq!(pattern.signature(), "CS");
/// # Ok::<(), quadrel::Error>(())
/// ```
///
/// Match all statements (wildcard pattern):
///
/// ```
/// use quadrel::QuadPattern;
///
/// let pattern = QuadPattern::any();
/// assert!(pattern.is_wildcard());
/// assert_eq!(pattern.signature(), "");
/// ```
#[derive(Debug, Clone, Default)]
pub struct QuadPattern {
    /// An optional constraint on the statement's context.
    pub context: Option<Term>,
    /// An optional constraint on the statement's subject.
    pub subject: Option<Term>,
    /// An optional constraint on the statement's predicate.
    pub predicate: Option<Term>,
    // Kept private so resource and literal bindings stay mutually exclusive.
    object: Option<Object>,
}

impl QuadPattern {
    /// Creates a pattern that matches any statement.
    pub fn any() -> Self {
        Self::default()
    }

    /// Creates a pattern bound on the context slot.
    pub fn context(context: Term) -> Self {
        Self {
            context: Some(context),
            ..Default::default()
        }
    }

    /// Creates a pattern bound on the subject slot.
    pub fn subject(subject: Term) -> Self {
        Self {
            subject: Some(subject),
            ..Default::default()
        }
    }

    /// Creates a pattern bound on the predicate slot.
    pub fn predicate(predicate: Term) -> Self {
        Self {
            predicate: Some(predicate),
            ..Default::default()
        }
    }

    /// Creates a pattern bound on the resource-object slot.
    pub fn object(object: Term) -> Self {
        Self::any().with_object(object)
    }

    /// Creates a pattern bound on the literal-object slot.
    pub fn literal(literal: Term) -> Self {
        Self::any().with_literal(literal)
    }

    /// Adds a context constraint.
    pub fn with_context(mut self, context: Term) -> Self {
        self.context = Some(context);
        self
    }

    /// Adds a subject constraint.
    pub fn with_subject(mut self, subject: Term) -> Self {
        self.subject = Some(subject);
        self
    }

    /// Adds a predicate constraint.
    pub fn with_predicate(mut self, predicate: Term) -> Self {
        self.predicate = Some(predicate);
        self
    }

    /// Adds a resource-object constraint, replacing any literal constraint.
    pub fn with_object(mut self, object: Term) -> Self {
        self.object = Some(Object::Resource(object));
        self
    }

    /// Adds a literal-object constraint, replacing any resource constraint.
    pub fn with_literal(mut self, literal: Term) -> Self {
        self.object = Some(Object::Literal(literal));
        self
    }

    /// Returns the bound object slot, if any, with its flavor.
    pub fn bound_object(&self) -> Option<&Object> {
        self.object.as_ref()
    }

    /// Returns the pattern's filter signature: the ordered subset of
    /// `C S P O L` letters whose slots are bound.
    ///
    /// `O` and `L` never appear together.
    pub fn signature(&self) -> String {
        let mut sig = String::with_capacity(4);
        if self.context.is_some() {
            sig.push('C');
        }
        if self.subject.is_some() {
            sig.push('S');
        }
        if self.predicate.is_some() {
            sig.push('P');
        }
        match self.object {
            Some(Object::Resource(_)) => sig.push('O'),
            Some(Object::Literal(_)) => sig.push('L'),
            None => {}
        }
        sig
    }

    /// Returns `true` if no slot is bound.
    pub fn is_wildcard(&self) -> bool {
        self.context.is_none()
            && self.subject.is_none()
            && self.predicate.is_none()
            && self.object.is_none()
    }

    /// Returns `true` if the given statement matches this pattern.
    ///
    /// Matching follows the store's semantics: term slots compare by key,
    /// and an object binding also requires the statement's flavor to match.
    pub fn matches(&self, stmt: &Statement) -> bool {
        if let Some(ref c) = self.context {
            if stmt.context().key() != c.key() {
                return false;
            }
        }
        if let Some(ref s) = self.subject {
            if stmt.subject().key() != s.key() {
                return false;
            }
        }
        if let Some(ref p) = self.predicate {
            if stmt.predicate().key() != p.key() {
                return false;
            }
        }
        if let Some(ref o) = self.object {
            if stmt.flavor() != o.flavor() || stmt.object().term().key() != o.term().key() {
                return false;
            }
        }
        true
    }
}
