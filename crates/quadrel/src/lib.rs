//! quadrel - Relational RDF Quad Store
//!
//! A quad store persists context-tagged RDF statements
//! `(context, subject, predicate, object)` in a single wide relation owned
//! by a relational engine. This crate implements the store logic exactly
//! once, behind a small SQL-dialect seam, where earlier systems duplicated
//! it per engine.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         quadrel                             │
//! ├─────────────────────────────────────────────────────────────┤
//! │                                                             │
//! │  ┌──────────────────────────────────────────────────────┐   │
//! │  │                  Pattern Planner                     │   │
//! │  │  16+1 signature table │ flavor disambiguation        │   │
//! │  └──────────────────────────────────────────────────────┘   │
//! │                           │                                 │
//! │  ┌──────────────────────────────────────────────────────┐   │
//! │  │                  Mutation Engine                     │   │
//! │  │  upsert │ merge │ delete │ clear │ select │ contains │   │
//! │  └──────────────────────────────────────────────────────┘   │
//! │                           │                                 │
//! │  ┌──────────────────────────────────────────────────────┐   │
//! │  │          Schema Bootstrap & SQL Dialect              │   │
//! │  │  probe │ one-time DDL │ SQLite (rusqlite)            │   │
//! │  └──────────────────────────────────────────────────────┘   │
//! │                                                             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```
//! use quadrel::{QuadPattern, QuadStore, Statement, Term};
//!
//! // Create an in-memory store (file-backed: QuadStore::open).
//! let store = QuadStore::memory()?;
//!
//! let stmt = Statement::resource(
//!     Term::new("ex:graph")?,
//!     Term::new("ex:alice")?,
//!     Term::new("foaf:knows")?,
//!     Term::new("ex:bob")?,
//! );
//!
//! // Insert-if-absent: merging the same statement twice stores one row.
//! assert!(store.upsert(&stmt)?);
//! assert!(!store.upsert(&stmt)?);
//!
//! let found = store.select_by_pattern(
//!     &QuadPattern::subject(Term::new("ex:alice")?),
//! )?;
//! assert_eq!(found, vec![stmt]);
//! # Ok::<(), quadrel::Error>(())
//! ```
//!
//! # Statements and flavor
//!
//! The object position carries a first-class flavor: a named resource
//! (`SPO`) or a literal value (`SPL`). A resource and a literal may share a
//! textual form, so every object-bound query also filters on flavor — the
//! planner enforces this for all sixteen filter signatures.

pub mod dialect;
pub mod error;
pub mod flavor;
pub mod pattern;
pub mod schema;
pub mod statement;
pub mod term;

mod engine;
mod planner;

// Re-exports
pub use dialect::{SqlDialect, SqliteDialect};
pub use engine::StoreOptions;
pub use error::{Error, Result};
pub use flavor::Flavor;
pub use pattern::QuadPattern;
pub use schema::SchemaState;
pub use statement::{Object, Statement};
pub use term::{Term, MAX_TERM_LEN};

use engine::StoreEngine;
use std::path::Path;

/// The main entry point: a quad store backed by a relational engine.
///
/// One `QuadStore` owns one connection. Every mutation runs in its own
/// transaction (commit on success, rollback on any failure); reads are
/// bounded by the configured timeout. All cross-connection concurrency is
/// the relational engine's responsibility.
///
/// # Examples
///
/// ```
/// use quadrel::{QuadStore, Statement, Term};
///
/// let store = QuadStore::memory()?;
///
/// let stmt = Statement::literal(
///     Term::new("ex:graph")?,
///     Term::new("ex:alice")?,
///     Term::new("ex:age")?,
///     Term::new("30")?,
/// );
///
/// store.upsert(&stmt)?;
/// assert!(store.contains(stmt.key()));
///
/// store.delete_by_key(stmt.key())?;
/// assert!(!store.contains(stmt.key()));
/// # Ok::<(), quadrel::Error>(())
/// ```
pub struct QuadStore {
    engine: StoreEngine,
}

impl QuadStore {
    /// Opens (or creates) a store backed by a database file.
    ///
    /// Bootstrap runs before the store is returned: the backing relation
    /// is probed and, if absent, created together with its indexes. An
    /// unreachable data source fails construction — no store value exists
    /// afterwards.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use quadrel::QuadStore;
    ///
    /// let store = QuadStore::open("./statements.db")?;
    /// # Ok::<(), quadrel::Error>(())
    /// ```
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(path, StoreOptions::default())
    }

    /// Opens a file-backed store with explicit options.
    pub fn open_with(path: impl AsRef<Path>, options: StoreOptions) -> Result<Self> {
        Ok(Self {
            engine: StoreEngine::open(path.as_ref(), options)?,
        })
    }

    /// Opens an in-memory store. Useful for tests and ephemeral data; all
    /// statements are lost on drop.
    pub fn memory() -> Result<Self> {
        Self::memory_with(StoreOptions::default())
    }

    /// Opens an in-memory store with explicit options.
    pub fn memory_with(options: StoreOptions) -> Result<Self> {
        Ok(Self {
            engine: StoreEngine::in_memory(options)?,
        })
    }

    /// Inserts a statement unless one with the same key already exists.
    ///
    /// Returns `true` if a new row was inserted. A pre-existing statement
    /// is left untouched and reports `Ok(false)` — still success, never an
    /// error and never a second row.
    pub fn upsert(&self, stmt: &Statement) -> Result<bool> {
        self.engine.upsert(stmt)
    }

    /// Merges a sequence of statements atomically.
    ///
    /// All statements run as repeated prepared-statement executions inside
    /// one transaction; either every one commits or none does. Returns the
    /// number of newly inserted rows.
    ///
    /// # Examples
    ///
    /// ```
    /// use quadrel::{QuadStore, Statement, Term};
    ///
    /// let store = QuadStore::memory()?;
    /// let graph = Term::new("ex:graph")?;
    ///
    /// let stmts = vec![
    ///     Statement::resource(graph.clone(), Term::new("ex:alice")?,
    ///         Term::new("foaf:knows")?, Term::new("ex:bob")?),
    ///     Statement::literal(graph.clone(), Term::new("ex:alice")?,
    ///         Term::new("foaf:name")?, Term::new("Alice")?),
    /// ];
    ///
    /// assert_eq!(store.merge_many(stmts)?, 2);
    /// # Ok::<(), quadrel::Error>(())
    /// ```
    pub fn merge_many<I>(&self, stmts: I) -> Result<usize>
    where
        I: IntoIterator<Item = Statement>,
    {
        self.engine.merge_many(stmts)
    }

    /// Removes at most one statement, by key.
    ///
    /// Returns `true` if a row was removed.
    pub fn delete_by_key(&self, key: i64) -> Result<bool> {
        self.engine.delete_by_key(key)
    }

    /// Removes every statement matching the pattern, in one statement.
    ///
    /// A completely unbound pattern is a defined no-op returning `0`; use
    /// [`clear`](Self::clear) to drop all statements.
    pub fn delete_by_pattern(&self, pattern: &QuadPattern) -> Result<usize> {
        self.engine.delete_by_pattern(pattern)
    }

    /// Unconditionally deletes all statements. Returns the number removed.
    pub fn clear(&self) -> Result<usize> {
        self.engine.clear()
    }

    /// Returns `true` if a statement with the given key exists.
    ///
    /// Never errors: an absent key, a closed store, or a failing
    /// collaborator all answer `false` (failures are logged).
    pub fn contains(&self, key: i64) -> bool {
        self.engine.contains(key)
    }

    /// Returns every statement matching the pattern, ordered by statement
    /// key.
    ///
    /// Execution is bounded by [`StoreOptions::read_timeout`]; exceeding it
    /// surfaces as an error, never a partial result.
    ///
    /// # Examples
    ///
    /// ```
    /// use quadrel::{QuadPattern, QuadStore, Statement, Term};
    ///
    /// let store = QuadStore::memory()?;
    /// store.upsert(&Statement::resource(
    ///     Term::new("ex:graph")?,
    ///     Term::new("ex:alice")?,
    ///     Term::new("foaf:knows")?,
    ///     Term::new("ex:bob")?,
    /// ))?;
    ///
    /// // An unbound pattern selects everything.
    /// assert_eq!(store.select_by_pattern(&QuadPattern::any())?.len(), 1);
    /// # Ok::<(), quadrel::Error>(())
    /// ```
    pub fn select_by_pattern(&self, pattern: &QuadPattern) -> Result<Vec<Statement>> {
        self.engine.select_by_pattern(pattern)
    }

    /// Returns the total number of statements.
    pub fn count(&self) -> usize {
        self.engine.count()
    }

    /// Returns `true` if the store holds no statements.
    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Returns the schema state observed when the store was constructed.
    /// Always [`SchemaState::Ready`] on a successfully built store.
    pub fn schema_state(&self) -> SchemaState {
        self.engine.schema_state()
    }

    /// Releases the store's connection.
    ///
    /// Idempotent: a second close is a no-op. Dropping the store releases
    /// the connection implicitly; closing explicitly surfaces any error.
    pub fn close(&self) -> Result<()> {
        self.engine.close()
    }
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    fn term(text: &str) -> Term {
        Term::new(text).unwrap()
    }

    #[test]
    fn test_create_memory_store() {
        let store = QuadStore::memory().unwrap();
        assert_eq!(store.count(), 0);
        assert!(store.is_empty());
        assert_eq!(store.schema_state(), SchemaState::Ready);
    }

    #[test]
    fn test_upsert_and_select_roundtrip() {
        let store = QuadStore::memory().unwrap();
        let stmt = Statement::literal(term("c"), term("s"), term("p"), term("a literal"));

        store.upsert(&stmt).unwrap();

        let found = store
            .select_by_pattern(
                &QuadPattern::context(term("c"))
                    .with_subject(term("s"))
                    .with_predicate(term("p"))
                    .with_literal(term("a literal")),
            )
            .unwrap();
        assert_eq!(found, vec![stmt]);
    }

    #[test]
    fn test_empty_path_is_configuration_error() {
        assert!(matches!(
            QuadStore::open(""),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_version_constant() {
        assert!(!VERSION.is_empty());
    }
}
