//! The SQL dialect seam.
//!
//! The five near-identical per-engine backends of the original system
//! differed only in DDL syntax, placeholder convention, and the wording of
//! the schema probe. Those differences live behind `SqlDialect`; the
//! planner, mutation engine, and bootstrap are written once against it.
//!
//! Only statically known identifiers (the table and column names below) are
//! ever concatenated into SQL text. Every value travels as a bound
//! parameter.

/// The backing relation.
pub(crate) const TABLE: &str = "quads";

pub(crate) const COL_STATEMENT_KEY: &str = "statement_key";
pub(crate) const COL_FLAVOR: &str = "flavor";
pub(crate) const COL_CONTEXT_TEXT: &str = "context_text";
pub(crate) const COL_SUBJECT_TEXT: &str = "subject_text";
pub(crate) const COL_PREDICATE_TEXT: &str = "predicate_text";
pub(crate) const COL_OBJECT_TEXT: &str = "object_text";
pub(crate) const COL_CONTEXT_KEY: &str = "context_key";
pub(crate) const COL_SUBJECT_KEY: &str = "subject_key";
pub(crate) const COL_PREDICATE_KEY: &str = "predicate_key";
pub(crate) const COL_OBJECT_KEY: &str = "object_key";

/// Engine-specific SQL texts and conventions.
///
/// Implementations supply the schema DDL, the system-catalog probe, the
/// conditional insert, and the placeholder convention for their engine.
/// The shipped implementation is [`SqliteDialect`].
pub trait SqlDialect: Send + Sync {
    /// Name of the backing relation.
    fn table(&self) -> &str {
        TABLE
    }

    /// `CREATE TABLE` text for the backing relation: ten columns, all
    /// `NOT NULL`, keyed on the statement key.
    fn create_table_sql(&self) -> String;

    /// `CREATE INDEX` texts. Seven indexes, chosen so that every two- and
    /// three-axis pattern signature is covered by an index prefix.
    fn create_index_sql(&self) -> Vec<String>;

    /// System-catalog query counting relations with the given name.
    /// Takes one bound parameter: the table name.
    fn probe_sql(&self) -> String;

    /// Single-statement conditional insert: inserts the ten columns unless
    /// a row with the same statement key already exists. Uniqueness must be
    /// enforced by the engine inside this one statement, never by a
    /// read-then-write sequence.
    fn insert_if_absent_sql(&self) -> String;

    /// The placeholder for the `n`-th bound parameter (1-based).
    fn placeholder(&self, n: usize) -> String;
}

/// The SQLite dialect, used with `rusqlite`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteDialect;

impl SqlDialect for SqliteDialect {
    fn create_table_sql(&self) -> String {
        "CREATE TABLE IF NOT EXISTS quads (
            statement_key  INTEGER PRIMARY KEY,
            flavor         INTEGER NOT NULL,
            context_text   TEXT    NOT NULL,
            subject_text   TEXT    NOT NULL,
            predicate_text TEXT    NOT NULL,
            object_text    TEXT    NOT NULL,
            context_key    INTEGER NOT NULL,
            subject_key    INTEGER NOT NULL,
            predicate_key  INTEGER NOT NULL,
            object_key     INTEGER NOT NULL
        )"
        .to_string()
    }

    fn create_index_sql(&self) -> Vec<String> {
        [
            "CREATE INDEX IF NOT EXISTS idx_quads_c ON quads(context_key)",
            "CREATE INDEX IF NOT EXISTS idx_quads_s ON quads(subject_key)",
            "CREATE INDEX IF NOT EXISTS idx_quads_p ON quads(predicate_key)",
            "CREATE INDEX IF NOT EXISTS idx_quads_of ON quads(object_key, flavor)",
            "CREATE INDEX IF NOT EXISTS idx_quads_sp ON quads(subject_key, predicate_key)",
            "CREATE INDEX IF NOT EXISTS idx_quads_sof ON quads(subject_key, object_key, flavor)",
            "CREATE INDEX IF NOT EXISTS idx_quads_pof ON quads(predicate_key, object_key, flavor)",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    fn probe_sql(&self) -> String {
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1".to_string()
    }

    fn insert_if_absent_sql(&self) -> String {
        format!(
            "INSERT OR IGNORE INTO {} ({}, {}, {}, {}, {}, {}, {}, {}, {}, {}) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            TABLE,
            COL_STATEMENT_KEY,
            COL_FLAVOR,
            COL_CONTEXT_TEXT,
            COL_SUBJECT_TEXT,
            COL_PREDICATE_TEXT,
            COL_OBJECT_TEXT,
            COL_CONTEXT_KEY,
            COL_SUBJECT_KEY,
            COL_PREDICATE_KEY,
            COL_OBJECT_KEY,
        )
    }

    fn placeholder(&self, n: usize) -> String {
        format!("?{}", n)
    }
}
