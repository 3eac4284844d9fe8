//! The mutation engine and read path.
//!
//! One engine instance owns one connection to the relational collaborator.
//! Every write runs inside its own transaction: begin, execute, commit on
//! success; any failure drops the transaction, which rolls it back before
//! the error propagates. Reads run without an explicit transaction but are
//! bounded by a configured timeout, since unfiltered scans over large
//! stores are expected.

use crate::dialect::{
    SqlDialect, COL_CONTEXT_TEXT, COL_FLAVOR, COL_OBJECT_TEXT, COL_PREDICATE_TEXT,
    COL_STATEMENT_KEY, COL_SUBJECT_TEXT,
};
use crate::{planner, schema, Error, Flavor, Object, QuadPattern, Result, SchemaState, Statement, Term};
use log::{debug, warn};
use rusqlite::{params, params_from_iter, Connection, Row};
use std::path::Path;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Engine VM instructions between read-deadline checks.
const TIMEOUT_CHECK_OPS: i32 = 4096;

/// Tunables for a store instance.
#[derive(Debug, Clone)]
pub struct StoreOptions {
    /// Upper bound on a single select's execution time. Low-selectivity
    /// scans that exceed it fail with [`Error::Operation`] rather than
    /// returning a partial result.
    pub read_timeout: Duration,
    /// How long the collaborator waits on a locked database before giving
    /// up.
    pub busy_timeout: Duration,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            read_timeout: Duration::from_secs(300),
            busy_timeout: Duration::from_secs(5),
        }
    }
}

/// The engine behind [`QuadStore`](crate::QuadStore).
///
/// Holds the single connection behind a mutex; the relational collaborator
/// is responsible for all cross-connection concurrency.
pub(crate) struct StoreEngine {
    conn: Mutex<Option<Connection>>,
    dialect: Box<dyn SqlDialect>,
    options: StoreOptions,
    state: SchemaState,
}

impl StoreEngine {
    /// Opens (or creates) a store backed by a database file.
    pub(crate) fn open(path: &Path, options: StoreOptions) -> Result<Self> {
        if path.as_os_str().is_empty() {
            return Err(Error::Configuration("empty connection target".into()));
        }
        let conn = Connection::open(path)
            .map_err(|e| Error::Unreachable(format!("cannot open {}: {}", path.display(), e)))?;
        Self::bootstrap(conn, options)
    }

    /// Opens a store backed by an in-memory database.
    pub(crate) fn in_memory(options: StoreOptions) -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::Unreachable(format!("cannot open in-memory store: {}", e)))?;
        Self::bootstrap(conn, options)
    }

    fn bootstrap(conn: Connection, options: StoreOptions) -> Result<Self> {
        conn.busy_timeout(options.busy_timeout)
            .map_err(|e| Error::Unreachable(format!("cannot set busy timeout: {}", e)))?;

        let dialect: Box<dyn SqlDialect> = Box::new(crate::SqliteDialect);
        let state = schema::ensure(&conn, dialect.as_ref())?;

        Ok(Self {
            conn: Mutex::new(Some(conn)),
            dialect,
            options,
            state,
        })
    }

    /// Runs `f` against the open connection. Fails if the store was closed.
    fn with_conn<T>(
        &self,
        f: impl FnOnce(&mut Connection, &dyn SqlDialect) -> Result<T>,
    ) -> Result<T> {
        let mut guard = self
            .conn
            .lock()
            .map_err(|_| Error::Operation("connection lock poisoned".into()))?;
        let conn = guard
            .as_mut()
            .ok_or_else(|| Error::Operation("store is closed".into()))?;
        f(conn, self.dialect.as_ref())
    }

    /// Insert-if-absent, keyed on the statement key.
    ///
    /// Returns `true` if a new row was inserted; `false` means the key was
    /// already present and the existing row was left untouched (still
    /// success).
    pub(crate) fn upsert(&self, stmt: &Statement) -> Result<bool> {
        self.with_conn(|conn, dialect| {
            let tx = conn.transaction()?;
            let inserted = {
                let mut insert = tx.prepare_cached(&dialect.insert_if_absent_sql())?;
                execute_insert(&mut insert, stmt)? > 0
            };
            tx.commit()?;
            Ok(inserted)
        })
    }

    /// Merges a sequence of statements in one transaction.
    ///
    /// Partial success is impossible: either every statement commits or
    /// none does. Returns the number of newly inserted rows; statements
    /// already present count as merged but not inserted. An empty sequence
    /// is a no-op.
    pub(crate) fn merge_many<I>(&self, stmts: I) -> Result<usize>
    where
        I: IntoIterator<Item = Statement>,
    {
        self.with_conn(|conn, dialect| {
            let tx = conn.transaction()?;
            let mut inserted = 0usize;
            {
                let mut insert = tx.prepare_cached(&dialect.insert_if_absent_sql())?;
                for stmt in stmts {
                    inserted += execute_insert(&mut insert, &stmt)?;
                }
            }
            tx.commit()?;
            Ok(inserted)
        })
    }

    /// Removes at most one row, by statement key.
    pub(crate) fn delete_by_key(&self, key: i64) -> Result<bool> {
        self.with_conn(|conn, dialect| {
            let sql = format!(
                "DELETE FROM {} WHERE {} = {}",
                dialect.table(),
                COL_STATEMENT_KEY,
                dialect.placeholder(1)
            );
            let tx = conn.transaction()?;
            let removed = tx.execute(&sql, params![key])? > 0;
            tx.commit()?;
            Ok(removed)
        })
    }

    /// Removes every row matching the pattern in one statement.
    ///
    /// An unbound pattern is a defined no-op returning `0`; the no-filter
    /// delete is reserved for [`clear`](Self::clear).
    pub(crate) fn delete_by_pattern(&self, pattern: &QuadPattern) -> Result<usize> {
        let plan = planner::plan(pattern, self.dialect.as_ref())?;
        if plan.is_full_scan() {
            debug!("delete with an unbound pattern is a no-op; use clear()");
            return Ok(0);
        }
        self.with_conn(|conn, dialect| {
            let sql = format!("DELETE FROM {} WHERE {}", dialect.table(), plan.clause);
            let tx = conn.transaction()?;
            let removed = tx.execute(&sql, params_from_iter(plan.params.iter()))?;
            tx.commit()?;
            Ok(removed)
        })
    }

    /// Unconditionally deletes all rows. Returns the number removed.
    pub(crate) fn clear(&self) -> Result<usize> {
        self.with_conn(|conn, dialect| {
            let sql = format!("DELETE FROM {}", dialect.table());
            let tx = conn.transaction()?;
            let removed = tx.execute(&sql, [])?;
            tx.commit()?;
            Ok(removed)
        })
    }

    /// Existence probe by statement key. Never errors: an absent key, a
    /// closed store, or a failing collaborator all answer `false`.
    pub(crate) fn contains(&self, key: i64) -> bool {
        let probed: Result<bool> = self.with_conn(|conn, dialect| {
            let sql = format!(
                "SELECT 1 FROM {} WHERE {} = {} LIMIT 1",
                dialect.table(),
                COL_STATEMENT_KEY,
                dialect.placeholder(1)
            );
            let mut stmt = conn.prepare_cached(&sql)?;
            Ok(stmt.exists(params![key])?)
        });
        match probed {
            Ok(found) => found,
            Err(e) => {
                warn!("contains({}) failed, answering false: {}", key, e);
                false
            }
        }
    }

    /// Selects every statement matching the pattern, ordered by statement
    /// key, materialized in memory.
    pub(crate) fn select_by_pattern(&self, pattern: &QuadPattern) -> Result<Vec<Statement>> {
        let plan = planner::plan(pattern, self.dialect.as_ref())?;
        let timeout = self.options.read_timeout;
        self.with_conn(|conn, dialect| {
            let mut sql = format!(
                "SELECT {}, {}, {}, {}, {} FROM {}",
                COL_FLAVOR,
                COL_CONTEXT_TEXT,
                COL_SUBJECT_TEXT,
                COL_PREDICATE_TEXT,
                COL_OBJECT_TEXT,
                dialect.table()
            );
            if !plan.is_full_scan() {
                sql.push_str(" WHERE ");
                sql.push_str(&plan.clause);
            }
            sql.push_str(" ORDER BY ");
            sql.push_str(COL_STATEMENT_KEY);

            let started = Instant::now();

            // The deadline is enforced from inside the engine's VM loop, so
            // a low-selectivity scan that yields few or no rows is still
            // bounded. Returning true interrupts the statement in flight.
            conn.progress_handler(
                TIMEOUT_CHECK_OPS,
                Some(move || started.elapsed() > timeout),
            );

            let drained = (|| -> Result<Vec<Statement>> {
                let mut stmt = conn.prepare(&sql)?;
                let mut rows = stmt.query(params_from_iter(plan.params.iter()))?;

                let mut out = Vec::new();
                while let Some(row) = rows.next()? {
                    out.push(statement_from_row(row)?);
                }
                Ok(out)
            })();

            conn.progress_handler(TIMEOUT_CHECK_OPS, None::<fn() -> bool>);

            // An interrupt surfaces as an engine error; an overdue scan that
            // completed anyway must not return late results either.
            if started.elapsed() > timeout {
                return Err(Error::Operation(format!(
                    "select (signature {}) timed out after {:?}",
                    plan.signature, timeout
                )));
            }
            drained
        })
    }

    /// Total number of statements. Diagnostics only; failures answer `0`.
    pub(crate) fn count(&self) -> usize {
        let counted: Result<i64> = self.with_conn(|conn, dialect| {
            let sql = format!("SELECT COUNT(*) FROM {}", dialect.table());
            Ok(conn.query_row(&sql, [], |row| row.get(0))?)
        });
        match counted {
            Ok(n) => n as usize,
            Err(e) => {
                warn!("count failed, answering 0: {}", e);
                0
            }
        }
    }

    /// The schema state observed at construction.
    pub(crate) fn schema_state(&self) -> SchemaState {
        self.state
    }

    /// Releases the connection. Idempotent: closing a closed store is a
    /// no-op.
    pub(crate) fn close(&self) -> Result<()> {
        let mut guard = self
            .conn
            .lock()
            .map_err(|_| Error::Operation("connection lock poisoned".into()))?;
        match guard.take() {
            Some(conn) => conn
                .close()
                .map_err(|(_, e)| Error::Operation(format!("close failed: {}", e))),
            None => Ok(()),
        }
    }
}

/// Binds a statement's ten columns, in the dialect's insert column order.
fn execute_insert(insert: &mut rusqlite::Statement<'_>, stmt: &Statement) -> rusqlite::Result<usize> {
    insert.execute(params![
        stmt.key(),
        stmt.flavor().as_i64(),
        stmt.context().as_str(),
        stmt.subject().as_str(),
        stmt.predicate().as_str(),
        stmt.object().term().as_str(),
        stmt.context().key(),
        stmt.subject().key(),
        stmt.predicate().key(),
        stmt.object().term().key(),
    ])
}

fn statement_from_row(row: &Row<'_>) -> Result<Statement> {
    let flavor_raw: i64 = row.get(0)?;
    let flavor = Flavor::from_i64(flavor_raw)
        .ok_or_else(|| Error::Operation(format!("corrupt flavor value {}", flavor_raw)))?;

    let context = Term::new(row.get::<_, String>(1)?)?;
    let subject = Term::new(row.get::<_, String>(2)?)?;
    let predicate = Term::new(row.get::<_, String>(3)?)?;
    let object_term = Term::new(row.get::<_, String>(4)?)?;

    let object = match flavor {
        Flavor::Resource => Object::Resource(object_term),
        Flavor::Literal => Object::Literal(object_term),
    };
    Ok(Statement::new(context, subject, predicate, object))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn term(text: &str) -> Term {
        Term::new(text).unwrap()
    }

    fn engine() -> StoreEngine {
        StoreEngine::in_memory(StoreOptions::default()).unwrap()
    }

    fn stmt(c: &str, s: &str, p: &str, o: &str) -> Statement {
        Statement::resource(term(c), term(s), term(p), term(o))
    }

    #[test]
    fn test_upsert_and_contains() {
        let engine = engine();
        let s = stmt("c", "s", "p", "o");

        assert!(!engine.contains(s.key()));
        assert!(engine.upsert(&s).unwrap());
        assert!(engine.contains(s.key()));

        // Second upsert is a no-op, not an error and not a second row.
        assert!(!engine.upsert(&s).unwrap());
        assert_eq!(engine.count(), 1);
    }

    #[test]
    fn test_delete_by_key() {
        let engine = engine();
        let s = stmt("c", "s", "p", "o");

        engine.upsert(&s).unwrap();
        assert!(engine.delete_by_key(s.key()).unwrap());
        assert!(!engine.delete_by_key(s.key()).unwrap());
        assert!(!engine.contains(s.key()));
    }

    #[test]
    fn test_merge_many_counts_new_rows() {
        let engine = engine();
        let a = stmt("c", "s1", "p", "o");
        let b = stmt("c", "s2", "p", "o");

        engine.upsert(&a).unwrap();
        let inserted = engine
            .merge_many(vec![a.clone(), b.clone(), b.clone()])
            .unwrap();
        assert_eq!(inserted, 1);
        assert_eq!(engine.count(), 2);
    }

    #[test]
    fn test_clear() {
        let engine = engine();
        engine.upsert(&stmt("c", "s1", "p", "o")).unwrap();
        engine.upsert(&stmt("c", "s2", "p", "o")).unwrap();

        assert_eq!(engine.clear().unwrap(), 2);
        assert_eq!(engine.count(), 0);
        assert!(engine.select_by_pattern(&QuadPattern::any()).unwrap().is_empty());
    }

    #[test]
    fn test_delete_by_unbound_pattern_is_noop() {
        let engine = engine();
        engine.upsert(&stmt("c", "s", "p", "o")).unwrap();

        assert_eq!(engine.delete_by_pattern(&QuadPattern::any()).unwrap(), 0);
        assert_eq!(engine.count(), 1);
    }

    #[test]
    fn test_close_is_idempotent() {
        let engine = engine();
        engine.close().unwrap();
        engine.close().unwrap();

        // Mutations on a closed store error; contains answers false.
        assert!(engine.upsert(&stmt("c", "s", "p", "o")).is_err());
        assert!(!engine.contains(42));
    }

    #[test]
    fn test_read_timeout_surfaces_as_error() {
        let engine = StoreEngine::in_memory(StoreOptions {
            read_timeout: Duration::ZERO,
            ..Default::default()
        })
        .unwrap();

        // Enough rows that the deadline is checked at least once.
        let stmts: Vec<Statement> = (0..2048)
            .map(|i| stmt("c", &format!("s{}", i), "p", "o"))
            .collect();
        engine.merge_many(stmts).unwrap();

        let result = engine.select_by_pattern(&QuadPattern::any());
        assert!(matches!(result, Err(Error::Operation(_))));
    }

    // The deadline must bind even when the filter rejects every row and the
    // scan never yields one.
    #[test]
    fn test_read_timeout_binds_non_yielding_scans() {
        let engine = StoreEngine::in_memory(StoreOptions {
            read_timeout: Duration::ZERO,
            ..Default::default()
        })
        .unwrap();

        let stmts: Vec<Statement> = (0..4096)
            .map(|i| stmt("c", &format!("s{}", i), "p", "o"))
            .collect();
        engine.merge_many(stmts).unwrap();

        let result = engine.select_by_pattern(&QuadPattern::subject(term("absent")));
        assert!(matches!(result, Err(Error::Operation(_))));
    }
}
