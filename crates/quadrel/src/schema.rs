//! Schema bootstrap and diagnostics.
//!
//! Runs once at construction time, before any mutation or query is
//! accepted: probe the engine's system catalog for the backing relation,
//! create it (plus its seven indexes) if absent, and fail loudly if the
//! data source is unreachable.

use crate::dialect::SqlDialect;
use crate::{Error, Result};
use log::debug;
use rusqlite::{params, Connection};

/// The diagnostics state machine: `Unprobed -> {Ready, MissingSchema,
/// Unreachable}`.
///
/// `MissingSchema` is transient — bootstrap resolves it by running the DDL.
/// `Unreachable` is fatal at construction: no store value is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaState {
    /// The data source has not been probed yet.
    Unprobed,
    /// The backing relation and its indexes exist.
    Ready,
    /// The data source is reachable but the backing relation is absent.
    MissingSchema,
    /// The data source could not be opened, or the probe itself failed.
    Unreachable,
}

/// Probes the system catalog for the backing relation.
///
/// Never returns `Unprobed`; a probe failure maps the state to
/// `Unreachable` via [`Error::Unreachable`].
pub(crate) fn probe(conn: &Connection, dialect: &dyn SqlDialect) -> Result<SchemaState> {
    let count: i64 = conn
        .query_row(&dialect.probe_sql(), params![dialect.table()], |row| {
            row.get(0)
        })
        .map_err(|e| Error::Unreachable(format!("schema probe failed: {}", e)))?;

    Ok(if count > 0 {
        SchemaState::Ready
    } else {
        SchemaState::MissingSchema
    })
}

/// Probes and, if the relation is missing, runs the one-time DDL.
///
/// Idempotent: a second bootstrap against an already-initialized data
/// source observes `Ready` and touches nothing.
pub(crate) fn ensure(conn: &Connection, dialect: &dyn SqlDialect) -> Result<SchemaState> {
    match probe(conn, dialect)? {
        SchemaState::Ready => {
            debug!("relation {} already present", dialect.table());
            Ok(SchemaState::Ready)
        }
        _ => {
            create(conn, dialect)?;
            Ok(SchemaState::Ready)
        }
    }
}

fn create(conn: &Connection, dialect: &dyn SqlDialect) -> Result<()> {
    debug!("creating relation {}", dialect.table());
    conn.execute(&dialect.create_table_sql(), [])
        .map_err(|e| Error::Schema(format!("creating {} failed: {}", dialect.table(), e)))?;

    for ddl in dialect.create_index_sql() {
        conn.execute(&ddl, [])
            .map_err(|e| Error::Schema(format!("index creation failed: {}", e)))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::SqliteDialect;

    fn fresh_conn() -> Connection {
        Connection::open_in_memory().unwrap()
    }

    #[test]
    fn test_probe_fresh_source() {
        let conn = fresh_conn();
        assert_eq!(probe(&conn, &SqliteDialect).unwrap(), SchemaState::MissingSchema);
    }

    #[test]
    fn test_ensure_creates_then_observes_ready() {
        let conn = fresh_conn();
        assert_eq!(ensure(&conn, &SqliteDialect).unwrap(), SchemaState::Ready);
        assert_eq!(probe(&conn, &SqliteDialect).unwrap(), SchemaState::Ready);

        // Second bootstrap is a no-op.
        assert_eq!(ensure(&conn, &SqliteDialect).unwrap(), SchemaState::Ready);
    }

    #[test]
    fn test_indexes_exist_after_bootstrap() {
        let conn = fresh_conn();
        ensure(&conn, &SqliteDialect).unwrap();

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'index' AND tbl_name = ?1",
                params![SqliteDialect.table()],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 7);
    }
}
