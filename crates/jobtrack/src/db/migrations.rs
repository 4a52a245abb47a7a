//! Schema migrations.
//!
//! Every migration is applied at most once, in version order, and recorded
//! in `_migrations` inside the same transaction as its DDL.

use std::collections::BTreeSet;

use rusqlite::{params, Connection};

use super::error::DatabaseError;

/// What a migration does to the schema.
enum Change {
    /// A batch of DDL statements.
    Sql(&'static str),
    /// Adds one column; a no-op when the column is already there.
    AddColumn {
        table: &'static str,
        column: &'static str,
        sql: &'static str,
    },
}

struct Migration {
    version: u32,
    name: &'static str,
    change: Change,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "create_field_values",
        change: Change::Sql(include_str!("sql/001_create_field_values.sql")),
    },
    Migration {
        version: 2,
        name: "create_applications",
        change: Change::Sql(include_str!("sql/002_create_applications.sql")),
    },
    Migration {
        version: 3,
        name: "create_application_docs",
        change: Change::Sql(include_str!("sql/003_create_application_docs.sql")),
    },
    Migration {
        version: 4,
        name: "add_field_values_updated_at",
        change: Change::AddColumn {
            table: "field_values",
            column: "updated_at",
            sql: include_str!("sql/004_add_updated_at_to_field_values.sql"),
        },
    },
];

/// Brings the schema of `conn` up to the latest version.
pub fn run_all(conn: &Connection) -> Result<(), DatabaseError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS _migrations (
            version INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        );",
    )?;

    let applied = applied_versions(conn)?;
    for migration in MIGRATIONS.iter().filter(|m| !applied.contains(&m.version)) {
        apply(conn, migration)?;
    }
    Ok(())
}

/// Highest version this build knows how to apply.
pub fn latest_version() -> u32 {
    MIGRATIONS.iter().map(|m| m.version).max().unwrap_or(0)
}

fn applied_versions(conn: &Connection) -> Result<BTreeSet<u32>, DatabaseError> {
    let mut stmt = conn.prepare("SELECT version FROM _migrations")?;
    let versions = stmt
        .query_map([], |row| row.get(0))?
        .collect::<Result<BTreeSet<u32>, _>>()?;
    Ok(versions)
}

fn apply(conn: &Connection, migration: &Migration) -> Result<(), DatabaseError> {
    let failed = |e: rusqlite::Error| DatabaseError::Migration {
        version: migration.version,
        reason: e.to_string(),
    };

    let tx = conn.unchecked_transaction()?;
    match &migration.change {
        Change::Sql(sql) => {
            log::info!("Applying migration v{} ({})", migration.version, migration.name);
            tx.execute_batch(sql).map_err(failed)?;
        }
        Change::AddColumn { table, column, sql } => {
            if column_exists(&tx, table, column)? {
                log::info!(
                    "Migration v{}: {}.{} already present",
                    migration.version,
                    table,
                    column
                );
            } else {
                log::info!("Applying migration v{} ({})", migration.version, migration.name);
                tx.execute_batch(sql).map_err(failed)?;
            }
        }
    }
    tx.execute(
        "INSERT INTO _migrations (version, name) VALUES (?1, ?2)",
        params![migration.version, migration.name],
    )?;
    tx.commit()?;
    Ok(())
}

fn column_exists(conn: &Connection, table: &str, column: &str) -> Result<bool, DatabaseError> {
    // pragma_table_info takes the table name as a bound value.
    let found: i64 = conn.query_row(
        "SELECT COUNT(*) FROM pragma_table_info(?1) WHERE name = ?2",
        params![table, column],
        |row| row.get(0),
    )?;
    Ok(found > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn versions(conn: &Connection) -> Vec<u32> {
        applied_versions(conn).unwrap().into_iter().collect()
    }

    #[test]
    fn test_fresh_database_gets_every_migration() {
        let conn = Connection::open_in_memory().unwrap();
        run_all(&conn).unwrap();
        assert_eq!(versions(&conn), vec![1, 2, 3, 4]);
        assert_eq!(latest_version(), 4);
        assert!(column_exists(&conn, "field_values", "updated_at").unwrap());
    }

    #[test]
    fn test_second_run_changes_nothing() {
        let conn = Connection::open_in_memory().unwrap();
        run_all(&conn).unwrap();
        run_all(&conn).unwrap();
        assert_eq!(versions(&conn), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_existing_column_is_recorded_without_altering() {
        let conn = Connection::open_in_memory().unwrap();
        run_all(&conn).unwrap();
        // Forget v4 while keeping its column, as after a manual patch.
        conn.execute("DELETE FROM _migrations WHERE version = 4", [])
            .unwrap();

        run_all(&conn).unwrap();
        assert_eq!(versions(&conn), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_failed_migration_reports_version() {
        let conn = Connection::open_in_memory().unwrap();
        run_all(&conn).unwrap();
        let broken = Migration {
            version: 99,
            name: "broken",
            change: Change::Sql("CREATE TABLE field_values (id INTEGER);"),
        };
        let err = apply(&conn, &broken).unwrap_err();
        assert!(matches!(err, DatabaseError::Migration { version: 99, .. }));
        assert!(!versions(&conn).contains(&99));
    }

    #[test]
    fn test_column_exists() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE sample (id INTEGER, name TEXT);")
            .unwrap();
        assert!(column_exists(&conn, "sample", "name").unwrap());
        assert!(!column_exists(&conn, "sample", "missing").unwrap());
        assert!(!column_exists(&conn, "no_such_table", "id").unwrap());
    }

    #[test]
    fn test_label_unique_within_type_only() {
        let conn = Connection::open_in_memory().unwrap();
        run_all(&conn).unwrap();
        let insert = |ty: &str, key: &str| {
            conn.execute(
                "INSERT INTO field_values (type, key, label) VALUES (?1, ?2, 'Same')",
                params![ty, key],
            )
        };
        insert("status", "a").unwrap();
        insert("modality", "a").unwrap();
        assert!(insert("status", "b").is_err());
    }
}
