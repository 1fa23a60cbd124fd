use crate::config::StoreConfig;
use crate::error::{AppError, Result};
use crate::models::{ObservationSet, Occurrence, PortStatistics};
use crate::state::PortSource;
use rusqlite::{params, Connection, OpenFlags};
use std::ops::Deref;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

const BANNER_COLUMN: &str = "banner";
const DAY_COLUMN: &str = "day";

/// Read-only port source backed by the scanner's SQLite database.
///
/// No connection is held between calls: each operation opens the database,
/// runs its queries and releases the connection before returning, on the
/// error path as well.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    config: StoreConfig,
    open_connections: Arc<AtomicUsize>,
}

/// Connection that is released when it goes out of scope
struct ScopedConnection {
    conn: Connection,
    open_connections: Arc<AtomicUsize>,
}

impl Deref for ScopedConnection {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        &self.conn
    }
}

impl Drop for ScopedConnection {
    fn drop(&mut self) {
        self.open_connections.fetch_sub(1, Ordering::SeqCst);
        tracing::debug!("Store connection released");
    }
}

impl SqliteStore {
    /// Create a store for the configured database; nothing is opened yet
    pub fn new(config: StoreConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            open_connections: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Number of connections currently held by this store
    pub fn open_connections(&self) -> usize {
        self.open_connections.load(Ordering::SeqCst)
    }

    /// Open a read-only connection.
    ///
    /// Read-only mode makes a missing path an error instead of creating an
    /// empty database there.
    fn connect(&self) -> Result<ScopedConnection> {
        let path = &self.config.path;
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| {
            AppError::StorageUnavailable(format!(
                "Failed to open database {}: {}",
                path.display(),
                e
            ))
        })?;

        self.open_connections.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(path = ?path, "Store connection opened");

        Ok(ScopedConnection {
            conn,
            open_connections: self.open_connections.clone(),
        })
    }

    /// Column names of the configured table.
    ///
    /// SQLite opens lazily, so this is also where an unreadable or non-database
    /// file is first detected.
    fn table_columns(&self, conn: &Connection) -> Result<Vec<String>> {
        let path = &self.config.path;
        let mut stmt = conn
            .prepare(&format!("PRAGMA table_info({})", self.config.table))
            .map_err(|e| {
                AppError::StorageUnavailable(format!(
                    "Failed to read schema of {}: {}",
                    path.display(),
                    e
                ))
            })?;

        let columns = stmt
            .query_map([], |row| row.get::<_, String>(1))
            .and_then(|rows| rows.collect::<rusqlite::Result<Vec<String>>>())
            .map_err(|e| {
                AppError::StorageUnavailable(format!(
                    "Failed to read schema of {}: {}",
                    path.display(),
                    e
                ))
            })?;

        if columns.is_empty() {
            return Err(AppError::Schema(format!(
                "Table '{}' does not exist in {}",
                self.config.table,
                path.display()
            )));
        }

        Ok(columns)
    }

    /// Check the port column exists and report which optional columns do
    fn check_schema(&self, conn: &Connection) -> Result<Vec<String>> {
        let columns = self.table_columns(conn)?;
        if !has_column(&columns, &self.config.port_column) {
            return Err(AppError::Schema(format!(
                "Column '{}' does not exist in table '{}'",
                self.config.port_column, self.config.table
            )));
        }
        Ok(columns)
    }

    fn read_ports(&self, conn: &Connection) -> Result<ObservationSet> {
        let sql = format!(
            "SELECT {} FROM {}",
            self.config.port_column, self.config.table
        );
        tracing::debug!(sql = %sql, "Querying port observations");

        let mut stmt = conn.prepare(&sql).map_err(query_error)?;
        let ports = stmt
            .query_map([], |row| row.get::<_, i64>(0))
            .and_then(|rows| rows.collect::<rusqlite::Result<Vec<i64>>>())
            .map_err(query_error)?;

        Ok(ObservationSet::from(ports))
    }

    fn top_ports(&self, conn: &Connection, limit: i64) -> Result<Vec<Occurrence<i64>>> {
        let column = &self.config.port_column;
        let sql = format!(
            "SELECT {col}, COUNT(*) AS occurrences FROM {table} \
             WHERE {col} IS NOT NULL GROUP BY {col} \
             ORDER BY occurrences DESC, {col} ASC LIMIT ?1",
            col = column,
            table = self.config.table
        );
        query_occurrences(conn, &sql, limit)
    }

    fn top_values(
        &self,
        conn: &Connection,
        column: &str,
        limit: i64,
    ) -> Result<Vec<Occurrence<String>>> {
        let sql = format!(
            "SELECT {col}, COUNT(*) AS occurrences FROM {table} \
             WHERE {col} IS NOT NULL GROUP BY {col} \
             ORDER BY occurrences DESC, {col} ASC LIMIT ?1",
            col = column,
            table = self.config.table
        );
        query_occurrences(conn, &sql, limit)
    }
}

impl PortSource for SqliteStore {
    fn fetch_ports(&self) -> Result<ObservationSet> {
        let conn = self.connect()?;
        self.check_schema(&conn)?;
        let set = self.read_ports(&conn)?;

        tracing::info!(
            observations = set.len(),
            path = ?self.config.path,
            "Port observations retrieved"
        );
        Ok(set)
    }

    fn port_statistics(&self, limit: usize) -> Result<PortStatistics> {
        let conn = self.connect()?;
        let columns = self.check_schema(&conn)?;
        let sql_limit = i64::try_from(limit).unwrap_or(i64::MAX);

        let top_ports = self.top_ports(&conn, sql_limit)?;

        let top_banners = if has_column(&columns, BANNER_COLUMN) {
            self.top_values(&conn, BANNER_COLUMN, sql_limit)?
        } else {
            tracing::debug!(table = %self.config.table, "No banner column, skipping banner ranking");
            Vec::new()
        };

        let busiest_day = if has_column(&columns, DAY_COLUMN) {
            self.top_values(&conn, DAY_COLUMN, 1)?.into_iter().next()
        } else {
            tracing::debug!(table = %self.config.table, "No day column, skipping day ranking");
            None
        };

        Ok(PortStatistics {
            limit,
            top_ports,
            top_banners,
            busiest_day,
        })
    }

    fn describe(&self) -> String {
        format!(
            "sqlite:{} ({}.{})",
            self.config.path.display(),
            self.config.table,
            self.config.port_column
        )
    }
}

/// SQLite identifiers are case-insensitive
fn has_column(columns: &[String], name: &str) -> bool {
    columns.iter().any(|c| c.eq_ignore_ascii_case(name))
}

fn query_occurrences<T: rusqlite::types::FromSql>(
    conn: &Connection,
    sql: &str,
    limit: i64,
) -> Result<Vec<Occurrence<T>>> {
    tracing::debug!(sql = %sql, "Querying occurrences");
    let mut stmt = conn.prepare(sql).map_err(query_error)?;
    let rows = stmt
        .query_map(params![limit], |row| {
            let count: i64 = row.get(1)?;
            Ok(Occurrence::new(row.get::<_, T>(0)?, count.max(0) as u64))
        })
        .and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
        .map_err(query_error)?;
    Ok(rows)
}

fn query_error(err: rusqlite::Error) -> AppError {
    AppError::Query(format!("Failed to read scan results: {}", err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_store(ports: &[i64]) -> (SqliteStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("network_scanner.db");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE port_scans (ip TEXT, port INTEGER, banner TEXT, day TEXT);",
        )
        .unwrap();
        for port in ports {
            conn.execute(
                "INSERT INTO port_scans (ip, port) VALUES ('10.0.0.1', ?1)",
                params![port],
            )
            .unwrap();
        }
        drop(conn);

        let store = SqliteStore::new(StoreConfig::new(path)).unwrap();
        (store, temp_dir)
    }

    #[test]
    fn test_fetch_ports() {
        let (store, _temp_dir) = create_test_store(&[22, 80, 443]);
        let mut ports = store.fetch_ports().unwrap().ports();
        ports.sort_unstable();
        assert_eq!(ports, vec![22, 80, 443]);
        assert_eq!(store.open_connections(), 0);
    }

    #[test]
    fn test_fetch_from_empty_table() {
        let (store, _temp_dir) = create_test_store(&[]);
        assert!(store.fetch_ports().unwrap().is_empty());
    }

    #[test]
    fn test_missing_database_is_unavailable() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing.db");
        let store = SqliteStore::new(StoreConfig::new(&path)).unwrap();

        let result = store.fetch_ports();
        assert!(matches!(result, Err(AppError::StorageUnavailable(_))));
        // Read-only open must not create the file
        assert!(!path.exists());
        assert_eq!(store.open_connections(), 0);
    }

    #[test]
    fn test_missing_column_is_schema_error() {
        let (store, _temp_dir) = create_test_store(&[22]);
        let mut config = store.config.clone();
        config.port_column = "dst_port".to_string();
        let store = SqliteStore::new(config).unwrap();

        let result = store.fetch_ports();
        assert!(matches!(result, Err(AppError::Schema(_))));
        assert_eq!(store.open_connections(), 0);
    }

    #[test]
    fn test_non_integer_port_is_query_error() {
        let (store, _temp_dir) = create_test_store(&[22]);
        let conn = Connection::open(&store.config.path).unwrap();
        conn.execute("INSERT INTO port_scans (port) VALUES ('ssh')", [])
            .unwrap();
        drop(conn);

        let result = store.fetch_ports();
        assert!(matches!(result, Err(AppError::Query(_))));
        assert_eq!(store.open_connections(), 0);
    }

    #[test]
    fn test_has_column_ignores_case() {
        let columns = vec!["IP".to_string(), "Port".to_string()];
        assert!(has_column(&columns, "port"));
        assert!(!has_column(&columns, "banner"));
    }
}
