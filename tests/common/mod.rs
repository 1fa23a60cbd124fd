//! Shared fixtures for integration tests
//!
//! Builds scanner databases in a temporary directory with the same layout the
//! scanner writes: `port_scans(ip, port, banner, day)`.

use rusqlite::{params, Connection};
use std::path::PathBuf;
use tempfile::TempDir;

/// A scan-results database living in its own temporary directory
pub struct ScanDb {
    pub dir: TempDir,
    pub path: PathBuf,
}

impl ScanDb {
    /// Create a database whose `port_scans` table holds `ports`
    pub fn with_ports(ports: &[i64]) -> Self {
        let rows: Vec<(i64, Option<&str>, Option<&str>)> =
            ports.iter().map(|&p| (p, None, None)).collect();
        Self::with_rows(&rows)
    }

    /// Create a database with full scan rows
    pub fn with_rows(rows: &[(i64, Option<&str>, Option<&str>)]) -> Self {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("network_scanner.db");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE port_scans (
                 id INTEGER PRIMARY KEY,
                 ip TEXT NOT NULL,
                 port INTEGER NOT NULL,
                 banner TEXT,
                 day TEXT
             );",
        )
        .unwrap();
        for (port, banner, day) in rows {
            conn.execute(
                "INSERT INTO port_scans (ip, port, banner, day) VALUES ('192.168.1.10', ?1, ?2, ?3)",
                params![port, banner, day],
            )
            .unwrap();
        }
        Self { dir, path }
    }

    /// A path inside the fixture directory that does not exist
    pub fn missing_path(&self) -> PathBuf {
        self.dir.path().join("does-not-exist.db")
    }
}
