use crate::error::Result;
use crate::models::{ObservationSet, PortStatistics};
use crate::state::PortSource;

/// One recorded scan row held by [`InMemoryStore`]
#[derive(Debug, Clone)]
struct ScanRow {
    port: i64,
    banner: Option<String>,
    day: Option<String>,
}

/// In-memory port source (for testing and development)
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    rows: Vec<ScanRow>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding only port numbers
    pub fn with_ports<I: IntoIterator<Item = i64>>(ports: I) -> Self {
        let mut store = Self::new();
        for port in ports {
            store.record(port, None, None);
        }
        store
    }

    /// Record one scan row
    pub fn record(&mut self, port: i64, banner: Option<&str>, day: Option<&str>) {
        self.rows.push(ScanRow {
            port,
            banner: banner.map(str::to_string),
            day: day.map(str::to_string),
        });
    }
}

impl PortSource for InMemoryStore {
    fn fetch_ports(&self) -> Result<ObservationSet> {
        let set: ObservationSet = self.rows.iter().map(|row| row.port).collect();
        tracing::debug!(observations = set.len(), "Ports read from memory");
        Ok(set)
    }

    fn port_statistics(&self, limit: usize) -> Result<PortStatistics> {
        Ok(PortStatistics::from_rows(
            self.rows
                .iter()
                .map(|row| (row.port, row.banner.as_deref(), row.day.as_deref())),
            limit,
        ))
    }

    fn describe(&self) -> String {
        format!("in-memory ({} rows)", self.rows.len())
    }
}
