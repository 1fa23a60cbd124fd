pub mod store;
pub mod sqlite_store;
pub mod factory;

pub use store::*;
pub use sqlite_store::SqliteStore;
pub use factory::{create_in_memory_source, create_source};

use crate::error::Result;
use crate::models::{ObservationSet, PortStatistics};

/// Read access to recorded port-scan observations
pub trait PortSource: Send + Sync {
    /// Retrieve every recorded port number
    fn fetch_ports(&self) -> Result<ObservationSet>;

    /// Frequency summary of the recorded scan results
    fn port_statistics(&self, limit: usize) -> Result<PortStatistics>;

    /// Human-readable location of the source, for logs
    fn describe(&self) -> String;
}
