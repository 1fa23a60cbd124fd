use crate::config::StoreConfig;
use crate::error::Result;
use crate::state::{InMemoryStore, PortSource, SqliteStore};

/// Create a port source based on configuration
pub fn create_source(config: &StoreConfig) -> Result<Box<dyn PortSource>> {
    tracing::info!(path = ?config.path, table = %config.table, "Initializing SQLite port source");
    let store = SqliteStore::new(config.clone())?;
    Ok(Box::new(store))
}

/// Create an in-memory source (for testing and development)
pub fn create_in_memory_source<I: IntoIterator<Item = i64>>(ports: I) -> Box<dyn PortSource> {
    tracing::info!("Initializing in-memory port source");
    Box::new(InMemoryStore::with_ports(ports))
}
