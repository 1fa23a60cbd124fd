//! Port usage clustering over recorded network scan results.
//!
//! Reads the port numbers a previous scan stored in SQLite, arranges them as a
//! one-feature matrix and groups them with k-means, so that well-known service
//! ports and ephemeral ranges show up as separate cluster centres.
//!
//! ```no_run
//! use port_cluster::{
//!     config::Config,
//!     pipeline::AnalysisPipeline,
//!     report::Reporter,
//!     state::create_source,
//! };
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load(None)?;
//!     let source = create_source(&config.store)?;
//!     let pipeline = AnalysisPipeline::new(source, config.analysis, Reporter::default());
//!     pipeline.run(&mut std::io::stdout())?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod ml;
pub mod models;
pub mod observability;
pub mod pipeline;
pub mod report;
pub mod state;

pub use error::{AppError, Result};
