/// Core Module for quantdb
///
/// Error handling and the database layer: value model, driver seam, the
/// MySQL driver and the client façade.

pub mod db;
pub mod error;

// Re-export commonly used types for convenience
pub use error::{QuantDbError, Result};
