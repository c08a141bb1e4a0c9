/// Driver Seam Module
///
/// The client talks to the database only through these two traits. A
/// `Driver` opens sessions from a `ConnectionConfig`; a `Session` is one live
/// connection that executes statements, commits, and closes. The production
/// implementation is `MySqlDriver`.

use crate::config::ConnectionConfig;
use crate::core::db::value::{Params, Row};

/// Error raised by a driver. The client decides which `QuantDbError` variant
/// it becomes based on the operation that failed.
pub type DriverError = Box<dyn std::error::Error + Send + Sync>;

/// Result type for driver-level calls
pub type DriverResult<T> = std::result::Result<T, DriverError>;

/// Opens sessions against a database server
pub trait Driver {
    type Session: Session;

    /// Opens a new connection using the stored credentials.
    ///
    /// Implementations must leave the session configured for utf8mb4 text,
    /// named-column rows, multi-statement text queries, and explicit commits.
    fn open(&self, config: &ConnectionConfig) -> DriverResult<Self::Session>;
}

/// One open connection and its statement cursor
pub trait Session {
    /// Executes `sql` with `params` bound and returns every produced row.
    ///
    /// An empty `Params` runs the text as-is, which may contain several
    /// semicolon-separated statements; rows from all result sets are
    /// returned in server order.
    fn execute(&mut self, sql: &str, params: &Params) -> DriverResult<Vec<Row>>;

    /// Commits the current transaction
    fn commit(&mut self) -> DriverResult<()>;

    /// Releases the cursor, then the connection
    fn close(self) -> DriverResult<()>;
}
