/// Database Module
///
/// ## Architecture
///
/// - **Values** (`value.rs`): `Value`, ordered `Row` records, bind `Params`
/// - **Driver seam** (`driver.rs`): the `Driver` / `Session` traits the client is built on
/// - **MySQL** (`mysql_driver.rs`): the production driver, backed by the `mysql` crate
/// - **Client** (`client.rs`): `DatabaseClient`, the connect/query/command/close façade
///
/// ## Error Handling
///
/// Drivers report boxed errors; the client turns them into `QuantDbError`
/// variants named after the operation that failed.
pub mod client;
pub mod driver;
pub mod mysql_driver;
pub mod value;

pub use client::*;
pub use driver::*;
pub use mysql_driver::*;
pub use value::*;
