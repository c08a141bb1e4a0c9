//! A small, blocking MySQL access wrapper.
//!
//! [`DatabaseClient`] owns one connection and offers parameterized queries,
//! auto-committed commands, and `INSERT` / `UPDATE` helpers driven by ordered
//! [`Row`] payloads. There is no pooling, no retry, and no transaction
//! control beyond one commit per command.
//!
//! Table names, column names and `UPDATE` conditions are pasted into SQL text
//! verbatim. Only values are bound as parameters, so identifiers and
//! conditions must come from trusted code, never from end users.

// Core infrastructure modules
pub mod core;

pub mod config;
pub mod sql;

#[cfg(test)]
mod test_utils;

pub use crate::config::ConnectionConfig;
pub use crate::core::db::{ConnectedClient, DatabaseClient, Driver, MySqlDriver, Params, Row, Session, Value};
pub use crate::core::{QuantDbError, Result};
