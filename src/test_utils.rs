/// # Test Utilities Module
///
/// Test infrastructure for quantdb:
/// - `SqliteDriver`, an embedded driver behind the same `Driver` seam so the
///   client can be exercised end-to-end without a MySQL server
/// - `StocksFixture`, a connected client with the `stocks` table
/// - Error assertion helpers
///
/// SQLite sessions mirror the MySQL session settings that matter to the
/// client: statements run inside an open transaction and only persist
/// through `Session::commit`.

use crate::config::ConnectionConfig;
use crate::core::db::driver::{Driver, DriverResult, Session};
use crate::core::db::value::{Params, Row, Value};
use crate::core::db::DatabaseClient;
use crate::core::Result;
use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{Batch, Connection, Statement, ToSql};
use std::cell::Cell;
use std::rc::Rc;

pub const STOCKS_SCHEMA: &str = "
    CREATE TABLE stocks (
        code TEXT NOT NULL,
        price REAL NOT NULL,
        date TEXT NOT NULL
    );
";

/// Opens SQLite sessions; `ConnectionConfig::database` is the file path
/// (or `:memory:`). Host, user and password are ignored.
#[derive(Debug, Clone, Default)]
pub struct SqliteDriver {
    /// Number of sessions opened through this driver, shared with clones
    pub opened: Rc<Cell<usize>>,
}

impl Driver for SqliteDriver {
    type Session = SqliteSession;

    fn open(&self, config: &ConnectionConfig) -> DriverResult<SqliteSession> {
        let conn = Connection::open(config.database())?;
        conn.execute_batch("BEGIN")?;
        self.opened.set(self.opened.get() + 1);
        Ok(SqliteSession { conn })
    }
}

pub struct SqliteSession {
    conn: Connection,
}

impl Session for SqliteSession {
    fn execute(&mut self, sql: &str, params: &Params) -> DriverResult<Vec<Row>> {
        match params {
            Params::Positional(values) if !values.is_empty() => {
                let mut stmt = self.conn.prepare(sql)?;
                let bound: Vec<SqlValue> = values.iter().map(to_sql_value).collect();
                Ok(collect_rows(&mut stmt, rusqlite::params_from_iter(bound))?)
            }
            Params::Named(pairs) if !pairs.is_empty() => {
                let mut stmt = self.conn.prepare(sql)?;
                let bound: Vec<(String, SqlValue)> = pairs
                    .iter()
                    .map(|(name, value)| (format!(":{}", name), to_sql_value(value)))
                    .collect();
                let refs: Vec<(&str, &dyn ToSql)> = bound
                    .iter()
                    .map(|(name, value)| (name.as_str(), value as &dyn ToSql))
                    .collect();
                Ok(collect_rows(&mut stmt, refs.as_slice())?)
            }
            _ => {
                // Unbound text may hold several statements
                let mut rows = Vec::new();
                for stmt in Batch::new(&self.conn, sql) {
                    let mut stmt = stmt?;
                    rows.extend(collect_rows(&mut stmt, [])?);
                }
                Ok(rows)
            }
        }
    }

    fn commit(&mut self) -> DriverResult<()> {
        self.conn.execute_batch("COMMIT; BEGIN")?;
        Ok(())
    }

    fn close(self) -> DriverResult<()> {
        // Uncommitted work is rolled back, as on a MySQL disconnect
        self.conn.close().map_err(|(_, e)| e)?;
        Ok(())
    }
}

fn collect_rows<P: rusqlite::Params>(stmt: &mut Statement<'_>, params: P) -> rusqlite::Result<Vec<Row>> {
    let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let mut rows = stmt.query(params)?;
    let mut out = Vec::new();
    while let Some(sql_row) = rows.next()? {
        let mut row = Row::new();
        for (i, column) in columns.iter().enumerate() {
            row.set(column.clone(), from_sql_value(sql_row.get_ref(i)?));
        }
        out.push(row);
    }
    Ok(out)
}

fn to_sql_value(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Int(i) => SqlValue::Integer(*i),
        Value::UInt(u) => i64::try_from(*u)
            .map(SqlValue::Integer)
            .unwrap_or_else(|_| SqlValue::Text(u.to_string())),
        Value::Float(f) => SqlValue::Real(*f),
        Value::Text(s) => SqlValue::Text(s.clone()),
        Value::Bytes(b) => SqlValue::Blob(b.clone()),
        Value::Date(d) => SqlValue::Text(d.format("%Y-%m-%d").to_string()),
        Value::DateTime(dt) => SqlValue::Text(dt.format("%Y-%m-%d %H:%M:%S").to_string()),
    }
}

fn from_sql_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Int(i),
        ValueRef::Real(f) => Value::Float(f),
        ValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::Bytes(b.to_vec()),
    }
}

/// Config pointing the SQLite driver at `database`
pub fn sqlite_config(database: &str) -> ConnectionConfig {
    ConnectionConfig::new("localhost", "root", "password", database)
}

/// A connected in-memory client with an empty `stocks` table
pub struct StocksFixture {
    pub client: DatabaseClient<SqliteDriver>,
    pub driver: SqliteDriver,
}

impl StocksFixture {
    pub fn new() -> Result<Self> {
        Self::at(":memory:")
    }

    /// Same fixture backed by a database file, for tests that reconnect
    pub fn at(database: &str) -> Result<Self> {
        let driver = SqliteDriver::default();
        let mut client = DatabaseClient::with_driver(sqlite_config(database), driver.clone());
        client.connect()?;
        client.execute_command(STOCKS_SCHEMA, ())?;
        Ok(StocksFixture { client, driver })
    }

    /// Inserts the rows used across tests
    pub fn with_sample_data() -> Result<Self> {
        let mut fixture = Self::new()?;
        fixture.insert_samples()?;
        Ok(fixture)
    }

    pub fn insert_samples(&mut self) -> Result<()> {
        for (code, price, date) in [
            ("AAPL", 150.0, "2024-04-11"),
            ("MSFT", 420.5, "2024-04-11"),
            ("GOOG", 155.25, "2024-04-12"),
        ] {
            self.client.insert_data(
                "stocks",
                &Row::new().with("code", code).with("price", price).with("date", date),
            )?;
        }
        Ok(())
    }

    /// Number of rows currently in `stocks`, read through the client
    pub fn count(&mut self) -> Result<i64> {
        let rows = self.client.fetch_data("SELECT COUNT(*) AS n FROM stocks")?;
        Ok(rows[0].get("n").and_then(Value::as_i64).unwrap_or(-1))
    }
}

/// Error testing utilities specific to QuantDbError patterns
pub mod error_testing {
    /// Verify error message quality (contains helpful information)
    pub fn verify_error_message_quality<T, E>(result: &std::result::Result<T, E>, context: &str)
    where
        T: std::fmt::Debug,
        E: std::fmt::Display,
    {
        match result {
            Ok(value) => panic!("Expected error but got Ok({:?}) in {}", value, context),
            Err(error) => {
                let error_str = error.to_string();
                assert!(error_str.len() > 10, "Error message should be descriptive in {}", context);
                assert!(
                    error_str.to_lowercase().contains("error") || error_str.to_lowercase().contains("failed"),
                    "Error should indicate what operation failed: '{}' in {}",
                    error_str,
                    context
                );
            }
        }
    }
}

#[macro_export]
macro_rules! assert_quantdb_error {
    ($result:expr, $expected_type:ident, $context:expr) => {
        match $result {
            Err($crate::core::QuantDbError::$expected_type(_)) => {}
            Ok(_) => panic!("Expected {} error but got Ok in {}", stringify!($expected_type), $context),
            Err(other) => panic!("Expected {} but got {:?} in {}", stringify!($expected_type), other, $context),
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::QuantDbError;

    #[test]
    fn test_stocks_fixture_creation() {
        let mut fixture = StocksFixture::new().unwrap();
        assert!(fixture.client.is_connected());
        assert_eq!(fixture.count().unwrap(), 0);
        assert_eq!(fixture.driver.opened.get(), 1);
    }

    #[test]
    fn test_sample_data_fixture() {
        let mut fixture = StocksFixture::with_sample_data().unwrap();
        assert_eq!(fixture.count().unwrap(), 3);
    }

    #[test]
    fn test_error_assertion_macro() {
        let result: Result<i32> = Err(QuantDbError::Argument("Test error".to_string()));
        assert_quantdb_error!(result, Argument, "macro test");
    }

    #[test]
    fn test_value_mapping() {
        assert_eq!(from_sql_value(ValueRef::Integer(3)), Value::Int(3));
        assert_eq!(to_sql_value(&Value::from("x")), SqlValue::Text("x".to_string()));
        assert_eq!(to_sql_value(&Value::UInt(42)), SqlValue::Integer(42));
        assert_eq!(
            to_sql_value(&Value::UInt(u64::MAX)),
            SqlValue::Text(u64::MAX.to_string())
        );
    }
}
