/// Database Client Module
///
/// `DatabaseClient` owns at most one live session and exposes the
/// connect / query / command / insert / update / close lifecycle on top of it.
///
/// ## Lifecycle
///
/// A client starts disconnected. `connect()` opens a session; every other
/// operation fails with `QuantDbError::NotConnected` until it has. `close()`
/// drops the session and may be called any number of times. A closed client
/// can `connect()` again.
///
/// ## Commits
///
/// Sessions run with autocommit off. `execute_command` (and the insert and
/// update helpers built on it) commits after each successful statement;
/// `execute_query` and `fetch_data` never commit.
///
/// ## Concurrency
///
/// Every operation takes `&mut self`, so one client serves one thread at a
/// time. Use one client per worker for parallel access.

use std::ops::{Deref, DerefMut};

use tracing::{debug, info, warn};

use crate::config::ConnectionConfig;
use crate::core::db::driver::{Driver, Session};
use crate::core::db::mysql_driver::MySqlDriver;
use crate::core::db::value::{Params, Row};
use crate::core::{QuantDbError, Result};
use crate::sql;

/// Blocking database client over a single connection
pub struct DatabaseClient<D: Driver = MySqlDriver> {
    config: ConnectionConfig,
    driver: D,
    session: Option<D::Session>,
}

impl DatabaseClient<MySqlDriver> {
    /// Creates a disconnected MySQL client
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use quantdb::{ConnectionConfig, DatabaseClient, Row};
    ///
    /// let config = ConnectionConfig::new("localhost", "root", "password", "quant_db");
    /// let mut db = DatabaseClient::new(config);
    /// db.connect()?;
    /// db.insert_data("stocks", &Row::new().with("code", "AAPL").with("price", 150.0))?;
    /// let rows = db.execute_query("SELECT * FROM stocks WHERE code=?", ["AAPL"])?;
    /// db.close();
    /// # Ok::<(), quantdb::QuantDbError>(())
    /// ```
    pub fn new(config: ConnectionConfig) -> Self {
        DatabaseClient::with_driver(config, MySqlDriver)
    }
}

impl<D: Driver> DatabaseClient<D> {
    /// Creates a disconnected client that opens sessions through `driver`
    pub fn with_driver(config: ConnectionConfig, driver: D) -> Self {
        DatabaseClient {
            config,
            driver,
            session: None,
        }
    }

    /// Returns the credentials this client connects with
    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Checks if there's an active session
    pub fn is_connected(&self) -> bool {
        self.session.is_some()
    }

    /// Opens a session with the stored credentials.
    ///
    /// A session that is already open is closed first. On failure the client
    /// stays disconnected.
    ///
    /// # Errors
    ///
    /// `QuantDbError::Connection` when the host is unreachable, authentication
    /// fails, or the database does not exist.
    pub fn connect(&mut self) -> Result<()> {
        self.close();

        let session = self.driver.open(&self.config).map_err(|e| {
            QuantDbError::Connection(format!(
                "Failed to connect to {}@{}/{}: {}",
                self.config.user(),
                self.config.host(),
                self.config.database(),
                e
            ))
        })?;

        info!(
            host = self.config.host(),
            database = self.config.database(),
            "Connected to database"
        );
        self.session = Some(session);
        Ok(())
    }

    /// Connects and returns a guard that closes the client when dropped,
    /// including on early return and unwinding.
    pub fn connect_scoped(&mut self) -> Result<ConnectedClient<'_, D>> {
        self.connect()?;
        Ok(ConnectedClient { client: self })
    }

    /// Executes a read statement and returns all rows. Never commits.
    ///
    /// Pass `()` for no parameters, a `Vec`/array for positional `?`
    /// markers, or a `Row` / `Params::Named` for `:name` markers.
    ///
    /// # Errors
    ///
    /// `NotConnected` before `connect()`, `Query` when the statement fails.
    pub fn execute_query(&mut self, sql: &str, params: impl Into<Params>) -> Result<Vec<Row>> {
        let params = params.into();
        let session = self.session("execute a query")?;

        debug!(sql, "Executing query");
        session
            .execute(sql, &params)
            .map_err(|e| QuantDbError::Query(format!("Query failed: {}: {}", e, sql)))
    }

    /// Executes a write statement, then commits.
    ///
    /// No commit is attempted when execution fails.
    ///
    /// # Errors
    ///
    /// `NotConnected` before `connect()`, `Command` when the statement or
    /// the commit fails.
    pub fn execute_command(&mut self, sql: &str, params: impl Into<Params>) -> Result<()> {
        let params = params.into();
        let session = self.session("execute a command")?;

        debug!(sql, "Executing command");
        session
            .execute(sql, &params)
            .map_err(|e| QuantDbError::Command(format!("Command failed: {}: {}", e, sql)))?;
        session
            .commit()
            .map_err(|e| QuantDbError::Command(format!("Commit failed: {}", e)))?;
        debug!("Committed");
        Ok(())
    }

    /// Executes `sql` exactly as given, with no parameter binding.
    pub fn fetch_data(&mut self, sql: &str) -> Result<Vec<Row>> {
        self.execute_query(sql, Params::Empty)
    }

    /// Inserts one row: `INSERT INTO {table} (cols) VALUES (?, ...)`.
    ///
    /// Column order follows `data`. `table` and the column names are
    /// interpolated without escaping and must be trusted.
    ///
    /// # Errors
    ///
    /// `Argument` for an empty `data`, checked before any I/O; otherwise the
    /// errors of `execute_command`.
    pub fn insert_data(&mut self, table: &str, data: &Row) -> Result<()> {
        if data.is_empty() {
            return Err(QuantDbError::Argument(format!(
                "Cannot insert into {} without any columns",
                table
            )));
        }

        let statement = sql::insert_statement(table, data.columns());
        self.execute_command(&statement, data.values().to_vec())
    }

    /// Updates matching rows: `UPDATE {table} SET c=?, ... WHERE {condition}`.
    ///
    /// `condition` is raw SQL appended verbatim and carries no bound
    /// parameters. Like `table`, it must be trusted.
    ///
    /// # Errors
    ///
    /// `Argument` for an empty `data`; otherwise the errors of
    /// `execute_command`.
    pub fn update_data(&mut self, table: &str, data: &Row, condition: &str) -> Result<()> {
        if data.is_empty() {
            return Err(QuantDbError::Argument(format!(
                "Cannot update {} without any columns to set",
                table
            )));
        }

        let statement = sql::update_statement(table, data.columns(), condition);
        self.execute_command(&statement, data.values().to_vec())
    }

    /// Closes the session, if any. Safe to call repeatedly.
    ///
    /// Close failures are logged and swallowed; the client always ends up
    /// disconnected.
    pub fn close(&mut self) {
        if let Some(session) = self.session.take() {
            match session.close() {
                Ok(()) => info!(host = self.config.host(), "Database connection closed"),
                Err(e) => warn!("Error while closing database connection: {}", e),
            }
        }
    }

    fn session(&mut self, operation: &'static str) -> Result<&mut D::Session> {
        self.session
            .as_mut()
            .ok_or(QuantDbError::NotConnected(operation))
    }
}

impl<D: Driver> Drop for DatabaseClient<D> {
    fn drop(&mut self) {
        self.close();
    }
}

/// A connected client that closes itself when dropped.
///
/// Returned by [`DatabaseClient::connect_scoped`]; dereferences to the client.
pub struct ConnectedClient<'a, D: Driver> {
    client: &'a mut DatabaseClient<D>,
}

impl<D: Driver> Deref for ConnectedClient<'_, D> {
    type Target = DatabaseClient<D>;

    fn deref(&self) -> &Self::Target {
        &*self.client
    }
}

impl<D: Driver> DerefMut for ConnectedClient<'_, D> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.client
    }
}

impl<D: Driver> Drop for ConnectedClient<'_, D> {
    fn drop(&mut self) {
        self.client.close();
    }
}
