/// MySQL Driver Module
///
/// `Driver` implementation on top of the `mysql` crate. The wire protocol,
/// timeouts and socket handling all belong to that crate; this module only
/// configures the session and converts values in both directions.
///
/// Unbound statements use the text protocol, where every non-NULL column
/// arrives as bytes; bound statements use the binary protocol, where values
/// arrive typed. Both are decoded by column type so a row reads the same
/// whichever path produced it. DECIMAL columns stay text to keep their
/// exact digits.

use ::mysql::consts::ColumnType;
use ::mysql::prelude::Queryable;
use ::mysql::{Conn, OptsBuilder};
use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use tracing::debug;

use crate::config::ConnectionConfig;
use crate::core::db::driver::{Driver, DriverError, DriverResult, Session};
use crate::core::db::value::{Params, Row, Value};

/// Statements run on every new connection. Autocommit is switched off so
/// that writes persist only through `Session::commit`.
const SESSION_INIT: [&str; 2] = ["SET NAMES utf8mb4", "SET autocommit = 0"];

/// Connects to a MySQL-compatible server over TCP on the default port
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlDriver;

impl Driver for MySqlDriver {
    type Session = MySqlSession;

    fn open(&self, config: &ConnectionConfig) -> DriverResult<MySqlSession> {
        let opts = OptsBuilder::new()
            .ip_or_hostname(Some(config.host()))
            .user(Some(config.user()))
            .pass(Some(config.password()))
            .db_name(Some(config.database()))
            .init(SESSION_INIT.to_vec());

        // The client always negotiates CLIENT_MULTI_STATEMENTS, so text
        // queries may carry several statements.
        let conn = Conn::new(opts)?;
        debug!(connection_id = conn.connection_id(), "MySQL session opened");
        Ok(MySqlSession { conn })
    }
}

/// A live MySQL connection
pub struct MySqlSession {
    conn: Conn,
}

impl Session for MySqlSession {
    fn execute(&mut self, sql: &str, params: &Params) -> DriverResult<Vec<Row>> {
        let mut rows = Vec::new();

        if params.is_empty() {
            let mut result = self.conn.query_iter(sql)?;
            while let Some(set) = result.iter() {
                for row in set {
                    rows.push(convert_row(row?));
                }
            }
        } else {
            let mut result = self.conn.exec_iter(sql, to_mysql_params(params)?)?;
            while let Some(set) = result.iter() {
                for row in set {
                    rows.push(convert_row(row?));
                }
            }
        }

        Ok(rows)
    }

    fn commit(&mut self) -> DriverResult<()> {
        self.conn.query_drop("COMMIT")?;
        Ok(())
    }

    fn close(self) -> DriverResult<()> {
        // Dropping the connection sends COM_QUIT; uncommitted work is rolled
        // back by the server.
        debug!(connection_id = self.conn.connection_id(), "MySQL session closing");
        drop(self.conn);
        Ok(())
    }
}

fn to_mysql_params(params: &Params) -> DriverResult<::mysql::Params> {
    Ok(match params {
        Params::Empty => ::mysql::Params::Empty,
        Params::Positional(values) => ::mysql::Params::Positional(
            values.iter().map(to_mysql_value).collect::<DriverResult<Vec<_>>>()?,
        ),
        Params::Named(pairs) => ::mysql::Params::from(
            pairs
                .iter()
                .map(|(name, value)| -> DriverResult<(String, ::mysql::Value)> {
                    Ok((name.clone(), to_mysql_value(value)?))
                })
                .collect::<DriverResult<Vec<(String, ::mysql::Value)>>>()?,
        ),
    })
}

fn to_mysql_value(value: &Value) -> DriverResult<::mysql::Value> {
    Ok(match value {
        Value::Null => ::mysql::Value::NULL,
        Value::Int(i) => ::mysql::Value::Int(*i),
        Value::UInt(u) => ::mysql::Value::UInt(*u),
        Value::Float(f) => ::mysql::Value::Double(*f),
        Value::Text(s) => ::mysql::Value::Bytes(s.as_bytes().to_vec()),
        Value::Bytes(b) => ::mysql::Value::Bytes(b.clone()),
        Value::Date(d) => {
            ::mysql::Value::Date(wire_year(d.year())?, d.month() as u8, d.day() as u8, 0, 0, 0, 0)
        }
        Value::DateTime(dt) => ::mysql::Value::Date(
            wire_year(dt.year())?,
            dt.month() as u8,
            dt.day() as u8,
            dt.hour() as u8,
            dt.minute() as u8,
            dt.second() as u8,
            dt.nanosecond() / 1_000,
        ),
    })
}

/// The wire format carries the year as u16; MySQL itself stops at 9999
fn wire_year(year: i32) -> DriverResult<u16> {
    u16::try_from(year).map_err(|_| -> DriverError {
        format!("Year {} cannot be sent to MySQL", year).into()
    })
}

fn convert_row(row: ::mysql::Row) -> Row {
    let columns: Vec<(String, ColumnType)> = row
        .columns_ref()
        .iter()
        .map(|c| (c.name_str().into_owned(), c.column_type()))
        .collect();

    columns
        .into_iter()
        .zip(row.unwrap())
        .map(|((name, column_type), value)| (name, from_mysql_value(value, column_type)))
        .collect()
}

fn from_mysql_value(value: ::mysql::Value, column_type: ColumnType) -> Value {
    match value {
        ::mysql::Value::NULL => Value::Null,
        ::mysql::Value::Int(i) => Value::Int(i),
        ::mysql::Value::UInt(u) => unsigned(u),
        ::mysql::Value::Float(f) => Value::Float(f as f64),
        ::mysql::Value::Double(d) => Value::Float(d),
        ::mysql::Value::Bytes(bytes) => match String::from_utf8(bytes) {
            Ok(text) => parse_text(text, column_type),
            Err(err) => Value::Bytes(err.into_bytes()),
        },
        ::mysql::Value::Date(year, month, day, hour, minute, second, micros) => {
            let is_date_column = is_date(column_type);
            let date = NaiveDate::from_ymd_opt(year as i32, month as u32, day as u32);
            match date {
                Some(date) if is_date_column => Value::Date(date),
                Some(date) => date
                    .and_hms_micro_opt(hour as u32, minute as u32, second as u32, micros)
                    .map(Value::DateTime)
                    .unwrap_or(Value::Null),
                // Zero dates ('0000-00-00') have no calendar representation
                None if is_date_column => Value::Text(format!("{:04}-{:02}-{:02}", year, month, day)),
                None => Value::Text(format!(
                    "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
                    year, month, day, hour, minute, second
                )),
            }
        }
        ::mysql::Value::Time(negative, days, hours, minutes, seconds, micros) => {
            Value::Text(format_time(negative, days, hours, minutes, seconds, micros))
        }
    }
}

fn is_date(column_type: ColumnType) -> bool {
    matches!(
        column_type,
        ColumnType::MYSQL_TYPE_DATE | ColumnType::MYSQL_TYPE_NEWDATE
    )
}

// Integers that fit i64 are Int on both protocols
fn unsigned(u: u64) -> Value {
    i64::try_from(u).map(Value::Int).unwrap_or(Value::UInt(u))
}

/// Decodes a text-protocol column. Anything that does not parse as its
/// column type stays text.
fn parse_text(text: String, column_type: ColumnType) -> Value {
    let parsed = match column_type {
        ColumnType::MYSQL_TYPE_TINY
        | ColumnType::MYSQL_TYPE_SHORT
        | ColumnType::MYSQL_TYPE_LONG
        | ColumnType::MYSQL_TYPE_INT24
        | ColumnType::MYSQL_TYPE_LONGLONG
        | ColumnType::MYSQL_TYPE_YEAR => text
            .parse::<i64>()
            .map(Value::Int)
            .ok()
            .or_else(|| text.parse::<u64>().ok().map(Value::UInt)),
        // FLOAT goes through f32 so it matches the binary protocol's value
        ColumnType::MYSQL_TYPE_FLOAT => text.parse::<f32>().ok().map(|f| Value::Float(f as f64)),
        ColumnType::MYSQL_TYPE_DOUBLE => text.parse::<f64>().ok().map(Value::Float),
        ColumnType::MYSQL_TYPE_DATE | ColumnType::MYSQL_TYPE_NEWDATE => {
            NaiveDate::parse_from_str(&text, "%Y-%m-%d").ok().map(Value::Date)
        }
        ColumnType::MYSQL_TYPE_DATETIME
        | ColumnType::MYSQL_TYPE_DATETIME2
        | ColumnType::MYSQL_TYPE_TIMESTAMP
        | ColumnType::MYSQL_TYPE_TIMESTAMP2 => NaiveDateTime::parse_from_str(&text, "%Y-%m-%d %H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(&text, "%Y-%m-%d %H:%M:%S"))
            .ok()
            .map(Value::DateTime),
        _ => None,
    };

    parsed.unwrap_or(Value::Text(text))
}

/// Renders a TIME value the way the server prints it, e.g. `-838:59:59`
fn format_time(negative: bool, days: u32, hours: u8, minutes: u8, seconds: u8, micros: u32) -> String {
    let sign = if negative { "-" } else { "" };
    let total_hours = days * 24 + hours as u32;
    if micros == 0 {
        format!("{}{:02}:{:02}:{:02}", sign, total_hours, minutes, seconds)
    } else {
        format!("{}{:02}:{:02}:{:02}.{:06}", sign, total_hours, minutes, seconds, micros)
    }
}
