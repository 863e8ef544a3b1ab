// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! MySQL driver on top of sqlx.
//!
//! sqlx is asynchronous; each handle owns a current-thread tokio runtime
//! and blocks on it for every call. Statements go over the text protocol
//! (`raw_sql`), so values arrive as text and are converted by column type.

use sqlx::mysql::{
    MySqlColumn, MySqlConnectOptions, MySqlConnection, MySqlDatabaseError, MySqlRow,
};
use sqlx::{Column, ConnectOptions, Connection, Executor, Row as _, TypeInfo};
use tokio::runtime::{Builder, Runtime};
use tracing::debug;

use crate::config::Config;
use crate::escape::{escape_mysql, escape_slashes};
use crate::link::{Driver, DriverError, RawResult};
use crate::result::BufferedRows;
use crate::statement::StatementKind;
use crate::value::{Row, Value};

/// Server error number for `ER_LOCK_DEADLOCK`.
pub const ER_LOCK_DEADLOCK: u16 = 1213;

/// Client error number used when the server cannot be reached.
const CR_CONNECTION_ERROR: i64 = 2002;

/// MySQL driver.
#[derive(Debug, Default, Clone, Copy)]
pub struct MySql;

impl MySql {
    pub fn new() -> Self {
        Self
    }
}

/// Open MySQL session.
pub struct MySqlHandle {
    runtime: Runtime,
    conn: MySqlConnection,
    affected: Option<u64>,
    insert_id: Option<u64>,
}

fn driver_error(e: sqlx::Error) -> DriverError {
    match &e {
        sqlx::Error::Database(db) => match db.try_downcast_ref::<MySqlDatabaseError>() {
            Some(my) if my.number() == ER_LOCK_DEADLOCK => {
                DriverError::deadlock(i64::from(my.number()), my.message())
            }
            Some(my) => DriverError::new(i64::from(my.number()), my.message()),
            None => DriverError::new(0, db.message()),
        },
        sqlx::Error::Io(_) | sqlx::Error::Tls(_) | sqlx::Error::PoolTimedOut => {
            DriverError::new(CR_CONNECTION_ERROR, e.to_string())
        }
        _ => DriverError::new(0, e.to_string()),
    }
}

/// Convert one text-protocol column according to its declared type.
fn to_value(type_name: &str, raw: Option<&[u8]>) -> Value {
    let Some(bytes) = raw else {
        return Value::Null;
    };
    let text = String::from_utf8_lossy(bytes);
    let parsed = match type_name {
        "BOOLEAN" => text.trim().parse::<i64>().ok().map(|n| Value::Bool(n != 0)),
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" | "YEAR" => {
            text.trim().parse().ok().map(Value::Int)
        }
        name if name.ends_with(" UNSIGNED") => text.trim().parse().ok().map(Value::Int),
        "FLOAT" | "DOUBLE" => text.trim().parse().ok().map(Value::Float),
        _ => None,
    };
    parsed.unwrap_or_else(|| Value::Text(text.into_owned()))
}

fn column_names(columns: &[MySqlColumn]) -> Vec<String> {
    columns.iter().map(|c| c.name().to_string()).collect()
}

/// Column names of `sql` when it returned no rows to read them from.
fn describe_columns(handle: &mut MySqlHandle, sql: &str) -> Vec<String> {
    match handle.runtime.block_on((&mut handle.conn).describe(sql)) {
        Ok(described) => column_names(described.columns()),
        Err(e) => {
            debug!("Could not describe columns of `{sql}`: {e}");
            Vec::new()
        }
    }
}

fn to_buffered(fields: Vec<String>, rows: Vec<MySqlRow>) -> BufferedRows {
    let rows = rows
        .iter()
        .map(|row| {
            row.columns()
                .iter()
                .map(|col| {
                    let raw = row
                        .try_get_unchecked::<Option<&[u8]>, _>(col.ordinal())
                        .ok()
                        .flatten();
                    (col.name().to_string(), to_value(col.type_info().name(), raw))
                })
                .collect::<Vec<_>>()
        })
        .map(Row::new)
        .collect();
    BufferedRows::new(fields, rows)
}

impl Driver for MySql {
    type Handle = MySqlHandle;

    fn raw_connect(&mut self, config: &Config) -> Result<MySqlHandle, DriverError> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| DriverError::new(0, format!("failed to start runtime: {e}")))?;

        let mut options = MySqlConnectOptions::new()
            .host(config.host.as_deref().unwrap_or("localhost"))
            .port(config.port_or_default());
        if let Some(user) = &config.user {
            options = options.username(user);
        }
        if let Some(password) = &config.password {
            options = options.password(password);
        }
        if let Some(database) = &config.database {
            options = options.database(database);
        }

        let conn = runtime.block_on(options.connect()).map_err(driver_error)?;
        debug!("Opened MySQL session to {}", config.identifier());
        Ok(MySqlHandle {
            runtime,
            conn,
            affected: None,
            insert_id: None,
        })
    }

    fn raw_is_connected(&mut self, handle: &mut MySqlHandle) -> bool {
        handle.runtime.block_on(handle.conn.ping()).is_ok()
    }

    fn raw_escape(&mut self, handle: Option<&mut MySqlHandle>, value: &str) -> String {
        match handle {
            Some(_) => escape_mysql(value),
            None => escape_slashes(value),
        }
    }

    fn raw_query(
        &mut self,
        handle: &mut MySqlHandle,
        sql: &str,
        kind: StatementKind,
    ) -> Result<RawResult, DriverError> {
        match kind {
            StatementKind::Read => {
                let rows = handle
                    .runtime
                    .block_on(sqlx::raw_sql(sql).fetch_all(&mut handle.conn))
                    .map_err(driver_error)?;
                let fields = match rows.first() {
                    Some(row) => column_names(row.columns()),
                    None => describe_columns(handle, sql),
                };
                Ok(RawResult::Rows(Box::new(to_buffered(fields, rows))))
            }
            StatementKind::Write => {
                let done = handle
                    .runtime
                    .block_on(sqlx::raw_sql(sql).execute(&mut handle.conn))
                    .map_err(driver_error)?;
                handle.affected = Some(done.rows_affected());
                handle.insert_id = Some(done.last_insert_id());
                Ok(RawResult::Done)
            }
        }
    }

    fn raw_affected(&mut self, handle: &mut MySqlHandle) -> Option<i64> {
        handle.affected.and_then(|n| i64::try_from(n).ok())
    }

    fn raw_insert_id(&mut self, handle: &mut MySqlHandle) -> Option<i64> {
        handle.insert_id.and_then(|n| i64::try_from(n).ok())
    }

    fn raw_disconnect(&mut self, handle: MySqlHandle) {
        let MySqlHandle { runtime, conn, .. } = handle;
        if let Err(e) = runtime.block_on(conn.close()) {
            debug!("Error while closing MySQL session: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::error::Error;
    use crate::link::{Connection, Link};

    #[rstest]
    #[case::null("INT", None, Value::Null)]
    #[case::int("BIGINT", Some(b"-12".as_slice()), Value::Int(-12))]
    #[case::unsigned("INT UNSIGNED", Some(b"7".as_slice()), Value::Int(7))]
    #[case::boolean("BOOLEAN", Some(b"1".as_slice()), Value::Bool(true))]
    #[case::double("DOUBLE", Some(b"2.5".as_slice()), Value::Float(2.5))]
    #[case::decimal("DECIMAL", Some(b"10.10".as_slice()), Value::from("10.10"))]
    #[case::varchar("VARCHAR", Some(b"hello".as_slice()), Value::from("hello"))]
    #[case::overflow(
        "BIGINT UNSIGNED",
        Some(b"18446744073709551615".as_slice()),
        Value::from("18446744073709551615")
    )]
    fn test_to_value(#[case] type_name: &str, #[case] raw: Option<&[u8]>, #[case] expected: Value) {
        assert_eq!(to_value(type_name, raw), expected);
    }

    #[test]
    fn test_empty_result_keeps_described_fields() {
        let fields = vec!["id".to_string(), "name".to_string()];
        let mut read = crate::result::ReadResult::new(
            Box::new(to_buffered(fields, Vec::new())),
            "SELECT id, name FROM t WHERE 0",
        );
        assert_eq!(read.count(), 0);
        assert_eq!(read.fields(), ["id", "name"]);
        assert!(read.has_field("name"));
    }

    #[test]
    fn test_escape_without_session_uses_slashes() {
        let mut driver = MySql::new();
        assert_eq!(driver.raw_escape(None, "a\nb'c"), "a\nb\\'c");
    }

    #[test]
    fn test_unreachable_server_is_link_error() {
        let config = Config::mysql("127.0.0.1", "nobody", None, "none").with_port(1);
        let mut link = Connection::new(config, MySql::new());
        let err = link.connect().unwrap_err();
        assert!(matches!(err, Error::Link { .. }));
        assert!(!link.is_connected());
    }
}
