// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! SQLite driver on top of rusqlite.

use std::path::Path;

use rusqlite::types::ValueRef;
use rusqlite::OpenFlags;
use tracing::debug;

use crate::config::{Config, SQLITE_MEMORY};
use crate::escape::escape_sqlite;
use crate::link::{Driver, DriverError, RawResult};
use crate::result::BufferedRows;
use crate::statement::StatementKind;
use crate::value::{Row, Value};

/// SQLite driver. The database file is created when missing.
#[derive(Debug, Default, Clone)]
pub struct Sqlite {
    affected: Option<i64>,
    insert_id: Option<i64>,
}

impl Sqlite {
    pub fn new() -> Self {
        Self::default()
    }
}

fn driver_error(e: rusqlite::Error) -> DriverError {
    // Prepare failures arrive as `SqlInputError`, which still carries the
    // SQLite result code.
    let code = e.sqlite_error().map_or(0, |err| i64::from(err.extended_code));
    DriverError::new(code, e.to_string())
}

fn to_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Int(i),
        ValueRef::Real(f) => Value::Float(f),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Value::Text(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}

fn fetch_rows(conn: &rusqlite::Connection, sql: &str) -> rusqlite::Result<BufferedRows> {
    let mut stmt = conn.prepare(sql)?;
    let fields: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let mut rows = stmt.query([])?;
    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        let mut values = Vec::with_capacity(fields.len());
        for (i, name) in fields.iter().enumerate() {
            values.push((name.clone(), to_value(row.get_ref(i)?)));
        }
        out.push(Row::new(values));
    }
    Ok(BufferedRows::new(fields, out))
}

fn execute(conn: &rusqlite::Connection, sql: &str) -> rusqlite::Result<()> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query([])?;
    while rows.next()?.is_some() {}
    Ok(())
}

impl Driver for Sqlite {
    type Handle = rusqlite::Connection;

    fn raw_connect(&mut self, config: &Config) -> Result<rusqlite::Connection, DriverError> {
        let path = config
            .path
            .as_deref()
            .ok_or_else(|| DriverError::new(0, "sqlite requires a path"))?;
        let conn = if path == Path::new(SQLITE_MEMORY) {
            rusqlite::Connection::open_in_memory()
        } else {
            rusqlite::Connection::open_with_flags(
                path,
                OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE,
            )
        }
        .map_err(driver_error)?;
        debug!("Opened SQLite database at {}", path.display());
        Ok(conn)
    }

    fn raw_is_connected(&mut self, handle: &mut rusqlite::Connection) -> bool {
        handle.query_row("SELECT 1", [], |_| Ok(())).is_ok()
    }

    fn raw_escape(&mut self, _handle: Option<&mut rusqlite::Connection>, value: &str) -> String {
        escape_sqlite(value)
    }

    fn raw_query(
        &mut self,
        handle: &mut rusqlite::Connection,
        sql: &str,
        kind: StatementKind,
    ) -> Result<RawResult, DriverError> {
        match kind {
            StatementKind::Read => {
                let rows = fetch_rows(handle, sql).map_err(driver_error)?;
                Ok(RawResult::Rows(Box::new(rows)))
            }
            StatementKind::Write => {
                // `changes` and `last_insert_rowid` keep the values of the
                // last INSERT/UPDATE/DELETE, so only trust them when this
                // statement moved them.
                let total = handle.total_changes();
                let rowid = handle.last_insert_rowid();
                self.affected = None;
                self.insert_id = None;
                execute(handle, sql).map_err(driver_error)?;

                self.affected = if handle.total_changes() == total {
                    Some(0)
                } else {
                    i64::try_from(handle.changes()).ok()
                };
                let new_rowid = handle.last_insert_rowid();
                self.insert_id = (new_rowid != rowid).then_some(new_rowid);
                Ok(RawResult::Done)
            }
        }
    }

    fn raw_affected(&mut self, _handle: &mut rusqlite::Connection) -> Option<i64> {
        self.affected
    }

    fn raw_insert_id(&mut self, _handle: &mut rusqlite::Connection) -> Option<i64> {
        self.insert_id
    }

    fn raw_disconnect(&mut self, handle: rusqlite::Connection) {
        if let Err((_, e)) = handle.close() {
            debug!("Error while closing SQLite database: {e}");
        }
    }
}
