// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Convenience layer over a [`Link`].
//!
//! [`Querier`] adds flag-driven failure handling, transaction verbs and
//! helpers that build `INSERT`/`UPDATE` statements or fetch a single row
//! or field.

use std::ops::BitOr;
use std::panic::Location;

use tracing::warn;

use crate::error::{Error, Result};
use crate::link::Link;
use crate::offset::Wrap;
use crate::result::{QueryResult, ReadResult};
use crate::value::{Fragment, Row, Value};

/// Options for one querier call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryFlags(u8);

impl QueryFlags {
    pub const NONE: Self = Self(0);

    /// Statement failures return `None` instead of an error.
    pub const SILENT: Self = Self(0x01);

    /// `insert` issues `INSERT IGNORE`.
    pub const INSERT_IGNORE: Self = Self(0x02);

    pub fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub fn contains(self, flag: Self) -> bool {
        self.0 & flag.0 == flag.0
    }
}

impl BitOr for QueryFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

/// Wraps a [`Link`] and adds higher level query helpers.
///
/// A querier is itself a [`Link`]: calls made through the trait go to the
/// wrapped link unchanged, so queriers stack with other wrappers. Every
/// helper goes through [`query`](Self::query), so
/// [`QueryFlags::SILENT`] applies uniformly. Errors that are reported
/// are attributed to the code that called the querier.
#[derive(Debug)]
pub struct Querier<L: Link> {
    link: L,
}

impl<L: Link> Querier<L> {
    pub fn new(link: L) -> Self {
        Self { link }
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    pub fn into_inner(self) -> L {
        self.link
    }

    /// Run `sql` on the wrapped link.
    ///
    /// With [`QueryFlags::SILENT`] a rejected statement (deadlocks
    /// included) yields `Ok(None)`. Connection failures are always
    /// returned.
    #[track_caller]
    pub fn query(&mut self, sql: &str, flags: QueryFlags) -> Result<Option<QueryResult>> {
        let caller = Location::caller();
        match self.link.query(sql) {
            Ok(result) => Ok(Some(result)),
            Err(e) if e.is_query() && flags.contains(QueryFlags::SILENT) => {
                warn!(%caller, "Ignoring failed statement: {e}");
                Ok(None)
            }
            Err(e) => Err(e.at_caller(caller)),
        }
    }

    #[track_caller]
    pub fn begin(&mut self, flags: QueryFlags) -> Result<&mut Self> {
        self.query("BEGIN", flags)?;
        Ok(self)
    }

    #[track_caller]
    pub fn commit(&mut self, flags: QueryFlags) -> Result<&mut Self> {
        self.query("COMMIT", flags)?;
        Ok(self)
    }

    #[track_caller]
    pub fn roll_back(&mut self, flags: QueryFlags) -> Result<&mut Self> {
        self.query("ROLLBACK", flags)?;
        Ok(self)
    }

    /// Render `fields` as `` `key` = value `` pairs joined by `", "`.
    ///
    /// `fields` must be a map. Nested maps and lists are flattened first.
    pub fn field_list(&mut self, fields: &Value) -> Result<String> {
        if !matches!(fields, Value::Map(_)) {
            return Err(Error::invalid_argument(
                "fields",
                format!("expected a map, got {}", fields.type_name()),
            ));
        }
        let flat = fields.flatten();
        if flat.is_empty() {
            return Err(Error::invalid_argument("fields", "must not be empty"));
        }
        let pairs: Vec<String> = flat
            .iter()
            .map(|(name, value)| format!("`{name}` = {}", self.link.quote(value, true)))
            .collect();
        Ok(pairs.join(", "))
    }

    /// Insert one row and return its generated id.
    ///
    /// Returns `None` when the statement was silenced or the driver
    /// reported no id.
    #[track_caller]
    pub fn insert(&mut self, table: &str, fields: &Value, flags: QueryFlags) -> Result<Option<u64>> {
        let table = table.trim();
        if table.is_empty() {
            return Err(Error::invalid_argument("table", "must not be empty"));
        }
        let ignore = if flags.contains(QueryFlags::INSERT_IGNORE) {
            "IGNORE "
        } else {
            ""
        };
        let sql = format!("INSERT {ignore}INTO {table} SET {}", self.field_list(fields)?);
        Ok(self
            .query(&sql, flags)?
            .and_then(|result| result.as_write().and_then(|w| w.insert_id())))
    }

    /// Update rows of `table`.
    ///
    /// A blank `where_clause` leaves out the `WHERE` clause, so every row
    /// in the table is updated.
    #[track_caller]
    pub fn update(
        &mut self,
        table: &str,
        where_clause: &str,
        fields: &Value,
        flags: QueryFlags,
    ) -> Result<Option<QueryResult>> {
        let table = table.trim();
        if table.is_empty() {
            return Err(Error::invalid_argument("table", "must not be empty"));
        }
        let mut sql = format!("UPDATE {table} SET {}", self.field_list(fields)?);
        let where_clause = where_clause.trim();
        if !where_clause.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(where_clause);
        }
        self.query(&sql, flags)
    }

    #[track_caller]
    fn read(&mut self, sql: &str, flags: QueryFlags) -> Result<Option<ReadResult>> {
        match self.query(sql, flags)? {
            None => Ok(None),
            Some(QueryResult::Read(read)) => Ok(Some(read)),
            Some(other) => Err(Error::ResultShape {
                query: sql.to_string(),
                dump: format!("{other:?}"),
            }),
        }
    }

    /// Fetch row `row` of the result of `sql`.
    ///
    /// `row` is clamped into the result. `None` when the result is empty
    /// or the statement was silenced.
    #[track_caller]
    pub fn get_row(&mut self, sql: &str, row: i64, flags: QueryFlags) -> Result<Option<Row>> {
        let Some(mut read) = self.read(sql, flags)? else {
            return Ok(None);
        };
        if read.count() == 0 {
            return Ok(None);
        }
        read.seek(row, Wrap::Restrict)?;
        let found = read.current().cloned();
        read.free();
        Ok(found)
    }

    /// Fetch column `field` of row `row` of the result of `sql`.
    ///
    /// Fails when the result has no column named `field`.
    #[track_caller]
    pub fn get_field(
        &mut self,
        field: &str,
        sql: &str,
        row: i64,
        flags: QueryFlags,
    ) -> Result<Option<Value>> {
        let Some(mut read) = self.read(sql, flags)? else {
            return Ok(None);
        };
        if read.count() == 0 {
            return Ok(None);
        }
        if !read.has_field(field) {
            return Err(Error::invalid_argument(
                "field",
                format!("`{field}` is not in the result of `{sql}`"),
            ));
        }
        read.seek(row, Wrap::Restrict)?;
        let value = read.current().cloned().and_then(|r| r.take(field));
        read.free();
        Ok(value)
    }
}

impl<L: Link> Link for Querier<L> {
    fn query(&mut self, sql: &str) -> Result<QueryResult> {
        self.link.query(sql)
    }

    fn connect(&mut self) -> Result<()> {
        self.link.connect()
    }

    fn is_connected(&mut self) -> bool {
        self.link.is_connected()
    }

    fn escape(&mut self, value: &Value) -> Fragment {
        self.link.escape(value)
    }

    fn quote(&mut self, value: &Value, allow_null: bool) -> Fragment {
        self.link.quote(value, allow_null)
    }

    fn disconnect(&mut self) {
        self.link.disconnect()
    }

    fn identifier(&self) -> String {
        self.link.identifier()
    }
}
