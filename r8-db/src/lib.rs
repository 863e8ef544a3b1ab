// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Database links, results and a querying wrapper.
//!
//! A [`Link`] is one lazily opened database connection. Running a
//! statement yields a [`QueryResult`]: a seekable [`ReadResult`] for
//! `SELECT` and a [`WriteResult`] (affected rows, insert id) for
//! everything else. [`Querier`] wraps a link with silent-failure handling,
//! transaction verbs and `INSERT`/`UPDATE` helpers.
//!
//! # Drivers
//!
//! - SQLite through rusqlite (feature `sqlite`)
//! - MySQL through sqlx (feature `mysql`)
//! - [`BlackHole`], which accepts everything and returns nothing
//!
//! # Example
//!
//! ```ignore
//! use r8_db::{Config, Querier, QueryFlags, Value, open};
//!
//! let mut q = Querier::new(open(Config::sqlite("app.db"))?);
//! q.insert("people", &Value::map([("name", "ann")]), QueryFlags::NONE)?;
//! let name = q.get_field("name", "SELECT name FROM people", 0, QueryFlags::NONE)?;
//! ```

pub mod config;
pub mod driver;
pub mod error;
pub mod escape;
pub mod link;
pub mod offset;
pub mod querier;
pub mod result;
pub mod statement;
pub mod value;

pub use config::{Config, DriverKind};
pub use driver::{BlackHole, open};
pub use error::{ConfigError, Error, QueryFailure, Result};
pub use link::{Connection, Driver, DriverError, Link, RawResult};
pub use offset::{Wrap, offset_wrap};
pub use querier::{Querier, QueryFlags};
pub use result::{BufferedRows, QueryResult, ReadResult, RowSource, Rows, WriteResult};
pub use statement::{StatementKind, classify};
pub use value::{Fragment, Row, Value};
