// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Query results.
//!
//! A statement produces either a [`ReadResult`] (a seekable row set) or a
//! [`WriteResult`] (affected rows and insert id). Drivers hand row sets to
//! a [`ReadResult`] through the [`RowSource`] capability.

mod buffered;
mod read;
mod write;

use std::fmt;

pub use buffered::BufferedRows;
pub use read::{ReadResult, Rows};
pub use write::WriteResult;

use crate::value::Row;

/// Driver-side access to the rows of one statement.
///
/// `raw_fetch` returns the row under the driver cursor and moves past it;
/// `raw_seek` positions the cursor at `offset` and behaves like a fetch
/// from there.
pub trait RowSource: fmt::Debug {
    /// Number of rows, if the driver can tell.
    fn raw_count(&mut self) -> Option<i64>;

    fn raw_fetch(&mut self) -> Option<Row>;

    fn raw_seek(&mut self, offset: usize) -> Option<Row>;

    /// Column names, if the driver can tell.
    fn raw_fields(&mut self) -> Option<Vec<String>>;

    /// Release the driver resource.
    fn raw_free(&mut self);
}

/// Outcome of running one statement.
#[derive(Debug)]
pub enum QueryResult {
    Read(ReadResult),
    Write(WriteResult),
}

impl QueryResult {
    /// SQL text that produced this result.
    pub fn query(&self) -> &str {
        match self {
            Self::Read(r) => r.query(),
            Self::Write(w) => w.query(),
        }
    }

    pub fn is_read(&self) -> bool {
        matches!(self, Self::Read(_))
    }

    pub fn has_result(&self) -> bool {
        match self {
            Self::Read(r) => r.has_result(),
            Self::Write(w) => w.has_result(),
        }
    }

    pub fn free(&mut self) {
        match self {
            Self::Read(r) => r.free(),
            Self::Write(w) => w.free(),
        }
    }

    pub fn as_read_mut(&mut self) -> Option<&mut ReadResult> {
        match self {
            Self::Read(r) => Some(r),
            Self::Write(_) => None,
        }
    }

    pub fn into_read(self) -> Option<ReadResult> {
        match self {
            Self::Read(r) => Some(r),
            Self::Write(_) => None,
        }
    }

    pub fn as_write(&self) -> Option<&WriteResult> {
        match self {
            Self::Write(w) => Some(w),
            Self::Read(_) => None,
        }
    }

    pub fn into_write(self) -> Option<WriteResult> {
        match self {
            Self::Write(w) => Some(w),
            Self::Read(_) => None,
        }
    }
}

impl From<ReadResult> for QueryResult {
    fn from(r: ReadResult) -> Self {
        Self::Read(r)
    }
}

impl From<WriteResult> for QueryResult {
    fn from(w: WriteResult) -> Self {
        Self::Write(w)
    }
}
