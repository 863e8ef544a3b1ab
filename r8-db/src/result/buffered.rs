// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

use crate::result::RowSource;
use crate::value::Row;

/// A fully fetched row set with a driver-style cursor.
///
/// Drivers that store the whole result client side (SQLite, MySQL's
/// buffered mode) hand one of these to the read result.
#[derive(Debug, Clone, Default)]
pub struct BufferedRows {
    fields: Vec<String>,
    rows: Vec<Row>,
    cursor: usize,
}

impl BufferedRows {
    pub fn new(fields: Vec<String>, rows: Vec<Row>) -> Self {
        Self {
            fields,
            rows,
            cursor: 0,
        }
    }

    /// An empty row set with no columns.
    pub fn empty() -> Self {
        Self::default()
    }
}

impl RowSource for BufferedRows {
    fn raw_count(&mut self) -> Option<i64> {
        i64::try_from(self.rows.len()).ok()
    }

    fn raw_fetch(&mut self) -> Option<Row> {
        let row = self.rows.get(self.cursor).cloned()?;
        self.cursor += 1;
        Some(row)
    }

    fn raw_seek(&mut self, offset: usize) -> Option<Row> {
        self.cursor = offset;
        self.raw_fetch()
    }

    fn raw_fields(&mut self) -> Option<Vec<String>> {
        Some(self.fields.clone())
    }

    fn raw_free(&mut self) {
        self.rows = Vec::new();
        self.fields = Vec::new();
        self.cursor = 0;
    }
}
