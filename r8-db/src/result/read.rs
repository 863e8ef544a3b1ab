// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

use tracing::trace;

use crate::error::Result;
use crate::offset::{Wrap, offset_wrap};
use crate::result::RowSource;
use crate::value::Row;

/// Row set produced by a `SELECT`.
///
/// Rows are materialized one at a time through the driver's row source.
/// The cursor starts unset; the first call to [`current`](Self::current),
/// [`key`](Self::key) or [`advance`](Self::advance) places it on row 0.
/// The row count and field list are fetched from the driver once and then
/// cached.
#[derive(Debug)]
pub struct ReadResult {
    query: String,
    source: Option<Box<dyn RowSource>>,
    count: Option<usize>,
    fields: Option<Vec<String>>,
    pointer: Option<usize>,
    row: Option<Row>,
}

impl ReadResult {
    pub fn new(source: Box<dyn RowSource>, query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            source: Some(source),
            count: None,
            fields: None,
            pointer: None,
            row: None,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Whether the driver resource is still held.
    pub fn has_result(&self) -> bool {
        self.source.is_some()
    }

    /// Number of rows. Driver values that are missing or negative count as 0.
    pub fn count(&mut self) -> usize {
        if let Some(count) = self.count {
            return count;
        }
        let count = self
            .source
            .as_mut()
            .and_then(|s| s.raw_count())
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(0);
        self.count = Some(count);
        count
    }

    pub fn is_empty(&mut self) -> bool {
        self.count() == 0
    }

    /// Column names, in driver order.
    pub fn fields(&mut self) -> &[String] {
        if self.fields.is_none() {
            let fields = self
                .source
                .as_mut()
                .and_then(|s| s.raw_fields())
                .unwrap_or_default();
            self.fields = Some(fields);
        }
        self.fields.as_deref().unwrap_or_default()
    }

    pub fn has_field(&mut self, name: &str) -> bool {
        self.fields().iter().any(|f| f == name)
    }

    /// Row under the cursor, or `None` once the cursor ran past the last row.
    pub fn current(&mut self) -> Option<&Row> {
        if self.pointer.is_none() {
            self.advance();
        }
        self.row.as_ref()
    }

    /// Cursor position.
    pub fn key(&mut self) -> usize {
        if self.pointer.is_none() {
            self.advance();
        }
        self.pointer.unwrap_or(0)
    }

    /// Move the cursor forward by one row, never past `count()`.
    pub fn advance(&mut self) -> &mut Self {
        let count = self.count();
        let next = match self.pointer {
            None => 0,
            Some(p) if p >= count => return self,
            Some(p) => p + 1,
        };
        self.pointer = Some(next);
        self.row = if next < count {
            self.source.as_mut().and_then(|s| s.raw_fetch())
        } else {
            None
        };
        trace!(position = next, "advanced read cursor");
        self
    }

    /// Whether the cursor sits on a row.
    pub fn valid(&mut self) -> bool {
        let count = self.count();
        count > 0 && self.pointer.unwrap_or(0) < count
    }

    /// Put the cursor back on the first row.
    pub fn rewind(&mut self) -> &mut Self {
        if self.pointer != Some(0) && self.count() > 0 {
            self.seek_to(0);
        }
        self
    }

    /// Move the cursor to `offset`, resolved against `count()` with `wrap`.
    ///
    /// Seeking an empty result does nothing. Seeking to the current
    /// position does not reach the driver.
    pub fn seek(&mut self, offset: i64, wrap: Wrap) -> Result<&mut Self> {
        let count = self.count();
        if count == 0 {
            return Ok(self);
        }
        let position = offset_wrap(count, offset, wrap)?;
        self.seek_to(position);
        Ok(self)
    }

    fn seek_to(&mut self, position: usize) {
        if self.pointer == Some(position) {
            return;
        }
        self.pointer = Some(position);
        self.row = self.source.as_mut().and_then(|s| s.raw_seek(position));
        trace!(position, "seeked read cursor");
    }

    /// Iterate over owned copies of every row, starting from the first.
    pub fn rows(&mut self) -> Rows<'_> {
        self.rewind();
        Rows { result: self }
    }

    /// Collect every row.
    pub fn fetch_all(&mut self) -> Vec<Row> {
        self.rows().collect()
    }

    /// Release the driver resource. Later calls do nothing.
    pub fn free(&mut self) {
        if let Some(mut source) = self.source.take() {
            source.raw_free();
            self.row = None;
            trace!(query = %self.query, "freed read result");
        }
    }
}

impl Drop for ReadResult {
    fn drop(&mut self) {
        self.free();
    }
}

/// Iterator returned by [`ReadResult::rows`].
pub struct Rows<'a> {
    result: &'a mut ReadResult,
}

impl Iterator for Rows<'_> {
    type Item = Row;

    fn next(&mut self) -> Option<Row> {
        if !self.result.valid() {
            return None;
        }
        let row = self.result.current().cloned();
        self.result.advance();
        row
    }
}

impl<'a> IntoIterator for &'a mut ReadResult {
    type Item = Row;
    type IntoIter = Rows<'a>;

    fn into_iter(self) -> Rows<'a> {
        self.rows()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::error::Error;
    use crate::value::Value;

    #[derive(Debug, Default)]
    struct Calls {
        count: Cell<usize>,
        fetch: Cell<usize>,
        seek: Cell<usize>,
        fields: Cell<usize>,
        free: Cell<usize>,
    }

    /// Row source over `n` rows `{id: 1..=n}` that counts every call.
    #[derive(Debug)]
    struct CountingSource {
        rows: Vec<Row>,
        cursor: usize,
        calls: Rc<Calls>,
        raw_count: Option<i64>,
    }

    impl CountingSource {
        fn new(n: i64) -> (Self, Rc<Calls>) {
            let calls = Rc::new(Calls::default());
            let source = Self {
                rows: (1..=n)
                    .map(|i| [("id", Value::Int(i))].into_iter().collect())
                    .collect(),
                cursor: 0,
                calls: calls.clone(),
                raw_count: Some(n),
            };
            (source, calls)
        }
    }

    impl RowSource for CountingSource {
        fn raw_count(&mut self) -> Option<i64> {
            self.calls.count.set(self.calls.count.get() + 1);
            self.raw_count
        }

        fn raw_fetch(&mut self) -> Option<Row> {
            self.calls.fetch.set(self.calls.fetch.get() + 1);
            let row = self.rows.get(self.cursor).cloned();
            self.cursor += 1;
            row
        }

        fn raw_seek(&mut self, offset: usize) -> Option<Row> {
            self.calls.seek.set(self.calls.seek.get() + 1);
            self.cursor = offset + 1;
            self.rows.get(offset).cloned()
        }

        fn raw_fields(&mut self) -> Option<Vec<String>> {
            self.calls.fields.set(self.calls.fields.get() + 1);
            Some(vec!["id".to_string()])
        }

        fn raw_free(&mut self) {
            self.calls.free.set(self.calls.free.get() + 1);
        }
    }

    fn result(n: i64) -> (ReadResult, Rc<Calls>) {
        let (source, calls) = CountingSource::new(n);
        (ReadResult::new(Box::new(source), "SELECT id FROM t"), calls)
    }

    fn id(row: &Row) -> i64 {
        row.get("id").and_then(Value::as_i64).unwrap()
    }

    #[test]
    fn test_free_is_idempotent() {
        let (mut result, calls) = result(2);
        assert!(result.has_result());
        result.free();
        result.free();
        assert!(!result.has_result());
        drop(result);
        assert_eq!(calls.free.get(), 1);
    }

    #[test]
    fn test_drop_frees() {
        let (result, calls) = result(1);
        drop(result);
        assert_eq!(calls.free.get(), 1);
    }

    #[test]
    fn test_count_is_memoized() {
        let (mut result, calls) = result(3);
        assert_eq!(result.count(), 3);
        result.advance();
        assert_eq!(result.count(), 3);
        let _ = result.fetch_all();
        assert_eq!(result.count(), 3);
        assert_eq!(calls.count.get(), 1);
    }

    #[test]
    fn test_count_coerces_bad_values() {
        let (mut source, _) = CountingSource::new(2);
        source.raw_count = Some(-4);
        let mut result = ReadResult::new(Box::new(source), "SELECT 1");
        assert_eq!(result.count(), 0);
        assert!(!result.valid());

        let (mut source, _) = CountingSource::new(2);
        source.raw_count = None;
        let mut result = ReadResult::new(Box::new(source), "SELECT 1");
        assert!(result.is_empty());
    }

    #[test]
    fn test_fields_are_memoized() {
        let (mut result, calls) = result(1);
        assert_eq!(result.fields(), ["id"]);
        assert!(result.has_field("id"));
        assert!(!result.has_field("name"));
        assert_eq!(calls.fields.get(), 1);
    }

    #[test]
    fn test_first_access_materializes_row_zero() {
        let (mut result, calls) = result(3);
        assert_eq!(result.key(), 0);
        assert_eq!(id(result.current().unwrap()), 1);
        assert_eq!(calls.fetch.get(), 1);
        assert_eq!(calls.seek.get(), 0);
    }

    #[test]
    fn test_cursor_never_passes_count() {
        let (mut result, calls) = result(3);
        for _ in 0..3 + 5 {
            result.advance();
        }
        assert!(!result.valid());
        assert!(result.current().is_none());
        assert_eq!(result.key(), 3);
        assert_eq!(calls.fetch.get(), 3);
    }

    #[test]
    fn test_empty_result() {
        let (mut result, calls) = result(0);
        assert!(!result.valid());
        assert!(result.current().is_none());
        result.rewind();
        result.seek(2, Wrap::Restrict).unwrap();
        assert!(result.fetch_all().is_empty());
        assert_eq!(calls.fetch.get(), 0);
        assert_eq!(calls.seek.get(), 0);
    }

    #[test]
    fn test_seek_same_offset_skips_driver() {
        let (mut result, calls) = result(5);
        result.seek(2, Wrap::Restrict).unwrap();
        assert_eq!(calls.seek.get(), 1);
        result.seek(2, Wrap::Restrict).unwrap();
        result.seek(-3, Wrap::Restrict).unwrap();
        assert_eq!(calls.seek.get(), 1);
        assert_eq!(id(result.current().unwrap()), 3);
    }

    #[test]
    fn test_seek_wraps_and_then_advances() {
        let (mut result, _) = result(5);
        result.seek(7, Wrap::Wrap).unwrap();
        assert_eq!(result.key(), 2);
        result.advance();
        assert_eq!(id(result.current().unwrap()), 4);
        result.seek(99, Wrap::Restrict).unwrap();
        assert_eq!(id(result.current().unwrap()), 5);
    }

    #[test]
    fn test_seek_out_of_bounds_leaves_cursor() {
        let (mut result, calls) = result(5);
        result.seek(1, Wrap::Restrict).unwrap();
        let err = result.seek(7, Wrap::None).unwrap_err();
        assert!(matches!(err, Error::OutOfBounds { offset: 7, length: 5 }));
        assert_eq!(result.key(), 1);
        assert_eq!(id(result.current().unwrap()), 2);
        assert_eq!(calls.seek.get(), 1);
    }

    #[test]
    fn test_rewind_at_start_skips_driver() {
        let (mut result, calls) = result(3);
        result.rewind();
        assert_eq!(calls.seek.get(), 1);
        result.rewind();
        assert_eq!(calls.seek.get(), 1);
        result.advance();
        result.rewind();
        assert_eq!(calls.seek.get(), 2);
        assert_eq!(id(result.current().unwrap()), 1);
    }

    #[test]
    fn test_iterate_twice() {
        let (mut result, calls) = result(3);
        let first: Vec<i64> = (&mut result).into_iter().map(|r| id(&r)).collect();
        let second: Vec<i64> = result.rows().map(|r| id(&r)).collect();
        assert_eq!(first, vec![1, 2, 3]);
        assert_eq!(second, vec![1, 2, 3]);
        assert_eq!(calls.count.get(), 1);
    }
}
