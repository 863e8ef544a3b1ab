// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Driver that accepts everything and stores nothing.

use crate::config::Config;
use crate::escape::escape_slashes;
use crate::link::{Driver, DriverError, RawResult};
use crate::result::BufferedRows;
use crate::statement::StatementKind;

/// Null driver: every connect succeeds, `SELECT` returns no rows and
/// writes change nothing. Statements are kept so callers can inspect
/// what would have been sent.
#[derive(Debug, Default, Clone)]
pub struct BlackHole {
    queries: Vec<String>,
}

impl BlackHole {
    pub fn new() -> Self {
        Self::default()
    }

    /// Statements received so far, oldest first.
    pub fn queries(&self) -> &[String] {
        &self.queries
    }

    pub fn clear(&mut self) {
        self.queries.clear();
    }
}

impl Driver for BlackHole {
    type Handle = ();

    fn raw_connect(&mut self, _config: &Config) -> Result<(), DriverError> {
        Ok(())
    }

    fn raw_is_connected(&mut self, _handle: &mut ()) -> bool {
        true
    }

    fn raw_escape(&mut self, _handle: Option<&mut ()>, value: &str) -> String {
        escape_slashes(value)
    }

    fn raw_query(
        &mut self,
        _handle: &mut (),
        sql: &str,
        kind: StatementKind,
    ) -> Result<RawResult, DriverError> {
        self.queries.push(sql.to_string());
        Ok(match kind {
            StatementKind::Read => RawResult::Rows(Box::new(BufferedRows::empty())),
            StatementKind::Write => RawResult::Done,
        })
    }

    fn raw_affected(&mut self, _handle: &mut ()) -> Option<i64> {
        Some(0)
    }

    fn raw_insert_id(&mut self, _handle: &mut ()) -> Option<i64> {
        None
    }

    fn raw_disconnect(&mut self, _handle: ()) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::{Connection, Link};

    #[test]
    fn test_records_statements() {
        let mut link = Connection::new(Config::blackhole(), BlackHole::new());
        let mut read = link.query("SELECT * FROM users").unwrap();
        assert_eq!(read.as_read_mut().unwrap().count(), 0);

        let write = link.query("DELETE FROM users").unwrap().into_write().unwrap();
        assert_eq!(write.affected(), 0);
        assert_eq!(write.insert_id(), None);

        assert_eq!(
            link.driver().queries(),
            ["SELECT * FROM users", "DELETE FROM users"]
        );
        link.driver_mut().clear();
        assert!(link.driver().queries().is_empty());
        assert_eq!(link.identifier(), "blackhole:");
    }
}
