// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Driver adapters.
//!
//! Each driver implements [`Driver`](crate::link::Driver) for one client
//! library. [`open`] picks the driver a [`Config`] names and wraps it in a
//! [`Connection`].

mod blackhole;
#[cfg(feature = "mysql")]
mod mysql;
#[cfg(feature = "sqlite")]
mod sqlite;

pub use blackhole::BlackHole;
#[cfg(feature = "mysql")]
pub use mysql::{ER_LOCK_DEADLOCK, MySql, MySqlHandle};
#[cfg(feature = "sqlite")]
pub use sqlite::Sqlite;

use crate::config::{Config, DriverKind};
use crate::error::{ConfigError, Result};
use crate::link::{Connection, Link};

/// Build an unconnected link for `config`.
///
/// Fails when the configuration is incomplete or names a driver this
/// build does not include.
pub fn open(config: Config) -> Result<Box<dyn Link>> {
    config.validate()?;
    match config.driver {
        DriverKind::Blackhole => Ok(Box::new(Connection::new(config, BlackHole::new()))),
        #[cfg(feature = "sqlite")]
        DriverKind::Sqlite => Ok(Box::new(Connection::new(config, Sqlite::new()))),
        #[cfg(feature = "mysql")]
        DriverKind::Mysql => Ok(Box::new(Connection::new(config, MySql::new()))),
        #[allow(unreachable_patterns)]
        other => Err(ConfigError::Invalid {
            reason: format!("driver '{}' is not enabled in this build", other.scheme()),
        }
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_open_blackhole() {
        let mut link = open(Config::blackhole()).unwrap();
        assert!(!link.is_connected());
        link.query("SELECT 1").unwrap();
        assert!(link.is_connected());
    }

    #[cfg(feature = "sqlite")]
    #[test]
    fn test_open_sqlite_memory() {
        let mut link = open(Config::sqlite_memory()).unwrap();
        let mut result = link.query("SELECT 1 AS one").unwrap();
        let read = result.as_read_mut().unwrap();
        assert_eq!(read.count(), 1);
        assert_eq!(link.identifier(), "sqlite://:memory:");
    }

    #[test]
    fn test_open_rejects_incomplete_config() {
        let mut config = Config::sqlite_memory();
        config.path = None;
        assert!(matches!(
            open(config),
            Err(Error::Config(ConfigError::Invalid { .. }))
        ));
    }
}
