// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

use r8_db::config::{CONFIG_FILE_ENV, DATABASE_URL_ENV};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] r8_db::ConfigError),

    #[error("Database error: {0}")]
    Db(#[from] r8_db::Error),

    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error(
        "No database configured: pass --url or --config, or set {url_env} or {file_env}",
        url_env = DATABASE_URL_ENV,
        file_env = CONFIG_FILE_ENV
    )]
    NoDatabase,
}

pub type Result<T> = std::result::Result<T, CliError>;

pub trait IoErrorContext<T> {
    fn io_context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> IoErrorContext<T> for std::result::Result<T, std::io::Error> {
    fn io_context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| CliError::Io {
            context: context.into(),
            source: e,
        })
    }
}
