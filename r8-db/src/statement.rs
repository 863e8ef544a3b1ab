// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Statement classification.

/// Whether a statement produces a row set or a write outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    /// `SELECT`: yields rows
    Read,
    /// Everything else: yields affected rows and an insert id
    Write,
}

/// Classify `sql` by its leading keyword.
///
/// Leading whitespace and comments (`-- ...`, `# ...`, `/* ... */`) are
/// skipped. Only `SELECT` (any case) counts as a read.
pub fn classify(sql: &str) -> StatementKind {
    let rest = skip_leading_noise(sql);
    let is_select = rest
        .get(..6)
        .is_some_and(|word| word.eq_ignore_ascii_case("select"))
        && rest[6..]
            .chars()
            .next()
            .is_none_or(|c| !(c.is_alphanumeric() || c == '_'));

    if is_select {
        StatementKind::Read
    } else {
        StatementKind::Write
    }
}

fn skip_leading_noise(mut sql: &str) -> &str {
    loop {
        sql = sql.trim_start();
        if let Some(rest) = sql.strip_prefix("--").or_else(|| sql.strip_prefix('#')) {
            sql = rest.split_once('\n').map_or("", |(_, after)| after);
        } else if let Some(rest) = sql.strip_prefix("/*") {
            sql = rest.split_once("*/").map_or("", |(_, after)| after);
        } else {
            return sql;
        }
    }
}
