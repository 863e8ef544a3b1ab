// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! String escaping for SQL literals.

/// Generic backslash escaping: quotes, backslashes and NUL bytes.
///
/// Used when no live session is available to ask for dialect rules.
pub fn escape_slashes(s: &str) -> String {
    let mut result = String::with_capacity(s.len() * 2);
    for c in s.chars() {
        match c {
            '\\' => result.push_str("\\\\"),
            '\'' => result.push_str("\\'"),
            '"' => result.push_str("\\\""),
            '\0' => result.push_str("\\0"),
            c => result.push(c),
        }
    }
    result
}

/// MySQL escaping, the character set `mysql_real_escape_string` handles.
pub fn escape_mysql(s: &str) -> String {
    let mut result = String::with_capacity(s.len() * 2);
    for c in s.chars() {
        match c {
            '\\' => result.push_str("\\\\"),
            '\'' => result.push_str("\\'"),
            '"' => result.push_str("\\\""),
            '\0' => result.push_str("\\0"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\x1a' => result.push_str("\\Z"),
            c => result.push(c),
        }
    }
    result
}

/// SQLite escaping: single quotes are doubled, nothing else changes.
#[inline]
pub fn escape_sqlite(s: &str) -> String {
    s.replace('\'', "''")
}
