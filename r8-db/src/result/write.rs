// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

/// Outcome of a statement that does not return rows.
///
/// Both values are normalized once at construction: a negative or missing
/// affected count becomes 0, and only a strictly positive insert id is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteResult {
    query: String,
    affected: u64,
    insert_id: Option<u64>,
    freed: bool,
}

impl WriteResult {
    pub fn new(affected: Option<i64>, insert_id: Option<i64>, query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            affected: affected.map_or(0, |n| n.max(0) as u64),
            insert_id: insert_id.filter(|&id| id > 0).map(|id| id as u64),
            freed: false,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Number of rows the statement changed.
    pub fn affected(&self) -> u64 {
        self.affected
    }

    /// Id generated by an insert, if any.
    pub fn insert_id(&self) -> Option<u64> {
        self.insert_id
    }

    pub fn has_result(&self) -> bool {
        !self.freed
    }

    pub fn free(&mut self) {
        self.freed = true;
    }
}
