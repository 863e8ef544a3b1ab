// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Statement execution and JSON output.

use std::io::Write;

use log::{debug, warn};
use r8_db::{Link, Querier, QueryFlags, QueryResult};
use serde_json::{Value as Json, json};

use crate::error::{IoErrorContext, Result};

/// What to run and how to report it.
#[derive(Debug, Clone, Default)]
pub struct Options {
    pub statements: Vec<String>,
    /// Report failed statements instead of stopping.
    pub silent: bool,
    /// Wrap all statements in one transaction.
    pub transaction: bool,
    /// Report only this row of each read result.
    pub row: Option<i64>,
    /// Report only this column of each read result.
    pub field: Option<String>,
}

impl Options {
    fn flags(&self) -> QueryFlags {
        if self.silent {
            QueryFlags::SILENT
        } else {
            QueryFlags::NONE
        }
    }
}

fn describe(sql: &str, result: Option<QueryResult>) -> Json {
    match result {
        None => json!({ "query": sql, "failed": true }),
        Some(QueryResult::Read(mut read)) => {
            let rows = read.fetch_all();
            read.free();
            json!({ "query": sql, "rows": rows })
        }
        Some(QueryResult::Write(write)) => json!({
            "query": sql,
            "affected": write.affected(),
            "insert_id": write.insert_id(),
        }),
    }
}

fn run_one<L: Link>(querier: &mut Querier<L>, sql: &str, opts: &Options) -> Result<Json> {
    let flags = opts.flags();
    let row = opts.row.unwrap_or(0);
    debug!("running {sql}");
    Ok(match (&opts.field, opts.row) {
        (Some(field), _) => {
            let value = querier.get_field(field, sql, row, flags)?;
            json!({ "query": sql, "field": field, "value": value })
        }
        (None, Some(_)) => {
            let found = querier.get_row(sql, row, flags)?;
            json!({ "query": sql, "row": found })
        }
        (None, None) => describe(sql, querier.query(sql, flags)?),
    })
}

fn run_all<L: Link>(querier: &mut Querier<L>, opts: &Options, out: &mut impl Write) -> Result<()> {
    for sql in &opts.statements {
        let record = run_one(querier, sql, opts)?;
        serde_json::to_writer(&mut *out, &record)?;
        writeln!(out).io_context("Failed to write output")?;
    }
    Ok(())
}

/// Run every statement and print one JSON object per statement to `out`.
pub fn run<L: Link>(querier: &mut Querier<L>, opts: &Options, out: &mut impl Write) -> Result<()> {
    if !opts.transaction {
        return run_all(querier, opts, out);
    }

    querier.begin(QueryFlags::NONE)?;
    match run_all(querier, opts, out) {
        Ok(()) => {
            querier.commit(QueryFlags::NONE)?;
            Ok(())
        }
        Err(e) => {
            warn!("rolling back after error: {e}");
            querier.roll_back(QueryFlags::SILENT)?;
            Err(e)
        }
    }
}
