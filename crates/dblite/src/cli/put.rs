//! `dblite put` command implementation.

use std::io::BufRead;

use colored::Colorize;
use dblite::{AutoCommit, Record};

use super::Context;

/// Run the put command.
///
/// Records come from `records` or, when that is empty, from stdin with one
/// JSON object per line. Everything is committed before returning.
pub fn run(
    ctx: &Context,
    fields: Option<&str>,
    autocommit: Option<AutoCommit>,
    records: &[String],
) -> Result<(), dblite::Error> {
    let records = if records.is_empty() {
        read_stdin()?
    } else {
        records
            .iter()
            .map(|json| Record::from_json(json))
            .collect::<Result<Vec<_>, _>>()?
    };

    let mut storage = ctx.open(fields, autocommit)?;
    let ids = storage.put_many(&records)?;
    storage.commit()?;

    println!(
        "{} {} record(s) in {}",
        "Stored".green().bold(),
        ids.len(),
        storage.table()
    );
    storage.close()
}

fn read_stdin() -> Result<Vec<Record>, dblite::Error> {
    let stdin = std::io::stdin();
    let mut records = Vec::new();
    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        records.push(Record::from_json(&line)?);
    }
    Ok(records)
}
