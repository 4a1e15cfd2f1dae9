//! `dblite get` command implementation.

use std::io::Write;

use super::{parse_filter, Context};

/// Run the get command.
pub fn run(ctx: &Context, filter: Option<&str>) -> Result<(), dblite::Error> {
    let storage = ctx.open(None, None)?;
    let records = storage.get(parse_filter(filter)?)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for record in &records {
        serde_json::to_writer(&mut out, record)?;
        writeln!(out)?;
    }

    tracing::info!(count = records.len(), table = storage.table(), "Printed records");
    Ok(())
}
