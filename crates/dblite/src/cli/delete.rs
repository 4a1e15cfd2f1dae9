//! `dblite delete` command implementation.

use colored::Colorize;

use super::{parse_filter, Context};

/// Run the delete command.
pub fn run(ctx: &Context, filter: Option<&str>, all: bool) -> Result<(), dblite::Error> {
    let mut storage = ctx.open(None, None)?;

    let deleted = if all {
        storage.delete_all()?
    } else {
        storage.delete(parse_filter(filter)?)?
    };
    storage.commit()?;

    println!(
        "{} {} record(s) from {}",
        "Deleted".yellow().bold(),
        deleted,
        storage.table()
    );
    storage.close()
}
