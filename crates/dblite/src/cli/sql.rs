//! `dblite sql` command implementation.

use colored::Colorize;
use dblite::{parse_uri, statement};
use dblite_query::translate_filter;

use super::{parse_filter, Context};

/// Run the sql command.
///
/// Only the URI's table name is used; the database is not opened. A delete
/// without criteria is refused, as `dblite delete` refuses it.
pub fn run(ctx: &Context, filter: Option<&str>, delete: bool) -> Result<(), dblite::Error> {
    let uri = parse_uri(ctx.uri()?)?;
    let translation = translate_filter(parse_filter(filter)?)?;
    if delete && translation.is_empty() {
        return Err(dblite::Error::MissingCriteria);
    }

    let sql = if delete {
        statement::delete(&uri.table, &translation)
    } else {
        statement::select(&uri.table, &translation)
    };

    println!("{sql}");
    println!(
        "{} {}",
        "params:".dimmed(),
        serde_json::to_string(translation.parameters())?
    );
    Ok(())
}
