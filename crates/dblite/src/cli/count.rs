//! `dblite count` command implementation.

use super::{parse_filter, Context};

/// Run the count command.
pub fn run(ctx: &Context, filter: Option<&str>) -> Result<(), dblite::Error> {
    let storage = ctx.open(None, None)?;
    println!("{}", storage.count(parse_filter(filter)?)?);
    Ok(())
}
