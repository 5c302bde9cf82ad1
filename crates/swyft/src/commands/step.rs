//! `swyft next` and `swyft prev` command implementation.

use swyft_site::{Direction, Route};

use crate::GlobalArgs;
use crate::commands::open::show;
use crate::context::{load_config, open_site};
use crate::error::CliError;

/// Reopen the last tab (or the start page), then step one page.
pub(crate) async fn step(global: &GlobalArgs, direction: Direction) -> Result<(), CliError> {
    let config = load_config(global)?;
    let site = open_site(&config);

    site.navigator().start(Route::Home).await?;
    let outcome = site.navigator().navigate_relative(direction).await?;
    show(&site, &outcome);
    Ok(())
}
