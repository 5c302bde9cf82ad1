//! `swyft open` command implementation.

use clap::Args;
use swyft_site::{NavOutcome, Site};

use crate::GlobalArgs;
use crate::context::{load_config, open_site};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the open command.
#[derive(Args)]
pub(crate) struct OpenArgs {
    /// Tab id, section id, or URL such as `/java/loops` or `/#loops`.
    target: String,
}

/// Whether `target` should be parsed as a URL rather than an id.
fn is_url(target: &str) -> bool {
    target.contains(['/', '#', '?'])
}

impl OpenArgs {
    /// Execute the open command.
    pub(crate) async fn execute(self, global: &GlobalArgs) -> Result<(), CliError> {
        let config = load_config(global)?;
        let site = open_site(&config);

        let outcome = if is_url(&self.target) {
            site.navigator().navigate_url(&self.target).await?
        } else {
            site.navigator().navigate_to_tab(&self.target).await?
        };
        show(&site, &outcome);
        Ok(())
    }
}

/// Print the page a navigation committed.
pub(crate) fn show(site: &Site, outcome: &NavOutcome) {
    let output = Output::new();
    let view = outcome.view().map_or_else(|| site.navigator().view(), std::sync::Arc::clone);
    if let Some(page) = &view.page {
        output.page(page, view.url.as_deref());
    }
}
