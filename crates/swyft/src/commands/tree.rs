//! `swyft tree` command implementation.

use clap::Args;
use swyft_site::Sidebar;

use crate::GlobalArgs;
use crate::context::{load_config, open_site};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the tree command.
#[derive(Args)]
pub(crate) struct TreeArgs {
    /// Section to show (default: list every section).
    section: Option<String>,
}

impl TreeArgs {
    /// Execute the tree command.
    pub(crate) async fn execute(self, global: &GlobalArgs) -> Result<(), CliError> {
        let output = Output::new();
        let config = load_config(global)?;
        let site = open_site(&config);

        if let Some(section) = &self.section {
            let manifest = site.index().register(section).await?;
            output.sidebar(&Sidebar::from_section(&manifest));
            return Ok(());
        }

        for id in site.index().section_ids().await? {
            match site.config().section(&id).await {
                Ok(section) => {
                    let pages = section.entries().len().max(usize::from(section.is_standalone()));
                    output.line(&format!("{}  [{id}]", section.label));
                    output.dim(&format!("    {pages} pages"));
                }
                Err(e) => output.warning(&format!("{id}: {e}")),
            }
        }
        Ok(())
    }
}
