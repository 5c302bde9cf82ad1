//! `swyft search` command implementation.

use clap::Args;
use swyft_site::{SearchOutcome, SearchResult, strip_tags};

use crate::GlobalArgs;
use crate::context::{load_config, open_site};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the search command.
#[derive(Args)]
pub(crate) struct SearchArgs {
    /// Text to search for (matched literally, case-insensitive).
    query: String,

    /// Show every result instead of the preview.
    #[arg(short, long)]
    all: bool,
}

impl SearchArgs {
    /// Execute the search command.
    pub(crate) async fn execute(self, global: &GlobalArgs) -> Result<(), CliError> {
        let output = Output::new();
        let config = load_config(global)?;
        let site = open_site(&config);

        let results = match site.navigator().search(&self.query).await? {
            SearchOutcome::Completed(results) => results,
            SearchOutcome::Queued | SearchOutcome::Cleared => {
                return Err(CliError::Validation("Search query is empty".to_owned()));
            }
        };

        if results.is_empty() {
            output.warning(&format!("No results for \"{}\"", results.query()));
            return Ok(());
        }

        if self.all {
            for (kind, group) in results.grouped() {
                output.highlight(&format!("{} ({})", kind.heading(), group.len()));
                for result in group {
                    print_result(&output, result);
                }
            }
        } else {
            for result in results.preview() {
                print_result(&output, result);
            }
            if results.has_more() {
                output.dim(&format!(
                    "{} more results, use --all to show everything",
                    results.len() - results.preview().len()
                ));
            }
        }
        Ok(())
    }
}

fn print_result(output: &Output, result: &SearchResult) {
    output.line(&format!("{}  [{}]", strip_tags(&result.text), result.tab_id));
    output.dim(&format!("    {} > {} ({})", result.section, result.group, result.kind));
}
