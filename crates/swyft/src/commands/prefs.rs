//! `swyft prefs` command implementation.

use clap::Args;
use swyft_prefs::{MAX_SIDEBAR_WIDTH, MIN_SIDEBAR_WIDTH, Preferences, Theme};

use crate::GlobalArgs;
use crate::context::{load_config, preferences};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the prefs command.
#[derive(Args)]
pub(crate) struct PrefsArgs {
    /// Set the color theme (light or dark).
    #[arg(long)]
    theme: Option<Theme>,

    /// Switch between light and dark.
    #[arg(long, conflicts_with = "theme")]
    toggle_theme: bool,

    /// Set the sidebar width in pixels (clamped to the allowed range).
    #[arg(long)]
    sidebar_width: Option<u32>,

    /// Forget the last opened tab.
    #[arg(long)]
    forget_tab: bool,
}

impl PrefsArgs {
    /// Execute the prefs command.
    pub(crate) fn execute(self, global: &GlobalArgs) -> Result<(), CliError> {
        let output = Output::new();
        let config = load_config(global)?;
        let prefs = preferences(&config);

        if let Some(theme) = self.theme {
            prefs.set_theme(theme)?;
            output.success(&format!("Theme set to {theme}"));
        }
        if self.toggle_theme {
            let theme = prefs.toggle_theme()?;
            output.success(&format!("Theme set to {theme}"));
        }
        if let Some(width) = self.sidebar_width {
            let stored = prefs.set_sidebar_width(width)?;
            if stored == width {
                output.success(&format!("Sidebar width set to {stored}"));
            } else {
                output.warning(&format!(
                    "Sidebar width {width} is outside {MIN_SIDEBAR_WIDTH}..={MAX_SIDEBAR_WIDTH}, stored {stored}"
                ));
            }
        }
        if self.forget_tab {
            prefs.clear_last_opened_tab()?;
        }

        show(&output, &prefs, &config.state_file().display().to_string());
        Ok(())
    }
}

fn show(output: &Output, prefs: &Preferences, path: &str) {
    let unset = || "(unset)".to_owned();
    output.line(&format!("theme          {}", prefs.theme()));
    output.line(&format!(
        "sidebar width  {}",
        prefs.sidebar_width().map_or_else(unset, |w| w.to_string())
    ));
    output.line(&format!(
        "last tab       {}",
        prefs.last_opened_tab().unwrap_or_else(unset)
    ));
    output.line(&format!(
        "search query   {}",
        prefs.search_query().unwrap_or_else(unset)
    ));
    output.dim(path);
}
