//! Colored terminal output utilities.

use console::{Style, Term};
use swyft_site::{NavItem, RenderedPage, Sidebar, strip_tags};

/// Terminal output formatter.
///
/// Command results go to stdout; status and errors go to stderr.
pub(crate) struct Output {
    out: Term,
    err: Term,
    green: Style,
    yellow: Style,
    red: Style,
    dim: Style,
    cyan_bold: Style,
}

impl Output {
    /// Create a new output formatter.
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            out: Term::stdout(),
            err: Term::stderr(),
            green: Style::new().green(),
            yellow: Style::new().yellow(),
            red: Style::new().red(),
            dim: Style::new().dim(),
            cyan_bold: Style::new().cyan().bold(),
        }
    }

    /// Print a result line.
    pub(crate) fn line(&self, msg: &str) {
        let _ = self.out.write_line(msg);
    }

    /// Print a de-emphasized result line.
    pub(crate) fn dim(&self, msg: &str) {
        let _ = self.out.write_line(&self.dim.apply_to(msg).to_string());
    }

    /// Print a highlighted result line (cyan bold).
    pub(crate) fn highlight(&self, msg: &str) {
        let _ = self.out.write_line(&self.cyan_bold.apply_to(msg).to_string());
    }

    /// Print a success message (green).
    pub(crate) fn success(&self, msg: &str) {
        let _ = self.err.write_line(&self.green.apply_to(msg).to_string());
    }

    /// Print a warning message (yellow).
    pub(crate) fn warning(&self, msg: &str) {
        let _ = self.err.write_line(&self.yellow.apply_to(msg).to_string());
    }

    /// Print an error message (red).
    pub(crate) fn error(&self, msg: &str) {
        let _ = self.err.write_line(&self.red.apply_to(msg).to_string());
    }

    /// Print a separator line.
    pub(crate) fn separator(&self) {
        let _ = self.out.write_line(&"=".repeat(70));
    }

    /// Print a rendered page as plain text.
    pub(crate) fn page(&self, page: &RenderedPage, url: Option<&str>) {
        self.highlight(&page.document_title);
        if let Some(url) = url {
            self.dim(url);
        }
        self.separator();
        for line in page_text(&page.html) {
            self.line(&line);
        }
    }

    /// Print a sidebar tree.
    pub(crate) fn sidebar(&self, sidebar: &Sidebar) {
        self.highlight(&sidebar.section_label);
        for item in &sidebar.items {
            self.nav_item(item, 1);
        }
    }

    fn nav_item(&self, item: &NavItem, depth: usize) {
        let indent = "  ".repeat(depth);
        match &item.tab_id {
            Some(tab) => self.line(&format!(
                "{indent}{} {}",
                item.label,
                self.dim.apply_to(format!("({tab})"))
            )),
            None => self.line(&format!("{indent}{}", item.label)),
        }
        for child in &item.children {
            self.nav_item(child, depth + 1);
        }
    }
}

/// Non-empty text lines of rendered page markup.
fn page_text(html: &str) -> Vec<String> {
    strip_tags(html)
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(unescape)
        .collect()
}

/// Undo the entity escaping applied by the renderer.
fn unescape(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#x27;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_page_text_strips_markup_and_entities() {
        let html = "<h2>Loops &amp; more</h2>\n<pre><code>if (a &lt; b) {}</code></pre>\n\n";

        assert_eq!(page_text(html), vec![
            "Loops & more".to_owned(),
            "if (a < b) {}".to_owned(),
        ]);
    }
}
