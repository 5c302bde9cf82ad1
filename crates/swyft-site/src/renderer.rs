//! HTML rendering of content records.
//!
//! Rendering is a pure function of the record: the navigator calls it after
//! resolving a tab and never from anywhere else. Titles, labels and code are
//! escaped; `content` fields, list items and table cells are inserted as the
//! trusted HTML the content files carry.

use crate::content::{
    Block, CalloutBlock, CodeBlock, ContentRecord, DataTypesGridBlock, ExerciseBlock, Link,
    LinkGridBlock, ListBlock, LogicalOperatorsBlock, TableBlock, TextBlock,
};
use crate::util::escape_html;

/// Output of rendering one page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedPage {
    pub tab_id: String,
    pub title: String,
    pub html: String,
    /// `"{title} - {site name}"`.
    pub document_title: String,
}

/// Turns a content record into a page.
pub trait Renderer: Send + Sync {
    fn render(&self, record: &ContentRecord) -> RenderedPage;
}

/// Renderer producing the portal's HTML markup.
#[derive(Clone, Debug)]
pub struct HtmlRenderer {
    site_name: String,
}

impl HtmlRenderer {
    #[must_use]
    pub fn new(site_name: impl Into<String>) -> Self {
        Self {
            site_name: site_name.into(),
        }
    }
}

impl Renderer for HtmlRenderer {
    fn render(&self, record: &ContentRecord) -> RenderedPage {
        let mut html = format!("<h2>{}</h2>\n", escape_html(&record.title));
        for block in &record.blocks {
            render_block(&mut html, block);
        }
        RenderedPage {
            tab_id: record.id.clone(),
            title: record.title.clone(),
            html,
            document_title: format!("{} - {}", record.title, self.site_name),
        }
    }
}

fn render_block(out: &mut String, block: &Block) {
    match block {
        Block::Text(b) => render_text(out, b),
        Block::List(b) => render_list(out, b),
        Block::Code(b) => render_code(out, b),
        Block::Table(b) => render_table(out, b),
        Block::RulesBox(b) | Block::EmphasisBox(b) => render_callout(out, b),
        Block::ExerciseBox(b) => render_exercise(out, b),
        Block::LinkGrid(b) => render_link_grid(out, b),
        Block::DataTypesGrid(b) => render_data_types(out, b),
        Block::LogicalOperators(b) => render_logical_operators(out, b),
        Block::Section(b) => render_section(out, b),
        Block::Unknown => tracing::debug!("Skipping unknown block type"),
    }
}

fn heading(out: &mut String, tag: &str, text: Option<&str>) {
    if let Some(text) = text {
        out.push_str(&format!("<{tag}>{}</{tag}>\n", escape_html(text)));
    }
}

fn items(out: &mut String, items: &[String]) {
    out.push_str("<ul>\n");
    for item in items {
        out.push_str(&format!("<li>{item}</li>\n"));
    }
    out.push_str("</ul>\n");
}

fn code_listing(out: &mut String, label: &str, language: Option<&str>, code: &str) {
    let class = language.map(|l| format!(" language-{}", escape_html(l))).unwrap_or_default();
    out.push_str(&format!("<div class=\"code-block{class}\">\n"));
    out.push_str(&format!(
        "<div class=\"code-header\"><span>{}</span></div>\n",
        escape_html(label)
    ));
    let code_class = language
        .map(|l| format!(" class=\"language-{}\"", escape_html(l)))
        .unwrap_or_default();
    out.push_str(&format!(
        "<pre><code{code_class}>{}</code></pre>\n</div>\n",
        escape_html(code)
    ));
}

/// Code header label: the block title, else the upper-cased language, else `CODE`.
fn code_label(title: Option<&str>, language: Option<&str>) -> String {
    title
        .map(str::to_owned)
        .or_else(|| language.map(str::to_uppercase))
        .unwrap_or_else(|| "CODE".to_owned())
}

fn render_text(out: &mut String, b: &TextBlock) {
    heading(out, "h3", b.title.as_deref());
    out.push_str(&format!("<p>{}</p>\n", b.content.as_deref().unwrap_or_default()));
}

fn render_section(out: &mut String, b: &TextBlock) {
    heading(out, "h3", b.title.as_deref());
    if let Some(content) = &b.content {
        out.push_str(&format!("<div>{content}</div>\n"));
    }
}

fn render_list(out: &mut String, b: &ListBlock) {
    heading(out, "h3", b.title.as_deref());
    items(out, &b.items);
}

fn render_code(out: &mut String, b: &CodeBlock) {
    heading(out, "h3", b.title.as_deref());
    if let Some(preamble) = b.preamble() {
        out.push_str(&format!("<div>{preamble}</div>\n"));
    }
    let label = code_label(b.title.as_deref(), b.language.as_deref());
    code_listing(out, &label, b.language.as_deref(), b.listing().unwrap_or_default());
}

fn render_table(out: &mut String, b: &TableBlock) {
    heading(out, "h3", b.title.as_deref());
    out.push_str("<div class=\"table-container\">\n<table class=\"content-table\">\n");
    if !b.headers.is_empty() {
        out.push_str("<thead><tr>");
        for header in &b.headers {
            out.push_str(&format!("<th>{header}</th>"));
        }
        out.push_str("</tr></thead>\n");
    }
    if !b.rows.is_empty() {
        out.push_str("<tbody>\n");
        for row in &b.rows {
            out.push_str("<tr>");
            for cell in row {
                out.push_str(&format!("<td>{cell}</td>"));
            }
            out.push_str("</tr>\n");
        }
        out.push_str("</tbody>\n");
    }
    out.push_str("</table>\n</div>\n");
}

fn render_callout(out: &mut String, b: &CalloutBlock) {
    out.push_str("<div class=\"rules-box\">\n");
    heading(out, "h3", b.title.as_deref());
    heading(out, "h4", b.subtitle.as_deref());
    if !b.good_practices.is_empty() {
        out.push_str("<h5>Good Practices:</h5>\n");
        items(out, &b.good_practices);
    }
    if !b.avoid.is_empty() {
        out.push_str("<h5>Avoid:</h5>\n");
        items(out, &b.avoid);
    }
    if !b.items.is_empty() {
        items(out, &b.items);
    }
    if let Some(content) = &b.content {
        out.push_str(&format!("<div>{content}</div>\n"));
    }
    out.push_str("</div>\n");
}

fn render_exercise(out: &mut String, b: &ExerciseBlock) {
    out.push_str("<div class=\"exercise-box\">\n");
    heading(out, "h3", b.title.as_deref());
    heading(out, "h4", b.subtitle.as_deref());
    if let Some(description) = &b.description {
        out.push_str(&format!("<p>{description}</p>\n"));
    }
    if let (Some(code), Some(content)) = (&b.code, &b.content)
        && code != content
    {
        out.push_str(&format!("<p>{content}</p>\n"));
    }
    if !b.tasks.is_empty() {
        items(out, &b.tasks);
    }
    if let Some(code) = b.listing() {
        let label = code_label(b.title.as_deref(), b.language.as_deref());
        code_listing(out, &label, b.language.as_deref(), code);
    }
    if !b.answers.is_empty() {
        out.push_str("<div class=\"answer-section hidden\">\n");
        for answer in &b.answers {
            out.push_str("<div class=\"answer-item\">\n");
            if let Some(task) = &answer.task {
                out.push_str(&format!(
                    "<div class=\"answer-task-label\">{}</div>\n",
                    escape_html(task)
                ));
            }
            if let Some(content) = &answer.content {
                let label = code_label(answer.task.as_deref(), answer.language.as_deref());
                code_listing(out, &label, answer.language.as_deref(), content);
            }
            out.push_str("</div>\n");
        }
        out.push_str("</div>\n");
    }
    out.push_str("</div>\n");
}

fn render_link_grid(out: &mut String, b: &LinkGridBlock) {
    heading(out, "h3", b.title.as_deref());
    out.push_str("<div class=\"link-grid\">\n");
    for link in &b.links {
        match link {
            Link::Html(markup) => {
                out.push_str(&format!("<div class=\"link-grid-button\">{markup}</div>\n"));
            }
            Link::Url { url, title, label } => {
                let text = title.as_deref().or(label.as_deref()).unwrap_or(url);
                out.push_str(&format!(
                    "<a class=\"link-grid-button\" href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">{}</a>\n",
                    escape_html(url),
                    escape_html(text)
                ));
            }
            Link::Tab { id, label, title } => {
                let text = label.as_deref().or(title.as_deref()).unwrap_or(id);
                out.push_str(&format!(
                    "<a class=\"link-grid-button\" href=\"#{}\">{}</a>\n",
                    escape_html(id),
                    escape_html(text)
                ));
            }
        }
    }
    out.push_str("</div>\n");
}

fn render_data_types(out: &mut String, b: &DataTypesGridBlock) {
    out.push_str("<div class=\"data-types-grid\">\n");
    for data_type in &b.types {
        out.push_str("<div class=\"data-type\">\n");
        out.push_str(&format!("<h4>{}</h4>\n", escape_html(&data_type.name)));
        out.push_str(&format!("<p>{}</p>\n", escape_html(&data_type.description)));
        if let Some(example) = &data_type.example {
            out.push_str(&format!("<code>{}</code>\n", escape_html(example)));
        }
        out.push_str("</div>\n");
    }
    out.push_str("</div>\n");
}

fn render_logical_operators(out: &mut String, b: &LogicalOperatorsBlock) {
    out.push_str("<div class=\"logical-operators-box\">\n");
    heading(out, "h3", b.title.as_deref());
    heading(out, "h4", b.subtitle.as_deref());
    if !b.operators.is_empty() {
        items(out, &b.operators);
    }
    if let Some(examples) = &b.examples {
        out.push_str("<div class=\"logical-operators-examples\">\n<h4>Examples:</h4>\n");
        out.push_str(&format!(
            "<div class=\"code-block\"><pre><code>{}</code></pre></div>\n</div>\n",
            escape_html(examples)
        ));
    }
    out.push_str("</div>\n");
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::content::{Answer, DataType};

    fn record(blocks: Vec<Block>) -> ContentRecord {
        ContentRecord {
            id: "loops".to_owned(),
            title: "Loops & <Iteration>".to_owned(),
            nav_label: "Loops".to_owned(),
            file: None,
            blocks,
            loaded: true,
            section_id: "java".to_owned(),
            section_label: "Java".to_owned(),
            group_id: None,
            group_label: None,
        }
    }

    fn render(blocks: Vec<Block>) -> RenderedPage {
        HtmlRenderer::new("SwyftNav").render(&record(blocks))
    }

    #[test]
    fn test_page_title_is_escaped() {
        let page = render(vec![]);

        assert_eq!(page.tab_id, "loops");
        assert_eq!(page.html, "<h2>Loops &amp; &lt;Iteration&gt;</h2>\n");
        assert_eq!(page.document_title, "Loops & <Iteration> - SwyftNav");
    }

    #[test]
    fn test_text_content_is_trusted_html() {
        let page = render(vec![Block::Text(TextBlock {
            title: Some("For <loops>".to_owned()),
            content: Some("Use <code>for</code>".to_owned()),
        })]);

        assert!(page.html.contains("<h3>For &lt;loops&gt;</h3>"));
        assert!(page.html.contains("<p>Use <code>for</code></p>"));
    }

    #[test]
    fn test_code_is_escaped_with_language_label() {
        let page = render(vec![Block::Code(CodeBlock {
            code: Some("if (a < b) {}".to_owned()),
            language: Some("java".to_owned()),
            ..CodeBlock::default()
        })]);

        assert!(page.html.contains("<span>JAVA</span>"));
        assert!(page.html.contains("<code class=\"language-java\">if (a &lt; b) {}</code>"));
    }

    #[test]
    fn test_table() {
        let page = render(vec![Block::Table(TableBlock {
            title: None,
            headers: vec!["Type".to_owned()],
            rows: vec![vec!["<code>int</code>".to_owned()]],
        })]);

        assert!(page.html.contains("<thead><tr><th>Type</th></tr></thead>"));
        assert!(page.html.contains("<tr><td><code>int</code></td></tr>"));
    }

    #[test]
    fn test_emphasis_box_renders_like_rules_box() {
        let callout = CalloutBlock {
            title: Some("Remember".to_owned()),
            avoid: vec!["magic numbers".to_owned()],
            ..CalloutBlock::default()
        };

        let rules = render(vec![Block::RulesBox(callout.clone())]);
        let emphasis = render(vec![Block::EmphasisBox(callout)]);

        assert_eq!(rules.html, emphasis.html);
        assert!(rules.html.contains("<h5>Avoid:</h5>"));
    }

    #[test]
    fn test_exercise_with_answers() {
        let page = render(vec![Block::ExerciseBox(ExerciseBlock {
            title: Some("Practice".to_owned()),
            tasks: vec!["Print 1..10".to_owned()],
            code: Some("// your code".to_owned()),
            answers: vec![Answer {
                task: Some("Task 1".to_owned()),
                content: Some("for (;;) {}".to_owned()),
                language: None,
            }],
            ..ExerciseBlock::default()
        })]);

        assert!(page.html.contains("<li>Print 1..10</li>"));
        assert!(page.html.contains("// your code"));
        assert!(page.html.contains("<div class=\"answer-task-label\">Task 1</div>"));
    }

    #[test]
    fn test_link_grid_variants() {
        let page = render(vec![Block::LinkGrid(LinkGridBlock {
            title: None,
            links: vec![
                Link::Url {
                    url: "https://docs.rs".to_owned(),
                    title: Some("Docs".to_owned()),
                    label: None,
                },
                Link::Tab {
                    id: "java-intro".to_owned(),
                    label: Some("Java".to_owned()),
                    title: None,
                },
            ],
        })]);

        assert!(page.html.contains("href=\"https://docs.rs\""));
        assert!(page.html.contains("href=\"#java-intro\">Java</a>"));
    }

    #[test]
    fn test_data_types_grid_escapes() {
        let page = render(vec![Block::DataTypesGrid(DataTypesGridBlock {
            types: vec![DataType {
                name: "List<T>".to_owned(),
                description: "growable".to_owned(),
                example: None,
            }],
        })]);

        assert!(page.html.contains("<h4>List&lt;T&gt;</h4>"));
    }

    #[test]
    fn test_unknown_block_renders_nothing() {
        let page = render(vec![Block::Unknown]);

        assert_eq!(page.html, "<h2>Loops &amp; &lt;Iteration&gt;</h2>\n");
    }
}
