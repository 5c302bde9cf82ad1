//! Content documents and their blocks.
//!
//! A content file is `{ "title": ..., "sections": [block, ...] }` (older files
//! use `content` instead of `sections`). Each block carries a `type` tag and is
//! parsed into the closed [`Block`] enum when the file is loaded. Blocks with an
//! unrecognised tag or an unusable shape become [`Block::Unknown`] so one odd
//! block never fails a whole page.
//!
//! Fields that hold markup (`content`, list items, table cells) are trusted
//! HTML from the site's own data files.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Deserialize an optional string, treating any non-string value as absent.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        _ => None,
    })
}

/// Deserialize a list of strings, dropping non-string entries.
fn lenient_strings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(strings_from(Option::<Value>::deserialize(deserializer)?))
}

fn strings_from(value: Option<Value>) -> Vec<String> {
    match value {
        Some(Value::Array(values)) => values
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Paragraph of trusted HTML.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct TextBlock {
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub content: Option<String>,
}

/// Bulleted list. Items come from `items`, or from `content` when it is an array.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "ListBlockRaw")]
pub struct ListBlock {
    pub title: Option<String>,
    pub items: Vec<String>,
}

#[derive(Deserialize)]
struct ListBlockRaw {
    #[serde(default, deserialize_with = "lenient_string")]
    title: Option<String>,
    #[serde(default)]
    items: Option<Value>,
    #[serde(default)]
    content: Option<Value>,
}

impl From<ListBlockRaw> for ListBlock {
    fn from(raw: ListBlockRaw) -> Self {
        let items = if matches!(raw.items, Some(Value::Array(_))) {
            raw.items
        } else {
            raw.content
        };
        Self {
            title: raw.title,
            items: strings_from(items),
        }
    }
}

/// Code listing, optionally preceded by explanatory HTML.
///
/// When `code` is absent the `content` field holds the code itself.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct CodeBlock {
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub content: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub code: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub language: Option<String>,
}

impl CodeBlock {
    /// Text shown inside the `<pre>` element.
    #[must_use]
    pub fn listing(&self) -> Option<&str> {
        self.code.as_deref().or(self.content.as_deref())
    }

    /// Explanatory HTML shown above the listing, if distinct from it.
    #[must_use]
    pub fn preamble(&self) -> Option<&str> {
        match (&self.code, &self.content) {
            (Some(code), Some(content)) if code != content => Some(content),
            _ => None,
        }
    }
}

/// Table with HTML header and body cells.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct TableBlock {
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub headers: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Vec<String>>,
}

/// Highlighted box used by `rules-box` and `emphasis-box`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalloutBlock {
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub subtitle: Option<String>,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub good_practices: Vec<String>,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub avoid: Vec<String>,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub items: Vec<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub content: Option<String>,
}

/// Worked answer attached to an exercise.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct Answer {
    #[serde(default, deserialize_with = "lenient_string")]
    pub task: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub content: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub language: Option<String>,
}

/// Exercise with tasks, starter code and optional answers.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct ExerciseBlock {
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub subtitle: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub content: Option<String>,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub tasks: Vec<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub code: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub language: Option<String>,
    #[serde(default)]
    pub answers: Vec<Answer>,
}

impl ExerciseBlock {
    /// Starter code, if any non-blank code or content is present.
    #[must_use]
    pub fn listing(&self) -> Option<&str> {
        self.code
            .as_deref()
            .or(self.content.as_deref())
            .filter(|code| !code.trim().is_empty())
    }
}

/// One entry of a link grid.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Link {
    /// Raw anchor markup such as `<a href="...">Docs</a>`.
    Html(String),
    /// External or absolute URL.
    Url {
        url: String,
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        label: Option<String>,
    },
    /// Another tab in the portal.
    Tab {
        id: String,
        #[serde(default)]
        label: Option<String>,
        #[serde(default)]
        title: Option<String>,
    },
}

/// Grid of link buttons. Links come from `links`, `items` or `content`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "LinkGridRaw")]
pub struct LinkGridBlock {
    pub title: Option<String>,
    pub links: Vec<Link>,
}

#[derive(Deserialize)]
struct LinkGridRaw {
    #[serde(default, deserialize_with = "lenient_string")]
    title: Option<String>,
    #[serde(default)]
    links: Option<Value>,
    #[serde(default)]
    items: Option<Value>,
    #[serde(default)]
    content: Option<Value>,
}

impl From<LinkGridRaw> for LinkGridBlock {
    fn from(raw: LinkGridRaw) -> Self {
        let links = match raw.links.or(raw.items).or(raw.content) {
            Some(Value::Array(values)) => values
                .into_iter()
                .filter_map(|v| serde_json::from_value(v).ok())
                .collect(),
            _ => Vec::new(),
        };
        Self {
            title: raw.title,
            links,
        }
    }
}

/// Card describing one data type.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct DataType {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub example: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct DataTypesGridBlock {
    #[serde(default)]
    pub types: Vec<DataType>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct LogicalOperatorsBlock {
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub subtitle: Option<String>,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub operators: Vec<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub examples: Option<String>,
}

/// One renderable block of a content page.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Block {
    Text(TextBlock),
    List(ListBlock),
    Code(CodeBlock),
    Table(TableBlock),
    RulesBox(CalloutBlock),
    EmphasisBox(CalloutBlock),
    ExerciseBox(ExerciseBlock),
    LinkGrid(LinkGridBlock),
    DataTypesGrid(DataTypesGridBlock),
    LogicalOperators(LogicalOperatorsBlock),
    Section(TextBlock),
    #[serde(other)]
    Unknown,
}

impl Block {
    /// Parse a block, falling back to [`Block::Unknown`] on malformed input.
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        match serde_json::from_value(value) {
            Ok(block) => block,
            Err(e) => {
                tracing::debug!(error = %e, "unparseable block");
                Self::Unknown
            }
        }
    }

    /// Block heading.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        match self {
            Self::Text(b) | Self::Section(b) => b.title.as_deref(),
            Self::List(b) => b.title.as_deref(),
            Self::Code(b) => b.title.as_deref(),
            Self::Table(b) => b.title.as_deref(),
            Self::RulesBox(b) | Self::EmphasisBox(b) => b.title.as_deref(),
            Self::ExerciseBox(b) => b.title.as_deref(),
            Self::LinkGrid(b) => b.title.as_deref(),
            Self::LogicalOperators(b) => b.title.as_deref(),
            Self::DataTypesGrid(_) | Self::Unknown => None,
        }
    }

    /// Free text of the block (its string `content` field).
    #[must_use]
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Text(b) | Self::Section(b) => b.content.as_deref(),
            Self::Code(b) => b.content.as_deref(),
            Self::RulesBox(b) | Self::EmphasisBox(b) => b.content.as_deref(),
            Self::ExerciseBox(b) => b.content.as_deref(),
            _ => None,
        }
    }

    /// Source code carried in an explicit `code` field.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Code(b) => b.code.as_deref(),
            Self::ExerciseBox(b) => b.code.as_deref(),
            _ => None,
        }
    }

    /// List item strings.
    #[must_use]
    pub fn list_items(&self) -> &[String] {
        match self {
            Self::List(b) => &b.items,
            Self::RulesBox(b) | Self::EmphasisBox(b) => &b.items,
            _ => &[],
        }
    }
}

/// Parsed body of a content file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContentBody {
    pub title: Option<String>,
    pub blocks: Vec<Block>,
}

#[derive(Deserialize)]
struct ContentBodyRaw {
    #[serde(default, deserialize_with = "lenient_string")]
    title: Option<String>,
    #[serde(default)]
    sections: Option<Value>,
    #[serde(default)]
    content: Option<Value>,
}

impl ContentBody {
    /// Whether a JSON object looks like a content body.
    #[must_use]
    pub fn is_body(object: &serde_json::Map<String, Value>) -> bool {
        ["sections", "content"]
            .iter()
            .any(|key| matches!(object.get(*key), Some(Value::Array(_))))
    }

    /// Parse a content document.
    ///
    /// # Errors
    ///
    /// Returns the parser error if `text` is not a JSON object.
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        let raw: ContentBodyRaw = serde_json::from_str(text)?;
        Ok(Self::from_raw(raw))
    }

    /// Build from an already parsed JSON value.
    ///
    /// # Errors
    ///
    /// Returns the conversion error if `value` is not a JSON object.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        let raw: ContentBodyRaw = serde_json::from_value(value)?;
        Ok(Self::from_raw(raw))
    }

    fn from_raw(raw: ContentBodyRaw) -> Self {
        let blocks = match (raw.sections, raw.content) {
            (Some(Value::Array(values)), _) | (_, Some(Value::Array(values))) => {
                values.into_iter().map(Block::from_value).collect()
            }
            _ => Vec::new(),
        };
        Self {
            title: raw.title,
            blocks,
        }
    }
}

/// A content page ("tab") known to the index.
///
/// Created with `loaded == false` from manifest metadata and upgraded to
/// `loaded == true` once its body has been fetched.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContentRecord {
    pub id: String,
    /// Page title (body title, falling back to the navigation label).
    pub title: String,
    /// Label shown in the sidebar.
    pub nav_label: String,
    pub file: Option<String>,
    pub blocks: Vec<Block>,
    pub loaded: bool,
    pub section_id: String,
    pub section_label: String,
    pub group_id: Option<String>,
    pub group_label: Option<String>,
}

impl ContentRecord {
    /// Upgrade a metadata record with its fetched body.
    #[must_use]
    pub fn with_body(&self, body: ContentBody) -> Self {
        Self {
            title: body.title.unwrap_or_else(|| self.nav_label.clone()),
            blocks: body.blocks,
            loaded: true,
            ..self.clone()
        }
    }
}
