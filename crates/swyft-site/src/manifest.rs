//! Root and section manifests.
//!
//! The root manifest lists sections in display order:
//!
//! ```json
//! { "sections": { "java": { "label": "Java", "file": "data/java.json" } } }
//! ```
//!
//! A section is either declared inline (with `intro` / `groups`), points to a
//! section manifest `file`, or points to a content file directly (a
//! standalone section such as the homepage). Groups nest through `children`
//! to any depth; the tree is flattened once into [`FlatEntry`] values so
//! lookups never re-walk it.

use std::collections::HashSet;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::content::ContentBody;
use crate::error::SiteError;

/// Group id given to a section's intro entry.
pub const INTRO_GROUP_ID: &str = "intro";

/// Group label given to a section's intro entry.
pub const INTRO_GROUP_LABEL: &str = "Introduction";

/// Reference to one content page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContentRef {
    pub id: String,
    pub label: String,
    pub file: Option<String>,
    /// Start tab when no route or persisted tab applies.
    pub default: bool,
}

/// Group of entries; items come before nested groups.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Group {
    pub id: String,
    pub label: String,
    pub entries: Vec<Entry>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Entry {
    Item(ContentRef),
    Nested(Group),
}

/// Content reference with the group it was declared in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlatEntry {
    pub item: ContentRef,
    pub group_id: Option<String>,
    pub group_label: Option<String>,
}

#[derive(Deserialize)]
struct ContentRefRaw {
    id: String,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    file: Option<String>,
    #[serde(default)]
    default: bool,
}

impl From<ContentRefRaw> for ContentRef {
    fn from(raw: ContentRefRaw) -> Self {
        let label = raw.label.or(raw.title).unwrap_or_else(|| raw.id.clone());
        Self {
            id: raw.id,
            label,
            file: raw.file,
            default: raw.default,
        }
    }
}

#[derive(Deserialize)]
struct GroupRaw {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    items: Vec<ContentRefRaw>,
    #[serde(default)]
    children: Vec<GroupRaw>,
}

impl From<GroupRaw> for Group {
    fn from(raw: GroupRaw) -> Self {
        let label = raw
            .label
            .or(raw.title)
            .or_else(|| raw.id.clone())
            .unwrap_or_default();
        let id = raw.id.unwrap_or_else(|| label.clone());

        let mut entries: Vec<Entry> = raw
            .items
            .into_iter()
            .map(|item| Entry::Item(item.into()))
            .collect();
        entries.extend(raw.children.into_iter().map(|g| Entry::Nested(g.into())));

        Self { id, label, entries }
    }
}

#[derive(Deserialize, Default)]
struct SectionRaw {
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    file: Option<String>,
    #[serde(default)]
    path: Option<String>,
    #[serde(default)]
    intro: Option<ContentRefRaw>,
    #[serde(default)]
    groups: Vec<GroupRaw>,
    #[serde(default)]
    children: Vec<GroupRaw>,
}

/// A section's structure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SectionManifest {
    pub id: String,
    pub label: String,
    pub file: Option<String>,
    /// URL slug, when the manifest declares one.
    pub path: Option<String>,
    pub intro: Option<ContentRef>,
    pub groups: Vec<Group>,
    /// Body of a standalone section (the section is its own page).
    pub body: Option<ContentBody>,
    entries: Vec<FlatEntry>,
}

impl SectionManifest {
    /// Parse a section from its JSON object.
    ///
    /// # Errors
    ///
    /// Returns [`SiteError::Manifest`] if the object has the wrong shape.
    pub fn from_object(id: &str, object: Map<String, Value>) -> Result<Self, SiteError> {
        let raw: SectionRaw = serde_json::from_value(Value::Object(object))
            .map_err(|e| SiteError::Manifest(format!("section {id}: {e}")))?;
        Ok(Self::from_raw(id, raw))
    }

    /// Build a standalone section whose own body is its only page.
    ///
    /// # Errors
    ///
    /// Returns [`SiteError::Manifest`] if the root entry has the wrong shape.
    pub fn standalone(
        id: &str,
        object: Map<String, Value>,
        body: ContentBody,
    ) -> Result<Self, SiteError> {
        let mut section = Self::from_object(id, object)?;
        section.body = Some(body);
        Ok(section)
    }

    fn from_raw(id: &str, raw: SectionRaw) -> Self {
        let label = raw
            .label
            .or(raw.title)
            .unwrap_or_else(|| id.to_owned());
        let intro: Option<ContentRef> = raw.intro.map(Into::into);
        let groups: Vec<Group> = raw
            .groups
            .into_iter()
            .chain(raw.children)
            .map(Into::into)
            .collect();

        let mut section = Self {
            id: id.to_owned(),
            label,
            file: raw.file,
            path: raw.path.map(|p| p.trim_matches('/').to_owned()).filter(|p| !p.is_empty()),
            intro,
            groups,
            body: None,
            entries: Vec::new(),
        };
        section.entries = section.flatten();
        section
    }

    /// Depth-first flattening: intro, then each group's items before its
    /// nested groups. Duplicate ids keep their first declaration.
    fn flatten(&self) -> Vec<FlatEntry> {
        fn walk(group: &Group, seen: &mut HashSet<String>, out: &mut Vec<FlatEntry>, section: &str) {
            for entry in &group.entries {
                match entry {
                    Entry::Item(item) => push(item, Some(group), seen, out, section),
                    Entry::Nested(child) => walk(child, seen, out, section),
                }
            }
        }

        fn push(
            item: &ContentRef,
            group: Option<&Group>,
            seen: &mut HashSet<String>,
            out: &mut Vec<FlatEntry>,
            section: &str,
        ) {
            if !seen.insert(item.id.clone()) {
                tracing::warn!(section, id = %item.id, "duplicate content id in manifest, keeping first");
                return;
            }
            let (group_id, group_label) = match group {
                Some(g) => (Some(g.id.clone()), Some(g.label.clone())),
                None => (
                    Some(INTRO_GROUP_ID.to_owned()),
                    Some(INTRO_GROUP_LABEL.to_owned()),
                ),
            };
            out.push(FlatEntry {
                item: item.clone(),
                group_id,
                group_label,
            });
        }

        let mut seen = HashSet::new();
        let mut out = Vec::new();
        if let Some(intro) = &self.intro {
            push(intro, None, &mut seen, &mut out, &self.id);
        }
        for group in &self.groups {
            walk(group, &mut seen, &mut out, &self.id);
        }
        out
    }

    /// Whether the structure has to be fetched from `file`.
    #[must_use]
    pub fn needs_fetch(&self) -> bool {
        self.file.is_some() && self.intro.is_none() && self.groups.is_empty() && self.body.is_none()
    }

    /// Whether this section is a single page identified by the section id.
    #[must_use]
    pub fn is_standalone(&self) -> bool {
        self.body.is_some()
    }

    /// Flattened entries in navigation order.
    #[must_use]
    pub fn entries(&self) -> &[FlatEntry] {
        &self.entries
    }

    /// Find the entry declaring `id`.
    #[must_use]
    pub fn entry(&self, id: &str) -> Option<&FlatEntry> {
        self.entries.iter().find(|e| e.item.id == id)
    }

    /// Whether `tab_id` belongs to this section.
    #[must_use]
    pub fn contains(&self, tab_id: &str) -> bool {
        (self.is_standalone() && self.id == tab_id) || self.entry(tab_id).is_some()
    }

    /// Tab opened when the section itself is requested: the intro, else the
    /// first item of the first non-empty group (descending into nested
    /// groups), else the section page itself when standalone.
    #[must_use]
    pub fn first_tab(&self) -> Option<&str> {
        if let Some(intro) = &self.intro {
            return Some(&intro.id);
        }
        if let Some(first) = self.entries.first() {
            return Some(&first.item.id);
        }
        self.is_standalone().then_some(self.id.as_str())
    }

    /// Entry flagged as the default start tab.
    #[must_use]
    pub fn default_tab(&self) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.item.default)
            .map(|e| e.item.id.as_str())
    }
}

/// The root manifest: every section in declaration order.
#[derive(Debug)]
pub struct RootManifest {
    sections: Vec<(String, Map<String, Value>)>,
}

#[derive(Deserialize)]
struct RootRaw {
    #[serde(default)]
    sections: Map<String, Value>,
}

impl RootManifest {
    /// Parse the root manifest document.
    ///
    /// # Errors
    ///
    /// Returns [`SiteError::Parse`] for malformed JSON and
    /// [`SiteError::Manifest`] when a section entry is not an object.
    pub fn parse(text: &str, path: &str) -> Result<Self, SiteError> {
        let raw: RootRaw = serde_json::from_str(text).map_err(|source| SiteError::Parse {
            path: path.to_owned(),
            source,
        })?;

        let sections = raw
            .sections
            .into_iter()
            .map(|(id, value)| match value {
                Value::Object(object) => Ok((id, object)),
                _ => Err(SiteError::Manifest(format!(
                    "section {id} in {path} is not an object"
                ))),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { sections })
    }

    /// Section ids in declaration order.
    pub fn section_ids(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|(id, _)| id.as_str())
    }

    /// Whether a section with this id is declared.
    #[must_use]
    pub fn has_section(&self, id: &str) -> bool {
        self.entry(id).is_some()
    }

    /// Raw JSON object declared for a section.
    #[must_use]
    pub fn entry(&self, id: &str) -> Option<&Map<String, Value>> {
        self.sections
            .iter()
            .find(|(section, _)| section == id)
            .map(|(_, object)| object)
    }

    /// URL slug for each section: the declared `path`, else the id.
    #[must_use]
    pub fn slugs(&self) -> Vec<(String, String)> {
        self.sections
            .iter()
            .map(|(id, object)| {
                let slug = object
                    .get("path")
                    .and_then(Value::as_str)
                    .map(|p| p.trim_matches('/'))
                    .filter(|p| !p.is_empty())
                    .unwrap_or(id);
                (slug.to_owned(), id.clone())
            })
            .collect()
    }
}

/// Overlay a fetched section document onto the root entry.
#[must_use]
pub fn merge_section(
    mut base: Map<String, Value>,
    fetched: Map<String, Value>,
) -> Map<String, Value> {
    base.extend(fetched);
    base
}
