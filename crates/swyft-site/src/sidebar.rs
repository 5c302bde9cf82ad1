//! Sidebar navigation tree for one section.

use serde::Serialize;

use crate::manifest::{Entry, Group, SectionManifest};

/// Navigation item in the sidebar.
///
/// Leaves link to a tab; group headings carry children and no tab.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavItem {
    /// Tab opened when the item is clicked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tab_id: Option<String>,
    /// Display label.
    pub label: String,
    /// Child navigation items.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NavItem>,
}

impl NavItem {
    fn leaf(tab_id: &str, label: &str) -> Self {
        Self {
            tab_id: Some(tab_id.to_owned()),
            label: label.to_owned(),
            children: Vec::new(),
        }
    }

    fn group(group: &Group) -> Self {
        let children = group
            .entries
            .iter()
            .map(|entry| match entry {
                Entry::Item(item) => Self::leaf(&item.id, &item.label),
                Entry::Nested(child) => Self::group(child),
            })
            .collect();
        Self {
            tab_id: None,
            label: group.label.clone(),
            children,
        }
    }

    /// Tab ids reachable from this item, depth-first.
    #[must_use]
    pub fn tab_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.tab_id.as_deref().into_iter().collect();
        for child in &self.children {
            ids.extend(child.tab_ids());
        }
        ids
    }
}

/// Sidebar contents for the current section.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Sidebar {
    pub section_id: String,
    pub section_label: String,
    pub items: Vec<NavItem>,
}

impl Sidebar {
    /// Build the tree for a section: the intro first, then each group.
    ///
    /// A standalone section has a single item linking to itself.
    #[must_use]
    pub fn from_section(section: &SectionManifest) -> Self {
        let mut items = Vec::new();
        if let Some(intro) = &section.intro {
            items.push(NavItem::leaf(&intro.id, &intro.label));
        }
        items.extend(section.groups.iter().map(NavItem::group));
        if items.is_empty() && section.is_standalone() {
            items.push(NavItem::leaf(&section.id, &section.label));
        }

        Self {
            section_id: section.id.clone(),
            section_label: section.label.clone(),
            items,
        }
    }

    /// Tab ids in sidebar order.
    #[must_use]
    pub fn tab_ids(&self) -> Vec<&str> {
        self.items.iter().flat_map(NavItem::tab_ids).collect()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::{Map, Value, json};

    use super::*;
    use crate::content::ContentBody;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(object) => object,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_sidebar_nests_groups() {
        let section = SectionManifest::from_object(
            "java",
            object(json!({
                "label": "Java",
                "intro": {"id": "java-intro", "label": "Welcome"},
                "groups": [{
                    "id": "basics",
                    "label": "Basics",
                    "items": [{"id": "vars", "label": "Variables"}],
                    "children": [{
                        "id": "flow",
                        "label": "Control flow",
                        "items": [{"id": "loops", "label": "Loops"}]
                    }]
                }]
            })),
        )
        .unwrap();

        let sidebar = Sidebar::from_section(&section);

        assert_eq!(sidebar.section_label, "Java");
        assert_eq!(sidebar.items.len(), 2);
        assert_eq!(sidebar.items[1].label, "Basics");
        assert_eq!(sidebar.items[1].tab_id, None);
        assert_eq!(sidebar.tab_ids(), vec!["java-intro", "vars", "loops"]);
    }

    #[test]
    fn test_standalone_section_links_to_itself() {
        let section = SectionManifest::standalone(
            "homepage",
            object(json!({"label": "Home", "file": "data/home.json"})),
            ContentBody::default(),
        )
        .unwrap();

        let sidebar = Sidebar::from_section(&section);

        assert_eq!(sidebar.tab_ids(), vec!["homepage"]);
    }

    #[test]
    fn test_serializes_camel_case_without_empty_fields() {
        let item = NavItem::leaf("loops", "Loops");

        assert_eq!(
            serde_json::to_value(&item).unwrap(),
            json!({"tabId": "loops", "label": "Loops"})
        );
    }
}
