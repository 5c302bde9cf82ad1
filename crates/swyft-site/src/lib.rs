//! Content index, search and navigation for SwyftNav.
//!
//! This crate provides:
//! - [`ConfigStore`]: root and section manifest loading over a
//!   [`ContentSource`](swyft_storage::ContentSource)
//! - [`ContentIndex`]: lazily loaded content records, one section at a time
//! - [`SearchEngine`]: ranked, deduplicated full-text search
//! - [`Navigator`]: tab resolution with last-request-wins ordering
//! - [`Router`] and [`HtmlRenderer`] for URLs and page markup
//! - [`Site`]: all of the above wired together
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use swyft_prefs::{MemoryStore, Preferences};
//! use swyft_site::{Site, SiteOptions};
//! use swyft_storage::HttpSource;
//!
//! let source = Arc::new(HttpSource::new("https://example.github.io"));
//! let site = Site::new(source, SiteOptions::default(), Preferences::new(Arc::new(MemoryStore::new())));
//!
//! let outcome = site.navigator().navigate_url("/java/loops").await?;
//! ```

mod config_store;
mod content;
mod content_index;
mod error;
mod manifest;
mod navigator;
mod renderer;
mod router;
mod search;
mod sidebar;
mod site;
mod util;

pub use config_store::{BasePath, ConfigStore};
pub use content::{
    Answer, Block, CalloutBlock, CodeBlock, ContentBody, ContentRecord, DataType,
    DataTypesGridBlock, ExerciseBlock, Link, LinkGridBlock, ListBlock, LogicalOperatorsBlock,
    TableBlock, TextBlock,
};
pub use content_index::{ContentIndex, Direction};
pub use error::SiteError;
pub use manifest::{
    ContentRef, Entry, FlatEntry, Group, INTRO_GROUP_ID, INTRO_GROUP_LABEL, RootManifest,
    SectionManifest,
};
pub use navigator::{NavOutcome, NavigationState, Navigator, View};
pub use renderer::{HtmlRenderer, RenderedPage, Renderer};
pub use router::{Route, Router};
pub use search::{
    ResultKind, SearchEngine, SearchOutcome, SearchResult, SearchResults, SearchSettings,
    highlight, snippet,
};
pub use sidebar::{NavItem, Sidebar};
pub use site::{Site, SiteOptions};
pub use util::{escape_html, strip_tags};
