//! Full-text search over every content page.
//!
//! A search forces every section to load, scans each loaded record and ranks
//! the matches:
//!
//! | Match            | Kind            | Priority (whole word / partial) |
//! |------------------|-----------------|---------------------------------|
//! | page title       | `title`         | 1 / 1.5                         |
//! | block title      | `section-title` | 2 / 2.5                         |
//! | block text       | `content`       | 3 / 3.5                         |
//! | block code       | `code`          | 4 / 4.5                         |
//! | list item        | `list-item`     | 5 / 5.5                         |
//!
//! Results are sorted by priority, then section, group and text, and
//! deduplicated. Queries are matched literally and case-insensitively.
//!
//! Only one search runs at a time. A call made while another is running
//! records its query and returns [`SearchOutcome::Queued`]; the running call
//! picks the newest queued query up before it finishes.

use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use futures::future::join_all;
use regex::RegexBuilder;

use crate::content::ContentRecord;
use crate::content_index::ContentIndex;
use crate::error::SiteError;
use crate::util::escape_html;

/// Kind of match, in the order results are grouped for display.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResultKind {
    Title,
    SectionTitle,
    Content,
    ListItem,
    Code,
}

impl ResultKind {
    /// Display grouping order.
    pub const ALL: [Self; 5] = [
        Self::Title,
        Self::SectionTitle,
        Self::Content,
        Self::ListItem,
        Self::Code,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::SectionTitle => "section-title",
            Self::Content => "content",
            Self::ListItem => "list-item",
            Self::Code => "code",
        }
    }

    /// Heading shown above a group of results.
    #[must_use]
    pub fn heading(self) -> &'static str {
        match self {
            Self::Title => "Page Titles",
            Self::SectionTitle => "Section Titles",
            Self::Content => "Content",
            Self::ListItem => "List Items",
            Self::Code => "Code",
        }
    }

    /// Whether two results of this kind on one page collapse regardless of text.
    fn dedup_by_page(self) -> bool {
        matches!(self, Self::Title | Self::SectionTitle)
    }
}

impl fmt::Display for ResultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One ranked match.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchResult {
    pub kind: ResultKind,
    /// Full title, or a snippet around the match.
    pub text: String,
    pub section: String,
    pub group: String,
    pub tab_id: String,
    /// Lower is more relevant.
    pub priority: f32,
    pub whole_word: bool,
}

/// Snippet context lengths and display limits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchSettings {
    pub preview_limit: usize,
    pub body_context: usize,
    pub code_context: usize,
    pub list_context: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            preview_limit: 15,
            body_context: 50,
            code_context: 30,
            list_context: 50,
        }
    }
}

/// Published result set for one query.
#[derive(Clone, Debug, Default)]
pub struct SearchResults {
    query: String,
    results: Vec<SearchResult>,
    preview_limit: usize,
}

impl SearchResults {
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Every result in rank order.
    #[must_use]
    pub fn all(&self) -> &[SearchResult] {
        &self.results
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// The first results, up to the preview limit.
    #[must_use]
    pub fn preview(&self) -> &[SearchResult] {
        &self.results[..self.results.len().min(self.preview_limit)]
    }

    /// Whether there are more results than the preview shows.
    #[must_use]
    pub fn has_more(&self) -> bool {
        self.results.len() > self.preview_limit
    }

    /// All results grouped by kind, in display order, omitting empty groups.
    #[must_use]
    pub fn grouped(&self) -> Vec<(ResultKind, Vec<&SearchResult>)> {
        ResultKind::ALL
            .iter()
            .filter_map(|&kind| {
                let group: Vec<_> = self.results.iter().filter(|r| r.kind == kind).collect();
                (!group.is_empty()).then_some((kind, group))
            })
            .collect()
    }
}

/// Result of [`SearchEngine::search`].
#[derive(Clone, Debug)]
pub enum SearchOutcome {
    /// Search ran and its results were published.
    Completed(Arc<SearchResults>),
    /// Another search was running; this query runs when it finishes.
    Queued,
    /// Results were cleared (empty query, or cleared while running).
    Cleared,
}

#[derive(Default)]
struct Flight {
    running: bool,
    pending: Option<String>,
}

/// Resets the single-flight flag if a running search fails or is dropped
/// mid-way.
struct FlightGuard<'a> {
    flight: &'a Mutex<Flight>,
    armed: bool,
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            let mut flight = self.flight.lock().unwrap();
            flight.running = false;
            flight.pending = None;
        }
    }
}

/// Single-flight search over a [`ContentIndex`].
pub struct SearchEngine {
    index: Arc<ContentIndex>,
    settings: SearchSettings,
    flight: Mutex<Flight>,
    current: Mutex<Arc<SearchResults>>,
    generation: AtomicU64,
}

impl SearchEngine {
    #[must_use]
    pub fn new(index: Arc<ContentIndex>, settings: SearchSettings) -> Self {
        Self {
            index,
            settings,
            flight: Mutex::new(Flight::default()),
            current: Mutex::new(Arc::new(SearchResults::default())),
            generation: AtomicU64::new(0),
        }
    }

    /// Most recently published results.
    #[must_use]
    pub fn current(&self) -> Arc<SearchResults> {
        Arc::clone(&self.current.lock().unwrap())
    }

    /// Clear published results and discard any running search's output.
    pub fn clear(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.flight.lock().unwrap().pending = None;
        *self.current.lock().unwrap() = Arc::new(SearchResults::default());
    }

    /// Run a search for `query`.
    ///
    /// An empty (after trimming) query clears the results immediately.
    pub async fn search(&self, query: &str) -> Result<SearchOutcome, SiteError> {
        let mut query = normalize(query);
        if query.is_empty() {
            self.clear();
            return Ok(SearchOutcome::Cleared);
        }

        {
            let mut flight = self.flight.lock().unwrap();
            if flight.running {
                tracing::debug!(%query, "Search in flight, queueing");
                flight.pending = Some(query);
                return Ok(SearchOutcome::Queued);
            }
            flight.running = true;
        }
        let mut guard = FlightGuard {
            flight: &self.flight,
            armed: true,
        };

        loop {
            let generation = self.generation.load(Ordering::SeqCst);
            let results = match self.run(&query).await {
                Ok(results) => results,
                Err(e) => {
                    let pending = self.flight.lock().unwrap().pending.take();
                    let Some(next) = pending else {
                        return Err(e);
                    };
                    tracing::warn!(%query, error = %e, "Search failed, running queued query");
                    query = next;
                    continue;
                }
            };

            let mut flight = self.flight.lock().unwrap();
            match flight.pending.take() {
                Some(next) if next != query => {
                    tracing::debug!(from = %query, to = %next, "Rerunning search for newer query");
                    query = next;
                }
                _ => {
                    flight.running = false;
                    guard.armed = false;
                    drop(flight);

                    if self.generation.load(Ordering::SeqCst) != generation {
                        return Ok(SearchOutcome::Cleared);
                    }
                    let published = Arc::new(SearchResults {
                        query,
                        results,
                        preview_limit: self.settings.preview_limit,
                    });
                    *self.current.lock().unwrap() = Arc::clone(&published);
                    return Ok(SearchOutcome::Completed(published));
                }
            }
        }
    }

    /// Load everything and rank matches for a normalized query.
    async fn run(&self, query: &str) -> Result<Vec<SearchResult>, SiteError> {
        let sections = self.index.section_ids().await?;
        let loads = join_all(sections.iter().map(|id| self.index.ensure_loaded(id))).await;
        for (id, result) in sections.iter().zip(loads) {
            if let Err(e) = result {
                tracing::warn!(section = %id, error = %e, "Section unavailable for search");
            }
        }

        let mut results = Vec::new();
        for record in self.index.loaded_records() {
            scan_record(&record, query, &self.settings, &mut results);
        }
        rank(&mut results);
        tracing::debug!(query, results = results.len(), "Search finished");
        Ok(results)
    }
}

fn normalize(query: &str) -> String {
    query.trim().to_lowercase()
}

/// Whether `query` equals one of the whitespace-separated tokens of `lower`.
fn is_whole_word(lower: &str, query: &str) -> bool {
    lower.split_whitespace().any(|word| word == query)
}

fn priority(base: f32, whole_word: bool) -> f32 {
    if whole_word { base } else { base + 0.5 }
}

/// Append every match in `record` to `out`.
fn scan_record(
    record: &ContentRecord,
    query: &str,
    settings: &SearchSettings,
    out: &mut Vec<SearchResult>,
) {
    let section = record.section_label.clone();
    let group = record
        .group_label
        .clone()
        .or_else(|| record.group_id.clone())
        .unwrap_or_else(|| "Unknown".to_owned());

    let mut push = |kind: ResultKind, base: f32, source: &str, context: Option<usize>| {
        let lower = source.to_lowercase();
        if !lower.contains(query) {
            return;
        }
        let whole_word = is_whole_word(&lower, query);
        let text = match context {
            Some(context) => snippet(source, query, context),
            None => source.to_owned(),
        };
        out.push(SearchResult {
            kind,
            text,
            section: section.clone(),
            group: group.clone(),
            tab_id: record.id.clone(),
            priority: priority(base, whole_word),
            whole_word,
        });
    };

    push(ResultKind::Title, 1.0, &record.title, None);
    for block in &record.blocks {
        if let Some(title) = block.title() {
            push(ResultKind::SectionTitle, 2.0, title, None);
        }
        if let Some(body) = block.body() {
            push(ResultKind::Content, 3.0, body, Some(settings.body_context));
        }
        if let Some(code) = block.code() {
            push(ResultKind::Code, 4.0, code, Some(settings.code_context));
        }
        for item in block.list_items() {
            push(ResultKind::ListItem, 5.0, item, Some(settings.list_context));
        }
    }
}

/// Sort by priority, section, group and text, then drop duplicates.
fn rank(results: &mut Vec<SearchResult>) {
    results.sort_by(|a, b| {
        a.priority
            .total_cmp(&b.priority)
            .then_with(|| a.section.cmp(&b.section))
            .then_with(|| a.group.cmp(&b.group))
            .then_with(|| a.text.cmp(&b.text))
    });

    let mut seen = HashSet::new();
    results.retain(|r| {
        let text = if r.kind.dedup_by_page() { None } else { Some(r.text.clone()) };
        seen.insert((r.tab_id.clone(), r.kind, text))
    });
}

/// Cut `context` characters either side of the first match of `query`,
/// marking truncated ends with `...`.
///
/// Works on characters, so multi-byte text is never split. Without a match
/// the first `2 * context` characters are returned.
#[must_use]
pub fn snippet(text: &str, query: &str, context: usize) -> String {
    let chars: Vec<char> = text.chars().collect();

    // Lower-case per character, remembering which original char each
    // lowered char came from.
    let mut lower = Vec::with_capacity(chars.len());
    let mut origin = Vec::with_capacity(chars.len());
    for (i, c) in chars.iter().enumerate() {
        for l in c.to_lowercase() {
            lower.push(l);
            origin.push(i);
        }
    }
    let needle: Vec<char> = query.to_lowercase().chars().collect();

    let found = if needle.is_empty() {
        None
    } else {
        lower.windows(needle.len()).position(|w| w == needle.as_slice())
    };
    let Some(at) = found else {
        return chars.iter().take(context * 2).collect();
    };

    let match_start = origin[at];
    let match_end = origin[at + needle.len() - 1] + 1;
    let start = match_start.saturating_sub(context);
    let end = (match_end + context).min(chars.len());

    let mut out = String::new();
    if start > 0 {
        out.push_str("...");
    }
    out.extend(&chars[start..end]);
    if end < chars.len() {
        out.push_str("...");
    }
    out
}

/// HTML-escape `text`, wrapping case-insensitive literal matches of `query`
/// in `<mark>`.
#[must_use]
pub fn highlight(text: &str, query: &str) -> String {
    let query = query.trim();
    if query.is_empty() {
        return escape_html(text);
    }
    let Ok(pattern) = RegexBuilder::new(&regex::escape(query))
        .case_insensitive(true)
        .build()
    else {
        return escape_html(text);
    };

    let mut out = String::with_capacity(text.len() + 16);
    let mut last = 0;
    for m in pattern.find_iter(text) {
        out.push_str(&escape_html(&text[last..m.start()]));
        out.push_str("<mark>");
        out.push_str(&escape_html(m.as_str()));
        out.push_str("</mark>");
        last = m.end();
    }
    out.push_str(&escape_html(&text[last..]));
    out
}
