//! End-to-end navigation over a mock portal.

mod common;

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use swyft_prefs::{MemoryStore, Preferences};
use swyft_site::{Direction, NavOutcome, Route, SearchOutcome, SiteError};

fn page_tab(outcome: &NavOutcome) -> String {
    outcome
        .view()
        .and_then(|view| view.page.as_ref())
        .map(|page| page.tab_id.clone())
        .unwrap_or_default()
}

#[tokio::test]
async fn test_repeat_navigation_does_no_io() {
    let source = Arc::new(common::source());
    let site = common::site(Arc::clone(&source));

    let first = site.navigator().navigate_to_tab("loops").await.unwrap();
    let fetches = source.total_fetches();
    let second = site.navigator().navigate_to_tab("loops").await.unwrap();

    assert_eq!(page_tab(&first), "loops");
    assert_eq!(page_tab(&second), "loops");
    assert_eq!(source.total_fetches(), fetches);
    assert_eq!(source.fetch_count("data/java/loops.json"), 1);
}

#[tokio::test]
async fn test_navigation_loads_whole_section() {
    let source = Arc::new(common::source());
    let site = common::site(Arc::clone(&source));

    site.navigator().navigate_to_tab("vars").await.unwrap();

    assert_eq!(site.index().tabs(), vec!["java-intro", "vars", "loops", "deep"]);
    assert_eq!(source.fetch_count("data/python/basics.json"), 0);
}

#[tokio::test]
async fn test_deeply_nested_tab_is_reachable() {
    let site = common::site(Arc::new(common::source()));

    site.navigator().navigate_to_tab("deep").await.unwrap();

    let view = site.navigator().view();
    assert_eq!(view.page.as_ref().unwrap().title, "Generics Deep Dive");
    assert!(view.sidebar.as_ref().unwrap().tab_ids().contains(&"deep"));
    let record = site.index().get("deep").unwrap();
    assert_eq!(record.group_label.as_deref(), Some("Generics"));
}

#[tokio::test]
async fn test_later_navigation_wins() {
    let source = Arc::new(common::source());
    let gate = source.gate("data/java/loops.json");
    let site = Arc::new(common::site(Arc::clone(&source)));

    let slow = {
        let site = Arc::clone(&site);
        tokio::spawn(async move { site.navigator().navigate_to_tab("loops").await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;

    let fast = site.navigator().navigate_to_tab("py-basics").await.unwrap();
    assert_eq!(page_tab(&fast), "py-basics");

    gate.open();
    let slow = slow.await.unwrap().unwrap();

    assert!(matches!(slow, NavOutcome::Superseded));
    let state = site.navigator().state();
    assert_eq!(state.tab_id.as_deref(), Some("py-basics"));
    assert_eq!(state.section_id.as_deref(), Some("python"));
    assert_eq!(
        site.navigator().view().page.as_ref().unwrap().tab_id,
        "py-basics"
    );
    // The slow section still finished loading.
    assert!(site.index().loaded("loops").is_some());
}

#[tokio::test]
async fn test_later_navigation_wins_over_slow_section_url() {
    let source = Arc::new(common::source());
    let site = Arc::new(common::site(Arc::clone(&source)));
    site.navigator().navigate_to_tab("vars").await.unwrap();
    let gate = source.gate("data/rust/manifest.json");

    let slow = {
        let site = Arc::clone(&site);
        tokio::spawn(async move { site.navigator().navigate_url("/rust").await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;

    let fast = site.navigator().navigate_to_tab("loops").await.unwrap();
    assert_eq!(page_tab(&fast), "loops");

    gate.open();
    let slow = slow.await.unwrap().unwrap();

    assert!(matches!(slow, NavOutcome::Superseded));
    let state = site.navigator().state();
    assert_eq!(state.tab_id.as_deref(), Some("loops"));
    assert_eq!(state.section_id.as_deref(), Some("java"));
    assert_eq!(site.prefs().last_opened_tab().as_deref(), Some("loops"));
}

#[tokio::test]
async fn test_later_navigation_wins_over_slow_section() {
    let source = Arc::new(common::source());
    let site = Arc::new(common::site(Arc::clone(&source)));
    site.navigator().navigate_to_tab("vars").await.unwrap();
    let gate = source.gate("data/rust/manifest.json");

    let slow = {
        let site = Arc::clone(&site);
        tokio::spawn(async move { site.navigator().handle_section_navigation("rust").await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;

    site.navigator().navigate_to_tab("loops").await.unwrap();
    gate.open();

    assert!(matches!(slow.await.unwrap().unwrap(), NavOutcome::Superseded));
    assert_eq!(site.navigator().state().tab_id.as_deref(), Some("loops"));
}

#[tokio::test]
async fn test_failure_sets_banner_and_keeps_page() {
    let site = common::site(Arc::new(common::source()));
    site.navigator().navigate_to_tab("vars").await.unwrap();

    let err = site.navigator().navigate_to_tab("py-broken").await.unwrap_err();

    assert!(matches!(err, SiteError::Network { .. }));
    let view = site.navigator().view();
    assert!(view.banner.as_ref().unwrap().contains("py-broken"));
    assert_eq!(view.page.as_ref().unwrap().tab_id, "vars");
    assert_eq!(site.navigator().state().tab_id.as_deref(), Some("vars"));

    site.navigator().navigate_to_tab("loops").await.unwrap();
    assert_eq!(site.navigator().view().banner, None);
}

#[tokio::test]
async fn test_unknown_section_manifest_is_fatal() {
    let site = common::site(Arc::new(common::source()));

    let err = site
        .navigator()
        .handle_section_navigation("retired")
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    assert!(site.navigator().view().banner.is_some());
}

#[tokio::test]
async fn test_next_and_previous_wrap() {
    let site = common::site(Arc::new(common::source()));
    let navigator = site.navigator();
    navigator.navigate_to_tab("java-intro").await.unwrap();

    let previous = navigator.navigate_relative(Direction::Previous).await.unwrap();
    assert_eq!(page_tab(&previous), "deep");

    let next = navigator.navigate_relative(Direction::Next).await.unwrap();
    assert_eq!(page_tab(&next), "java-intro");

    let next = navigator.navigate_relative(Direction::Next).await.unwrap();
    assert_eq!(page_tab(&next), "vars");
}

#[tokio::test]
async fn test_relative_navigation_needs_open_tab() {
    let site = common::site(Arc::new(common::source()));

    let err = site
        .navigator()
        .navigate_relative(Direction::Next)
        .await
        .unwrap_err();

    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_start_restores_last_tab() {
    let prefs = Preferences::new(Arc::new(MemoryStore::new()));
    prefs.set_last_opened_tab("loops").unwrap();
    let site = common::site_with_prefs(Arc::new(common::source()), prefs);

    let outcome = site.navigator().start(Route::Home).await.unwrap();

    assert_eq!(page_tab(&outcome), "loops");
}

#[tokio::test]
async fn test_start_falls_back_to_default_tab() {
    let prefs = Preferences::new(Arc::new(MemoryStore::new()));
    prefs.set_last_opened_tab("removed-page").unwrap();
    let site = common::site_with_prefs(Arc::new(common::source()), prefs.clone());

    let outcome = site.navigator().start(Route::Home).await.unwrap();

    assert_eq!(page_tab(&outcome), "vars");
    assert_eq!(site.navigator().view().banner, None);
    assert_eq!(prefs.last_opened_tab().as_deref(), Some("vars"));
}

#[tokio::test]
async fn test_navigate_url_forms() {
    let site = common::site(Arc::new(common::source()));
    let navigator = site.navigator();

    let redirected = navigator
        .navigate_url("https://example.github.io/?redirect=%2Fpython%2Fpy-basics")
        .await
        .unwrap();
    assert_eq!(page_tab(&redirected), "py-basics");

    let hashed = navigator.navigate_url("/#loops").await.unwrap();
    assert_eq!(page_tab(&hashed), "loops");
    assert_eq!(navigator.view().url.as_deref(), Some("/java/loops"));

    let section = navigator.navigate_url("/c-plus-plus").await.unwrap();
    assert_eq!(page_tab(&section), "cpp-intro");
    assert_eq!(navigator.view().url.as_deref(), Some("/c-plus-plus/cpp-intro"));

    let home = navigator.navigate_url("/").await.unwrap();
    assert_eq!(page_tab(&home), "homepage");
    assert_eq!(navigator.view().url.as_deref(), Some("/"));
}

#[tokio::test]
async fn test_section_change_rebuilds_sidebar() {
    let site = common::site(Arc::new(common::source()));
    let navigator = site.navigator();

    navigator.navigate_to_tab("vars").await.unwrap();
    let java = navigator.view().sidebar.clone().unwrap();
    navigator.navigate_to_tab("loops").await.unwrap();
    let still_java = navigator.view().sidebar.clone().unwrap();
    navigator.navigate_to_tab("py-basics").await.unwrap();
    let python = navigator.view().sidebar.clone().unwrap();

    assert!(Arc::ptr_eq(&java, &still_java));
    assert_eq!(python.section_id, "python");
}

#[tokio::test]
async fn test_search_results_follow_navigation() {
    let site = common::site(Arc::new(common::source()));
    let navigator = site.navigator();

    let outcome = navigator.search("  Loop ").await.unwrap();
    assert!(matches!(outcome, SearchOutcome::Completed(_)));
    assert_eq!(site.prefs().search_query().as_deref(), Some("Loop"));

    navigator.navigate_to_tab("vars").await.unwrap();

    let view = navigator.view();
    assert_eq!(view.search.as_ref().unwrap().query(), "loop");

    navigator.search("").await.unwrap();
    assert!(navigator.view().search.is_none());
    assert_eq!(site.prefs().search_query(), None);
}
