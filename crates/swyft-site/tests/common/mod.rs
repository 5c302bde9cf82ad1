//! Portal fixture shared by the integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use swyft_prefs::{MemoryStore, Preferences};
use swyft_site::{Site, SiteOptions};
use swyft_storage::MockSource;

pub const ROOT: &str = r#"{"sections": {
    "homepage": {"label": "Home", "file": "data/home.json"},
    "java": {"label": "Java", "file": "data/java/manifest.json"},
    "python": {
        "label": "Python",
        "groups": [{"id": "py-start", "label": "Getting started", "items": [
            {"id": "py-basics", "label": "Basics", "file": "data/python/basics.json"},
            {"id": "py-broken", "label": "Broken", "file": "data/python/broken.json"}
        ]}]
    },
    "cpp": {
        "label": "C++",
        "path": "c-plus-plus",
        "intro": {"id": "cpp-intro", "label": "Overview", "file": "data/cpp/intro.json"}
    },
    "rust": {"label": "Rust", "file": "data/rust/manifest.json"},
    "retired": {"label": "Retired", "file": "data/retired.json"}
}}"#;

pub const JAVA: &str = r#"{
    "intro": {"id": "java-intro", "label": "Introduction", "file": "data/java/intro.json"},
    "groups": [{
        "id": "basics",
        "label": "Basics",
        "items": [
            {"id": "vars", "label": "Variables", "file": "data/java/vars.json", "default": true},
            {"id": "loops", "label": "Loops", "file": "data/java/loops.json"}
        ],
        "children": [{
            "id": "advanced",
            "label": "Advanced",
            "children": [{
                "id": "generics-group",
                "label": "Generics",
                "items": [{"id": "deep", "label": "Deep dive", "file": "data/java/deep.json"}]
            }]
        }]
    }]
}"#;

pub fn source() -> MockSource {
    MockSource::new()
        .with_document("data/config/config.json", ROOT)
        .with_document(
            "data/home.json",
            r#"{"title": "Welcome", "sections": [{"type": "text", "content": "Pick a language."}]}"#,
        )
        .with_document("data/java/manifest.json", JAVA)
        .with_document(
            "data/java/intro.json",
            r#"{"title": "Java Introduction", "sections": [
                {"type": "text", "content": "Java runs on the JVM."}
            ]}"#,
        )
        .with_document(
            "data/java/vars.json",
            r#"{"title": "Variables", "sections": [
                {"type": "text", "title": "Declaring", "content": "Every variable has a type."}
            ]}"#,
        )
        .with_document(
            "data/java/loops.json",
            r#"{"title": "Loops", "sections": [
                {"type": "text", "title": "Loop basics", "content": "Loops repeat code; counters are variables."},
                {"type": "text", "title": "Loop exits", "content": "Use break to leave."},
                {"type": "code", "code": "// loop three times\nfor (int i = 0; i < 3; i++) {}", "language": "java"},
                {"type": "list", "items": ["while loop", "for loop", "do-while loop"]}
            ]}"#,
        )
        .with_document(
            "data/java/deep.json",
            r#"{"title": "Generics Deep Dive", "sections": [
                {"type": "text", "content": "Type erasure removes generic types at runtime."}
            ]}"#,
        )
        .with_document(
            "data/python/basics.json",
            r#"{"title": "Python Basics", "sections": [
                {"type": "text", "content": "Python has a for loop too."}
            ]}"#,
        )
        .with_failure("data/python/broken.json")
        .with_document(
            "data/cpp/intro.json",
            r#"{"title": "C++ Overview", "sections": [
                {"type": "text", "content": "Learn C++. It compiles to native code."}
            ]}"#,
        )
        .with_document(
            "data/rust/manifest.json",
            r#"{"intro": {"id": "rust-intro", "label": "Ownership", "file": "data/rust/intro.json"}}"#,
        )
        .with_document(
            "data/rust/intro.json",
            r#"{"title": "Ownership", "sections": [
                {"type": "text", "content": "Every value has a single owner."}
            ]}"#,
        )
}

pub fn site(source: Arc<MockSource>) -> Site {
    site_with_prefs(source, Preferences::new(Arc::new(MemoryStore::new())))
}

pub fn site_with_prefs(source: Arc<MockSource>, prefs: Preferences) -> Site {
    Site::new(source, SiteOptions::default(), prefs)
}
