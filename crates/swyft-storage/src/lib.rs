//! Content source abstraction for SwyftNav.
//!
//! This crate provides a [`ContentSource`] trait for fetching manifest and
//! content documents from wherever the portal is hosted. This enables:
//!
//! - **Unit testing** without touching the network or the filesystem
//! - **Backend flexibility** (local directory, static web host)
//! - **Clean separation** between loading logic and I/O
//!
//! # Architecture
//!
//! The crate provides:
//! - [`ContentSource`] trait with an async `fetch()` method
//! - [`FsSource`] serving documents from a local directory
//! - [`HttpSource`] fetching documents from a static web host
//! - [`MockSource`] for testing (behind `mock` feature flag)
//!
//! # Example
//!
//! ```ignore
//! use std::path::PathBuf;
//! use swyft_storage::{ContentSource, FsSource};
//!
//! let source = FsSource::new(PathBuf::from("public"));
//! let manifest = source.fetch("/data/config/config.json").await?;
//! ```

mod fs;
mod http;
#[cfg(feature = "mock")]
mod mock;
mod source;

pub use fs::FsSource;
pub use http::HttpSource;
#[cfg(feature = "mock")]
pub use mock::{Gate, MockSource};
pub use source::{ContentSource, ErrorStatus, SourceError, SourceErrorKind, strip_query};
