//! CLI command implementations.

pub(crate) mod open;
pub(crate) mod prefs;
pub(crate) mod search;
pub(crate) mod step;
pub(crate) mod tree;

pub(crate) use open::OpenArgs;
pub(crate) use prefs::PrefsArgs;
pub(crate) use search::SearchArgs;
pub(crate) use step::step;
pub(crate) use tree::TreeArgs;
