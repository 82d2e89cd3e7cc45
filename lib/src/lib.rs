//! Indexing and Markdown rendering for a directory of standard-name records.
//!
//! # Overview
//!
//! A _record source_ is a directory tree of small YAML (or JSON, or TOML)
//! files, each describing one standard name: its `name`, `unit`,
//! `description`, free-form `documentation`, `status`, and a list of `tags`.
//! The directory a record lives in is its _category_; its first tag is its
//! _primary tag_.
//!
//! Processing flows leaf to root:
//!
//!   1. [`Catalog::load()`](catalog::Catalog::load) walks the source and
//!      parses every record file, tagging each record with `_category` and
//!      `_file_path`. Files that don't parse to a mapping become
//!      [`Diagnostic`](catalog::Diagnostic)s rather than errors.
//!
//!   2. The [`index`] functions group records by category and by primary tag,
//!      and summarize both groupings.
//!
//!   3. The [`render`] functions turn records into Markdown: tables, detail
//!      sections, tag badges, and link lists. Documentation fields pass
//!      through the [`normalize`] module on their way in.
//!
//! The [`templating`] module exposes all of the above to minijinja templates,
//! reloading the source on every call so a page always reflects the files as
//! they are.
//!
//! Nothing here fails on bad input. Malformed records are skipped with a
//! diagnostic, missing fields take defaults, and lookups that miss return
//! `None` or a sentinel string.

#[macro_use]
pub mod error;
#[macro_use]
pub mod record;
pub mod value;
pub mod fstree;
pub mod catalog;
pub mod index;
pub mod normalize;
pub mod render;
pub mod templating;

pub use catalog::{Catalog, Diagnostic};
pub use record::Record;

/// This crate's version, or `"dev"` when it was built without package
/// metadata.
pub fn version() -> &'static str {
    option_env!("CARGO_PKG_VERSION").unwrap_or("dev")
}
