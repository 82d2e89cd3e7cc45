pub mod minijinja;

use std::fmt::Debug;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{Chainable, Result};
use crate::render::DEFAULT_OVERVIEW;

pub use self::minijinja::MacroEngine;

/// Where template functions find their records.
///
/// Nothing loaded from the source outlives a single template function call:
/// every call walks `root` again.
#[derive(Debug, Clone)]
pub struct RecordSource {
    pub root: PathBuf,
    /// Document that category link lists point into.
    pub overview: String,
}

impl RecordSource {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        RecordSource { root: root.into(), overview: DEFAULT_OVERVIEW.into() }
    }

    pub fn with_overview<S: Into<String>>(mut self, overview: S) -> Self {
        self.overview = overview.into();
        self
    }
}

pub trait EngineInit {
    type Engine: Engine + 'static;

    fn init<G: Serialize>(source: RecordSource, globals: G) -> Self::Engine;
}

pub trait Engine: Send + Sync + Debug {
    /// Renders `template_str`. `name`, if given, is used in error messages
    /// and decides auto-escaping by extension.
    fn render_str(&self, name: Option<&str>, template_str: &str) -> Result<String>;

    /// Reads and renders the template at `path`.
    fn render_file(&self, path: &Path) -> Result<String> {
        let template = std::fs::read_to_string(path)
            .chain_with(|| error!("failed to read template", "path" => path.display()))?;

        let name = path.file_name().map(|n| n.to_string_lossy());
        self.render_str(name.as_deref(), &template)
    }
}
