use std::path::{Path, PathBuf};
use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use lexicon::error::Result;
use lexicon::render::DEFAULT_OVERVIEW;
use lexicon::templating::{Engine, EngineInit, RecordSource};
use lexicon::value::{Format, Toml, Value};

#[derive(Debug)]
pub struct Config {
    pub project: PathBuf,
    pub engine: Arc<dyn Engine>,
    pub settings: Settings,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Record source, relative to the project.
    pub names_dir: PathBuf,
    pub docs_dir: PathBuf,
    /// Generated tag pages, relative to `docs_dir`.
    pub tags_dir: PathBuf,
    /// The file whose `nav:` block `scaffold` rewrites.
    pub site_config: PathBuf,
    pub overview: String,
    /// Everything else. Available to templates as `G`.
    #[serde(flatten)]
    pub globals: FxHashMap<String, Value>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            names_dir: "standard_names".into(),
            docs_dir: "docs".into(),
            tags_dir: "tags".into(),
            site_config: "mkdocs.yml".into(),
            overview: DEFAULT_OVERVIEW.into(),
            globals: FxHashMap::default(),
        }
    }
}

impl Config {
    pub fn discover<E: EngineInit>(project: &Path) -> Result<Self> {
        let config_file = project.join(crate::CONFIG_FILE);
        let settings: Settings = match config_file.is_file() {
            true => Toml::read(&config_file)?,
            false => Settings::default(),
        };

        let source = RecordSource::new(project.join(&settings.names_dir))
            .with_overview(settings.overview.clone());

        let engine = Arc::new(E::init(source, &settings.globals));
        Ok(Config { project: project.to_path_buf(), engine, settings })
    }

    pub fn names_dir(&self) -> PathBuf {
        self.project.join(&self.settings.names_dir)
    }

    pub fn tags_dir(&self) -> PathBuf {
        self.project.join(&self.settings.docs_dir).join(&self.settings.tags_dir)
    }

    pub fn site_config(&self) -> PathBuf {
        self.project.join(&self.settings.site_config)
    }
}
