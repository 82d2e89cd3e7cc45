use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use derive_more::Debug;

use crate::error::{Chainable, Result};
use crate::fstree::{Entry, FsTree};
use crate::index::{self, Index, Stats};
use crate::record::{Category, FilePath, Record};
use crate::value::FileFormat;

/// A record file that could not be loaded.
#[derive(Debug, Clone, PartialEq)]
#[debug("{path:?}: {message}")]
pub struct Diagnostic {
    pub path: PathBuf,
    pub message: String,
}

/// Every record found beneath a source root, in walk order.
///
/// A catalog is a snapshot: it is never updated after loading. Callers that
/// need fresh data load a new one.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    #[debug(ignore)]
    pub root: Option<PathBuf>,
    pub records: Vec<Arc<Record>>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Catalog {
    /// Loads every record file beneath `root`.
    ///
    /// Loading never fails. Files that can't be read or parsed, or that don't
    /// contain a mapping, are logged, recorded in [`Catalog::diagnostics`],
    /// and skipped. A missing root yields an empty catalog.
    pub fn load<P: AsRef<Path>>(root: P) -> Catalog {
        let root = root.as_ref();
        let mut catalog = Catalog { root: Some(root.to_path_buf()), ..Catalog::default() };
        let tree = match FsTree::build(root) {
            Ok(tree) => tree,
            Err(e) => {
                tracing::warn!(root = %root.display(), "record source unavailable: {}", e.message());
                return catalog;
            }
        };

        for entry in tree.files() {
            let Some(format) = entry.file_ext().and_then(FileFormat::from_ext) else {
                continue;
            };

            match load_record(&tree, entry, format) {
                Ok(record) => catalog.records.push(Arc::new(record)),
                Err(e) => {
                    tracing::warn!(path = %entry.path.display(), "skipping record: {e}");
                    catalog.diagnostics.push(Diagnostic {
                        path: entry.path.to_path_buf(),
                        message: e.to_string(),
                    });
                }
            }
        }

        tracing::debug!(
            root = %root.display(),
            records = catalog.records.len(),
            rejected = catalog.diagnostics.len(),
            "loaded record source"
        );

        catalog
    }

    /// A catalog over records that were already loaded.
    pub fn from_records<I, R>(records: I) -> Catalog
        where I: IntoIterator<Item = R>, R: Into<Arc<Record>>
    {
        Catalog {
            records: records.into_iter().map(Into::into).collect(),
            ..Catalog::default()
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn by_category(&self) -> Index {
        index::by_category(&self.records)
    }

    pub fn by_primary_tag(&self) -> Index {
        index::by_primary_tag(&self.records)
    }

    pub fn stats(&self) -> Stats {
        index::stats(&self.records)
    }

    /// The first record, in load order, whose `name` is exactly `name`.
    pub fn find(&self, name: &str) -> Option<&Arc<Record>> {
        self.records.iter().find(|r| r.name().as_deref() == Some(name))
    }
}

fn load_record(tree: &FsTree, entry: &Entry, format: FileFormat) -> Result<Record> {
    let value = format.read(&*entry.path)
        .chain_with(|| error!("record file is not valid", "format" => format!("{format:?}")))?;

    let kind = value.kind();
    let mut record = Record::try_from(value)
        .map_err(|_| error!(format!("expected a mapping at the top level, found {kind}")))?;

    let relative = entry.path_relative_to(tree.root())
        .map(|path| path.components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/"))
        .unwrap_or_else(|| entry.file_name.clone());

    let category = entry.parent
        .map(|id| tree[id].file_name.as_str())
        .unwrap_or_default();

    record.insert(FilePath, relative);
    record.insert(Category, category);
    Ok(record)
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.message)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::record::Name;

    fn source(files: &[(&str, &str)]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for (path, contents) in files {
            let path = dir.path().join(path);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, contents).unwrap();
        }

        dir
    }

    #[test]
    fn scalars_are_rejected_with_a_diagnostic() {
        let dir = source(&[
            ("atmosphere/air_temperature.yml", "name: air_temperature\nunit: K\n"),
            ("atmosphere/broken.yml", "just a string\n"),
        ]);

        let catalog = Catalog::load(dir.path());
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.diagnostics.len(), 1);
        assert!(catalog.diagnostics[0].path.ends_with("atmosphere/broken.yml"));
        assert!(catalog.diagnostics[0].message.contains("mapping"));
    }

    #[test]
    fn provenance_is_injected() {
        let dir = source(&[
            ("ocean/surface/sst.yaml", "name: sea_surface_temperature\n"),
            ("top.json", r#"{"name": "top"}"#),
        ]);

        let catalog = Catalog::load(dir.path());
        let sst = catalog.find("sea_surface_temperature").unwrap();
        assert_eq!(sst.text(Category).as_deref(), Some("surface"));
        assert_eq!(sst.text(FilePath).as_deref(), Some("ocean/surface/sst.yaml"));

        let top = catalog.find("top").unwrap();
        let root_name = dir.path().file_name().unwrap().to_string_lossy();
        assert_eq!(top.text(Category).as_deref(), Some(&*root_name));
        assert_eq!(top.text(FilePath).as_deref(), Some("top.json"));
    }

    #[test]
    fn malformed_and_foreign_files() {
        let dir = source(&[
            ("a/good.toml", "name = \"from_toml\"\n"),
            ("a/bad.yml", "name: [unclosed\n"),
            ("a/empty.yml", ""),
            ("a/list.json", "[1, 2]"),
            ("a/README.md", "# not a record"),
            (".hidden/secret.yml", "name: secret\n"),
        ]);

        let catalog = Catalog::load(dir.path());
        let names: Vec<_> = catalog.records.iter().filter_map(|r| r.text(Name)).collect();
        assert_eq!(names, vec!["from_toml"]);
        assert_eq!(catalog.diagnostics.len(), 3);
    }

    #[test]
    fn missing_root_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = Catalog::load(dir.path().join("standard_names"));
        assert!(catalog.is_empty());
        assert!(catalog.diagnostics.is_empty());
    }

    #[test]
    fn lookups_take_the_first_match() {
        let catalog = Catalog::from_records([
            record!("name" => "dup", "unit" => "K"),
            record!("name" => "dup", "unit" => "m"),
        ]);

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.find("dup").unwrap().text(crate::record::Unit).as_deref(), Some("K"));
        assert!(catalog.find("nonexistent").is_none());
    }
}
