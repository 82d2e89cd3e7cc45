use std::sync::Arc;
use std::path::Path;
use std::{fs, fmt};

use rustc_hash::FxHashMap;

use crate::error::Result;

#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct EntryId(pub(crate) usize);

/// Every file and directory beneath a root, in sorted walk order.
///
/// Directories whose names begin with `.` are pruned while walking: neither
/// they nor anything beneath them appear in the tree. The root itself is never
/// pruned.
#[derive(Debug)]
pub struct FsTree {
    entries: Vec<Entry>,
    map: FxHashMap<Arc<Path>, EntryId>,
}

#[derive(Debug)]
pub struct Entry {
    pub id: EntryId,
    pub path: Arc<Path>,
    pub file_name: String,
    pub file_type: fs::FileType,
    pub parent: Option<EntryId>,
    pub children: Vec<EntryId>,
    pub depth: usize,
}

/// Returns `true` if `file_name` names a hidden file or directory.
pub fn is_hidden(file_name: &str) -> bool {
    file_name.starts_with('.')
}

impl FsTree {
    fn new() -> Self {
        Self {
            map: FxHashMap::default(),
            entries: vec![],
        }
    }

    pub fn build<P: AsRef<Path>>(root: P) -> Result<Self> {
        use jwalk::WalkDir;

        let root = root.as_ref();
        let walker = WalkDir::new(root)
            .sort(true)
            .skip_hidden(false)
            .follow_links(true)
            .process_read_dir(|_, _, _, children| {
                children.retain(|child| match child {
                    Ok(e) => !(e.file_type.is_dir() && is_hidden(&e.file_name.to_string_lossy())),
                    Err(_) => true,
                })
            });

        let mut tree = FsTree::new();
        for entry in walker {
            match entry {
                Ok(entry) => { tree.insert(entry); }
                Err(e) => tracing::warn!("skipping unreadable path: {e}"),
            }
        }

        if tree.entries.is_empty() {
            return err! {
                "file system tree discovery yielded zero entries",
                "search root" => root.display(),
            }
        }

        Ok(tree)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn root(&self) -> &Entry {
        &self[self.root_id()]
    }

    pub fn root_id(&self) -> EntryId {
        EntryId(0)
    }

    #[inline]
    pub fn get<P: AsRef<Path>>(&self, path: P) -> Option<&Entry> {
        let full_path = self.root().path.join(path.as_ref());
        self.map.get(&*full_path).map(|id| &self[*id])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter()
    }

    /// Every regular file in the tree, in walk order.
    pub fn files(&self) -> impl Iterator<Item = &Entry> {
        self.iter().filter(|e| e.file_type.is_file())
    }

    fn insert(&mut self, entry: jwalk::DirEntry<((), ())>) -> EntryId {
        let path: Arc<Path> = Arc::from(entry.path().into_boxed_path());
        let entry = Entry {
            id: EntryId(self.entries.len()),
            file_type: entry.file_type,
            file_name: entry.file_name.to_string_lossy().into_owned(),
            parent: self.map.get(&*entry.parent_path).cloned(),
            children: vec![],
            depth: entry.depth,
            path,
        };

        self.map.insert(entry.path.clone(), entry.id);
        if let Some(parent) = entry.parent {
            self.entries[parent.0].children.push(entry.id);
        }

        let id = entry.id;
        self.entries.push(entry);
        id
    }
}

impl Entry {
    /// File name without the extension.
    pub fn file_stem(&self) -> &str {
        match self.file_name.rsplit_once('.') {
            Some((left, _)) => left,
            None => &self.file_name,
        }
    }

    /// The final extension, if any.
    pub fn file_ext(&self) -> Option<&str> {
        self.file_name.rsplit_once('.').map(|(_, right)| right)
    }

    /// Path relative to `other`. `other` must be an ancestor of `self`.
    pub fn path_relative_to(&self, other: &Entry) -> Option<&Path> {
        self.path.strip_prefix(&other.path).ok()
    }
}

impl std::ops::Index<EntryId> for FsTree {
    type Output = Entry;

    fn index(&self, index: EntryId) -> &Self::Output {
        &self.entries[index.0]
    }
}

impl fmt::Debug for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
