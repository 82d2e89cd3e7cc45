use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use crate::record::Record;

/// Records grouped under a string key. Keys iterate in sorted order; records
/// within a group keep the order they were given in.
pub type Index = BTreeMap<Arc<str>, Vec<Arc<Record>>>;

/// Summary counts over a record collection, with the groupings they came from.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Stats {
    pub total_names: usize,
    pub total_categories: usize,
    pub total_tags: usize,
    pub categories: Index,
    pub tags: Index,
}

/// Groups `records` by `_category`, using `"unknown"` for records without one.
pub fn by_category(records: &[Arc<Record>]) -> Index {
    let mut index = Index::new();
    for record in records {
        let category = record.category();
        match index.get_mut(&*category) {
            Some(group) => group.push(record.clone()),
            None => { index.insert(category.into(), vec![record.clone()]); }
        }
    }

    index
}

/// Groups `records` by their first tag. Records without tags, or whose first
/// tag isn't a scalar, are left out.
pub fn by_primary_tag(records: &[Arc<Record>]) -> Index {
    let mut index = Index::new();
    for record in records {
        if let Some(tag) = record.primary_tag() {
            index.entry(tag.into()).or_default().push(record.clone());
        }
    }

    index
}

pub fn stats(records: &[Arc<Record>]) -> Stats {
    let categories = by_category(records);
    let tags = by_primary_tag(records);
    Stats {
        total_names: categories.values().map(Vec::len).sum(),
        total_categories: categories.len(),
        total_tags: tags.len(),
        categories,
        tags,
    }
}
