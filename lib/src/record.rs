use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::value::{Dict, Value};

/// A typed, named record field.
pub trait MetaKey: 'static {
    const KEY: &'static str;

    type Value: TryFrom<Value> + Into<Value> + fmt::Debug;
}

#[macro_export]
macro_rules! define_meta_key {
    ($($(#[$attr:meta])* $v:vis $T:ident : $key:literal => $V:ty),+ $(,)?) => {
        $(
            $(#[$attr])*
            #[derive(Debug, Clone, Copy)]
            $v struct $T;

            impl $crate::record::MetaKey for $T {
                const KEY: &'static str = $key;
                type Value = $V;
            }
        )+
    }
}

define_meta_key! {
    /// The identifier of a standard name. Used as the sort and lookup key.
    pub Name : "name" => Arc<str>,
    pub Unit : "unit" => Arc<str>,
    pub Description : "description" => Arc<str>,
    /// Free-form text, possibly containing math and list markup.
    pub Documentation : "documentation" => Arc<str>,
    /// Classification tags. The first one is the primary tag.
    pub Tags : "tags" => Vec<Arc<str>>,
    pub Status : "status" => Arc<str>,
    /// Injected by the loader: name of the directory the record was found in.
    pub Category : "_category" => Arc<str>,
    /// Injected by the loader: path of the record relative to the source root.
    pub FilePath : "_file_path" => Arc<str>,
}

/// A single loaded record: a mapping from field names to values.
///
/// Every record is known to be a mapping; nothing else is guaranteed. All the
/// fields above are optional and looked up on use.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: Dict,
}

impl Record {
    pub fn new() -> Self {
        Record::default()
    }

    #[inline(always)]
    pub fn get_raw(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    #[inline]
    pub fn get<K: MetaKey>(&self, _: K) -> Option<Result<K::Value, Value>> {
        let value = self.get_raw(K::KEY)?.clone();
        Some(value.clone().try_into().map_err(|_| value))
    }

    /// The textual form of the scalar field `K`. Null, missing, and
    /// non-scalar values read as `None`.
    pub fn text<K: MetaKey>(&self, _: K) -> Option<Cow<'_, str>> {
        self.get_raw(K::KEY)?.to_text()
    }

    /// Like [`Record::text()`] but also treats empty strings as absent.
    pub fn non_empty<K: MetaKey>(&self, key: K) -> Option<Cow<'_, str>> {
        self.text(key).filter(|s| !s.is_empty())
    }

    #[inline(always)]
    pub fn contains<K: MetaKey>(&self, _: K) -> bool {
        self.fields.contains_key(K::KEY)
    }

    pub fn insert<K, V>(&mut self, _: K, value: V) -> Option<Value>
        where K: MetaKey, V: Into<K::Value>
    {
        self.insert_raw(K::KEY, value.into().into())
    }

    pub fn insert_raw<K, V>(&mut self, key: K, value: V) -> Option<Value>
        where K: Into<Arc<str>>, V: Into<Value>
    {
        self.fields.insert(key.into(), value.into())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> &Dict {
        &self.fields
    }

    /// The record's `name`, if it has one.
    pub fn name(&self) -> Option<Cow<'_, str>> {
        self.text(Name)
    }

    /// The key records sort by: the name, or `""` when there isn't one.
    pub fn sort_key(&self) -> Cow<'_, str> {
        self.name().unwrap_or(Cow::Borrowed(""))
    }

    /// The record's category, `"unknown"` when it has none.
    pub fn category(&self) -> Cow<'_, str> {
        self.text(Category).unwrap_or(Cow::Borrowed("unknown"))
    }

    /// The record's tags in order. A lone scalar counts as a single tag.
    pub fn tags(&self) -> Vec<Cow<'_, str>> {
        match self.get_raw(<Tags as MetaKey>::KEY) {
            Some(Value::Array(tags)) => tags.iter().filter_map(|t| t.to_text()).collect(),
            Some(scalar) => scalar.to_text().into_iter().collect(),
            None => vec![],
        }
    }

    /// The first tag, which decides the record's classification. A first tag
    /// that isn't a scalar leaves the record without one; later tags never
    /// take its place.
    pub fn primary_tag(&self) -> Option<Cow<'_, str>> {
        match self.get_raw(<Tags as MetaKey>::KEY)? {
            Value::Array(tags) => tags.first()?.to_text(),
            scalar => scalar.to_text(),
        }
    }
}

impl AsRef<Record> for Record {
    fn as_ref(&self) -> &Record {
        self
    }
}

impl TryFrom<Value> for Record {
    type Error = Value;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let dict = value.into_dict()?;
        let fields = Arc::try_unwrap(dict).unwrap_or_else(|arc| (*arc).clone());
        Ok(Record { fields })
    }
}

impl<K: Into<Arc<str>>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let fields = iter.into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();

        Record { fields }
    }
}

/// Builds a [`Record`] from `key => value` pairs.
#[doc(hidden)]
#[macro_export]
macro_rules! record {
    ($($key:expr => $value:expr),* $(,)?) => ({
        #[allow(unused_mut)]
        let mut record = $crate::record::Record::new();
        $(record.insert_raw($key, $value);)*
        record
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_and_textual_access() {
        let record = record! {
            "name" => "air_temperature",
            "unit" => "K",
            "tags" => vec!["atmosphere", "temperature"],
            "status" => Value::Null,
            "priority" => 3,
        };

        assert_eq!(record.get(Name), Some(Ok(Arc::from("air_temperature"))));
        assert_eq!(record.text(Unit).as_deref(), Some("K"));
        assert_eq!(record.text(Status), None);
        assert_eq!(record.get_raw("priority").and_then(|v| v.to_text()).as_deref(), Some("3"));
        assert_eq!(record.primary_tag().as_deref(), Some("atmosphere"));
        assert!(record.get(Tags).unwrap().is_ok());
        assert_eq!(record.category(), "unknown");
        assert_eq!(record.sort_key(), "air_temperature");
    }

    #[test]
    fn missing_and_odd_tags() {
        assert!(record!().tags().is_empty());
        assert!(record!("tags" => Vec::<Value>::new()).primary_tag().is_none());
        assert_eq!(record!("tags" => "ocean").tags(), vec!["ocean"]);
        assert!(record!("tags" => Value::Null).tags().is_empty());

        let record = record!("tags" => vec![Value::Null, Value::from("ocean")]);
        assert_eq!(record.tags(), vec!["ocean"]);
        assert!(record.primary_tag().is_none());
    }

    #[test]
    fn non_mappings_are_not_records() {
        assert!(Record::try_from(Value::from("scalar")).is_err());
        assert!(Record::try_from(Value::from(vec![1, 2])).is_err());

        let dict: Dict = [(Arc::from("name"), Value::from("x"))].into_iter().collect();
        let record = Record::try_from(Value::from(Arc::new(dict))).unwrap();
        assert_eq!(record.name().as_deref(), Some("x"));
    }
}
