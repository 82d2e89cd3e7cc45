use std::sync::Arc;

use minijinja::{context, Environment};
use minijinja::value::Value;
use serde::Serialize;

use crate::catalog::Catalog;
use crate::error::Result;
use crate::templating::{Engine, EngineInit, RecordSource};

/// A minijinja environment exposing the record functions to templates.
///
/// | name                       | kind     | result                          |
/// |----------------------------|----------|---------------------------------|
/// | `load_standard_names()`    | function | every record                    |
/// | `get_categories()`         | function | category => records             |
/// | `get_tags()`               | function | primary tag => records          |
/// | `category_stats()`         | function | totals and both groupings       |
/// | `standard_names_table(items, show_category=false, show_full_description=false)` | function | Markdown table |
/// | `standard_names_details(items)` | function | detail sections            |
/// | `category_details(category)` | function | detail sections of a category |
/// | `category_links()`         | function | bullet list of primary tags     |
/// | `standard_name_detail(name)` | function | the record, or `none`         |
/// | `format_tags(tags)`        | function | tag badges                      |
/// | `format_documentation`     | filter   | normalized documentation        |
/// | `titlecase`                | filter   | `sea-ice` => `Sea Ice`          |
/// | `deslug`                   | filter   | `sea-ice` => `sea ice`          |
/// | `version`                  | global   | crate version or `dev`          |
/// | `G`                        | global   | user-supplied globals           |
#[derive(Debug)]
pub struct MacroEngine {
    env: Environment<'static>,
}

fn init<G: Serialize>(source: RecordSource, globals: G) -> Environment<'static> {
    let source = Arc::new(source);
    let mut env = Environment::new();

    macro_rules! with_catalog {
        ($name:literal, |$catalog:ident, $source:ident $(, $arg:ident : $T:ty)*| $body:expr) => {{
            let $source = source.clone();
            env.add_function($name, move |$($arg: $T),*| {
                let $catalog = Catalog::load(&$source.root);
                #[allow(unused_variables)]
                let $source = &*$source;
                $body
            });
        }};
    }

    with_catalog!("load_standard_names", |catalog, source| {
        Value::from_serializable(&catalog.records)
    });

    with_catalog!("get_categories", |catalog, source| {
        Value::from_serializable(&catalog.by_category())
    });

    with_catalog!("get_tags", |catalog, source| {
        Value::from_serializable(&catalog.by_primary_tag())
    });

    with_catalog!("category_stats", |catalog, source| {
        Value::from_serializable(&catalog.stats())
    });

    with_catalog!("category_details", |catalog, source, category: &str| {
        Value::from_safe_string(crate::render::category_detail_block(&catalog, category))
    });

    with_catalog!("category_links", |catalog, source| {
        Value::from_safe_string(crate::render::category_link_list(&catalog, &source.overview))
    });

    with_catalog!("standard_name_detail", |catalog, source, name: &str| {
        match crate::render::record_detail(&catalog, name) {
            Some(record) => Value::from_serializable(record),
            None => Value::from(()),
        }
    });

    env.add_global("G", Value::from_serializable(&globals));
    env.add_global("version", Value::from(crate::version()));
    env.add_function("standard_names_table", ext::standard_names_table);
    env.add_function("standard_names_details", ext::standard_names_details);
    env.add_function("format_tags", ext::format_tags);
    env.add_filter("format_documentation", ext::format_documentation);
    env.add_filter("titlecase", ext::titlecase);
    env.add_filter("deslug", ext::deslug);
    env
}

impl MacroEngine {
    pub fn environment(&self) -> &Environment<'static> {
        &self.env
    }
}

impl EngineInit for MacroEngine {
    type Engine = Self;

    fn init<G: Serialize>(source: RecordSource, globals: G) -> Self::Engine {
        MacroEngine { env: init(source, globals) }
    }
}

impl Engine for MacroEngine {
    fn render_str(&self, name: Option<&str>, template_str: &str) -> Result<String> {
        let string = match name {
            Some(name) => self.env.render_named_str(name, template_str, context! {})?,
            None => self.env.render_str(template_str, context! {})?,
        };

        Ok(string)
    }
}

mod ext {
    use minijinja::value::{Kwargs, Value, ValueKind};
    use minijinja::Error;
    use serde::Deserialize;

    use crate::record::Record;
    use crate::render::{self, TableOptions};

    /// The records in a template argument: a sequence of mappings or a single
    /// mapping. Undefined and `none` are empty; other values are skipped.
    fn records(items: &Value) -> Vec<Record> {
        let record = |value: Value| match Record::deserialize(value) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::debug!("ignoring non-record template argument: {e}");
                None
            }
        };

        match items.kind() {
            ValueKind::Undefined | ValueKind::None => vec![],
            ValueKind::Map => record(items.clone()).into_iter().collect(),
            _ => match items.try_iter() {
                Ok(iter) => iter.filter_map(record).collect(),
                Err(_) => vec![],
            }
        }
    }

    pub fn standard_names_table(items: Value, kwargs: Kwargs) -> Result<Value, Error> {
        let options = TableOptions {
            show_category: kwargs.get::<Option<bool>>("show_category")?.unwrap_or(false),
            show_full_description: kwargs.get::<Option<bool>>("show_full_description")?
                .unwrap_or(false),
        };

        kwargs.assert_all_used()?;
        Ok(Value::from_safe_string(render::table(&records(&items), options)))
    }

    pub fn standard_names_details(items: Value) -> Value {
        Value::from_safe_string(render::detail_block(&records(&items)))
    }

    pub fn format_tags(tags: Value) -> String {
        let tags: Vec<String> = match tags.kind() {
            ValueKind::Undefined | ValueKind::None => vec![],
            ValueKind::Seq => tags.try_iter()
                .map(|iter| iter.map(|tag| tag.to_string()).collect())
                .unwrap_or_default(),
            _ => vec![tags.to_string()],
        };

        render::tag_badges(&tags)
    }

    pub fn format_documentation(value: Value) -> Value {
        let text = match value.as_str() {
            Some(text) => crate::normalize::normalize(text),
            None if value.is_undefined() || value.is_none() => String::new(),
            None => crate::normalize::normalize(&value.to_string()),
        };

        Value::from_safe_string(text)
    }

    pub fn titlecase(value: &str) -> String {
        render::title_case(value)
    }

    pub fn deslug(value: &str) -> String {
        value.replace('-', " ")
    }
}

impl_error_detail_with_std_error!(minijinja::Error);
