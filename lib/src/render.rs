//! Markdown renderings of records: tables, detail sections, link lists, and
//! tag badges.
//!
//! Every function here is total. Missing fields fall back to defaults, empty
//! inputs render [`NO_RESULTS`], and lookups that miss return `None`. Output
//! depends only on the input, so identical records always render to identical
//! bytes.

use std::borrow::Cow;
use std::fmt::Write;
use std::sync::Arc;

use crate::catalog::Catalog;
use crate::normalize::normalize;
use crate::record::{Description, Documentation, Record, Status, Unit};

/// Rendered in place of a table or detail listing with nothing in it.
pub const NO_RESULTS: &str = "No standard names found.";

/// The document category link lists point into.
pub const DEFAULT_OVERVIEW: &str = "overview.md";

/// Descriptions longer than this are truncated in tables.
const MAX_DESCRIPTION: usize = 80;

const ELLIPSIS: &str = "...";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableOptions {
    /// Adds a Category column linking to the record's tag page.
    pub show_category: bool,
    /// Disables description truncation.
    pub show_full_description: bool,
}

/// Sorts records by name. Records without a name sort first; ties keep their
/// input order.
fn sorted<R: AsRef<Record>>(records: &[R]) -> Vec<&Record> {
    let mut records: Vec<&Record> = records.iter().map(|r| r.as_ref()).collect();
    records.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
    records
}

fn display_name(record: &Record) -> Cow<'_, str> {
    record.name().unwrap_or(Cow::Borrowed("Unknown"))
}

/// Renders `records` as a Markdown table with one row per record, sorted by
/// name.
///
/// ```rust
/// use lexicon::record;
/// use lexicon::render::{table, TableOptions, NO_RESULTS};
///
/// let rows = [record!("name" => "air_temperature", "unit" => "K")];
/// let table = table(&rows, TableOptions::default());
/// assert!(table.contains("| [`air_temperature`](names/air_temperature.md) | K | No description |"));
///
/// let none: [lexicon::record::Record; 0] = [];
/// assert_eq!(lexicon::render::table(&none, TableOptions::default()), NO_RESULTS);
/// ```
pub fn table<R: AsRef<Record>>(records: &[R], options: TableOptions) -> String {
    if records.is_empty() {
        return NO_RESULTS.into();
    }

    let mut headers = vec!["Name", "Unit", "Description"];
    if options.show_category {
        headers.push("Category");
    }

    let mut out = String::with_capacity(128 * (records.len() + 2));
    let _ = writeln!(out, "| {} |", headers.join(" | "));
    let _ = writeln!(out, "|{}|", vec![" --- "; headers.len()].join("|"));

    for record in sorted(records) {
        let name = escape_cell(&display_name(record));
        let unit = record.non_empty(Unit).map_or(Cow::Borrowed("-"), |u| escape_cell(&u).into());
        let description = record.text(Description)
            .map_or(Cow::Borrowed("No description"), |d| escape_cell(&d).into());

        let description = match options.show_full_description {
            true => description,
            false => truncate(description, MAX_DESCRIPTION),
        };

        let _ = write!(out, "| [`{name}`](names/{name}.md) | {unit} | {description} |");
        if options.show_category {
            let category = record.category();
            let target = record.primary_tag().unwrap_or_else(|| category.clone());
            let _ = write!(out, " [{}](tags/{target}.md) |", title_case(&category));
        }

        out.push('\n');
    }

    out
}

/// Makes `text` safe for a table cell: pipes are escaped and line breaks
/// become spaces.
pub fn escape_cell(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 4);
    for c in text.chars() {
        match c {
            '|' => out.push_str("\\|"),
            '\n' => out.push(' '),
            '\r' => {},
            c => out.push(c),
        }
    }

    out
}

/// Truncates `text` to at most `max` characters, replacing the tail with an
/// ellipsis when anything is cut.
///
/// ```rust
/// use lexicon::render::truncate;
///
/// assert_eq!(truncate("short".into(), 80), "short");
/// assert_eq!(truncate("abcdefghij".into(), 8), "abcde...");
/// ```
pub fn truncate(text: Cow<'_, str>, max: usize) -> Cow<'_, str> {
    if text.chars().nth(max).is_none() {
        return text;
    }

    let keep = max.saturating_sub(ELLIPSIS.len());
    let end = text.char_indices().nth(keep).map_or(text.len(), |(i, _)| i);
    Cow::Owned(format!("{}{ELLIPSIS}", &text[..end]))
}

/// Renders one detail section per record, sorted by name.
///
/// Each section holds, in order: a heading with the name, the description,
/// the normalized documentation, the unit, the title-cased status, the tag
/// badges, and a `---` separator. Absent fields are left out entirely; only
/// the tag line is always present.
pub fn detail_block<R: AsRef<Record>>(records: &[R]) -> String {
    if records.is_empty() {
        return NO_RESULTS.into();
    }

    let sections: Vec<String> = sorted(records).into_iter()
        .map(detail_section)
        .collect();

    let mut out = sections.join("\n\n");
    out.push('\n');
    out
}

fn detail_section(record: &Record) -> String {
    let mut parts = vec![format!("### `{}`", display_name(record))];
    if let Some(description) = record.non_empty(Description) {
        parts.push(description.into_owned());
    }

    if let Some(documentation) = record.non_empty(Documentation) {
        let documentation = normalize(&documentation);
        if !documentation.is_empty() {
            parts.push(documentation);
        }
    }

    if let Some(unit) = record.non_empty(Unit) {
        parts.push(format!("**Unit:** `{unit}`"));
    }

    if let Some(status) = record.non_empty(Status) {
        parts.push(format!("**Status:** {}", title_case(&status)));
    }

    parts.push(format!("**Tags:** {}", tag_badges(&record.tags())));
    parts.push("---".into());
    parts.join("\n\n")
}

/// Detail sections for every record in category `category`. An unknown
/// category renders [`NO_RESULTS`].
pub fn category_detail_block(catalog: &Catalog, category: &str) -> String {
    match catalog.by_category().get(category) {
        Some(records) => detail_block(records),
        None => NO_RESULTS.into(),
    }
}

/// Renders tags as comma-separated inline code spans, or `None` when there
/// are no tags.
///
/// ```rust
/// use lexicon::render::tag_badges;
///
/// assert_eq!(tag_badges(&["ocean", "salinity"]), "`ocean`, `salinity`");
/// assert_eq!(tag_badges::<&str>(&[]), "None");
/// ```
pub fn tag_badges<S: AsRef<str>>(tags: &[S]) -> String {
    if tags.is_empty() {
        return "None".into();
    }

    tags.iter()
        .map(|tag| format!("`{}`", tag.as_ref()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// One bullet per primary tag, linking to that tag's section of `overview`
/// and giving its record count.
pub fn category_link_list(catalog: &Catalog, overview: &str) -> String {
    let mut out = String::new();
    for (tag, records) in catalog.by_primary_tag() {
        let title = title_case(&tag);
        let _ = writeln!(out, "- [{title}]({overview}#{}) ({})", anchor(&title), records.len());
    }

    out
}

/// The first record named exactly `name`, if any.
pub fn record_detail<'c>(catalog: &'c Catalog, name: &str) -> Option<&'c Arc<Record>> {
    catalog.find(name)
}

/// Human-readable form of a category or tag: hyphens become spaces and each
/// word is capitalized.
///
/// A word starts after any character that isn't a letter, so digits and
/// apostrophes start new words.
///
/// ```rust
/// use lexicon::render::title_case;
///
/// assert_eq!(title_case("sea-ice"), "Sea Ice");
/// assert_eq!(title_case("OCEAN physics"), "Ocean Physics");
/// assert_eq!(title_case("2d-fields"), "2D Fields");
/// ```
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_word = false;
    for c in text.chars() {
        let c = if c == '-' { ' ' } else { c };
        match (c.is_alphabetic(), in_word) {
            (true, true) => out.extend(c.to_lowercase()),
            (true, false) => out.extend(c.to_uppercase()),
            (false, _) => out.push(c),
        }

        in_word = c.is_alphabetic();
    }

    out
}

/// Link anchor for a heading: lowercased, spaces replaced with hyphens.
pub fn anchor(text: &str) -> String {
    text.to_lowercase().replace(' ', "-")
}

#[cfg(test)]
mod tests {
    use pulldown_cmark::{Event, Options, Parser, Tag};

    use super::*;
    use crate::record::Name;
    use crate::value::Value;

    fn sample() -> Vec<Arc<Record>> {
        vec![
            record! {
                "name" => "sea_surface_temperature",
                "unit" => "K",
                "description" => "Temperature | of the sea\nsurface",
                "tags" => vec!["ocean", "temperature"],
                "_category" => "sea-ice",
            },
            record! {
                "name" => "air_temperature",
                "unit" => "K",
                "description" => "A".repeat(90),
                "tags" => vec!["atmosphere", "temperature"],
                "_category" => "atmosphere",
            },
            record!("unit" => "m", "_category" => "misc"),
        ].into_iter().map(Arc::new).collect()
    }

    /// Cells of each body row of the first table in `markdown`.
    fn parse_rows(markdown: &str) -> Vec<Vec<String>> {
        let (mut rows, mut in_head) = (vec![], false);
        for event in Parser::new_ext(markdown, Options::ENABLE_TABLES) {
            match event {
                Event::Start(Tag::TableHead) => in_head = true,
                Event::End(pulldown_cmark::TagEnd::TableHead) => in_head = false,
                Event::Start(Tag::TableRow) => rows.push(vec![]),
                Event::Start(Tag::TableCell) if !in_head => rows.last_mut().unwrap().push(String::new()),
                Event::Text(text) | Event::Code(text) if !in_head => {
                    if let Some(cell) = rows.last_mut().and_then(|r| r.last_mut()) {
                        cell.push_str(&text);
                    }
                }
                _ => {}
            }
        }

        rows
    }

    #[test]
    fn empty_table_is_the_sentinel() {
        assert_eq!(table::<Record>(&[], TableOptions::default()), NO_RESULTS);
        assert_eq!(detail_block::<Record>(&[]), NO_RESULTS);
    }

    #[test]
    fn table_rows_are_sorted_and_complete() {
        let records = sample();
        let table = table(&records, TableOptions::default());
        let rows = parse_rows(&table);
        assert_eq!(rows.len(), records.len());

        let names: Vec<_> = rows.iter().map(|r| r[0].as_str()).collect();
        assert_eq!(names, vec!["Unknown", "air_temperature", "sea_surface_temperature"]);
        assert!(rows.iter().all(|r| r.len() == 3));
        assert_eq!(rows[0][2], "No description");
    }

    #[test]
    fn only_missing_descriptions_get_the_placeholder() {
        let records = [
            record!("name" => "blank", "description" => ""),
            record!("name" => "null", "description" => Value::Null),
        ];

        let table = table(&records, TableOptions::default());
        assert!(table.contains("| [`blank`](names/blank.md) | - |  |\n"));
        assert!(table.contains("| [`null`](names/null.md) | - | No description |\n"));
    }

    #[test]
    fn descriptions_are_escaped_and_truncated() {
        let records = sample();
        let table = table(&records, TableOptions::default());
        let air = table.lines().find(|l| l.contains("air_temperature")).unwrap();
        let description = air.split(" | ").nth(2).unwrap().trim_end_matches(" |");
        assert_eq!(description.len(), 80);
        assert!(description.ends_with("..."));

        let sea = table.lines().find(|l| l.contains("sea_surface")).unwrap();
        assert!(sea.contains("Temperature \\| of the sea surface"));

        let rows = parse_rows(&table);
        assert_eq!(rows[2][2], "Temperature | of the sea surface");

        let full = super::table(&records, TableOptions { show_full_description: true, ..Default::default() });
        assert!(full.contains(&"A".repeat(90)));
    }

    #[test]
    fn truncation_counts_characters() {
        let text = "é".repeat(81);
        let cut = truncate(Cow::Borrowed(&text), 80);
        assert_eq!(cut.chars().count(), 80);
        assert_eq!(truncate(Cow::Borrowed(&text[..160]), 80).chars().count(), 80);
    }

    #[test]
    fn category_column_links_to_primary_tag() {
        let records = sample();
        let options = TableOptions { show_category: true, ..Default::default() };
        let table = table(&records, options);
        assert!(table.starts_with("| Name | Unit | Description | Category |\n| --- | --- | --- | --- |\n"));
        assert!(table.contains("[Sea Ice](tags/ocean.md)"));
        assert!(table.contains("[Misc](tags/misc.md)"));
        assert!(parse_rows(&table).iter().all(|r| r.len() == 4));
    }

    #[test]
    fn table_output_is_stable() {
        let records = sample();
        let mut reversed = records.clone();
        reversed.reverse();
        let options = TableOptions { show_category: true, ..Default::default() };
        assert_eq!(table(&records, options), table(&reversed, options));
    }

    #[test]
    fn detail_sections_skip_absent_fields() {
        let records = [
            record! {
                "name" => "salinity",
                "description" => "Salt content.",
                "documentation" => "Measured in PSU.\\n\\nSee $S$ and $T$.",
                "status" => "draft",
                "tags" => vec!["ocean"],
            },
            record!("name" => "bare", "unit" => "", "status" => Value::Null),
        ];

        let detail = detail_block(&records);
        assert_eq!(detail, "### `bare`\n\n**Tags:** None\n\n---\n\n\
            ### `salinity`\n\nSalt content.\n\nMeasured in PSU.\n\nSee $S$ and $T$.\n\n\
            **Status:** Draft\n\n**Tags:** `ocean`\n\n---\n");
    }

    #[test]
    fn category_details_and_links() {
        let catalog = Catalog::from_records(sample());
        let detail = category_detail_block(&catalog, "atmosphere");
        assert!(detail.starts_with("### `air_temperature`"));
        assert_eq!(category_detail_block(&catalog, "nowhere"), NO_RESULTS);

        let links = category_link_list(&catalog, DEFAULT_OVERVIEW);
        assert_eq!(links, "- [Atmosphere](overview.md#atmosphere) (1)\n\
            - [Ocean](overview.md#ocean) (1)\n");
    }

    #[test]
    fn record_lookup_misses_are_none() {
        let catalog = Catalog::from_records(sample());
        assert!(record_detail(&catalog, "nonexistent").is_none());
        let found = record_detail(&catalog, "air_temperature").unwrap();
        assert_eq!(found.text(Name).as_deref(), Some("air_temperature"));
    }

    #[test]
    fn titles_and_anchors() {
        assert_eq!(title_case("ocean_biogeochemistry"), "Ocean_Biogeochemistry");
        assert_eq!(title_case(""), "");
        assert_eq!(anchor(&title_case("sea-ice")), "sea-ice");
        assert_eq!(anchor("Land Surface"), "land-surface");
    }
}
