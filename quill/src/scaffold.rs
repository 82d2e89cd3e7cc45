use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use lexicon::Catalog;
use lexicon::error::{Chainable, Result};
use lexicon::record::Name;
use lexicon::render::title_case;

use crate::config::Config;

/// Writes a page per primary tag and points the site navigation at them.
pub fn run(config: &Config) -> Result<()> {
    let catalog = Catalog::load(config.names_dir());
    let categories = categories(&catalog);

    let tags_dir = config.tags_dir();
    write_tag_pages(&tags_dir, &categories)?;
    tracing::info!(dir = %tags_dir.display(), "created {} category pages", categories.len());

    let site_config = config.site_config();
    if !site_config.is_file() {
        tracing::warn!(path = %site_config.display(), "site config not found; navigation unchanged");
        return Ok(());
    }

    let content = fs::read_to_string(&site_config)
        .chain_with(|| error!("failed to read site config", "path" => site_config.display()))?;

    let updated = rewrite_nav(&content, &categories, &config.settings.overview);
    if updated != content {
        fs::write(&site_config, updated)
            .chain_with(|| error!("failed to write site config", "path" => site_config.display()))?;

        tracing::info!(path = %site_config.display(), "updated navigation");
    }

    Ok(())
}

/// Primary tags of every record that has both a name and tags.
pub fn categories(catalog: &Catalog) -> BTreeSet<String> {
    catalog.records.iter()
        .filter(|record| record.non_empty(Name).is_some())
        .filter_map(|record| record.primary_tag())
        .map(|tag| tag.into_owned())
        .collect()
}

pub fn tag_page(tag: &str) -> String {
    let title = title_case(tag);
    format!("# {title}\n\n\
        This category contains standard names related to {}.\n\n\
        {{% set tag_items = get_tags()['{tag}'] %}}\n\n\
        {{{{ standard_names_table(tag_items) }}}}\n", title.to_lowercase())
}

pub fn write_tag_pages(dir: &Path, categories: &BTreeSet<String>) -> Result<()> {
    fs::create_dir_all(dir)
        .chain_with(|| error!("failed to create tag page directory", "path" => dir.display()))?;

    for tag in categories {
        let path = dir.join(format!("{tag}.md"));
        fs::write(&path, tag_page(tag))
            .chain_with(|| error!("failed to write tag page", "path" => path.display()))?;
    }

    Ok(())
}

/// Replaces the `nav:` block in `content`.
///
/// The block is the `nav:` line and every line after it up to the next line
/// that is neither empty nor indented. Content without a `nav:` line comes
/// back unchanged.
pub fn rewrite_nav(content: &str, categories: &BTreeSet<String>, overview: &str) -> String {
    let mut nav = vec![
        "nav:".to_string(),
        "  - Home: index.md".into(),
        "  - Standard Names:".into(),
        format!("    - Overview: {overview}"),
        "    - By Category:".into(),
    ];

    for tag in categories {
        nav.push(format!("      - {}: tags/{tag}.md", title_case(tag)));
    }

    let mut lines: Vec<&str> = vec![];
    let mut in_nav = false;
    for line in content.split('\n') {
        if line.starts_with("nav:") {
            in_nav = true;
            lines.extend(nav.iter().map(|s| s.as_str()));
        } else if in_nav && !line.is_empty() && !line.starts_with([' ', '\t']) {
            in_nav = false;
            lines.push(line);
        } else if !in_nav {
            lines.push(line);
        }
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use lexicon::templating::MacroEngine;

    use super::*;

    fn tags(tags: &[&str]) -> BTreeSet<String> {
        tags.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn nav_block_is_replaced() {
        let mkdocs = "site_name: WEST\nnav:\n  - Home: index.md\n\n  - Old: old.md\n\ttabbed\ntheme:\n  name: material\n";
        let updated = rewrite_nav(mkdocs, &tags(&["sea-ice", "atmosphere"]), "overview.md");
        assert_eq!(updated, "site_name: WEST\n\
            nav:\n  - Home: index.md\n  - Standard Names:\n    - Overview: overview.md\n    - By Category:\n\
            \x20     - Atmosphere: tags/atmosphere.md\n      - Sea Ice: tags/sea-ice.md\n\
            theme:\n  name: material\n");
    }

    #[test]
    fn nav_at_end_of_file() {
        let updated = rewrite_nav("a: b\nnav:\n  - x: y.md\n", &tags(&[]), "overview.md");
        assert!(updated.ends_with("    - By Category:"));
        assert!(!updated.contains("x: y.md"));
    }

    #[test]
    fn no_nav_means_no_change() {
        let mkdocs = "site_name: WEST\ntheme:\n  name: material\n";
        assert_eq!(rewrite_nav(mkdocs, &tags(&["ocean"]), "overview.md"), mkdocs);
    }

    #[test]
    fn categories_need_a_name_and_tags() {
        let catalog = Catalog::from_records([
            record!("name" => "a", "tags" => vec!["ocean", "salinity"]),
            record!("name" => "b", "tags" => vec!["atmosphere"]),
            record!("name" => "c", "tags" => vec!["ocean"]),
            record!("tags" => vec!["anonymous"]),
            record!("name" => "d"),
        ]);

        assert_eq!(categories(&catalog), tags(&["atmosphere", "ocean"]));
    }

    #[test]
    fn tag_pages() {
        assert_eq!(tag_page("sea-ice"), "# Sea Ice\n\n\
            This category contains standard names related to sea ice.\n\n\
            {% set tag_items = get_tags()['sea-ice'] %}\n\n\
            {{ standard_names_table(tag_items) }}\n");
    }

    #[test]
    fn scaffolds_a_project() {
        let dir = tempfile::tempdir().unwrap();
        let names = dir.path().join("standard_names/ocean");
        fs::create_dir_all(&names).unwrap();
        fs::write(names.join("sst.yml"), "name: sea_surface_temperature\nunit: K\ntags: [sea-ice]\n").unwrap();
        fs::write(dir.path().join("mkdocs.yml"), "site_name: WEST\nnav:\n  - Home: index.md\n").unwrap();

        let config = Config::discover::<MacroEngine>(dir.path()).unwrap();
        run(&config).unwrap();

        let page = dir.path().join("docs/tags/sea-ice.md");
        let rendered = config.engine.render_file(&page).unwrap();
        assert!(rendered.starts_with("# Sea Ice"));
        assert!(rendered.contains("| [`sea_surface_temperature`](names/sea_surface_temperature.md) | K | No description |"));

        let mkdocs = fs::read_to_string(dir.path().join("mkdocs.yml")).unwrap();
        assert!(mkdocs.ends_with("      - Sea Ice: tags/sea-ice.md"));
    }

    #[test]
    fn missing_site_config_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::discover::<MacroEngine>(dir.path()).unwrap();
        run(&config).unwrap();
        assert!(dir.path().join("docs/tags").is_dir());
    }
}
