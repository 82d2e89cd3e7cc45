use std::fs;
use std::path::Path;

use lexicon::Catalog;
use lexicon::error::{Chainable, Result};

use crate::config::Config;

/// Renders the template at `template` to `output`, or to stdout.
pub fn run(config: &Config, template: &Path, output: Option<&Path>) -> Result<()> {
    let page = config.engine.render_file(template)?;
    let Some(output) = output else {
        print!("{page}");
        return Ok(());
    };

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .chain_with(|| error!("failed to create output directory", "path" => parent.display()))?;
    }

    fs::write(output, page)
        .chain_with(|| error!("failed to write page", "path" => output.display()))?;

    tracing::info!(template = %template.display(), output = %output.display(), "rendered page");
    Ok(())
}

pub fn stats(config: &Config) -> Result<()> {
    let catalog = Catalog::load(config.names_dir());
    let stats = catalog.stats();
    println!("standard names: {}", stats.total_names);
    println!("categories:     {}", stats.total_categories);
    println!("tags:           {}", stats.total_tags);
    for (tag, records) in &stats.tags {
        println!("  {tag}: {}", records.len());
    }

    if !catalog.diagnostics.is_empty() {
        println!("rejected files: {}", catalog.diagnostics.len());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use lexicon::templating::MacroEngine;

    use super::*;

    #[test]
    fn renders_to_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let names = dir.path().join("standard_names/atmosphere");
        fs::create_dir_all(&names).unwrap();
        fs::write(names.join("t.yml"), "name: air_temperature\ntags: [atmosphere]\n").unwrap();
        fs::write(dir.path().join("overview.md"), "{{ category_links() }}").unwrap();

        let config = Config::discover::<MacroEngine>(dir.path()).unwrap();
        let output = dir.path().join("site/overview.md");
        run(&config, &dir.path().join("overview.md"), Some(&output)).unwrap();

        let page = fs::read_to_string(output).unwrap();
        assert_eq!(page, "- [Atmosphere](overview.md#atmosphere) (1)\n");
    }

    #[test]
    fn missing_template_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::discover::<MacroEngine>(dir.path()).unwrap();
        assert!(run(&config, &dir.path().join("nope.md"), None).is_err());
    }
}
