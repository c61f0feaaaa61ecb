//! The `vdoc categories` command.
//!
//! Lists the active classification rule table so operators can see which
//! categories are configured and how many trigger terms each carries.

use anyhow::Result;

use crate::config::Config;
use crate::rules::RuleSet;

pub fn list_categories(config: &Config) -> Result<()> {
    let rules = RuleSet::load(config.classifier.rules_path.as_deref())?;

    let source = match &config.classifier.rules_path {
        Some(path) => format!("{}", path.display()),
        None => "builtin".to_string(),
    };
    println!("Rule table: {} ({} categories)", source, rules.len());
    println!();
    println!(
        "{:<22} {:>9} {:>8} {:>9} {:>8}",
        "CATEGORY", "FILENAME", "TEXT", "KEYWORDS", "PHRASES"
    );
    println!("{}", "-".repeat(62));

    for rule in rules.iter() {
        println!(
            "{:<22} {:>9} {:>8} {:>9} {:>8}",
            rule.category,
            rule.filename_keywords.len(),
            rule.text_phrases.len(),
            rule.keywords.len(),
            rule.key_phrases.len()
        );
    }

    Ok(())
}
