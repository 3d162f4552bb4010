use crate::services::seed;
use crate::Config;
use anyhow::Result;
use std::path::Path;

pub async fn run(config_path: &Path) -> Result<()> {
    let config = Config::load(config_path)?;
    let db = config.open_database()?;
    db.migrate()?;

    let outcome = seed::seed_defaults(&db, config.content.slug_max_attempts)?;
    println!(
        "Default data ready: {} categor{} and {} tag(s) created.",
        outcome.categories_created,
        if outcome.categories_created == 1 { "y" } else { "ies" },
        outcome.tags_created
    );
    Ok(())
}
