use crate::{Config, Database};
use anyhow::Result;
use std::path::Path;

pub async fn run(config_path: &Path) -> Result<()> {
    let config = Config::load(config_path)?;
    let db = config.open_database()?;

    let before = db.schema_version()?;
    db.migrate()?;
    let after = db.schema_version()?;

    if after > before {
        tracing::info!("Migrated schema from version {} to {}", before, after);
    } else {
        tracing::info!(
            "Schema already at version {} (latest {})",
            after,
            Database::latest_version()
        );
    }
    Ok(())
}
