use crate::services::seed;
use crate::Config;
use anyhow::Result;
use std::path::PathBuf;

pub async fn run(path: PathBuf, name: Option<String>) -> Result<()> {
    let site_name = name.unwrap_or_else(|| "My Blog".to_string());

    std::fs::create_dir_all(&path)?;
    std::fs::create_dir_all(path.join("data"))?;

    let config_path = path.join("quill.toml");
    if config_path.exists() {
        anyhow::bail!("{} already exists", config_path.display());
    }

    let config = format!(
        r#"[site]
title = "{}"
description = "A personal blog"

[server]
host = "127.0.0.1"
port = 3000

[database]
path = "./data/quill.db"

[content]
posts_per_page = 5
slug_max_attempts = 5
"#,
        site_name.replace('"', "\\\"")
    );

    std::fs::write(&config_path, config)?;

    let config = Config::load(&config_path)?;
    let db = config.open_database()?;
    db.migrate()?;
    let outcome = seed::seed_defaults(&db, config.content.slug_max_attempts)?;
    tracing::info!(
        categories = outcome.categories_created,
        tags = outcome.tags_created,
        "Seeded default taxonomy"
    );

    tracing::info!("Created new site at {:?}", path);
    tracing::info!("Run 'quill user add --username <name>' to create an author");
    tracing::info!("Run 'quill serve' to start the server");

    Ok(())
}
