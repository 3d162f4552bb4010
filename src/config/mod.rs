use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub site: SiteConfig,
    #[serde(default)]
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub content: ContentConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SiteConfig {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub path: String,
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ContentConfig {
    #[serde(default = "default_posts_per_page")]
    pub posts_per_page: usize,
    /// Insert attempts before slug assignment gives up on collisions.
    #[serde(default = "default_slug_max_attempts")]
    pub slug_max_attempts: usize,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            posts_per_page: default_posts_per_page(),
            slug_max_attempts: default_slug_max_attempts(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_pool_size() -> u32 {
    10
}

fn default_posts_per_page() -> usize {
    10
}

fn default_slug_max_attempts() -> usize {
    5
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            anyhow::anyhow!(
                "Could not read config file '{}': {}. Run `quill init` to create one.",
                path.display(),
                e
            )
        })?;
        let mut config = Self::parse(&content)?;
        if let Some(dir) = path.parent() {
            config.resolve_relative_to(dir);
        }
        Ok(config)
    }

    /// Anchors a relative `database.path` at `dir`, the directory holding the
    /// config file, so commands agree on the database wherever they run from.
    pub fn resolve_relative_to(&mut self, dir: &Path) {
        let db_path = Path::new(&self.database.path);
        if db_path.is_relative() && !dir.as_os_str().is_empty() {
            self.database.path = dir.join(db_path).to_string_lossy().into_owned();
        }
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.database.path.trim().is_empty() {
            anyhow::bail!("database.path must not be empty");
        }
        if self.database.pool_size == 0 {
            anyhow::bail!("database.pool_size must be greater than 0");
        }
        if self.content.posts_per_page == 0 {
            anyhow::bail!("content.posts_per_page must be greater than 0");
        }
        if self.content.posts_per_page > 100 {
            anyhow::bail!("content.posts_per_page must be 100 or less");
        }
        if self.content.slug_max_attempts == 0 {
            anyhow::bail!("content.slug_max_attempts must be greater than 0");
        }
        if self.content.slug_max_attempts > 50 {
            anyhow::bail!("content.slug_max_attempts must be 50 or less");
        }
        Ok(())
    }

    pub fn open_database(&self) -> Result<crate::Database> {
        crate::Database::open_with_pool_size(&self.database.path, self.database.pool_size)
    }
}
