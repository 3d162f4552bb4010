//! One-time creation of the default categories and tags.

use crate::services::{categories, tags};
use crate::Database;
use anyhow::Result;

pub const DEFAULT_CATEGORIES: [&str; 5] = ["Programming", "Design", "Marketing", "Travel", "Cooking"];

pub const DEFAULT_TAGS: [&str; 7] = [
    "django",
    "python",
    "web",
    "development",
    "design",
    "cooking",
    "travel",
];

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedOutcome {
    pub categories_created: usize,
    pub tags_created: usize,
}

/// Creates whichever defaults are missing. Safe to run repeatedly.
pub fn seed_defaults(db: &Database, max_attempts: usize) -> Result<SeedOutcome> {
    let mut outcome = SeedOutcome::default();

    for name in DEFAULT_CATEGORIES {
        let (_, created) = categories::get_or_create_category(db, name, max_attempts)?;
        if created {
            outcome.categories_created += 1;
            tracing::info!("Created category: {}", name);
        }
    }

    for name in DEFAULT_TAGS {
        let (_, created) = tags::get_or_create_tag(db, name, max_attempts)?;
        if created {
            outcome.tags_created += 1;
            tracing::info!("Created tag: {}", name);
        }
    }

    Ok(outcome)
}
