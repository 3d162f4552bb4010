//! Slug derivation and uniqueness for posts, categories and tags.
//!
//! Candidates are probed in order `base`, `base-1`, `base-2`, ... against an
//! existence predicate. Writes are backed by `UNIQUE` columns, so a probe
//! that raced another writer surfaces as [`SlugError::UniqueConstraintViolation`]
//! and the next suffix is tried, up to a bounded number of attempts.

use rusqlite::Connection;
use serde::Serialize;
use slug::slugify;
use std::collections::HashSet;
use thiserror::Error;

pub const MAX_SLUG_LENGTH: usize = 200;
const MAX_BASE_LENGTH: usize = 180;
const LAST_RESORT_BASE: &str = "untitled";

#[derive(Debug, Error)]
pub enum SlugError {
    #[error("slug `{slug}` is already taken")]
    UniqueConstraintViolation { slug: String },
    #[error("could not assign a unique slug for `{base}` after {attempts} attempts")]
    SlugAssignmentFailed { base: String, attempts: usize },
    #[error(transparent)]
    Store(#[from] rusqlite::Error),
}

/// The tables that carry a unique slug.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SlugScope {
    Post,
    Category,
    Tag,
}

impl SlugScope {
    pub const ALL: [SlugScope; 3] = [SlugScope::Post, SlugScope::Category, SlugScope::Tag];

    pub fn table(self) -> &'static str {
        match self {
            Self::Post => "posts",
            Self::Category => "categories",
            Self::Tag => "tags",
        }
    }

    /// Column the slug is derived from.
    pub fn display_column(self) -> &'static str {
        match self {
            Self::Post => "title",
            Self::Category | Self::Tag => "name",
        }
    }

    pub fn placeholder_slug(self, id: i64) -> String {
        format!("{}-{}", self, id)
    }

    pub fn placeholder_name(self, id: i64) -> String {
        match self {
            Self::Post => format!("Post {}", id),
            Self::Category => format!("Category {}", id),
            Self::Tag => format!("Tag {}", id),
        }
    }
}

impl std::fmt::Display for SlugScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Post => write!(f, "post"),
            Self::Category => write!(f, "category"),
            Self::Tag => write!(f, "tag"),
        }
    }
}

/// Normalizes text into a slug without any uniqueness handling. May be empty.
pub fn base_slug(text: &str) -> String {
    let slug = slugify(text);
    if slug.len() <= MAX_BASE_LENGTH {
        return slug;
    }
    // slugify only emits ASCII
    slug[..MAX_BASE_LENGTH].trim_end_matches('-').to_string()
}

pub fn validate_slug(slug: &str) -> bool {
    if slug.is_empty() || slug.len() > MAX_SLUG_LENGTH {
        return false;
    }
    if slug.starts_with('-') || slug.ends_with('-') || slug.contains("--") {
        return false;
    }
    slug.chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// True when a stored slug is missing, blank or malformed.
pub fn needs_repair(slug: Option<&str>) -> bool {
    match slug {
        None => true,
        Some(s) => s.trim().is_empty() || !validate_slug(s),
    }
}

/// Derives a slug from `candidate_text` that `exists` reports as free.
///
/// When the text normalizes to nothing (blank, punctuation only) the
/// `fallback` is used instead, typically [`SlugScope::placeholder_slug`].
pub fn generate_slug<F, E>(candidate_text: &str, fallback: &str, mut exists: F) -> Result<String, E>
where
    F: FnMut(&str) -> Result<bool, E>,
{
    let base = resolve_base(candidate_text, fallback);

    if !exists(&base)? {
        return Ok(base);
    }

    let mut counter: u64 = 1;
    loop {
        let candidate = format!("{}-{}", base, counter);
        if !exists(&candidate)? {
            return Ok(candidate);
        }
        counter += 1;
    }
}

/// Probes for a free slug and hands it to `write`, retrying with the next
/// candidate whenever `write` reports a unique-constraint rejection.
pub fn assign_slug<T, P, W>(
    candidate_text: &str,
    fallback: &str,
    max_attempts: usize,
    mut exists: P,
    mut write: W,
) -> Result<(String, T), SlugError>
where
    P: FnMut(&str) -> rusqlite::Result<bool>,
    W: FnMut(&str) -> Result<T, SlugError>,
{
    let attempts = max_attempts.max(1);
    let mut rejected: HashSet<String> = HashSet::new();

    for attempt in 1..=attempts {
        let slug = generate_slug(candidate_text, fallback, |candidate| {
            if rejected.contains(candidate) {
                return Ok(true);
            }
            exists(candidate)
        })?;

        match write(&slug) {
            Ok(value) => return Ok((slug, value)),
            Err(SlugError::UniqueConstraintViolation { slug }) => {
                tracing::warn!(attempt, slug = %slug, "Slug collided on write, retrying");
                rejected.insert(slug);
            }
            Err(e) => return Err(e),
        }
    }

    Err(SlugError::SlugAssignmentFailed {
        base: resolve_base(candidate_text, fallback),
        attempts,
    })
}

fn resolve_base(candidate_text: &str, fallback: &str) -> String {
    let base = base_slug(candidate_text);
    if !base.is_empty() {
        return base;
    }
    let base = base_slug(fallback);
    if base.is_empty() {
        LAST_RESORT_BASE.to_string()
    } else {
        base
    }
}

pub fn is_unique_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(e, msg) => {
            e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                && msg.as_deref().map_or(true, |m| m.ends_with(".slug"))
        }
        _ => false,
    }
}

pub fn map_write_error(err: rusqlite::Error, slug: &str) -> SlugError {
    if is_unique_violation(&err) {
        SlugError::UniqueConstraintViolation {
            slug: slug.to_string(),
        }
    } else {
        SlugError::Store(err)
    }
}

/// Whether any record other than `exclude_id` in `scope` holds `slug`.
pub fn slug_taken(
    conn: &Connection,
    scope: SlugScope,
    slug: &str,
    exclude_id: i64,
) -> rusqlite::Result<bool> {
    let sql = format!(
        "SELECT EXISTS(SELECT 1 FROM {} WHERE slug = ?1 AND id != ?2)",
        scope.table()
    );
    conn.query_row(&sql, (slug, exclude_id), |row| row.get(0))
}

pub fn store_slug(conn: &Connection, scope: SlugScope, id: i64, slug: &str) -> Result<(), SlugError> {
    let sql = format!("UPDATE {} SET slug = ?1 WHERE id = ?2", scope.table());
    conn.execute(&sql, (slug, id))
        .map_err(|e| map_write_error(e, slug))?;
    Ok(())
}

/// Assigns a fresh slug to an existing row, deriving it from `text`.
pub fn assign_stored_slug(
    conn: &Connection,
    scope: SlugScope,
    id: i64,
    text: &str,
    max_attempts: usize,
) -> Result<String, SlugError> {
    let fallback = scope.placeholder_slug(id);
    let (slug, ()) = assign_slug(
        text,
        &fallback,
        max_attempts,
        |candidate| slug_taken(conn, scope, candidate, id),
        |candidate| store_slug(conn, scope, id, candidate),
    )?;
    Ok(slug)
}
