use crate::models::Category;
use crate::services::slug::{assign_stored_slug, SlugScope};
use crate::Database;
use anyhow::{bail, Result};
use rusqlite::{Connection, OptionalExtension};

const MAX_NAME_LENGTH: usize = 100;

pub fn create_category(db: &Database, name: &str, max_attempts: usize) -> Result<i64> {
    let name = validate_name(name)?;
    let mut conn = db.get()?;
    let tx = conn.transaction()?;
    if category_name_exists(&tx, &name)? {
        bail!("Category '{}' already exists", name);
    }
    let id = insert_category(&tx, &name, max_attempts)?;
    tx.commit()?;
    Ok(id)
}

pub fn get_or_create_category(
    db: &Database,
    name: &str,
    max_attempts: usize,
) -> Result<(i64, bool)> {
    let name = validate_name(name)?;
    let mut conn = db.get()?;
    let tx = conn.transaction()?;
    let existing: Option<i64> = tx
        .query_row("SELECT id FROM categories WHERE name = ?", [&name], |row| {
            row.get(0)
        })
        .optional()?;
    let result = match existing {
        Some(id) => (id, false),
        None => (insert_category(&tx, &name, max_attempts)?, true),
    };
    tx.commit()?;
    Ok(result)
}

fn insert_category(conn: &Connection, name: &str, max_attempts: usize) -> Result<i64> {
    conn.execute("INSERT INTO categories (name) VALUES (?)", [name])?;
    let id = conn.last_insert_rowid();
    let slug = assign_stored_slug(conn, SlugScope::Category, id, name, max_attempts)?;
    tracing::info!(category_id = id, slug = %slug, "Category created");
    Ok(id)
}

pub fn category_name_exists(conn: &Connection, name: &str) -> Result<bool> {
    let exists = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM categories WHERE name = ?)",
        [name],
        |row| row.get(0),
    )?;
    Ok(exists)
}

pub fn get_category_by_slug(db: &Database, slug: &str) -> Result<Option<Category>> {
    let conn = db.get()?;
    let category = conn
        .query_row(
            "SELECT id, name, slug FROM categories WHERE slug = ?",
            [slug],
            row_to_category,
        )
        .optional()?;
    Ok(category)
}

pub fn get_category_by_name(db: &Database, name: &str) -> Result<Option<Category>> {
    let conn = db.get()?;
    let category = conn
        .query_row(
            "SELECT id, name, slug FROM categories WHERE name = ?",
            [name.trim()],
            row_to_category,
        )
        .optional()?;
    Ok(category)
}

pub fn list_categories(db: &Database) -> Result<Vec<Category>> {
    let conn = db.get()?;
    let mut stmt = conn.prepare("SELECT id, name, slug FROM categories ORDER BY name")?;
    let categories = stmt
        .query_map([], row_to_category)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(categories)
}

/// Deleting a category leaves its posts uncategorised.
pub fn delete_category(db: &Database, id: i64) -> Result<()> {
    let conn = db.get()?;
    conn.execute("DELETE FROM categories WHERE id = ?", [id])?;
    Ok(())
}

fn validate_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        bail!("Category name cannot be empty");
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        bail!("Category name must be {} characters or less", MAX_NAME_LENGTH);
    }
    Ok(name.to_string())
}

fn row_to_category(row: &rusqlite::Row) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get(0)?,
        name: row.get(1)?,
        slug: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
    })
}
