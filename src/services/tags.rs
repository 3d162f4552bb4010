use crate::models::{Tag, TagWithCount};
use crate::services::slug::{assign_stored_slug, SlugScope};
use crate::Database;
use anyhow::{bail, Result};
use rusqlite::{Connection, OptionalExtension};

const MAX_NAME_LENGTH: usize = 100;

pub fn create_tag(db: &Database, name: &str, max_attempts: usize) -> Result<i64> {
    let name = validate_name(name)?;
    let mut conn = db.get()?;
    let tx = conn.transaction()?;
    if tag_name_exists(&tx, &name)? {
        bail!("Tag '{}' already exists", name);
    }
    let id = insert_tag(&tx, &name, max_attempts)?;
    tx.commit()?;
    Ok(id)
}

/// Returns the id of the tag named `name`, creating it when missing.
/// The flag is true when a new row was inserted.
pub fn get_or_create_tag(db: &Database, name: &str, max_attempts: usize) -> Result<(i64, bool)> {
    let name = validate_name(name)?;
    let mut conn = db.get()?;
    let tx = conn.transaction()?;
    let existing: Option<i64> = tx
        .query_row("SELECT id FROM tags WHERE name = ?", [&name], |row| row.get(0))
        .optional()?;
    let result = match existing {
        Some(id) => (id, false),
        None => (insert_tag(&tx, &name, max_attempts)?, true),
    };
    tx.commit()?;
    Ok(result)
}

fn insert_tag(conn: &Connection, name: &str, max_attempts: usize) -> Result<i64> {
    conn.execute("INSERT INTO tags (name) VALUES (?)", [name])?;
    let id = conn.last_insert_rowid();
    let slug = assign_stored_slug(conn, SlugScope::Tag, id, name, max_attempts)?;
    tracing::info!(tag_id = id, slug = %slug, "Tag created");
    Ok(id)
}

pub fn tag_name_exists(conn: &Connection, name: &str) -> Result<bool> {
    let exists = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM tags WHERE name = ?)",
        [name],
        |row| row.get(0),
    )?;
    Ok(exists)
}

pub fn get_tag_by_slug(db: &Database, slug: &str) -> Result<Option<Tag>> {
    let conn = db.get()?;
    let tag = conn
        .query_row(
            "SELECT id, name, slug FROM tags WHERE slug = ?",
            [slug],
            row_to_tag,
        )
        .optional()?;
    Ok(tag)
}

pub fn list_tags(db: &Database) -> Result<Vec<Tag>> {
    let conn = db.get()?;
    let mut stmt = conn.prepare("SELECT id, name, slug FROM tags ORDER BY name")?;
    let tags = stmt
        .query_map([], row_to_tag)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(tags)
}

pub fn list_tags_with_counts(db: &Database) -> Result<Vec<TagWithCount>> {
    let conn = db.get()?;
    let mut stmt = conn.prepare(
        r#"
        SELECT t.id, t.name, t.slug, COUNT(p.id) as count
        FROM tags t
        LEFT JOIN post_tags pt ON t.id = pt.tag_id
        LEFT JOIN posts p ON pt.post_id = p.id AND p.is_published = 1
        GROUP BY t.id
        ORDER BY count DESC, t.name
        "#,
    )?;
    let tags = stmt
        .query_map([], |row| {
            Ok(TagWithCount {
                tag: row_to_tag(row)?,
                count: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(tags)
}

pub fn delete_tag(db: &Database, id: i64) -> Result<()> {
    let conn = db.get()?;
    conn.execute("DELETE FROM tags WHERE id = ?", [id])?;
    Ok(())
}

fn validate_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        bail!("Tag name cannot be empty");
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        bail!("Tag name must be {} characters or less", MAX_NAME_LENGTH);
    }
    Ok(name.to_string())
}

fn row_to_tag(row: &rusqlite::Row) -> rusqlite::Result<Tag> {
    Ok(Tag {
        id: row.get(0)?,
        name: row.get(1)?,
        slug: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
    })
}
