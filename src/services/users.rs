use crate::models::User;
use crate::Database;
use anyhow::{bail, Result};
use rusqlite::OptionalExtension;

const MAX_USERNAME_LENGTH: usize = 100;

fn validate_username(username: &str) -> Result<()> {
    if username.is_empty() {
        bail!("Username cannot be empty");
    }
    if username.len() > MAX_USERNAME_LENGTH {
        bail!(
            "Username must be {} characters or less",
            MAX_USERNAME_LENGTH
        );
    }
    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
    {
        bail!("Username can only contain letters, numbers, underscores, and hyphens");
    }
    Ok(())
}

pub fn create_user(db: &Database, username: &str) -> Result<i64> {
    validate_username(username)?;
    let conn = db.get()?;
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM users WHERE username = ?)",
        [username],
        |row| row.get(0),
    )?;
    if exists {
        bail!("User '{}' already exists", username);
    }
    conn.execute(
        "INSERT INTO users (username, created_at) VALUES (?, ?)",
        (username, chrono::Utc::now().to_rfc3339()),
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_user_by_username(db: &Database, username: &str) -> Result<Option<User>> {
    let conn = db.get()?;
    let user = conn
        .query_row(
            "SELECT id, username, created_at FROM users WHERE username = ?",
            [username],
            row_to_user,
        )
        .optional()?;
    Ok(user)
}

pub fn list_users(db: &Database) -> Result<Vec<User>> {
    let conn = db.get()?;
    let mut stmt = conn.prepare("SELECT id, username, created_at FROM users ORDER BY username")?;
    let users = stmt
        .query_map([], row_to_user)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(users)
}

fn row_to_user(row: &rusqlite::Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        created_at: row.get(2)?,
    })
}
