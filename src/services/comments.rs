use crate::models::{Comment, CommentWithPost};
use crate::Database;
use anyhow::{bail, Result};

pub const MAX_AUTHOR_LENGTH: usize = 200;
pub const MAX_TEXT_LENGTH: usize = 5000;

pub fn validate_comment(author: &str, text: &str) -> Result<()> {
    if author.trim().is_empty() {
        bail!("Name cannot be empty");
    }
    if author.trim().chars().count() > MAX_AUTHOR_LENGTH {
        bail!("Name must be {} characters or less", MAX_AUTHOR_LENGTH);
    }
    if text.trim().is_empty() {
        bail!("Comment cannot be empty");
    }
    if text.trim().chars().count() > MAX_TEXT_LENGTH {
        bail!("Comment must be {} characters or less", MAX_TEXT_LENGTH);
    }
    Ok(())
}

/// Stores a new comment. Comments always start unapproved.
pub fn create_comment(db: &Database, post_id: i64, author: &str, text: &str) -> Result<i64> {
    validate_comment(author, text)?;
    let conn = db.get()?;
    conn.execute(
        "INSERT INTO comments (post_id, author, text, created_date, approved_comment) VALUES (?, ?, ?, ?, 0)",
        (
            post_id,
            author.trim(),
            text.trim(),
            chrono::Utc::now().to_rfc3339(),
        ),
    )?;
    let id = conn.last_insert_rowid();
    tracing::info!(comment_id = id, post_id, "Comment submitted for moderation");
    Ok(id)
}

/// Comments readers may see on the post page: approved only, oldest first.
pub fn list_public_comments(db: &Database, post_id: i64) -> Result<Vec<Comment>> {
    let conn = db.get()?;
    let mut stmt = conn.prepare(
        r#"
        SELECT id, post_id, author, text, created_date, approved_comment
        FROM comments
        WHERE post_id = ? AND approved_comment = 1
        ORDER BY created_date, id
        "#,
    )?;
    let comments = stmt
        .query_map([post_id], row_to_comment)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(comments)
}

/// Moderator listing across all posts.
pub fn list_comments(db: &Database, pending_only: bool) -> Result<Vec<CommentWithPost>> {
    let conn = db.get()?;
    let mut sql = String::from(
        r#"
        SELECT c.id, c.post_id, c.author, c.text, c.created_date, c.approved_comment,
               COALESCE(p.slug, ''), p.title
        FROM comments c
        JOIN posts p ON c.post_id = p.id
        "#,
    );
    if pending_only {
        sql.push_str(" WHERE c.approved_comment = 0");
    }
    sql.push_str(" ORDER BY c.created_date DESC, c.id DESC");

    let mut stmt = conn.prepare(&sql)?;
    let comments = stmt
        .query_map([], |row| {
            Ok(CommentWithPost {
                comment: row_to_comment(row)?,
                post_slug: row.get(6)?,
                post_title: row.get(7)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(comments)
}

pub fn approve_comment(db: &Database, id: i64) -> Result<()> {
    let conn = db.get()?;
    let affected = conn.execute(
        "UPDATE comments SET approved_comment = 1 WHERE id = ?",
        [id],
    )?;
    if affected == 0 {
        bail!("Comment {} not found", id);
    }
    tracing::info!(comment_id = id, "Comment approved");
    Ok(())
}

pub fn delete_comment(db: &Database, id: i64) -> Result<()> {
    let conn = db.get()?;
    let affected = conn.execute("DELETE FROM comments WHERE id = ?", [id])?;
    if affected == 0 {
        bail!("Comment {} not found", id);
    }
    tracing::info!(comment_id = id, "Comment deleted");
    Ok(())
}

fn row_to_comment(row: &rusqlite::Row) -> rusqlite::Result<Comment> {
    Ok(Comment {
        id: row.get(0)?,
        post_id: row.get(1)?,
        author: row.get(2)?,
        text: row.get(3)?,
        created_date: row.get(4)?,
        approved_comment: row.get(5)?,
    })
}
