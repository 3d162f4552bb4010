use crate::models::{Category, CreatePost, Post, PostWithRelations, Tag, UpdatePost, UserSummary};
use crate::services::publication::Publication;
use crate::services::slug::{assign_stored_slug, needs_repair, SlugScope};
use crate::Database;
use anyhow::{bail, Result};
use rusqlite::{Connection, OptionalExtension};

const POST_COLUMNS: &str = "p.id, p.slug, p.title, p.content, p.author_id, p.category_id, p.is_published, p.published_date, p.created_date";

pub fn create_post(
    db: &Database,
    input: CreatePost,
    author_id: i64,
    max_attempts: usize,
) -> Result<i64> {
    let title = input.title.trim().to_string();
    let now = chrono::Utc::now();
    let publication = Publication::on_create(input.is_published, now);

    let mut conn = db.get()?;
    let tx = conn.transaction()?;
    tx.execute(
        r#"
        INSERT INTO posts (title, content, author_id, category_id, is_published, published_date, created_date)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
        (
            &title,
            &input.content,
            author_id,
            input.category_id,
            publication.is_published,
            &publication.published_date,
            now.to_rfc3339(),
        ),
    )?;
    let post_id = tx.last_insert_rowid();

    let slug = assign_stored_slug(&tx, SlugScope::Post, post_id, &title, max_attempts)?;
    replace_post_tags(&tx, post_id, &input.tag_ids)?;
    tx.commit()?;

    tracing::info!(post_id, slug = %slug, state = %publication.state(), "Post created");
    Ok(post_id)
}

pub fn update_post(db: &Database, id: i64, input: UpdatePost, max_attempts: usize) -> Result<()> {
    let mut conn = db.get()?;
    let tx = conn.transaction()?;

    let current = match load_post(&tx, "p.id = ?", id)? {
        Some(p) => p,
        None => bail!("Post {} not found", id),
    };

    let title = input
        .title
        .map(|t| t.trim().to_string())
        .unwrap_or(current.title);
    let content = input.content.unwrap_or(current.content);
    let category_id = input.category_id.unwrap_or(current.category_id);

    let before = Publication::new(current.is_published, current.published_date);
    let is_published = input.is_published.unwrap_or(before.is_published);
    if before.stamps_on(is_published) {
        tracing::info!(post_id = id, "Post published for the first time");
    }
    let publication = before.apply(is_published, chrono::Utc::now());

    tx.execute(
        r#"
        UPDATE posts SET title = ?, content = ?, category_id = ?, is_published = ?, published_date = ?
        WHERE id = ?
        "#,
        (
            &title,
            &content,
            category_id,
            publication.is_published,
            &publication.published_date,
            id,
        ),
    )?;

    if needs_repair(Some(current.slug.as_str())) {
        let slug = assign_stored_slug(&tx, SlugScope::Post, id, &title, max_attempts)?;
        tracing::info!(post_id = id, slug = %slug, "Assigned missing slug on save");
    }

    if let Some(tag_ids) = input.tag_ids {
        replace_post_tags(&tx, id, &tag_ids)?;
    }

    tx.commit()?;
    Ok(())
}

/// Flips the published flag of the post with the given slug.
pub fn set_published(
    db: &Database,
    slug: &str,
    is_published: bool,
    max_attempts: usize,
) -> Result<Post> {
    let post = match get_post_by_slug(db, slug)? {
        Some(p) => p.post,
        None => bail!("Post '{}' not found", slug),
    };
    update_post(
        db,
        post.id,
        UpdatePost {
            is_published: Some(is_published),
            ..Default::default()
        },
        max_attempts,
    )?;
    match get_post_by_id(db, post.id)? {
        Some(p) => Ok(p.post),
        None => bail!("Post '{}' disappeared during update", slug),
    }
}

pub fn delete_post(db: &Database, id: i64) -> Result<()> {
    let conn = db.get()?;
    conn.execute("DELETE FROM posts WHERE id = ?", [id])?;
    Ok(())
}

pub fn get_post_by_id(db: &Database, id: i64) -> Result<Option<PostWithRelations>> {
    let conn = db.get()?;
    match load_post(&conn, "p.id = ?", id)? {
        Some(p) => Ok(Some(enrich_post(&conn, p)?)),
        None => Ok(None),
    }
}

pub fn get_post_by_slug(db: &Database, slug: &str) -> Result<Option<PostWithRelations>> {
    let conn = db.get()?;
    match load_post(&conn, "p.slug = ?", slug)? {
        Some(p) => Ok(Some(enrich_post(&conn, p)?)),
        None => Ok(None),
    }
}

/// A published post by slug. Drafts are treated as missing.
pub fn get_published_post(db: &Database, slug: &str) -> Result<Option<PostWithRelations>> {
    Ok(get_post_by_slug(db, slug)?.filter(|p| p.post.is_published))
}

pub fn list_published_posts(
    db: &Database,
    limit: usize,
    offset: usize,
) -> Result<Vec<PostWithRelations>> {
    let conn = db.get()?;
    let sql = format!(
        "SELECT {} FROM posts p WHERE p.is_published = 1 ORDER BY p.published_date DESC, p.id DESC LIMIT ? OFFSET ?",
        POST_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let posts = stmt
        .query_map((limit, offset), row_to_post)?
        .collect::<Result<Vec<_>, _>>()?;
    posts.into_iter().map(|p| enrich_post(&conn, p)).collect()
}

pub fn count_published_posts(db: &Database) -> Result<i64> {
    let conn = db.get()?;
    let count = conn.query_row(
        "SELECT COUNT(*) FROM posts WHERE is_published = 1",
        [],
        |row| row.get(0),
    )?;
    Ok(count)
}

pub fn list_posts_by_category(db: &Database, category_id: i64) -> Result<Vec<PostWithRelations>> {
    let conn = db.get()?;
    let sql = format!(
        "SELECT {} FROM posts p WHERE p.category_id = ? AND p.is_published = 1 ORDER BY p.published_date DESC, p.id DESC",
        POST_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let posts = stmt
        .query_map([category_id], row_to_post)?
        .collect::<Result<Vec<_>, _>>()?;
    posts.into_iter().map(|p| enrich_post(&conn, p)).collect()
}

pub fn list_posts_by_tag(db: &Database, tag_id: i64) -> Result<Vec<PostWithRelations>> {
    let conn = db.get()?;
    let sql = format!(
        r#"
        SELECT {} FROM posts p
        JOIN post_tags pt ON p.id = pt.post_id
        WHERE pt.tag_id = ? AND p.is_published = 1
        ORDER BY p.published_date DESC, p.id DESC
        "#,
        POST_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let posts = stmt
        .query_map([tag_id], row_to_post)?
        .collect::<Result<Vec<_>, _>>()?;
    posts.into_iter().map(|p| enrich_post(&conn, p)).collect()
}

/// Everything an author has written, drafts included, newest first.
pub fn list_posts_by_author(db: &Database, author_id: i64) -> Result<Vec<Post>> {
    let conn = db.get()?;
    let sql = format!(
        "SELECT {} FROM posts p WHERE p.author_id = ? ORDER BY p.created_date DESC, p.id DESC",
        POST_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let posts = stmt
        .query_map([author_id], row_to_post)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(posts)
}

pub fn list_posts(db: &Database) -> Result<Vec<Post>> {
    let conn = db.get()?;
    let sql = format!("SELECT {} FROM posts p ORDER BY p.id", POST_COLUMNS);
    let mut stmt = conn.prepare(&sql)?;
    let posts = stmt
        .query_map([], row_to_post)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(posts)
}

fn load_post<P: rusqlite::ToSql>(conn: &Connection, filter: &str, param: P) -> Result<Option<Post>> {
    let sql = format!("SELECT {} FROM posts p WHERE {}", POST_COLUMNS, filter);
    let post = conn.query_row(&sql, [param], row_to_post).optional()?;
    Ok(post)
}

fn replace_post_tags(conn: &Connection, post_id: i64, tag_ids: &[i64]) -> Result<()> {
    conn.execute("DELETE FROM post_tags WHERE post_id = ?", [post_id])?;
    for tag_id in tag_ids {
        conn.execute(
            "INSERT OR IGNORE INTO post_tags (post_id, tag_id) VALUES (?, ?)",
            (post_id, tag_id),
        )?;
    }
    Ok(())
}

fn row_to_post(row: &rusqlite::Row) -> rusqlite::Result<Post> {
    Ok(Post {
        id: row.get(0)?,
        slug: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
        title: row.get(2)?,
        content: row.get(3)?,
        author_id: row.get(4)?,
        category_id: row.get(5)?,
        is_published: row.get(6)?,
        published_date: row.get(7)?,
        created_date: row.get(8)?,
    })
}

fn enrich_post(conn: &Connection, post: Post) -> Result<PostWithRelations> {
    let category = match post.category_id {
        Some(cid) => conn
            .query_row(
                "SELECT id, name, slug FROM categories WHERE id = ?",
                [cid],
                |row| {
                    Ok(Category {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        slug: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                    })
                },
            )
            .optional()?,
        None => None,
    };

    let mut tag_stmt = conn.prepare(
        "SELECT t.id, t.name, t.slug FROM tags t JOIN post_tags pt ON t.id = pt.tag_id WHERE pt.post_id = ? ORDER BY t.name",
    )?;
    let tags: Vec<Tag> = tag_stmt
        .query_map([post.id], |row| {
            Ok(Tag {
                id: row.get(0)?,
                name: row.get(1)?,
                slug: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let author = conn
        .query_row(
            "SELECT id, username FROM users WHERE id = ?",
            [post.author_id],
            |row| {
                Ok(UserSummary {
                    id: row.get(0)?,
                    username: row.get(1)?,
                })
            },
        )
        .optional()?;

    Ok(PostWithRelations {
        post,
        category,
        tags,
        author,
    })
}
