use crate::models::CreatePost;
use crate::services::{categories, posts, tags, users};
use crate::Config;
use anyhow::Result;
use std::path::Path;

use super::PostCommand;

pub async fn run(config_path: &Path, command: PostCommand) -> Result<()> {
    let config = Config::load(config_path)?;
    let db = config.open_database()?;
    db.migrate()?;
    let max_attempts = config.content.slug_max_attempts;

    match command {
        PostCommand::Create {
            author,
            title,
            content,
            category,
            tags: tag_names,
            publish,
        } => {
            let author = users::get_user_by_username(&db, &author)?
                .ok_or_else(|| anyhow::anyhow!("User '{}' not found", author))?;

            let category_id = match category {
                Some(name) => Some(
                    categories::get_category_by_name(&db, &name)?
                        .ok_or_else(|| {
                            anyhow::anyhow!(
                                "Category '{}' not found. Run `quill seed` to create the defaults.",
                                name
                            )
                        })?
                        .id,
                ),
                None => None,
            };

            let mut tag_ids = Vec::with_capacity(tag_names.len());
            for name in &tag_names {
                let (id, _) = tags::get_or_create_tag(&db, name, max_attempts)?;
                tag_ids.push(id);
            }

            let input = CreatePost {
                title,
                content,
                category_id,
                tag_ids,
                is_published: publish,
            };
            let id = posts::create_post(&db, input, author.id, max_attempts)?;
            if let Some(post) = posts::get_post_by_id(&db, id)? {
                println!("Created post {} at /post/{} ({})", id, post.post.slug, post.post.state());
            }
        }
        PostCommand::Publish { slug } => {
            let post = posts::set_published(&db, &slug, true, max_attempts)?;
            println!(
                "Published '{}' (first published {})",
                post.slug,
                post.published_date.as_deref().unwrap_or("-")
            );
        }
        PostCommand::Unpublish { slug } => {
            let post = posts::set_published(&db, &slug, false, max_attempts)?;
            println!("'{}' is now a draft", post.slug);
        }
        PostCommand::List { author } => {
            let list = match author {
                Some(username) => {
                    let user = users::get_user_by_username(&db, &username)?
                        .ok_or_else(|| anyhow::anyhow!("User '{}' not found", username))?;
                    posts::list_posts_by_author(&db, user.id)?
                }
                None => posts::list_posts(&db)?,
            };
            println!(
                "{:<6} {:<10} {:<40} {:<26} {}",
                "ID", "STATE", "SLUG", "PUBLISHED", "TITLE"
            );
            println!("{}", "-".repeat(100));
            for post in list {
                println!(
                    "{:<6} {:<10} {:<40} {:<26} {}",
                    post.id,
                    post.state().to_string(),
                    post.slug,
                    post.published_date.as_deref().unwrap_or("-"),
                    post.title
                );
            }
        }
    }

    Ok(())
}
