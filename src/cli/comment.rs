use crate::services::comments;
use crate::Config;
use anyhow::Result;
use std::path::Path;

use super::CommentCommand;

pub async fn run(config_path: &Path, command: CommentCommand) -> Result<()> {
    let config = Config::load(config_path)?;
    let db = config.open_database()?;
    db.migrate()?;

    match command {
        CommentCommand::List { pending } => {
            let comments = comments::list_comments(&db, pending)?;
            println!(
                "{:<6} {:<9} {:<20} {:<30} {}",
                "ID", "STATUS", "AUTHOR", "POST", "TEXT"
            );
            println!("{}", "-".repeat(90));
            for c in comments {
                let status = if c.comment.approved_comment {
                    "approved"
                } else {
                    "pending"
                };
                let text: String = c.comment.text.chars().take(40).collect();
                println!(
                    "{:<6} {:<9} {:<20} {:<30} {}",
                    c.comment.id,
                    status,
                    c.comment.author,
                    c.post_slug,
                    text.replace('\n', " ")
                );
            }
        }
        CommentCommand::Approve { id } => {
            comments::approve_comment(&db, id)?;
            println!("Comment {} approved.", id);
        }
        CommentCommand::Delete { id } => {
            comments::delete_comment(&db, id)?;
            println!("Comment {} deleted.", id);
        }
    }

    Ok(())
}
