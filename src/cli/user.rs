use crate::services::users;
use crate::Config;
use anyhow::Result;
use std::path::Path;

use super::UserCommand;

pub async fn run(config_path: &Path, command: UserCommand) -> Result<()> {
    let config = Config::load(config_path)?;
    let db = config.open_database()?;
    db.migrate()?;

    match command {
        UserCommand::Add { username } => {
            users::create_user(&db, &username)?;
            tracing::info!("User '{}' created", username);
        }
        UserCommand::List => {
            let users = users::list_users(&db)?;
            println!("{:<6} {:<30} {:<30}", "ID", "USERNAME", "CREATED");
            println!("{}", "-".repeat(66));
            for user in users {
                println!("{:<6} {:<30} {:<30}", user.id, user.username, user.created_at);
            }
        }
    }

    Ok(())
}
