pub mod comment;
pub mod init;
pub mod migrate;
pub mod post;
pub mod repair;
pub mod seed;
pub mod serve;
pub mod user;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "quill")]
#[command(version)]
#[command(about = "A small blog with categories, tags and moderated comments", long_about = None)]
pub struct Cli {
    #[arg(short, long, default_value = "quill.toml", env = "QUILL_CONFIG")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new site directory with a default config
    Init {
        #[arg(default_value = ".")]
        path: PathBuf,
        #[arg(long)]
        name: Option<String>,
    },
    /// Start the public web server
    Serve {
        #[arg(short = 'H', long)]
        host: Option<String>,
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Apply pending database migrations
    Migrate,
    /// Create the default categories and tags
    Seed,
    /// Fix posts, categories and tags with missing or malformed slugs
    RepairSlugs,
    User {
        #[command(subcommand)]
        command: UserCommand,
    },
    Post {
        #[command(subcommand)]
        command: PostCommand,
    },
    Comment {
        #[command(subcommand)]
        command: CommentCommand,
    },
}

#[derive(Subcommand)]
pub enum UserCommand {
    Add {
        #[arg(long)]
        username: String,
    },
    List,
}

#[derive(Subcommand)]
pub enum PostCommand {
    Create {
        #[arg(long)]
        author: String,
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        content: String,
        /// Category name
        #[arg(long)]
        category: Option<String>,
        /// Tag name, repeatable; missing tags are created
        #[arg(long = "tag")]
        tags: Vec<String>,
        #[arg(long)]
        publish: bool,
    },
    Publish {
        slug: String,
    },
    Unpublish {
        slug: String,
    },
    List {
        /// Only posts by this author
        #[arg(long)]
        author: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum CommentCommand {
    List {
        /// Only comments awaiting approval
        #[arg(long)]
        pending: bool,
    },
    Approve {
        id: i64,
    },
    Delete {
        id: i64,
    },
}
