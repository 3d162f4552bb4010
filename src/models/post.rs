use super::{Category, Tag, UserSummary};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PublicationState {
    #[default]
    Draft,
    Published,
}

impl FromStr for PublicationState {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "draft" => Ok(Self::Draft),
            "published" => Ok(Self::Published),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for PublicationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Draft => write!(f, "draft"),
            Self::Published => write!(f, "published"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Post {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub content: String,
    pub author_id: i64,
    pub category_id: Option<i64>,
    pub is_published: bool,
    pub published_date: Option<String>,
    pub created_date: String,
}

impl Post {
    pub fn state(&self) -> PublicationState {
        if self.is_published {
            PublicationState::Published
        } else {
            PublicationState::Draft
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PostWithRelations {
    #[serde(flatten)]
    pub post: Post,
    pub category: Option<Category>,
    pub tags: Vec<Tag>,
    pub author: Option<UserSummary>,
}

#[derive(Debug, Deserialize, Default)]
pub struct CreatePost {
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub category_id: Option<i64>,
    #[serde(default)]
    pub tag_ids: Vec<i64>,
    #[serde(default)]
    pub is_published: bool,
}

/// Partial edit. `category_id: Some(None)` detaches the category.
#[derive(Debug, Deserialize, Default)]
pub struct UpdatePost {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category_id: Option<Option<i64>>,
    pub tag_ids: Option<Vec<i64>>,
    pub is_published: Option<bool>,
}
