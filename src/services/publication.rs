//! Draft/published transitions for posts.
//!
//! `published_date` is stamped the first time a post becomes published and is
//! never rewritten afterwards, including when the post is unpublished and
//! republished.

use crate::models::PublicationState;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Publication {
    pub is_published: bool,
    pub published_date: Option<String>,
}

impl Publication {
    pub fn draft() -> Self {
        Self::default()
    }

    pub fn new(is_published: bool, published_date: Option<String>) -> Self {
        Self {
            is_published,
            published_date,
        }
    }

    /// Publication fields for a freshly created post.
    pub fn on_create(is_published: bool, now: DateTime<Utc>) -> Self {
        Self::draft().apply(is_published, now)
    }

    /// Applies the `is_published` flag from an edit.
    pub fn apply(&self, is_published: bool, now: DateTime<Utc>) -> Self {
        let published_date = match &self.published_date {
            Some(date) => Some(date.clone()),
            None if is_published => Some(now.to_rfc3339()),
            None => None,
        };
        Self {
            is_published,
            published_date,
        }
    }

    pub fn state(&self) -> PublicationState {
        if self.is_published {
            PublicationState::Published
        } else {
            PublicationState::Draft
        }
    }

    /// Whether this edit performs the one-time Draft -> Published stamp.
    pub fn stamps_on(&self, is_published: bool) -> bool {
        is_published && self.published_date.is_none()
    }
}
