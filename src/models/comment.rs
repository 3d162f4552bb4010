use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub author: String,
    pub text: String,
    pub created_date: String,
    pub approved_comment: bool,
}

impl Comment {
    /// Only approved comments may be shown on a post's public page.
    pub fn is_visible(&self) -> bool {
        self.approved_comment
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentWithPost {
    #[serde(flatten)]
    pub comment: Comment,
    pub post_slug: String,
    pub post_title: String,
}
