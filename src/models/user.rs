use serde::Serialize;

/// Locally stored handle for an author. Credentials live with the identity
/// provider; posts only need a stable id to point at.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    pub id: i64,
    pub username: String,
}
