pub mod categories;
pub mod comments;
pub mod posts;
pub mod publication;
pub mod repair;
pub mod seed;
pub mod slug;
pub mod tags;
pub mod users;
