mod category;
mod comment;
mod post;
mod tag;
mod user;

pub use category::*;
pub use comment::*;
pub use post::*;
pub use tag::*;
pub use user::*;
