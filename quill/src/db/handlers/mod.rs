pub mod comments;
pub mod posts;
pub mod repository;
pub mod users;

pub use comments::{CommentFilter, Comments};
pub use posts::{PostFilter, Posts};
pub use repository::Repository;
pub use users::{UserFilter, Users};
