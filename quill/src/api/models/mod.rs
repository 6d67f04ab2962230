pub mod auth;
pub mod comments;
pub mod pagination;
pub mod posts;
pub mod users;
