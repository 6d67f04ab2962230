//! Shared identifier types.
//!
//! All entities use 64-bit sequence ids assigned by PostgreSQL.

pub type UserId = i64;
pub type PostId = i64;
pub type CommentId = i64;
