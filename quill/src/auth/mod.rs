//! Authentication and authorization: password hashing, JWT issuance and
//! verification, identity middleware, and ownership/visibility guards.

pub mod guard;
pub mod identity;
pub mod password;
pub mod token;

pub use guard::{ensure_comment_owner, ensure_post_owner, ensure_post_visible};
pub use identity::{Identity, MaybeIdentity, authenticate};
pub use password::{hash_password, verify_password};
pub use token::{Claims, TokenCodec};
