//! Database layer: repositories over `&mut PgConnection`, request/response
//! models, and error categorization.

pub mod errors;
pub mod handlers;
pub mod models;
