//! Route handlers grouped by resource, plus the paging helpers they share.

pub mod auth;
pub mod health;
pub mod paging;
pub mod sessions;
pub mod users;
