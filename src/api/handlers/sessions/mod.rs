//! Shareable sessions and their room memberships.
//!
//! A session is owned by one user and addressed publicly by a random hex slug
//! that never changes after creation. Rooms bind users to a session with a
//! role; creation enrolls the creator in the `owner` room in the same
//! transaction as the session insert.
//!
//! Flow Overview:
//! 1) Reads (`get`, `get_by_slug`, `list`) are public and skip soft-deleted rows.
//! 2) `create` requires the `owner` or `admin` role and calls the slug allocator.
//! 3) `update`, `delete` and `rooms` require session ownership or `admin`.

pub(crate) mod manage;
pub(crate) mod public;
pub(crate) mod slug;
pub(crate) mod storage;
pub(crate) mod types;
