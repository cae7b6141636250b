//! Domain model for the user registry.
//! - `user`: the persisted record and its input rules.
//! - `errors`: validation failures raised before any storage access.
//! - `timestamp`: the millisecond ISO-8601 form used in the stored blob.

pub mod errors;
pub mod timestamp;
pub mod user;

pub use user::{User, UserId, UserInput};
