//! Service layer providing the user registry's CRUD operations on top of models.
//! - Separates business rules from the storage medium.
//! - Reuses validation and the record definition in the `models` crate.
//! - Every mutation is a full-collection read-modify-write through `storage`.

pub mod clock;
pub mod errors;
pub mod storage;
pub mod user_service;

pub use clock::{Clock, ManualClock, SystemClock};
pub use errors::ServiceError;
pub use user_service::UserService;
