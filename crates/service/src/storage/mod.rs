//! Storage abstractions for the service layer
//!
//! `kv_store` models the host's key-value string store; `user_repository`
//! keeps the whole user collection as one JSON blob inside it.

pub mod json_file_store;
pub mod kv_store;
pub mod memory_store;
pub mod user_repository;

pub use json_file_store::JsonFileKvStore;
pub use kv_store::{KvStore, StorageError};
pub use memory_store::MemoryKvStore;
pub use user_repository::{KvUserRepository, UserRepository};
