pub mod base;
pub mod file_store;
pub mod memory_store;
pub mod token_store;

// Re-export the primary store items so code outside can do
// "use crate::store::{KeyValueStorage, TokenStore, create_storage};"
pub use base::{create_storage, KeyValueStorage};
pub use file_store::FileStore;
pub use memory_store::MemoryStore;
pub use token_store::TokenStore;
