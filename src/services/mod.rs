// Service exports
pub mod memory;
pub mod postgres;
pub mod storage;

pub use memory::MemoryStorage;
pub use postgres::PostgresStorage;
pub use storage::{Storage, StorageError};
