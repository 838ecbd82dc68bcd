mod mappers;
mod queries;
mod rows;
pub mod sqlite_store;

pub use sqlite_store::SqliteSnapshotStore;
