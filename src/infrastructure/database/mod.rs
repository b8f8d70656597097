mod connection_pool;
mod sqlite_local_store;

pub use connection_pool::ConnectionPool;
pub use sqlite_local_store::SqliteLocalStore;
