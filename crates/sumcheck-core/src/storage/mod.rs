mod local;
pub mod models;
mod queries;
mod sqlite;

pub use local::LocalStorage;
pub use sqlite::Database;
