pub mod clock;
pub mod database;
pub mod http;
pub mod notify;
pub mod offline;
