pub mod database;

pub use database::{InsertError, SoldierDb};
