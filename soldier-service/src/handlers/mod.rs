pub mod health;
pub mod soldiers;

pub use health::{db_health_check, health_check};
pub use soldiers::{
    append_limitations, create_soldier, delete_soldier, get_soldier, list_soldiers, update_soldier,
};
