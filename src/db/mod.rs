pub mod json_store;

pub use json_store::validate_username;
pub use json_store::JsonStore;
