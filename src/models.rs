pub mod catalog;
pub mod container;
pub mod instance;
pub mod lobby;
pub mod types;
