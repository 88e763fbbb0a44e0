pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod models;
pub mod net;
pub mod services;
pub mod state;

// Convenient re-exports (so call sites can do `satchel::Registry`, etc.)
pub use state::registry::{MemoryBackend, Registry};
