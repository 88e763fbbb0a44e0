mod catalog;
mod catalog_db;
mod catalog_mem;
mod character;
mod character_db;
mod character_mem;
mod instance;
mod instance_db;
mod instance_mem;
mod lobby;
mod lobby_db;
mod lobby_mem;

pub use catalog_db::CatalogRepository;
pub use character_db::CharacterRepository;
pub use instance_db::InstanceRepository;
pub use lobby_db::LobbyRepository;

pub use catalog_mem::MemoryCatalogRepo;
pub use character_mem::MemoryCharacterRepo;
pub use instance_mem::MemoryInstanceRepo;
pub use lobby_mem::MemoryLobbyRepo;

pub use catalog::CatalogRepo;
pub use character::CharacterRepo;
pub use instance::{InstanceBatch, InstanceRepo, InstanceWrite};
pub use lobby::LobbyRepo;
