use crate::config::Config;
use crate::db::Db;
use crate::db::repo::{
    CatalogRepo, CatalogRepository, CharacterRepo, CharacterRepository, InstanceRepo, InstanceRepository, LobbyRepo,
    LobbyRepository,
};
use crate::db::repo::{MemoryCatalogRepo, MemoryCharacterRepo, MemoryInstanceRepo, MemoryLobbyRepo};
use crate::engine::capacity::{CapacityPolicy, LinearCapacity};
use crate::services::{CatalogService, InventoryService, LocalMediaStore, MediaStore, MemoryMediaStore};
use std::sync::Arc;

pub struct Repos {
    pub catalog: Arc<dyn CatalogRepo>,
    pub instances: Arc<dyn InstanceRepo>,
    pub lobbies: Arc<dyn LobbyRepo>,
    pub characters: Arc<dyn CharacterRepo>,
}

impl Repos {
    pub fn postgres(db: Arc<Db>) -> Self {
        Self {
            catalog: Arc::new(CatalogRepository::new(db.clone())),
            instances: Arc::new(InstanceRepository::new(db.clone())),
            lobbies: Arc::new(LobbyRepository::new(db.clone())),
            characters: Arc::new(CharacterRepository::new(db)),
        }
    }
}

/// Concrete in-memory stores, kept so callers can seed lobby and character facts.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    pub catalog: Arc<MemoryCatalogRepo>,
    pub instances: Arc<MemoryInstanceRepo>,
    pub lobbies: Arc<MemoryLobbyRepo>,
    pub characters: Arc<MemoryCharacterRepo>,
    pub media: Arc<MemoryMediaStore>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn repos(&self) -> Repos {
        Repos {
            catalog: self.catalog.clone(),
            instances: self.instances.clone(),
            lobbies: self.lobbies.clone(),
            characters: self.characters.clone(),
        }
    }
}

pub struct Services {
    pub catalog: Arc<CatalogService>,
    pub inventory: Arc<InventoryService>,
}

pub struct Registry {
    pub db: Option<Arc<Db>>,
    pub repos: Arc<Repos>,
    pub services: Arc<Services>,
    pub config: Arc<Config>,
}

impl Registry {
    pub fn new(repos: Repos, media: Arc<dyn MediaStore>, config: Arc<Config>) -> Self {
        let repos = Arc::new(repos);

        let capacity: Arc<dyn CapacityPolicy> = Arc::new(LinearCapacity {
            base: config.capacity_base,
            per_strength: config.capacity_per_strength,
        });

        let catalog_service = Arc::new(CatalogService::new(repos.catalog.clone()));
        let inventory_service = Arc::new(InventoryService::new(
            repos.instances.clone(),
            repos.lobbies.clone(),
            repos.characters.clone(),
            catalog_service.clone(),
            media,
            capacity,
            config.default_strength,
        ));

        let services = Arc::new(Services {
            catalog: catalog_service,
            inventory: inventory_service,
        });

        Self {
            db: None,
            repos,
            services,
            config,
        }
    }

    /// Postgres-backed registry. Images go to the configured media directory.
    pub fn postgres(db: Arc<Db>, config: Arc<Config>) -> Self {
        let media = Arc::new(LocalMediaStore::new(config.media_dir.clone()));
        let mut registry = Self::new(Repos::postgres(db.clone()), media, config);
        registry.db = Some(db);
        registry
    }

    pub fn memory(backend: &MemoryBackend, config: Arc<Config>) -> Self {
        Self::new(backend.repos(), backend.media.clone(), config)
    }
}
