use crate::db::DbResult;
use crate::db::error::DbError;
use crate::db::repo::catalog::CatalogRepo;
use crate::models::catalog::{ItemDefinition, ItemType};
use crate::models::types::DefinitionId;
use async_trait::async_trait;
use dashmap::DashMap;

/// Catalog kept in process memory. Used by tests and `--memory` runs.
#[derive(Default)]
pub struct MemoryCatalogRepo {
    types: DashMap<String, ItemType>,
    definitions: DashMap<DefinitionId, ItemDefinition>,
}

impl MemoryCatalogRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CatalogRepo for MemoryCatalogRepo {
    async fn get_type_by_name(&self, name: &str) -> DbResult<Option<ItemType>> {
        Ok(self.types.get(name).map(|t| t.value().clone()))
    }

    async fn get_or_insert_type(&self, candidate: ItemType) -> DbResult<ItemType> {
        let entry = self.types.entry(candidate.name.clone()).or_insert(candidate);
        Ok(entry.value().clone())
    }

    async fn get_definition(&self, id: DefinitionId) -> DbResult<Option<ItemDefinition>> {
        Ok(self.definitions.get(&id).map(|d| d.value().clone()))
    }

    async fn get_definitions(&self, ids: &[DefinitionId]) -> DbResult<Vec<ItemDefinition>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.definitions.get(id).map(|d| d.value().clone()))
            .collect())
    }

    async fn list_definitions(&self) -> DbResult<Vec<ItemDefinition>> {
        let mut all: Vec<ItemDefinition> = self.definitions.iter().map(|d| d.value().clone()).collect();
        all.sort_by(|a, b| {
            a.item_type
                .name
                .cmp(&b.item_type.name)
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(all)
    }

    async fn insert_definition(&self, definition: &ItemDefinition) -> DbResult<()> {
        if self.definitions.contains_key(&definition.id) {
            return Err(DbError::UniqueViolation);
        }
        self.definitions.insert(definition.id, definition.clone());
        Ok(())
    }

    async fn set_image_path(&self, id: DefinitionId, image_path: &str) -> DbResult<()> {
        let mut def = self.definitions.get_mut(&id).ok_or(DbError::NotFound)?;
        def.image_path = Some(image_path.to_string());
        Ok(())
    }
}
