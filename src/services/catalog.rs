use crate::db::repo::CatalogRepo;
use crate::engine::Definitions;
use crate::engine::catalog::normalize_type_name;
use crate::error::{AppResult, DomainError};
use crate::models::catalog::{ItemDefinition, ItemType, NewDefinition};
use crate::models::instance::ItemInstance;
use crate::models::types::DefinitionId;
use std::collections::BTreeSet;
use std::sync::Arc;

pub struct CatalogService {
    repo: Arc<dyn CatalogRepo>,
}

impl CatalogService {
    pub fn new(repo: Arc<dyn CatalogRepo>) -> Self {
        Self { repo }
    }

    /// Get-or-create a type by name. Idempotent; new types receive their well-known defaults.
    pub async fn resolve_type(&self, name: &str) -> AppResult<ItemType> {
        let name = normalize_type_name(name).ok_or(DomainError::InvalidValue("type"))?;

        if let Some(existing) = self.repo.get_type_by_name(&name).await? {
            return Ok(existing);
        }

        let created = self.repo.get_or_insert_type(ItemType::with_defaults(&name)).await?;
        tracing::debug!(type_name = %created.name, stackable = created.stackable, "item type resolved");
        Ok(created)
    }

    pub async fn get_definition(&self, id: DefinitionId) -> AppResult<ItemDefinition> {
        self.repo
            .get_definition(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("definition {id}")))
    }

    /// Definitions for every instance in `instances`, fetched in one round trip.
    pub async fn definitions_for(&self, instances: &[ItemInstance]) -> AppResult<Definitions> {
        let ids: Vec<DefinitionId> = instances
            .iter()
            .map(|i| i.definition_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let defs = self.repo.get_definitions(&ids).await?;
        Ok(defs.into_iter().map(|d| (d.id, d)).collect())
    }

    pub async fn list(&self) -> AppResult<Vec<ItemDefinition>> {
        Ok(self.repo.list_definitions().await?)
    }

    pub async fn create_definition(&self, input: NewDefinition) -> AppResult<ItemDefinition> {
        validate(&input)?;
        let item_type = self.resolve_type(&input.type_name).await?;

        let definition = ItemDefinition {
            id: DefinitionId::new(),
            item_type,
            name: input.name.trim().to_string(),
            description: input.description.trim().to_string(),
            width: input.width,
            height: input.height,
            weight: input.weight,
            max_durability: input.max_durability,
            max_stack: input.max_stack,
            quality: input.quality,
            is_cloth: input.is_cloth,
            bag_width: input.bag_width,
            bag_height: input.bag_height,
            fast_width: input.fast_width,
            fast_height: input.fast_height,
            image_path: None,
            created_at: chrono::Utc::now(),
        };

        self.repo.insert_definition(&definition).await?;
        tracing::info!(definition_id = %definition.id, name = %definition.name, type_name = %definition.item_type.name, "item definition created");
        Ok(definition)
    }

    pub async fn set_image_path(&self, id: DefinitionId, image_path: &str) -> AppResult<ItemDefinition> {
        self.repo.set_image_path(id, image_path).await?;
        self.get_definition(id).await
    }
}

fn invalid(field: &'static str, message: &str) -> DomainError {
    DomainError::Validation {
        field,
        message: message.to_string(),
    }
}

fn validate(input: &NewDefinition) -> AppResult<()> {
    if input.name.trim().is_empty() {
        return Err(invalid("name", "must not be empty"));
    }
    if input.width < 1 {
        return Err(invalid("width", "must be at least 1"));
    }
    if input.height < 1 {
        return Err(invalid("height", "must be at least 1"));
    }
    if !input.weight.is_finite() || input.weight < 0.0 {
        return Err(invalid("weight", "must be zero or more"));
    }
    if input.max_durability.is_some_and(|v| v < 1) {
        return Err(invalid("max_durability", "must be positive"));
    }
    if input.max_stack.is_some_and(|v| v < 1) {
        return Err(invalid("max_stack", "must be positive"));
    }
    for (field, value) in [
        ("bag_width", input.bag_width),
        ("bag_height", input.bag_height),
        ("fast_width", input.fast_width),
        ("fast_height", input.fast_height),
    ] {
        if value < 0 {
            return Err(invalid(field, "must not be negative"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repo::MemoryCatalogRepo;

    fn service() -> CatalogService {
        CatalogService::new(Arc::new(MemoryCatalogRepo::new()))
    }

    fn sword() -> NewDefinition {
        NewDefinition {
            name: "Short sword".into(),
            type_name: "Weapon".into(),
            width: 1,
            height: 3,
            weight: 2.5,
            max_durability: Some(30),
            ..NewDefinition::default()
        }
    }

    #[tokio::test]
    async fn resolve_type_is_idempotent() {
        let catalog = service();
        let first = catalog.resolve_type(" Food ").await.unwrap();
        let second = catalog.resolve_type("food").await.unwrap();

        assert_eq!(first.id, second.id);
        assert!(first.stackable);
        assert_eq!(first.max_amount, 20);
    }

    #[tokio::test]
    async fn empty_type_name_is_rejected() {
        let err = service().resolve_type("   ").await.unwrap_err();
        assert_eq!(err.code(), "invalid_value");
    }

    #[tokio::test]
    async fn create_definition_resolves_type() {
        let catalog = service();
        let def = catalog.create_definition(sword()).await.unwrap();

        assert_eq!(def.type_name(), "weapon");
        assert!(def.item_type.has_durability);
        assert_eq!(catalog.get_definition(def.id).await.unwrap().name, "Short sword");
        assert_eq!(catalog.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn create_definition_validates_shape() {
        let catalog = service();
        let err = catalog
            .create_definition(NewDefinition { width: 0, ..sword() })
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation { field: "width", .. }));

        let err = catalog
            .create_definition(NewDefinition { weight: -1.0, ..sword() })
            .await
            .unwrap_err();
        assert_eq!(err.code(), "validation");
    }
}
