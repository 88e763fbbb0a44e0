use crate::db::DbResult;
use crate::models::catalog::{ItemDefinition, ItemType};
use crate::models::types::DefinitionId;

#[async_trait::async_trait]
pub trait CatalogRepo: Send + Sync {
    // ========================================================================
    // ITEM TYPES
    // ========================================================================

    /// Get a type by its unique name
    async fn get_type_by_name(&self, name: &str) -> DbResult<Option<ItemType>>;

    /// Insert `candidate` unless a type with the same name exists. Returns the stored type
    /// either way, so concurrent callers converge on one row.
    async fn get_or_insert_type(&self, candidate: ItemType) -> DbResult<ItemType>;

    // ========================================================================
    // DEFINITIONS
    // ========================================================================

    async fn get_definition(&self, id: DefinitionId) -> DbResult<Option<ItemDefinition>>;

    /// Fetch several definitions at once. Unknown ids are skipped.
    async fn get_definitions(&self, ids: &[DefinitionId]) -> DbResult<Vec<ItemDefinition>>;

    async fn list_definitions(&self) -> DbResult<Vec<ItemDefinition>>;

    async fn insert_definition(&self, definition: &ItemDefinition) -> DbResult<()>;

    /// The image is the only mutable part of a definition
    async fn set_image_path(&self, id: DefinitionId, image_path: &str) -> DbResult<()>;
}
