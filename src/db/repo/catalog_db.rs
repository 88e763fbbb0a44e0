use crate::db::error::DbError;
use crate::db::repo::catalog::CatalogRepo;
use crate::db::{Db, DbResult, map_row_opt, map_rows};
use crate::models::catalog::{ItemDefinition, ItemType};
use crate::models::types::DefinitionId;
use std::sync::Arc;

const DEFINITION_SELECT: &str = r#"
    SELECT
        d.id, d.name, d.description, d.width, d.height, d.weight,
        d.max_durability, d.max_stack, d.quality, d.is_cloth,
        d.bag_width, d.bag_height, d.fast_width, d.fast_height,
        d.image_path, d.created_at,
        t.id AS type_id, t.name AS type_name, t.stackable, t.max_amount, t.has_durability
    FROM item_definitions d
    JOIN item_types t ON t.id = d.type_id
"#;

pub struct CatalogRepository {
    db: Arc<Db>,
}

impl CatalogRepository {
    pub fn new(db: Arc<Db>) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl CatalogRepo for CatalogRepository {
    async fn get_type_by_name(&self, name: &str) -> DbResult<Option<ItemType>> {
        let client = self.db.get_client().await?;

        let stmt = client
            .prepare_cached(
                "SELECT id AS type_id, name AS type_name, stackable, max_amount, has_durability
                 FROM item_types WHERE name = $1",
            )
            .await?;

        let row_opt = client.query_opt(&stmt, &[&name]).await?;
        map_row_opt(
            row_opt,
            ItemType::try_from_row,
            &format!("CatalogRepo::get_type_by_name name={}", name),
        )
    }

    async fn get_or_insert_type(&self, candidate: ItemType) -> DbResult<ItemType> {
        let client = self.db.get_client().await?;

        client
            .execute(
                "INSERT INTO item_types (id, name, stackable, max_amount, has_durability)
                 VALUES ($1, $2, $3, $4, $5)
                 ON CONFLICT (name) DO NOTHING",
                &[
                    &candidate.id,
                    &candidate.name,
                    &candidate.stackable,
                    &candidate.max_amount,
                    &candidate.has_durability,
                ],
            )
            .await?;

        self.get_type_by_name(&candidate.name).await?.ok_or(DbError::NotFound)
    }

    async fn get_definition(&self, id: DefinitionId) -> DbResult<Option<ItemDefinition>> {
        let client = self.db.get_client().await?;

        let stmt = client
            .prepare_cached(&format!("{DEFINITION_SELECT} WHERE d.id = $1"))
            .await?;

        let row_opt = client.query_opt(&stmt, &[&id]).await?;
        map_row_opt(
            row_opt,
            ItemDefinition::try_from_row,
            &format!("CatalogRepo::get_definition id={}", id),
        )
    }

    async fn get_definitions(&self, ids: &[DefinitionId]) -> DbResult<Vec<ItemDefinition>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let client = self.db.get_client().await?;
        let uuids: Vec<uuid::Uuid> = ids.iter().map(|id| id.0).collect();

        let rows = client
            .query(&format!("{DEFINITION_SELECT} WHERE d.id = ANY($1)"), &[&uuids])
            .await?;

        map_rows(rows, ItemDefinition::try_from_row, "CatalogRepo::get_definitions")
    }

    async fn list_definitions(&self) -> DbResult<Vec<ItemDefinition>> {
        let client = self.db.get_client().await?;

        let rows = client
            .query(&format!("{DEFINITION_SELECT} ORDER BY t.name, d.name"), &[])
            .await?;

        map_rows(rows, ItemDefinition::try_from_row, "CatalogRepo::list_definitions")
    }

    async fn insert_definition(&self, d: &ItemDefinition) -> DbResult<()> {
        let client = self.db.get_client().await?;

        let stmt = client
            .prepare_cached(
                r#"
                INSERT INTO item_definitions (
                    id, type_id, name, description, width, height, weight,
                    max_durability, max_stack, quality, is_cloth,
                    bag_width, bag_height, fast_width, fast_height, image_path, created_at
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
                "#,
            )
            .await?;

        client
            .execute(
                &stmt,
                &[
                    &d.id,
                    &d.item_type.id,
                    &d.name,
                    &d.description,
                    &d.width,
                    &d.height,
                    &d.weight,
                    &d.max_durability,
                    &d.max_stack,
                    &d.quality.as_str(),
                    &d.is_cloth,
                    &d.bag_width,
                    &d.bag_height,
                    &d.fast_width,
                    &d.fast_height,
                    &d.image_path,
                    &d.created_at,
                ],
            )
            .await
            .map_err(DbError::from_pg)?;

        Ok(())
    }

    async fn set_image_path(&self, id: DefinitionId, image_path: &str) -> DbResult<()> {
        let client = self.db.get_client().await?;

        let n = client
            .execute(
                "UPDATE item_definitions SET image_path = $2 WHERE id = $1",
                &[&id, &image_path],
            )
            .await?;

        if n == 0 {
            return Err(DbError::NotFound);
        }
        Ok(())
    }
}
