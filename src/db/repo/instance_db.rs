use crate::db::error::DbError;
use crate::db::repo::instance::{InstanceBatch, InstanceRepo, InstanceWrite};
use crate::db::{Db, DbResult, map_row_opt, map_rows};
use crate::models::instance::ItemInstance;
use crate::models::types::{AccountId, InstanceId};
use std::sync::Arc;

const INSTANCE_COLUMNS: &str = "id, owner_id, definition_id, container_id, pos_x, pos_y, rotated, \
     durability_current, amount, custom_name, custom_description, version, created_at, updated_at";

pub struct InstanceRepository {
    db: Arc<Db>,
}

impl InstanceRepository {
    pub fn new(db: Arc<Db>) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl InstanceRepo for InstanceRepository {
    async fn get(&self, id: InstanceId) -> DbResult<Option<ItemInstance>> {
        let client = self.db.get_client().await?;

        let stmt = client
            .prepare_cached(&format!("SELECT {INSTANCE_COLUMNS} FROM item_instances WHERE id = $1"))
            .await?;

        let row_opt = client.query_opt(&stmt, &[&id]).await?;
        map_row_opt(
            row_opt,
            ItemInstance::try_from_row,
            &format!("InstanceRepo::get id={}", id),
        )
    }

    async fn list_for_owner(&self, owner_id: AccountId) -> DbResult<Vec<ItemInstance>> {
        let client = self.db.get_client().await?;

        let stmt = client
            .prepare_cached(&format!(
                "SELECT {INSTANCE_COLUMNS} FROM item_instances WHERE owner_id = $1 ORDER BY created_at, id"
            ))
            .await?;

        let rows = client.query(&stmt, &[&owner_id]).await?;
        map_rows(rows, ItemInstance::try_from_row, "InstanceRepo::list_for_owner")
    }

    async fn apply(&self, batch: InstanceBatch) -> DbResult<()> {
        if batch.is_empty() {
            return Ok(());
        }

        let mut client = self.db.get_client().await?;
        let tx = client.transaction().await?;

        let insert = tx
            .prepare_cached(&format!(
                "INSERT INTO item_instances ({INSTANCE_COLUMNS})
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)"
            ))
            .await?;
        let update = tx
            .prepare_cached(
                "UPDATE item_instances SET
                    owner_id = $3, definition_id = $4, container_id = $5, pos_x = $6, pos_y = $7,
                    rotated = $8, durability_current = $9, amount = $10, custom_name = $11,
                    custom_description = $12, updated_at = $13, version = version + 1
                 WHERE id = $1 AND version = $2",
            )
            .await?;
        let delete = tx
            .prepare_cached("DELETE FROM item_instances WHERE id = $1 AND version = $2")
            .await?;

        for write in batch.into_writes() {
            match write {
                InstanceWrite::Insert(i) => {
                    let container = i.container.to_string();
                    tx.execute(
                        &insert,
                        &[
                            &i.id,
                            &i.owner_id,
                            &i.definition_id,
                            &container,
                            &i.pos_x,
                            &i.pos_y,
                            &i.rotated,
                            &i.durability_current,
                            &i.amount,
                            &i.custom_name,
                            &i.custom_description,
                            &i.version,
                            &i.created_at,
                            &i.updated_at,
                        ],
                    )
                    .await
                    .map_err(DbError::from_pg)?;
                }
                InstanceWrite::Update {
                    expected_version,
                    instance: i,
                } => {
                    let container = i.container.to_string();
                    let n = tx
                        .execute(
                            &update,
                            &[
                                &i.id,
                                &expected_version,
                                &i.owner_id,
                                &i.definition_id,
                                &container,
                                &i.pos_x,
                                &i.pos_y,
                                &i.rotated,
                                &i.durability_current,
                                &i.amount,
                                &i.custom_name,
                                &i.custom_description,
                                &i.updated_at,
                            ],
                        )
                        .await?;
                    if n == 0 {
                        // dropping `tx` rolls everything back
                        return Err(DbError::VersionConflict { id: i.id });
                    }
                }
                InstanceWrite::Delete { id, expected_version } => {
                    let n = tx.execute(&delete, &[&id, &expected_version]).await?;
                    if n == 0 {
                        return Err(DbError::VersionConflict { id });
                    }
                }
            }
        }

        tx.commit().await?;
        Ok(())
    }
}
