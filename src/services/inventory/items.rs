use super::{InventoryService, ItemRequest, Outcome, check_version, require_version, view};
use crate::db::repo::InstanceBatch;
use crate::engine::catalog::{has_durability, max_durability};
use crate::error::{AppResult, DomainError};
use crate::models::types::AccountId;
use rand::Rng;

/// Largest durability a single weapon use can cost.
const MAX_WEAR: i32 = 3;

impl InventoryService {
    pub async fn use_item(&self, actor: AccountId, req: ItemRequest) -> AppResult<Outcome> {
        let expected = require_version(req.version)?;
        let inst = self.get_instance(req.item_id).await?;
        self.authorize_edit(actor, inst.owner_id, req.lobby_id).await?;
        check_version(&inst, expected)?;

        let inv = self.load_inventory(inst.owner_id).await?;
        let def = inv.definition(&inst)?;

        match def.type_name() {
            "food" => {
                inv.ensure_no_dependents(&inst)?;
                let mut batch = InstanceBatch::new();
                batch.delete(&inst);
                self.commit("use", batch).await?;

                tracing::debug!(item_id = %inst.id, %actor, "food eaten");
                Ok(Outcome {
                    deleted_id: Some(inst.id),
                    ..Outcome::default()
                })
            }
            "weapon" => {
                if !has_durability(def) {
                    return Err(DomainError::InvalidItem("weapon has no durability"));
                }
                let max = max_durability(def).unwrap_or(1);
                let loss = rand::rng().random_range(0..=MAX_WEAR);

                let mut next = inst.clone();
                next.durability_current = Some((inst.durability_current.unwrap_or(max) - loss).max(0));

                let mut batch = InstanceBatch::new();
                let stored = batch.update(&next);
                self.commit("use", batch).await?;

                tracing::debug!(item_id = %stored.id, %actor, loss, durability = ?stored.durability_current, "weapon used");
                Ok(Outcome {
                    durability_loss: Some(loss),
                    ..Outcome::of(view(&stored, def))
                })
            }
            "map" => Ok(Outcome {
                map_image: def.image_path.clone(),
                ..Outcome::of(view(&inst, def))
            }),
            _ => Err(DomainError::NotUsable),
        }
    }
}
