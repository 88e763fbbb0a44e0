use super::{InventoryService, MergeRequest, Outcome, SplitRequest, check_version, require_version, view};
use crate::db::repo::InstanceBatch;
use crate::engine::catalog::{effective_max_stack, is_stackable};
use crate::engine::placement::auto_place;
use crate::error::{AppResult, DomainError};
use crate::models::instance::ItemInstance;
use crate::models::types::AccountId;

impl InventoryService {
    /// Splits `amount` off a stack into a new instance placed in the same container.
    pub async fn split_item(&self, actor: AccountId, req: SplitRequest) -> AppResult<Outcome> {
        let expected = require_version(req.version)?;
        let inst = self.get_instance(req.item_id).await?;
        self.authorize_edit(actor, inst.owner_id, req.lobby_id).await?;
        check_version(&inst, expected)?;

        let inv = self.load_inventory(inst.owner_id).await?;
        let def = inv.definition(&inst)?;

        if !is_stackable(def) {
            return Err(DomainError::NotStackable);
        }
        if inst.amount > effective_max_stack(def) {
            return Err(DomainError::MaxStackExceeded);
        }

        let amount = if req.split_half.unwrap_or(false) {
            inst.amount / 2
        } else {
            req.amount.ok_or(DomainError::InvalidAmount)?
        };
        if amount <= 0 || amount >= inst.amount {
            return Err(DomainError::InvalidAmount);
        }

        let container = inv
            .container(inst.container)
            .ok_or_else(|| DomainError::InvalidContainer(inst.container.to_string()))?;
        let grid = inv.grid(&container, &[]);
        let spot = auto_place(&container, &grid, def, inst.rotated).ok_or(DomainError::NoSpace)?;

        let mut piece = ItemInstance::new(inst.owner_id, def, inst.container);
        piece.amount = amount;
        piece.custom_name = inst.custom_name.clone();
        piece.custom_description = inst.custom_description.clone();
        piece.place(inst.container, spot.x, spot.y, spot.rotated);

        let mut source = inst.clone();
        source.amount -= amount;

        let mut batch = InstanceBatch::new();
        let stored = batch.update(&source);
        batch.insert(piece.clone());
        self.commit("split", batch).await?;

        tracing::debug!(item_id = %stored.id, new_item_id = %piece.id, amount, version = stored.version, "stack split");
        Ok(Outcome {
            new_instance_id: Some(piece.id),
            created: vec![view(&piece, def)],
            ..Outcome::of(view(&stored, def))
        })
    }

    /// Moves as much of the source stack onto the target as fits. An emptied source is deleted.
    pub async fn merge_items(&self, actor: AccountId, req: MergeRequest) -> AppResult<Outcome> {
        let source_expected = require_version(req.source_version)?;
        let target_expected = require_version(req.target_version)?;
        if req.source_instance_id == req.target_instance_id {
            return Err(DomainError::InvalidItem("cannot merge an item with itself"));
        }

        let source = self.get_instance(req.source_instance_id).await?;
        let target = self.get_instance(req.target_instance_id).await?;

        let (source_access, _) = self.authorize_edit(actor, source.owner_id, req.lobby_id).await?;
        if source.owner_id != target.owner_id {
            let (target_access, _) = self.authorize_edit(actor, target.owner_id, req.lobby_id).await?;
            if !source_access.is_master || !target_access.is_master {
                return Err(DomainError::Forbidden);
            }
        }

        check_version(&source, source_expected)?;
        check_version(&target, target_expected)?;

        if source.definition_id != target.definition_id {
            return Err(DomainError::TemplateMismatch);
        }
        let def = self.catalog.get_definition(source.definition_id).await?;
        if !is_stackable(&def) {
            return Err(DomainError::NotStackable);
        }

        let room = effective_max_stack(&def) - target.amount;
        let moved = source.amount.min(room);
        if moved <= 0 {
            return Err(DomainError::MaxStackExceeded);
        }

        let mut next_target = target.clone();
        next_target.amount += moved;
        let mut next_source = source.clone();
        next_source.amount -= moved;

        let mut batch = InstanceBatch::new();
        let stored_target = batch.update(&next_target);
        let remaining = if next_source.amount == 0 {
            batch.delete(&source);
            None
        } else {
            Some(batch.update(&next_source))
        };
        self.commit("merge", batch).await?;

        tracing::debug!(source_id = %source.id, target_id = %target.id, moved, "stacks merged");
        Ok(Outcome {
            source: remaining.as_ref().map(|s| view(s, &def)),
            deleted_id: remaining.is_none().then_some(source.id),
            moved_amount: Some(moved),
            ..Outcome::of(view(&stored_target, &def))
        })
    }
}
