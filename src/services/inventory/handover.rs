use super::{InventoryService, ItemRequest, Outcome, TransferRequest, check_version, require_version, view};
use crate::db::repo::InstanceBatch;
use crate::engine::catalog::is_stackable;
use crate::engine::placement::auto_place;
use crate::error::{AppResult, DomainError};
use crate::models::catalog::ItemDefinition;
use crate::models::container::ContainerId;
use crate::models::instance::ItemInstance;
use crate::models::types::AccountId;

impl InventoryService {
    /// Finds a spot in `recipient`'s main inventory for an item of `def`.
    async fn place_in_main(
        &self,
        recipient: AccountId,
        def: &ItemDefinition,
        prefer_rotated: bool,
    ) -> AppResult<(i32, i32, bool)> {
        let inv = self.load_inventory(recipient).await?;
        let container = inv
            .container(ContainerId::Main)
            .ok_or_else(|| DomainError::InvalidContainer(ContainerId::Main.to_string()))?;

        let grid = inv.grid(&container, &[]);
        let spot = auto_place(&container, &grid, def, prefer_rotated).ok_or(DomainError::NoSpace)?;
        Ok((spot.x, spot.y, spot.rotated))
    }

    /// Masters destroy dropped items. Everyone else hands them to the lobby's master.
    pub async fn drop_item(&self, actor: AccountId, req: ItemRequest) -> AppResult<Outcome> {
        let expected = require_version(req.version)?;
        let inst = self.get_instance(req.item_id).await?;
        let (access, ctx) = self.authorize_edit(actor, inst.owner_id, req.lobby_id).await?;
        check_version(&inst, expected)?;

        let inv = self.load_inventory(inst.owner_id).await?;
        let def = inv.definition(&inst)?;
        inv.ensure_no_dependents(&inst)?;

        let mut batch = InstanceBatch::new();

        if access.is_master {
            batch.delete(&inst);
            self.commit("drop", batch).await?;

            tracing::info!(item_id = %inst.id, %actor, "item destroyed by master");
            return Ok(Outcome {
                deleted_id: Some(inst.id),
                ..Outcome::default()
            });
        }

        let master = ctx.map(|c| c.lobby.admin_id).ok_or(DomainError::MissingMaster)?;
        let (x, y, rotated) = self.place_in_main(master, def, inst.rotated).await?;

        let mut next = inst.clone();
        next.owner_id = master;
        next.place(ContainerId::Main, x, y, rotated);
        let stored = batch.update(&next);
        self.commit("drop", batch).await?;

        tracing::info!(item_id = %stored.id, %actor, %master, "item handed to master");
        Ok(Outcome::of(view(&stored, def)))
    }

    /// Gives all or part of a stack to another member of the lobby.
    pub async fn transfer_item(&self, actor: AccountId, req: TransferRequest) -> AppResult<Outcome> {
        let expected = require_version(req.version)?;
        let lobby_id = req.lobby_id.ok_or(DomainError::NotInLobby)?;
        let inst = self.get_instance(req.item_id).await?;
        let sender = inst.owner_id;

        let (_, ctx) = self.authorize_edit(actor, sender, Some(lobby_id)).await?;
        let Some(ctx) = ctx else {
            return Err(DomainError::NotInLobby);
        };
        if !ctx.owner_is_member(sender) {
            return Err(DomainError::NotInLobby);
        }
        if req.recipient_id == sender || !self.is_member(&ctx, req.recipient_id).await? {
            return Err(DomainError::InvalidRecipient);
        }
        check_version(&inst, expected)?;

        let inv = self.load_inventory(sender).await?;
        let def = inv.definition(&inst)?;

        let amount = req.amount.unwrap_or(inst.amount);
        if !is_stackable(def) && amount != 1 {
            return Err(DomainError::InvalidAmount);
        }
        if amount < 1 || amount > inst.amount {
            return Err(DomainError::InvalidAmount);
        }
        let whole = amount == inst.amount;
        if whole {
            inv.ensure_no_dependents(&inst)?;
        }

        let (x, y, rotated) = self.place_in_main(req.recipient_id, def, inst.rotated).await?;
        let mut batch = InstanceBatch::new();

        let outcome = if whole {
            let mut next = inst.clone();
            next.owner_id = req.recipient_id;
            next.place(ContainerId::Main, x, y, rotated);
            let stored = batch.update(&next);
            self.commit("transfer", batch).await?;
            Outcome::of(view(&stored, def))
        } else {
            let mut piece = ItemInstance::new(req.recipient_id, def, ContainerId::Main);
            piece.amount = amount;
            piece.custom_name = inst.custom_name.clone();
            piece.custom_description = inst.custom_description.clone();
            piece.place(ContainerId::Main, x, y, rotated);

            let mut source = inst.clone();
            source.amount -= amount;
            let remaining = batch.update(&source);
            batch.insert(piece.clone());
            self.commit("transfer", batch).await?;

            Outcome {
                source: Some(view(&remaining, def)),
                new_instance_id: Some(piece.id),
                ..Outcome::of(view(&piece, def))
            }
        };

        tracing::info!(item_id = %inst.id, from = %sender, to = %req.recipient_id, amount, "item transferred");
        Ok(Outcome {
            moved_amount: Some(amount),
            ..outcome
        })
    }
}
