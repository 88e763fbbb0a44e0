mod handover;
mod items;
mod master;
mod requests;
mod snapshot;
mod stack;


pub use requests::{
    CreateDefinitionRequest, IssueOptions, IssueRequest, ItemRequest, MergeRequest, MoveRequest, Outcome,
    SetDurabilityRequest, SplitRequest, TransferRequest,
};
pub use snapshot::{Snapshot, Weight, view};

use crate::db::error::DbError;
use crate::db::repo::{CharacterRepo, InstanceBatch, InstanceRepo, LobbyRepo};
use crate::engine::Definitions;
use crate::engine::capacity::CapacityPolicy;
use crate::engine::containers::resolve_container;
use crate::engine::permissions::{Access, LobbyContext, evaluate};
use crate::engine::placement::{Grid, Placement, auto_place, can_place};
use crate::error::{AppResult, DomainError};
use crate::models::catalog::ItemDefinition;
use crate::models::container::{Container, ContainerId};
use crate::models::instance::ItemInstance;
use crate::models::types::{AccountId, InstanceId, LobbyId};
use crate::services::{CatalogService, MediaStore};
use std::sync::Arc;

/// One owner's instances together with the definitions they reference.
pub(crate) struct Inventory {
    pub owner: AccountId,
    pub items: Vec<ItemInstance>,
    pub definitions: Definitions,
}

impl Inventory {
    pub fn definition(&self, inst: &ItemInstance) -> AppResult<&ItemDefinition> {
        self.definitions
            .get(&inst.definition_id)
            .ok_or_else(|| DomainError::NotFound(format!("definition {}", inst.definition_id)))
    }

    pub fn container(&self, id: ContainerId) -> Option<Container> {
        resolve_container(id, self.owner, &self.items, &self.definitions)
    }

    pub fn grid(&self, container: &Container, exclude: &[InstanceId]) -> Grid {
        Grid::of(container, &self.items, &self.definitions, exclude)
    }

    /// Fails when `inst` backs a bag or fast-slot container that still holds something.
    pub fn ensure_no_dependents(&self, inst: &ItemInstance) -> AppResult<()> {
        for item in &self.items {
            match item.container {
                ContainerId::Bag(id) if id == inst.id => return Err(DomainError::BackpackNotEmpty),
                ContainerId::Fast(id) if id == inst.id => return Err(DomainError::BeltNotEmpty),
                _ => {}
            }
        }
        Ok(())
    }
}

pub struct InventoryService {
    instances: Arc<dyn InstanceRepo>,
    lobbies: Arc<dyn LobbyRepo>,
    characters: Arc<dyn CharacterRepo>,
    catalog: Arc<CatalogService>,
    media: Arc<dyn MediaStore>,
    capacity: Arc<dyn CapacityPolicy>,
    default_strength: i32,
}

/// Largest amount a single issue request may create.
pub const MAX_ISSUE_AMOUNT: i32 = 999;

pub(crate) fn require_version(version: Option<i64>) -> AppResult<i64> {
    match version {
        Some(v) if v > 0 => Ok(v),
        _ => Err(DomainError::MissingVersion),
    }
}

pub(crate) fn check_version(inst: &ItemInstance, expected: i64) -> AppResult<()> {
    if inst.version != expected {
        tracing::warn!(item_id = %inst.id, expected, actual = inst.version, "stale version presented");
        return Err(DomainError::Conflict {
            expected,
            actual: inst.version,
        });
    }
    Ok(())
}

impl InventoryService {
    pub fn new(
        instances: Arc<dyn InstanceRepo>,
        lobbies: Arc<dyn LobbyRepo>,
        characters: Arc<dyn CharacterRepo>,
        catalog: Arc<CatalogService>,
        media: Arc<dyn MediaStore>,
        capacity: Arc<dyn CapacityPolicy>,
        default_strength: i32,
    ) -> Self {
        Self {
            instances,
            lobbies,
            characters,
            catalog,
            media,
            capacity,
            default_strength,
        }
    }

    // ========================================================================
    // LOADING & AUTHORIZATION
    // ========================================================================

    pub(crate) async fn get_instance(&self, id: InstanceId) -> AppResult<ItemInstance> {
        self.instances
            .get(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("item {id}")))
    }

    pub(crate) async fn load_inventory(&self, owner: AccountId) -> AppResult<Inventory> {
        let items = self.instances.list_for_owner(owner).await?;
        let definitions = self.catalog.definitions_for(&items).await?;
        Ok(Inventory {
            owner,
            items,
            definitions,
        })
    }

    pub(crate) async fn lobby_context(
        &self,
        lobby_id: LobbyId,
        actor: AccountId,
        owner: AccountId,
    ) -> AppResult<LobbyContext> {
        let lobby = self
            .lobbies
            .get_lobby(lobby_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("lobby {lobby_id}")))?;

        let actor_role = self.lobbies.membership(lobby_id, actor).await?.map(|m| m.role);
        let owner_role = if owner == actor {
            actor_role
        } else {
            self.lobbies.membership(lobby_id, owner).await?.map(|m| m.role)
        };

        Ok(LobbyContext {
            lobby,
            actor_role,
            owner_role,
        })
    }

    /// Access of `actor` to `owner`'s inventory. Acting on someone else requires a lobby.
    pub(crate) async fn authorize(
        &self,
        actor: AccountId,
        owner: AccountId,
        lobby_id: Option<LobbyId>,
    ) -> AppResult<(Access, Option<LobbyContext>)> {
        let ctx = match lobby_id {
            Some(id) => Some(self.lobby_context(id, actor, owner).await?),
            None => None,
        };
        Ok((evaluate(actor, owner, ctx.as_ref()), ctx))
    }

    pub(crate) async fn authorize_edit(
        &self,
        actor: AccountId,
        owner: AccountId,
        lobby_id: Option<LobbyId>,
    ) -> AppResult<(Access, Option<LobbyContext>)> {
        let (access, ctx) = self.authorize(actor, owner, lobby_id).await?;
        if !access.can_edit {
            tracing::debug!(%actor, %owner, "edit refused");
            return Err(DomainError::Forbidden);
        }
        Ok((access, ctx))
    }

    pub(crate) async fn is_member(&self, ctx: &LobbyContext, user: AccountId) -> AppResult<bool> {
        if ctx.lobby.admin_id == user {
            return Ok(true);
        }
        Ok(self.lobbies.membership(ctx.lobby.id, user).await?.is_some())
    }

    /// Applies `batch`, logging how it failed.
    pub(crate) async fn commit(&self, op: &'static str, batch: InstanceBatch) -> AppResult<()> {
        match self.instances.apply(batch).await {
            Ok(()) => Ok(()),
            Err(DbError::VersionConflict { id }) => {
                tracing::warn!(op, item_id = %id, "concurrent write detected, batch rejected");
                Err(DbError::VersionConflict { id }.into())
            }
            Err(e) => {
                tracing::error!(op, error = %e, "persisting inventory change failed");
                Err(e.into())
            }
        }
    }

    // ========================================================================
    // MOVE & ROTATE
    // ========================================================================

    pub async fn move_item(&self, actor: AccountId, req: MoveRequest) -> AppResult<Outcome> {
        let expected = require_version(req.version)?;
        let inst = self.get_instance(req.item_id).await?;
        self.authorize_edit(actor, inst.owner_id, req.lobby_id).await?;
        check_version(&inst, expected)?;

        let raw = req.container_id.as_deref().map(str::trim).unwrap_or_default();
        if raw.is_empty() {
            return Err(DomainError::MissingContainer);
        }
        let target: ContainerId = raw.parse().map_err(DomainError::InvalidContainer)?;
        if target.backing_instance() == Some(inst.id) {
            return Err(DomainError::InvalidContainer(format!("{target} is carried by the item itself")));
        }

        let inv = self.load_inventory(inst.owner_id).await?;
        let def = inv.definition(&inst)?;
        let container = inv
            .container(target)
            .ok_or_else(|| DomainError::InvalidContainer(target.to_string()))?;

        if !container.accepts_type(def.type_name()) {
            return Err(DomainError::TypeMismatch {
                container: target.to_string(),
                type_name: def.type_name().to_string(),
            });
        }
        if target != inst.container {
            inv.ensure_no_dependents(&inst)?;
        }

        let rotated = req.rotated.unwrap_or(inst.rotated && container.rotatable);
        if rotated && !container.rotatable {
            return Err(DomainError::RotationNotAllowed);
        }

        let grid = inv.grid(&container, &[inst.id]);
        let placement = match (req.pos_x, req.pos_y) {
            (Some(x), Some(y)) => {
                can_place(&container, &grid, def, x, y, rotated)?;
                Placement { x, y, rotated }
            }
            _ => auto_place(&container, &grid, def, rotated).ok_or(DomainError::NoSpace)?,
        };

        let mut next = inst.clone();
        next.place(target, placement.x, placement.y, placement.rotated);

        let mut batch = InstanceBatch::new();
        let stored = batch.update(&next);
        self.commit("move", batch).await?;

        tracing::debug!(item_id = %stored.id, %actor, container = %target, x = placement.x, y = placement.y, version = stored.version, "item moved");
        Ok(Outcome::of(view(&stored, def)))
    }

    pub async fn rotate_item(&self, actor: AccountId, req: ItemRequest) -> AppResult<Outcome> {
        let expected = require_version(req.version)?;
        let inst = self.get_instance(req.item_id).await?;
        self.authorize_edit(actor, inst.owner_id, req.lobby_id).await?;
        check_version(&inst, expected)?;

        let inv = self.load_inventory(inst.owner_id).await?;
        let def = inv.definition(&inst)?;
        let container = inv
            .container(inst.container)
            .ok_or_else(|| DomainError::InvalidContainer(inst.container.to_string()))?;

        if !container.rotatable {
            return Err(DomainError::RotationNotAllowed);
        }
        let (x, y) = inst.position().ok_or(DomainError::InvalidRotation)?;

        let grid = inv.grid(&container, &[inst.id]);
        can_place(&container, &grid, def, x, y, !inst.rotated).map_err(|_| DomainError::InvalidRotation)?;

        let mut next = inst.clone();
        next.rotated = !inst.rotated;

        let mut batch = InstanceBatch::new();
        let stored = batch.update(&next);
        self.commit("rotate", batch).await?;

        tracing::debug!(item_id = %stored.id, %actor, rotated = stored.rotated, version = stored.version, "item rotated");
        Ok(Outcome::of(view(&stored, def)))
    }
}
