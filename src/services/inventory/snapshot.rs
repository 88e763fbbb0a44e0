use crate::engine::capacity::carried_weight;
use crate::engine::catalog::{effective_max_stack, is_stackable, max_durability};
use crate::engine::containers::containers_for;
use crate::engine::permissions::Access;
use crate::error::{AppResult, DomainError};
use crate::models::catalog::ItemDefinition;
use crate::models::container::Container;
use crate::models::instance::{InstanceView, ItemInstance};
use crate::models::types::{AccountId, LobbyId};
use crate::services::InventoryService;
use serde::Serialize;

pub fn view(inst: &ItemInstance, def: &ItemDefinition) -> InstanceView {
    InstanceView {
        id: inst.id,
        owner_id: inst.owner_id,
        template_id: def.id,
        name: inst.display_name(def).to_string(),
        description: inst
            .custom_description
            .clone()
            .unwrap_or_else(|| def.description.clone()),
        type_name: def.item_type.name.clone(),
        quality: def.quality,
        container_id: inst.container,
        pos_x: inst.pos_x,
        pos_y: inst.pos_y,
        rotated: u8::from(inst.rotated),
        w: def.width,
        h: def.height,
        weight: def.weight,
        amount: inst.amount,
        max_amount: effective_max_stack(def),
        stackable: is_stackable(def),
        durability_current: inst.durability_current,
        max_durability: max_durability(def),
        is_cloth: def.is_cloth,
        image_path: def.image_path.clone(),
        version: inst.version,
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Weight {
    pub current: f64,
    pub capacity: f64,
}

/// Everything a client needs to draw one inventory.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub user: AccountId,
    pub containers: Vec<Container>,
    pub items: Vec<InstanceView>,
    pub weight: Weight,
    pub permissions: Access,
}

impl InventoryService {
    pub async fn snapshot(&self, actor: AccountId, owner: AccountId, lobby_id: Option<LobbyId>) -> AppResult<Snapshot> {
        let (access, _) = self.authorize(actor, owner, lobby_id).await?;
        if !access.can_view {
            tracing::debug!(%actor, %owner, "inventory view refused");
            return Err(DomainError::Forbidden);
        }

        let inv = self.load_inventory(owner).await?;

        let items = inv
            .items
            .iter()
            .filter_map(|i| inv.definitions.get(&i.definition_id).map(|d| view(i, d)))
            .collect();

        let strength = self
            .characters
            .strength(owner)
            .await?
            .unwrap_or(self.default_strength);

        Ok(Snapshot {
            user: owner,
            containers: containers_for(owner, &inv.items, &inv.definitions),
            items,
            weight: Weight {
                current: carried_weight(&inv.items, &inv.definitions),
                capacity: self.capacity.capacity(strength),
            },
            permissions: access,
        })
    }
}
