use crate::engine::Definitions;
use crate::engine::catalog::has_durability;
use crate::models::container::{Container, ContainerId, ContainerKind, EquipSlot};
use crate::models::instance::ItemInstance;
use crate::models::types::AccountId;
use once_cell::sync::Lazy;

pub const MAIN_WIDTH: i32 = 12;
pub const MAIN_HEIGHT: i32 = 8;
pub const HANDS_WIDTH: i32 = 4;
pub const HANDS_HEIGHT: i32 = 4;

fn slot_accepts(slot: EquipSlot) -> &'static [&'static str] {
    match slot {
        EquipSlot::Head => &["head"],
        EquipSlot::Shirt => &["shirt"],
        EquipSlot::Pants => &["pants"],
        EquipSlot::Armor => &["armor"],
        EquipSlot::Boots => &["boots"],
        EquipSlot::Back => &["backpack"],
        EquipSlot::Amulet => &["amulet"],
        EquipSlot::Belt => &["belt"],
        EquipSlot::Shield => &["shield"],
        EquipSlot::WeaponMain => &["weapon"],
    }
}

fn slot_label(slot: EquipSlot) -> &'static str {
    match slot {
        EquipSlot::Head => "Head",
        EquipSlot::Shirt => "Shirt",
        EquipSlot::Pants => "Pants",
        EquipSlot::Armor => "Armor",
        EquipSlot::Boots => "Boots",
        EquipSlot::Back => "Back",
        EquipSlot::Amulet => "Amulet",
        EquipSlot::Belt => "Belt",
        EquipSlot::Shield => "Shield",
        EquipSlot::WeaponMain => "Main weapon",
    }
}

static STATIC_CONTAINERS: Lazy<Vec<Container>> = Lazy::new(|| {
    let mut list = vec![
        Container {
            id: ContainerId::Main,
            label: "Inventory".to_string(),
            width: MAIN_WIDTH,
            height: MAIN_HEIGHT,
            accepts: None,
            kind: ContainerKind::Grid,
            rotatable: true,
            broken: false,
        },
        Container {
            id: ContainerId::Hands,
            label: "Hands".to_string(),
            width: HANDS_WIDTH,
            height: HANDS_HEIGHT,
            accepts: None,
            kind: ContainerKind::Grid,
            rotatable: true,
            broken: false,
        },
    ];

    list.extend(EquipSlot::ALL.into_iter().map(|slot| Container {
        id: ContainerId::Equip(slot),
        label: slot_label(slot).to_string(),
        width: 1,
        height: 1,
        accepts: Some(slot_accepts(slot)),
        kind: ContainerKind::Slot,
        rotatable: false,
        broken: false,
    }));

    list
});

pub fn static_containers() -> &'static [Container] {
    &STATIC_CONTAINERS
}

/// Resolves `id` against the owner's current instances. Dynamic containers exist only while
/// their backing instance is equipped and has the right shape; nothing is cached.
pub fn resolve_container(
    id: ContainerId,
    owner: AccountId,
    instances: &[ItemInstance],
    definitions: &Definitions,
) -> Option<Container> {
    match id {
        ContainerId::Main | ContainerId::Hands | ContainerId::Equip(_) => {
            static_containers().iter().find(|c| c.id == id).cloned()
        }
        ContainerId::Bag(backing_id) => {
            let backing = instances.iter().find(|i| i.id == backing_id)?;
            if backing.owner_id != owner || !backing.container.is_equipment() {
                return None;
            }
            let def = definitions.get(&backing.definition_id)?;
            if !def.has_bag() {
                return None;
            }

            Some(Container {
                id,
                label: backing.display_name(def).to_string(),
                width: def.bag_width,
                height: def.bag_height,
                accepts: None,
                kind: ContainerKind::Bag,
                rotatable: true,
                broken: has_durability(def) && backing.durability_current == Some(0),
            })
        }
        ContainerId::Fast(backing_id) => {
            let backing = instances.iter().find(|i| i.id == backing_id)?;
            if backing.owner_id != owner || backing.container != ContainerId::Equip(EquipSlot::Belt) {
                return None;
            }
            let def = definitions.get(&backing.definition_id)?;
            if !def.has_fast_slots() {
                return None;
            }

            Some(Container {
                id,
                label: format!("{} (fast slots)", backing.display_name(def)),
                width: def.fast_width,
                height: def.fast_height,
                accepts: None,
                kind: ContainerKind::Fast,
                rotatable: true,
                broken: false,
            })
        }
    }
}

/// Every static container followed by every dynamic container that currently resolves.
pub fn containers_for(owner: AccountId, instances: &[ItemInstance], definitions: &Definitions) -> Vec<Container> {
    let mut list = static_containers().to_vec();

    for inst in instances.iter().filter(|i| i.owner_id == owner && i.container.is_equipment()) {
        for candidate in [ContainerId::Bag(inst.id), ContainerId::Fast(inst.id)] {
            if let Some(container) = resolve_container(candidate, owner, instances, definitions) {
                list.push(container);
            }
        }
    }

    list
}

/// Dynamic containers that `instance` currently backs.
pub fn backed_by(instance: &ItemInstance) -> [ContainerId; 2] {
    [ContainerId::Bag(instance.id), ContainerId::Fast(instance.id)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::fixtures::{backpack, belt, definition};
    use crate::models::catalog::ItemDefinition;

    fn defs(list: &[&ItemDefinition]) -> Definitions {
        list.iter().map(|d| (d.id, (*d).clone())).collect()
    }

    #[test]
    fn static_table() {
        let owner = AccountId::new();
        let main = resolve_container(ContainerId::Main, owner, &[], &Definitions::new()).unwrap();
        assert_eq!((main.width, main.height), (12, 8));
        assert!(main.accepts_type("anything"));

        let hands = resolve_container(ContainerId::Hands, owner, &[], &Definitions::new()).unwrap();
        assert_eq!((hands.width, hands.height), (4, 4));

        let back = resolve_container(ContainerId::Equip(EquipSlot::Back), owner, &[], &Definitions::new()).unwrap();
        assert!(back.is_slot());
        assert!(back.accepts_type("backpack"));
        assert!(!back.accepts_type("weapon"));

        let weapon = resolve_container(ContainerId::Equip(EquipSlot::WeaponMain), owner, &[], &Definitions::new()).unwrap();
        assert!(weapon.accepts_type("weapon"));
        assert!(!weapon.rotatable);
    }

    #[test]
    fn bag_resolves_only_while_equipped() {
        let owner = AccountId::new();
        let bag_def = backpack(4, 3);
        let definitions = defs(&[&bag_def]);

        let mut bag = ItemInstance::new(owner, &bag_def, ContainerId::Main);
        let id = ContainerId::Bag(bag.id);
        assert!(resolve_container(id, owner, std::slice::from_ref(&bag), &definitions).is_none());

        bag.place(ContainerId::Equip(EquipSlot::Back), 1, 1, false);
        let resolved = resolve_container(id, owner, std::slice::from_ref(&bag), &definitions).unwrap();
        assert_eq!((resolved.width, resolved.height), (4, 3));
        assert_eq!(resolved.kind, ContainerKind::Bag);

        // Someone else's bag never resolves for us
        assert!(resolve_container(id, AccountId::new(), std::slice::from_ref(&bag), &definitions).is_none());
    }

    #[test]
    fn non_cloth_items_have_no_bag() {
        let owner = AccountId::new();
        let helmet_def = definition("head", 2, 2);
        let definitions = defs(&[&helmet_def]);

        let mut helmet = ItemInstance::new(owner, &helmet_def, ContainerId::Main);
        helmet.place(ContainerId::Equip(EquipSlot::Head), 1, 1, false);

        assert!(resolve_container(ContainerId::Bag(helmet.id), owner, &[helmet], &definitions).is_none());
    }

    #[test]
    fn fast_slots_require_belt_slot() {
        let owner = AccountId::new();
        let belt_def = belt(3, 1);
        let definitions = defs(&[&belt_def]);

        let mut strap = ItemInstance::new(owner, &belt_def, ContainerId::Main);
        strap.place(ContainerId::Equip(EquipSlot::Belt), 1, 1, false);

        let fast = resolve_container(ContainerId::Fast(strap.id), owner, std::slice::from_ref(&strap), &definitions).unwrap();
        assert_eq!((fast.width, fast.height), (3, 1));

        let all = containers_for(owner, std::slice::from_ref(&strap), &definitions);
        assert_eq!(all.len(), static_containers().len() + 1);
        assert_eq!(all.last().map(|c| c.id), Some(ContainerId::Fast(strap.id)));
    }

    #[test]
    fn worn_out_bag_is_flagged_broken() {
        let owner = AccountId::new();
        let mut bag_def = backpack(2, 2);
        bag_def.max_durability = Some(5);
        let definitions = defs(&[&bag_def]);

        let mut bag = ItemInstance::new(owner, &bag_def, ContainerId::Main);
        bag.place(ContainerId::Equip(EquipSlot::Back), 1, 1, false);
        bag.durability_current = Some(0);

        let resolved = resolve_container(ContainerId::Bag(bag.id), owner, &[bag], &definitions).unwrap();
        assert!(resolved.broken);
    }
}
