use crate::models::types::InstanceId;
use serde::{Serialize, Serializer};

/// Equipment and ready slots. Each holds a single item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EquipSlot {
    Head,
    Shirt,
    Pants,
    Armor,
    Boots,
    Back,
    Amulet,
    Belt,
    Shield,
    WeaponMain,
}

impl EquipSlot {
    pub const ALL: [EquipSlot; 10] = [
        EquipSlot::Head,
        EquipSlot::Shirt,
        EquipSlot::Pants,
        EquipSlot::Armor,
        EquipSlot::Boots,
        EquipSlot::Back,
        EquipSlot::Amulet,
        EquipSlot::Belt,
        EquipSlot::Shield,
        EquipSlot::WeaponMain,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EquipSlot::Head => "equip_head",
            EquipSlot::Shirt => "equip_shirt",
            EquipSlot::Pants => "equip_pants",
            EquipSlot::Armor => "equip_armor",
            EquipSlot::Boots => "equip_boots",
            EquipSlot::Back => "equip_back",
            EquipSlot::Amulet => "equip_amulet",
            EquipSlot::Belt => "equip_belt",
            EquipSlot::Shield => "equip_shield",
            EquipSlot::WeaponMain => "slot_weapon_main",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        EquipSlot::ALL.into_iter().find(|slot| slot.as_str() == s)
    }
}

/// Identifier of a container as it travels over the wire and through the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerId {
    Main,
    Hands,
    Equip(EquipSlot),
    /// Bag grid of an equipped cloth item
    Bag(InstanceId),
    /// Fast slots of an equipped belt
    Fast(InstanceId),
}

impl ContainerId {
    pub fn is_equipment(&self) -> bool {
        matches!(self, ContainerId::Equip(_))
    }

    /// Instance backing a dynamic container, if any.
    pub fn backing_instance(&self) -> Option<InstanceId> {
        match self {
            ContainerId::Bag(id) | ContainerId::Fast(id) => Some(*id),
            _ => None,
        }
    }
}

impl core::fmt::Display for ContainerId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ContainerId::Main => f.write_str("inv_main"),
            ContainerId::Hands => f.write_str("hands"),
            ContainerId::Equip(slot) => f.write_str(slot.as_str()),
            ContainerId::Bag(id) => write!(f, "bag:{id}"),
            ContainerId::Fast(id) => write!(f, "fast:{id}"),
        }
    }
}

impl core::str::FromStr for ContainerId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s {
            "inv_main" => return Ok(ContainerId::Main),
            "hands" => return Ok(ContainerId::Hands),
            _ => {}
        }

        if let Some(slot) = EquipSlot::parse(s) {
            return Ok(ContainerId::Equip(slot));
        }

        if let Some(rest) = s.strip_prefix("bag:") {
            return rest
                .parse::<InstanceId>()
                .map(ContainerId::Bag)
                .map_err(|e| format!("invalid bag container {s}: {e}"));
        }
        if let Some(rest) = s.strip_prefix("fast:") {
            return rest
                .parse::<InstanceId>()
                .map(ContainerId::Fast)
                .map_err(|e| format!("invalid fast container {s}: {e}"));
        }

        Err(format!("unknown container: {s}"))
    }
}

impl Serialize for ContainerId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerKind {
    /// Free grid (main inventory, hands)
    Grid,
    /// Single-occupant equipment slot
    Slot,
    Bag,
    Fast,
}

/// Resolved descriptor of a container. Never stored; derived on every access.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Container {
    pub id: ContainerId,
    pub label: String,
    #[serde(rename = "w")]
    pub width: i32,
    #[serde(rename = "h")]
    pub height: i32,
    /// Allowed item types; `None` accepts anything
    pub accepts: Option<&'static [&'static str]>,
    pub kind: ContainerKind,
    pub rotatable: bool,
    /// Backing bag is worn out (durability 0)
    pub broken: bool,
}

impl Container {
    pub fn accepts_type(&self, type_name: &str) -> bool {
        match self.accepts {
            Some(list) => list.contains(&type_name),
            None => true,
        }
    }

    pub fn is_slot(&self) -> bool {
        self.kind == ContainerKind::Slot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn container_ids_parse_and_display() {
        let id = InstanceId::from_u128(7);
        for s in ["inv_main", "hands", "equip_back", "slot_weapon_main"] {
            assert_eq!(s.parse::<ContainerId>().unwrap().to_string(), s);
        }

        let bag: ContainerId = format!("bag:{id}").parse().unwrap();
        assert_eq!(bag, ContainerId::Bag(id));
        assert_eq!(bag.backing_instance(), Some(id));

        let fast: ContainerId = format!("fast:{id}").parse().unwrap();
        assert_eq!(fast, ContainerId::Fast(id));
    }

    #[test]
    fn unknown_containers_are_rejected() {
        assert!("inv_side".parse::<ContainerId>().is_err());
        assert!("bag:not-a-uuid".parse::<ContainerId>().is_err());
        assert!("".parse::<ContainerId>().is_err());
    }
}
