//! Pure inventory rules. Nothing in here touches storage; the services load state, ask the
//! engine, and persist what it derives.

use crate::models::catalog::ItemDefinition;
use crate::models::types::DefinitionId;
use std::collections::HashMap;

pub mod capacity;
pub mod catalog;
pub mod containers;
pub mod permissions;
pub mod placement;

/// Definitions referenced by a set of instances, keyed by id.
pub type Definitions = HashMap<DefinitionId, ItemDefinition>;

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::models::catalog::{ItemDefinition, ItemType, Quality};
    use crate::models::types::DefinitionId;

    pub fn definition(type_name: &str, width: i32, height: i32) -> ItemDefinition {
        let item_type = ItemType::with_defaults(type_name);
        ItemDefinition {
            id: DefinitionId::new(),
            max_durability: if item_type.has_durability { Some(10) } else { None },
            item_type,
            name: format!("{type_name} {width}x{height}"),
            description: String::new(),
            width,
            height,
            weight: 1.0,
            max_stack: None,
            quality: Quality::Common,
            is_cloth: false,
            bag_width: 0,
            bag_height: 0,
            fast_width: 0,
            fast_height: 0,
            image_path: None,
            created_at: chrono::Utc::now(),
        }
    }

    pub fn backpack(bag_width: i32, bag_height: i32) -> ItemDefinition {
        ItemDefinition {
            is_cloth: true,
            bag_width,
            bag_height,
            ..definition("backpack", 2, 3)
        }
    }

    pub fn belt(fast_width: i32, fast_height: i32) -> ItemDefinition {
        ItemDefinition {
            fast_width,
            fast_height,
            ..definition("belt", 2, 1)
        }
    }
}
