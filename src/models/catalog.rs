use crate::db::DbResult;
use crate::db::error::DbError;
use crate::models::types::{DefinitionId, ItemTypeId};
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;

/// Item category shared by many definitions (`weapon`, `food`, `belt`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemType {
    pub id: ItemTypeId,
    /// Unique, lower-cased name
    pub name: String,
    pub stackable: bool,
    /// Default stack limit for definitions of this type
    pub max_amount: i32,
    pub has_durability: bool,
}

impl ItemType {
    /// Defaults applied when a type is first created by name.
    pub fn with_defaults(name: &str) -> Self {
        let (stackable, max_amount, has_durability) = match name {
            "food" | "potion" | "ammo" | "material" | "other" => (true, 20, false),
            "weapon" | "armor" | "shield" | "head" | "shirt" | "pants" | "boots" => (false, 1, true),
            _ => (false, 1, false),
        };

        Self {
            id: ItemTypeId::new(),
            name: name.to_string(),
            stackable,
            max_amount,
            has_durability,
        }
    }

    pub fn try_from_row(row: &Row) -> DbResult<Self> {
        Ok(Self {
            id: row.try_get("type_id")?,
            name: row.try_get("type_name")?,
            stackable: row.try_get("stackable")?,
            max_amount: row.try_get("max_amount")?,
            has_durability: row.try_get("has_durability")?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    #[default]
    Common,
    Uncommon,
    Epic,
    Legendary,
    Mythical,
}

impl Quality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Quality::Common => "common",
            Quality::Uncommon => "uncommon",
            Quality::Epic => "epic",
            Quality::Legendary => "legendary",
            Quality::Mythical => "mythical",
        }
    }
}

impl core::str::FromStr for Quality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "common" => Ok(Quality::Common),
            "uncommon" => Ok(Quality::Uncommon),
            "epic" => Ok(Quality::Epic),
            "legendary" => Ok(Quality::Legendary),
            "mythical" => Ok(Quality::Mythical),
            _ => Err(format!("unknown quality: {s}")),
        }
    }
}

/// Template from which item instances are created. Write-once, apart from the image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDefinition {
    pub id: DefinitionId,
    pub item_type: ItemType,
    pub name: String,
    pub description: String,
    /// Unrotated footprint
    pub width: i32,
    pub height: i32,
    pub weight: f64,
    pub max_durability: Option<i32>,
    /// Overrides the type's `max_amount` when set
    pub max_stack: Option<i32>,
    pub quality: Quality,
    /// Cloth items with positive bag dimensions become a container when equipped
    pub is_cloth: bool,
    pub bag_width: i32,
    pub bag_height: i32,
    /// Belt fast-slot grid
    pub fast_width: i32,
    pub fast_height: i32,
    pub image_path: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl ItemDefinition {
    pub fn try_from_row(row: &Row) -> DbResult<Self> {
        let quality_s: String = row.try_get("quality")?;
        let quality = quality_s.parse::<Quality>().map_err(DbError::Decode)?;

        Ok(Self {
            id: row.try_get("id")?,
            item_type: ItemType::try_from_row(row)?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            width: row.try_get("width")?,
            height: row.try_get("height")?,
            weight: row.try_get("weight")?,
            max_durability: row.try_get("max_durability")?,
            max_stack: row.try_get("max_stack")?,
            quality,
            is_cloth: row.try_get("is_cloth")?,
            bag_width: row.try_get("bag_width")?,
            bag_height: row.try_get("bag_height")?,
            fast_width: row.try_get("fast_width")?,
            fast_height: row.try_get("fast_height")?,
            image_path: row.try_get("image_path")?,
            created_at: row.try_get("created_at")?,
        })
    }

    pub fn type_name(&self) -> &str {
        &self.item_type.name
    }

    pub fn has_bag(&self) -> bool {
        self.is_cloth && self.bag_width > 0 && self.bag_height > 0
    }

    pub fn has_fast_slots(&self) -> bool {
        self.item_type.name == "belt" && self.fast_width > 0 && self.fast_height > 0
    }
}

/// Input for creating a definition through the master workflow.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewDefinition {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub quality: Quality,
    pub width: i32,
    pub height: i32,
    #[serde(default)]
    pub weight: f64,
    pub max_durability: Option<i32>,
    #[serde(alias = "max_amount")]
    pub max_stack: Option<i32>,
    #[serde(default)]
    pub is_cloth: bool,
    #[serde(default)]
    pub bag_width: i32,
    #[serde(default)]
    pub bag_height: i32,
    #[serde(default, alias = "fast_w")]
    pub fast_width: i32,
    #[serde(default, alias = "fast_h")]
    pub fast_height: i32,
}
