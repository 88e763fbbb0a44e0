use crate::db::DbResult;
use crate::db::error::DbError;
use crate::models::catalog::{ItemDefinition, Quality};
use crate::models::container::ContainerId;
use crate::models::types::{AccountId, DefinitionId, InstanceId};
use serde::Serialize;
use tokio_postgres::Row;

/// An owned, placed unit of an item definition.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemInstance {
    pub id: InstanceId,
    pub owner_id: AccountId,
    pub definition_id: DefinitionId,
    pub container: ContainerId,
    /// 1-based grid position; `None` means not yet placed
    pub pos_x: Option<i32>,
    pub pos_y: Option<i32>,
    pub rotated: bool,
    pub durability_current: Option<i32>,
    pub amount: i32,
    pub custom_name: Option<String>,
    pub custom_description: Option<String>,
    /// Optimistic concurrency token, bumped by exactly one on every mutation
    pub version: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl ItemInstance {
    /// A fresh instance at version 1, not yet persisted.
    pub fn new(owner_id: AccountId, definition: &ItemDefinition, container: ContainerId) -> Self {
        let now = chrono::Utc::now();
        Self {
            id: InstanceId::new(),
            owner_id,
            definition_id: definition.id,
            container,
            pos_x: None,
            pos_y: None,
            rotated: false,
            durability_current: definition.max_durability,
            amount: 1,
            custom_name: None,
            custom_description: None,
            version: 1,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn try_from_row(row: &Row) -> DbResult<Self> {
        let container_s: String = row.try_get("container_id")?;
        let container = container_s.parse::<ContainerId>().map_err(DbError::Decode)?;

        Ok(Self {
            id: row.try_get("id")?,
            owner_id: row.try_get("owner_id")?,
            definition_id: row.try_get("definition_id")?,
            container,
            pos_x: row.try_get("pos_x")?,
            pos_y: row.try_get("pos_y")?,
            rotated: row.try_get("rotated")?,
            durability_current: row.try_get("durability_current")?,
            amount: row.try_get("amount")?,
            custom_name: row.try_get("custom_name")?,
            custom_description: row.try_get("custom_description")?,
            version: row.try_get("version")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    pub fn position(&self) -> Option<(i32, i32)> {
        match (self.pos_x, self.pos_y) {
            (Some(x), Some(y)) => Some((x, y)),
            _ => None,
        }
    }

    pub fn place(&mut self, container: ContainerId, x: i32, y: i32, rotated: bool) {
        self.container = container;
        self.pos_x = Some(x);
        self.pos_y = Some(y);
        self.rotated = rotated;
    }

    pub fn display_name<'a>(&'a self, definition: &'a ItemDefinition) -> &'a str {
        self.custom_name.as_deref().unwrap_or(&definition.name)
    }
}

/// Canonical instance + definition view returned to clients.
#[derive(Debug, Clone, Serialize)]
pub struct InstanceView {
    pub id: InstanceId,
    pub owner_id: AccountId,
    pub template_id: DefinitionId,
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub quality: Quality,
    pub container_id: ContainerId,
    pub pos_x: Option<i32>,
    pub pos_y: Option<i32>,
    pub rotated: u8,
    pub w: i32,
    pub h: i32,
    pub weight: f64,
    pub amount: i32,
    pub max_amount: i32,
    pub stackable: bool,
    pub durability_current: Option<i32>,
    pub max_durability: Option<i32>,
    pub is_cloth: bool,
    pub image_path: Option<String>,
    pub version: i64,
}
