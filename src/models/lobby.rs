use crate::db::DbResult;
use crate::db::error::DbError;
use crate::models::types::{AccountId, LobbyId};
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LobbyRole {
    Master,
    Player,
    Spectator,
}

impl core::str::FromStr for LobbyRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "master" => Ok(LobbyRole::Master),
            "player" => Ok(LobbyRole::Player),
            "spectator" => Ok(LobbyRole::Spectator),
            _ => Err(format!("unknown lobby role: {s}")),
        }
    }
}

/// Lobby facts owned by the lobby collaborator. Read-only here.
#[derive(Debug, Clone)]
pub struct Lobby {
    pub id: LobbyId,
    pub name: String,
    pub admin_id: AccountId,
}

impl Lobby {
    pub fn try_from_row(row: &Row) -> DbResult<Self> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            admin_id: row.try_get("admin_id")?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct Membership {
    pub lobby_id: LobbyId,
    pub user_id: AccountId,
    pub role: LobbyRole,
}

impl Membership {
    pub fn try_from_row(row: &Row) -> DbResult<Self> {
        let role_s: String = row.try_get("role")?;
        let role = role_s.parse::<LobbyRole>().map_err(DbError::Decode)?;

        Ok(Self {
            lobby_id: row.try_get("lobby_id")?,
            user_id: row.try_get("user_id")?,
            role,
        })
    }
}
