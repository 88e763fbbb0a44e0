use crate::db::DbResult;
use crate::models::lobby::{Lobby, Membership};
use crate::models::types::{AccountId, LobbyId};

/// Lobby facts the inventory engine needs from the lobby collaborator. Read-only.
#[async_trait::async_trait]
pub trait LobbyRepo: Send + Sync {
    async fn get_lobby(&self, id: LobbyId) -> DbResult<Option<Lobby>>;

    /// Membership of `user_id` in `lobby_id`, if any
    async fn membership(&self, lobby_id: LobbyId, user_id: AccountId) -> DbResult<Option<Membership>>;

    async fn members(&self, lobby_id: LobbyId) -> DbResult<Vec<Membership>>;
}
