use crate::db::DbResult;
use crate::db::repo::lobby::LobbyRepo;
use crate::models::lobby::{Lobby, LobbyRole, Membership};
use crate::models::types::{AccountId, LobbyId};
use async_trait::async_trait;
use dashmap::DashMap;

#[derive(Default)]
pub struct MemoryLobbyRepo {
    lobbies: DashMap<LobbyId, Lobby>,
    // insertion order kept per lobby so `members` is stable
    members: DashMap<LobbyId, Vec<Membership>>,
}

impl MemoryLobbyRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a lobby. The admin joins as master.
    pub fn insert_lobby(&self, lobby: Lobby) {
        let admin = lobby.admin_id;
        let id = lobby.id;
        self.lobbies.insert(id, lobby);
        self.add_member(id, admin, LobbyRole::Master);
    }

    pub fn add_member(&self, lobby_id: LobbyId, user_id: AccountId, role: LobbyRole) {
        let mut list = self.members.entry(lobby_id).or_default();
        list.retain(|m| m.user_id != user_id);
        list.push(Membership { lobby_id, user_id, role });
    }
}

#[async_trait]
impl LobbyRepo for MemoryLobbyRepo {
    async fn get_lobby(&self, id: LobbyId) -> DbResult<Option<Lobby>> {
        Ok(self.lobbies.get(&id).map(|l| l.value().clone()))
    }

    async fn membership(&self, lobby_id: LobbyId, user_id: AccountId) -> DbResult<Option<Membership>> {
        Ok(self
            .members
            .get(&lobby_id)
            .and_then(|list| list.iter().find(|m| m.user_id == user_id).cloned()))
    }

    async fn members(&self, lobby_id: LobbyId) -> DbResult<Vec<Membership>> {
        Ok(self.members.get(&lobby_id).map(|l| l.value().clone()).unwrap_or_default())
    }
}
