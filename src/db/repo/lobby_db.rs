use crate::db::repo::lobby::LobbyRepo;
use crate::db::{Db, DbResult, map_row_opt, map_rows};
use crate::models::lobby::{Lobby, Membership};
use crate::models::types::{AccountId, LobbyId};
use std::sync::Arc;

pub struct LobbyRepository {
    db: Arc<Db>,
}

impl LobbyRepository {
    pub fn new(db: Arc<Db>) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl LobbyRepo for LobbyRepository {
    async fn get_lobby(&self, id: LobbyId) -> DbResult<Option<Lobby>> {
        let client = self.db.get_client().await?;

        let stmt = client
            .prepare_cached("SELECT id, name, admin_id FROM lobbies WHERE id = $1")
            .await?;

        let row_opt = client.query_opt(&stmt, &[&id]).await?;
        map_row_opt(row_opt, Lobby::try_from_row, &format!("LobbyRepo::get_lobby id={}", id))
    }

    async fn membership(&self, lobby_id: LobbyId, user_id: AccountId) -> DbResult<Option<Membership>> {
        let client = self.db.get_client().await?;

        let stmt = client
            .prepare_cached(
                "SELECT lobby_id, user_id, role FROM lobby_members WHERE lobby_id = $1 AND user_id = $2",
            )
            .await?;

        let row_opt = client.query_opt(&stmt, &[&lobby_id, &user_id]).await?;
        map_row_opt(
            row_opt,
            Membership::try_from_row,
            &format!("LobbyRepo::membership lobby={} user={}", lobby_id, user_id),
        )
    }

    async fn members(&self, lobby_id: LobbyId) -> DbResult<Vec<Membership>> {
        let client = self.db.get_client().await?;

        let stmt = client
            .prepare_cached(
                "SELECT lobby_id, user_id, role FROM lobby_members WHERE lobby_id = $1 ORDER BY joined_at",
            )
            .await?;

        let rows = client.query(&stmt, &[&lobby_id]).await?;
        map_rows(rows, Membership::try_from_row, "LobbyRepo::members")
    }
}
