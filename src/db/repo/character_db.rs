use crate::db::repo::character::CharacterRepo;
use crate::db::{Db, DbResult};
use crate::models::types::AccountId;
use std::sync::Arc;

pub struct CharacterRepository {
    db: Arc<Db>,
}

impl CharacterRepository {
    pub fn new(db: Arc<Db>) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl CharacterRepo for CharacterRepository {
    async fn strength(&self, user_id: AccountId) -> DbResult<Option<i32>> {
        let client = self.db.get_client().await?;

        let stmt = client
            .prepare_cached("SELECT strength FROM characters WHERE user_id = $1")
            .await?;

        let row = client.query_opt(&stmt, &[&user_id]).await?;
        Ok(match row {
            Some(r) => Some(r.try_get::<_, i32>("strength")?),
            None => None,
        })
    }
}
