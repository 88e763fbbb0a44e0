use crate::db::DbResult;
use crate::models::types::AccountId;

/// Character facts the inventory engine needs from the character collaborator.
#[async_trait::async_trait]
pub trait CharacterRepo: Send + Sync {
    /// Strength of the user's character, if one exists
    async fn strength(&self, user_id: AccountId) -> DbResult<Option<i32>>;
}
