use crate::db::DbResult;
use crate::db::repo::character::CharacterRepo;
use crate::models::types::AccountId;
use async_trait::async_trait;
use dashmap::DashMap;

#[derive(Default)]
pub struct MemoryCharacterRepo {
    strength: DashMap<AccountId, i32>,
}

impl MemoryCharacterRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_strength(&self, user_id: AccountId, strength: i32) {
        self.strength.insert(user_id, strength);
    }
}

#[async_trait]
impl CharacterRepo for MemoryCharacterRepo {
    async fn strength(&self, user_id: AccountId) -> DbResult<Option<i32>> {
        Ok(self.strength.get(&user_id).map(|s| *s))
    }
}
