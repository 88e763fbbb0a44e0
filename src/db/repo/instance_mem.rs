use crate::db::DbResult;
use crate::db::error::DbError;
use crate::db::repo::instance::{InstanceBatch, InstanceRepo, InstanceWrite};
use crate::models::instance::ItemInstance;
use crate::models::types::{AccountId, InstanceId};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Instances kept in process memory. A single lock over the whole map makes
/// `apply` all-or-nothing.
#[derive(Default)]
pub struct MemoryInstanceRepo {
    rows: RwLock<HashMap<InstanceId, ItemInstance>>,
}

impl MemoryInstanceRepo {
    pub fn new() -> Self {
        Self::default()
    }

    fn check(rows: &HashMap<InstanceId, ItemInstance>, write: &InstanceWrite) -> DbResult<()> {
        match write {
            InstanceWrite::Insert(i) => {
                if rows.contains_key(&i.id) {
                    return Err(DbError::UniqueViolation);
                }
            }
            InstanceWrite::Update {
                expected_version,
                instance,
            } => match rows.get(&instance.id) {
                Some(stored) if stored.version == *expected_version => {}
                _ => return Err(DbError::VersionConflict { id: instance.id }),
            },
            InstanceWrite::Delete { id, expected_version } => match rows.get(id) {
                Some(stored) if stored.version == *expected_version => {}
                _ => return Err(DbError::VersionConflict { id: *id }),
            },
        }
        Ok(())
    }
}

#[async_trait]
impl InstanceRepo for MemoryInstanceRepo {
    async fn get(&self, id: InstanceId) -> DbResult<Option<ItemInstance>> {
        Ok(self.rows.read().get(&id).cloned())
    }

    async fn list_for_owner(&self, owner_id: AccountId) -> DbResult<Vec<ItemInstance>> {
        let mut out: Vec<ItemInstance> = self
            .rows
            .read()
            .values()
            .filter(|i| i.owner_id == owner_id)
            .cloned()
            .collect();
        out.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(out)
    }

    async fn apply(&self, batch: InstanceBatch) -> DbResult<()> {
        let mut rows = self.rows.write();

        // Validate everything first; a batch touches an instance at most once.
        for write in batch.writes() {
            Self::check(&rows, write)?;
        }

        for write in batch.into_writes() {
            match write {
                InstanceWrite::Insert(i) => {
                    rows.insert(i.id, i);
                }
                InstanceWrite::Update {
                    expected_version,
                    mut instance,
                } => {
                    instance.version = expected_version + 1;
                    rows.insert(instance.id, instance);
                }
                InstanceWrite::Delete { id, .. } => {
                    rows.remove(&id);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::catalog::{ItemDefinition, ItemType, Quality};
    use crate::models::container::ContainerId;
    use crate::models::types::DefinitionId;

    fn apple() -> ItemDefinition {
        ItemDefinition {
            id: DefinitionId::new(),
            item_type: ItemType::with_defaults("food"),
            name: "Apple".into(),
            description: String::new(),
            width: 1,
            height: 1,
            weight: 0.2,
            max_durability: None,
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

    #[tokio::test]
    async fn stale_update_rolls_back_whole_batch() {
        let repo = MemoryInstanceRepo::new();
        let owner = AccountId::new();
        let def = apple();

        let a = ItemInstance::new(owner, &def, ContainerId::Main);
        let b = ItemInstance::new(owner, &def, ContainerId::Main);
        let mut seed = InstanceBatch::new();
        seed.insert(a.clone()).insert(b.clone());
        repo.apply(seed).await.unwrap();

        // Someone else bumps `b`
        let mut other = InstanceBatch::new();
        other.update(&b);
        repo.apply(other).await.unwrap();

        let mut batch = InstanceBatch::new();
        let mut a2 = a.clone();
        a2.amount = 5;
        batch.update(&a2);
        batch.delete(&b);

        let err = repo.apply(batch).await.unwrap_err();
        assert!(matches!(err, DbError::VersionConflict { id } if id == b.id));

        let stored_a = repo.get(a.id).await.unwrap().unwrap();
        assert_eq!(stored_a.amount, 1);
        assert_eq!(stored_a.version, 1);
        assert!(repo.get(b.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn list_for_owner_filters_by_owner() {
        let repo = MemoryInstanceRepo::new();
        let def = apple();
        let alice = AccountId::new();
        let bob = AccountId::new();

        let mut seed = InstanceBatch::new();
        seed.insert(ItemInstance::new(alice, &def, ContainerId::Main))
            .insert(ItemInstance::new(bob, &def, ContainerId::Main))
            .insert(ItemInstance::new(alice, &def, ContainerId::Hands));
        repo.apply(seed).await.unwrap();

        assert_eq!(repo.list_for_owner(alice).await.unwrap().len(), 2);
        assert_eq!(repo.list_for_owner(bob).await.unwrap().len(), 1);
    }
}
