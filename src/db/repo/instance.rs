use crate::db::DbResult;
use crate::models::instance::ItemInstance;
use crate::models::types::{AccountId, InstanceId};

/// A single write inside an [`InstanceBatch`].
#[derive(Debug, Clone)]
pub enum InstanceWrite {
    Insert(ItemInstance),
    /// Overwrite the stored row, provided it still carries `expected_version`.
    /// The stored version becomes `expected_version + 1`.
    Update {
        expected_version: i64,
        instance: ItemInstance,
    },
    Delete {
        id: InstanceId,
        expected_version: i64,
    },
}

/// Writes that commit together or not at all.
#[derive(Debug, Clone, Default)]
pub struct InstanceBatch {
    writes: Vec<InstanceWrite>,
}

impl InstanceBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, instance: ItemInstance) -> &mut Self {
        self.writes.push(InstanceWrite::Insert(instance));
        self
    }

    /// Queues `instance` as the new state of a row last read at `instance.version`.
    /// Returns the instance as it will be stored: version bumped by one.
    pub fn update(&mut self, instance: &ItemInstance) -> ItemInstance {
        let mut next = instance.clone();
        next.version = instance.version + 1;
        next.updated_at = chrono::Utc::now();

        self.writes.push(InstanceWrite::Update {
            expected_version: instance.version,
            instance: next.clone(),
        });
        next
    }

    pub fn delete(&mut self, instance: &ItemInstance) -> &mut Self {
        self.writes.push(InstanceWrite::Delete {
            id: instance.id,
            expected_version: instance.version,
        });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    pub fn writes(&self) -> &[InstanceWrite] {
        &self.writes
    }

    pub fn into_writes(self) -> Vec<InstanceWrite> {
        self.writes
    }
}

#[async_trait::async_trait]
pub trait InstanceRepo: Send + Sync {
    async fn get(&self, id: InstanceId) -> DbResult<Option<ItemInstance>>;

    /// All instances owned by `owner_id`, oldest first
    async fn list_for_owner(&self, owner_id: AccountId) -> DbResult<Vec<ItemInstance>>;

    /// Commits every write of `batch` atomically. Any guarded write whose version no longer
    /// matches aborts the whole batch with [`DbError::VersionConflict`](crate::db::error::DbError).
    async fn apply(&self, batch: InstanceBatch) -> DbResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::catalog::{ItemDefinition, ItemType, Quality};
    use crate::models::container::ContainerId;
    use crate::models::types::DefinitionId;

    fn definition() -> ItemDefinition {
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

    #[test]
    fn update_bumps_version_and_records_guard() {
        let inst = ItemInstance::new(AccountId::new(), &definition(), ContainerId::Main);
        let mut batch = InstanceBatch::new();

        let next = batch.update(&inst);
        assert_eq!(next.version, 2);

        match &batch.writes()[0] {
            InstanceWrite::Update {
                expected_version,
                instance,
            } => {
                assert_eq!(*expected_version, 1);
                assert_eq!(instance.version, 2);
            }
            other => panic!("unexpected write {:?}", other),
        }
    }
}
