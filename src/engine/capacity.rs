use crate::engine::Definitions;
use crate::models::instance::ItemInstance;

/// Carrying capacity as a function of strength.
pub trait CapacityPolicy: Send + Sync {
    fn capacity(&self, strength: i32) -> f64;
}

/// `base + per_strength * strength`
#[derive(Debug, Clone, Copy)]
pub struct LinearCapacity {
    pub base: f64,
    pub per_strength: f64,
}

impl Default for LinearCapacity {
    fn default() -> Self {
        Self {
            base: 20.0,
            per_strength: 5.0,
        }
    }
}

impl CapacityPolicy for LinearCapacity {
    fn capacity(&self, strength: i32) -> f64 {
        self.base + self.per_strength * f64::from(strength.max(0))
    }
}

/// Total weight of the given instances, stacks counted per unit.
pub fn carried_weight(instances: &[ItemInstance], definitions: &Definitions) -> f64 {
    instances
        .iter()
        .filter_map(|i| definitions.get(&i.definition_id).map(|d| d.weight * f64::from(i.amount)))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::fixtures::definition;
    use crate::models::container::ContainerId;
    use crate::models::types::AccountId;

    #[test]
    fn linear_capacity() {
        let policy = LinearCapacity::default();
        assert_eq!(policy.capacity(10), 70.0);
        assert_eq!(policy.capacity(-3), 20.0);
    }

    #[test]
    fn weight_counts_stack_amounts() {
        let owner = AccountId::new();
        let mut apple = definition("food", 1, 1);
        apple.weight = 0.5;
        let definitions: Definitions = [(apple.id, apple.clone())].into();

        let mut stack = ItemInstance::new(owner, &apple, ContainerId::Main);
        stack.amount = 4;
        let single = ItemInstance::new(owner, &apple, ContainerId::Hands);

        assert_eq!(carried_weight(&[stack, single], &definitions), 2.5);
    }
}
