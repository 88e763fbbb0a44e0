use crate::models::catalog::ItemDefinition;

/// Canonical form of a type name: trimmed and lower-cased. `None` when nothing is left.
pub fn normalize_type_name(raw: &str) -> Option<String> {
    let name = raw.trim().to_lowercase();
    if name.is_empty() { None } else { Some(name) }
}

pub fn has_durability(def: &ItemDefinition) -> bool {
    def.max_durability.is_some() || def.item_type.has_durability
}

/// Durability-tracked items never stack, whatever their type says.
pub fn is_stackable(def: &ItemDefinition) -> bool {
    def.item_type.stackable && !has_durability(def)
}

pub fn effective_max_stack(def: &ItemDefinition) -> i32 {
    if !is_stackable(def) {
        return 1;
    }
    def.max_stack.unwrap_or(def.item_type.max_amount).max(1)
}

/// Upper bound for durability. Tracked items without an explicit maximum fall back to 1.
pub fn max_durability(def: &ItemDefinition) -> Option<i32> {
    if has_durability(def) {
        Some(def.max_durability.unwrap_or(1).max(1))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::fixtures::definition;

    #[test]
    fn type_names_are_normalized() {
        assert_eq!(normalize_type_name("  Weapon "), Some("weapon".to_string()));
        assert_eq!(normalize_type_name("   "), None);
    }

    #[test]
    fn max_stack_prefers_definition_override() {
        let mut potion = definition("potion", 1, 1);
        assert_eq!(effective_max_stack(&potion), 20);

        potion.max_stack = Some(5);
        assert_eq!(effective_max_stack(&potion), 5);
    }

    #[test]
    fn durability_forces_single_stack() {
        let sword = definition("weapon", 1, 3);
        assert!(has_durability(&sword));
        assert!(!is_stackable(&sword));
        assert_eq!(effective_max_stack(&sword), 1);

        // A stackable type becomes unstackable once a definition tracks durability
        let mut bandage = definition("food", 1, 1);
        bandage.max_durability = Some(3);
        assert!(has_durability(&bandage));
        assert_eq!(effective_max_stack(&bandage), 1);
    }

    #[test]
    fn unknown_types_are_plain() {
        let lamp = definition("lamp", 1, 1);
        assert!(!has_durability(&lamp));
        assert_eq!(max_durability(&lamp), None);
        assert_eq!(effective_max_stack(&lamp), 1);
    }
}
