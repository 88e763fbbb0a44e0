use crate::engine::Definitions;
use crate::error::DomainError;
use crate::models::catalog::ItemDefinition;
use crate::models::container::Container;
use crate::models::instance::ItemInstance;
use crate::models::types::InstanceId;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementError {
    RotationNotAllowed,
    OutOfBounds,
    Overlap,
}

impl From<PlacementError> for DomainError {
    fn from(e: PlacementError) -> Self {
        match e {
            PlacementError::RotationNotAllowed => DomainError::RotationNotAllowed,
            PlacementError::OutOfBounds => DomainError::OutOfBounds,
            PlacementError::Overlap => DomainError::Overlap,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub x: i32,
    pub y: i32,
    pub rotated: bool,
}

/// Bounding box of a definition, width and height swapped when rotated.
pub fn footprint(def: &ItemDefinition, rotated: bool) -> (i32, i32) {
    if rotated {
        (def.height, def.width)
    } else {
        (def.width, def.height)
    }
}

/// Footprint as a container sees it. Slots hold one item in one cell, whatever its size.
pub fn footprint_in(container: &Container, def: &ItemDefinition, rotated: bool) -> (i32, i32) {
    if container.is_slot() { (1, 1) } else { footprint(def, rotated) }
}

/// Occupied cells of one container. Coordinates are 1-based.
#[derive(Debug, Clone)]
pub struct Grid {
    width: i32,
    height: i32,
    occupied: HashSet<(i32, i32)>,
}

impl Grid {
    pub fn empty(container: &Container) -> Self {
        Self {
            width: container.width,
            height: container.height,
            occupied: HashSet::new(),
        }
    }

    /// Grid with every placed instance of `container` marked, apart from those in `exclude`.
    pub fn of(container: &Container, instances: &[ItemInstance], definitions: &Definitions, exclude: &[InstanceId]) -> Self {
        let mut grid = Self::empty(container);

        for inst in instances
            .iter()
            .filter(|i| i.container == container.id && !exclude.contains(&i.id))
        {
            let (Some((x, y)), Some(def)) = (inst.position(), definitions.get(&inst.definition_id)) else {
                continue;
            };
            let (w, h) = footprint_in(container, def, inst.rotated);
            grid.occupy(x, y, w, h);
        }

        grid
    }

    pub fn occupy(&mut self, x: i32, y: i32, w: i32, h: i32) {
        for cy in y..y.saturating_add(h) {
            for cx in x..x.saturating_add(w) {
                self.occupied.insert((cx, cy));
            }
        }
    }

    pub fn is_free(&self, x: i32, y: i32) -> bool {
        !self.occupied.contains(&(x, y))
    }

    pub fn check(&self, x: i32, y: i32, w: i32, h: i32) -> Result<(), PlacementError> {
        // Client coordinates are arbitrary i32s; compare without adding to them
        if x < 1 || y < 1 || w > self.width || h > self.height || x > self.width - w + 1 || y > self.height - h + 1 {
            return Err(PlacementError::OutOfBounds);
        }

        for cy in y..y + h {
            for cx in x..x + w {
                if !self.is_free(cx, cy) {
                    return Err(PlacementError::Overlap);
                }
            }
        }
        Ok(())
    }

    /// Row-major scan from (1,1): y outer, x inner.
    pub fn first_fit(&self, w: i32, h: i32) -> Option<(i32, i32)> {
        for y in 1..=self.height - h + 1 {
            for x in 1..=self.width - w + 1 {
                if self.check(x, y, w, h).is_ok() {
                    return Some((x, y));
                }
            }
        }
        None
    }
}

/// Validates placing an item of `def` at (x, y) against `grid`, which must already exclude
/// the item being placed.
pub fn can_place(
    container: &Container,
    grid: &Grid,
    def: &ItemDefinition,
    x: i32,
    y: i32,
    rotated: bool,
) -> Result<(), PlacementError> {
    if rotated && !container.rotatable {
        return Err(PlacementError::RotationNotAllowed);
    }
    let (w, h) = footprint_in(container, def, rotated);
    grid.check(x, y, w, h)
}

pub fn first_fit(container: &Container, grid: &Grid, def: &ItemDefinition, rotated: bool) -> Option<(i32, i32)> {
    if rotated && !container.rotatable {
        return None;
    }
    let (w, h) = footprint_in(container, def, rotated);
    grid.first_fit(w, h)
}

/// First fit with the preferred rotation, then with the other one where the container allows it.
pub fn auto_place(container: &Container, grid: &Grid, def: &ItemDefinition, prefer_rotated: bool) -> Option<Placement> {
    let prefer_rotated = prefer_rotated && container.rotatable;

    let mut attempts = vec![prefer_rotated];
    if container.rotatable && def.width != def.height {
        attempts.push(!prefer_rotated);
    }

    attempts.into_iter().find_map(|rotated| {
        first_fit(container, grid, def, rotated).map(|(x, y)| Placement { x, y, rotated })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::containers::static_containers;
    use crate::engine::fixtures::definition;
    use crate::models::container::{ContainerId, EquipSlot};
    use crate::models::types::AccountId;

    fn container(id: ContainerId) -> Container {
        static_containers().iter().find(|c| c.id == id).cloned().unwrap()
    }

    #[test]
    fn rotation_swaps_footprint() {
        let def = definition("other", 2, 3);
        assert_eq!(footprint(&def, false), (2, 3));
        assert_eq!(footprint(&def, true), (3, 2));
    }

    #[test]
    fn overlap_scenario_in_main_inventory() {
        let main = container(ContainerId::Main);
        let tall = definition("other", 2, 3);
        let wide = definition("other", 3, 2);
        let definitions: Definitions = [(tall.id, tall.clone()), (wide.id, wide.clone())].into();

        let mut first = ItemInstance::new(AccountId::new(), &tall, ContainerId::Main);
        first.place(ContainerId::Main, 1, 1, false);
        let instances = vec![first];

        let grid = Grid::of(&main, &instances, &definitions, &[]);
        // 3x2 rotated is 2x3 and collides at (1,1)
        assert_eq!(can_place(&main, &grid, &wide, 1, 1, true), Err(PlacementError::Overlap));
        assert_eq!(can_place(&main, &grid, &wide, 3, 1, true), Ok(()));
    }

    #[test]
    fn rotated_footprint_past_bounds() {
        let main = container(ContainerId::Main);
        let pole = definition("other", 1, 4);
        let grid = Grid::empty(&main);

        assert_eq!(can_place(&main, &grid, &pole, 12, 5, false), Ok(()));
        assert_eq!(can_place(&main, &grid, &pole, 12, 5, true), Err(PlacementError::OutOfBounds));
        assert_eq!(can_place(&main, &grid, &pole, 0, 1, false), Err(PlacementError::OutOfBounds));
    }

    #[test]
    fn huge_coordinates_are_out_of_bounds() {
        let main = container(ContainerId::Main);
        let grid = Grid::empty(&main);
        let wide = definition("other", 2, 1);

        assert_eq!(can_place(&main, &grid, &wide, i32::MAX, 1, false), Err(PlacementError::OutOfBounds));
        assert_eq!(can_place(&main, &grid, &wide, 1, i32::MAX, true), Err(PlacementError::OutOfBounds));
        assert_eq!(can_place(&main, &grid, &wide, i32::MIN, 1, false), Err(PlacementError::OutOfBounds));
    }

    #[test]
    fn first_fit_is_row_major() {
        let hands = container(ContainerId::Hands);
        let block = definition("other", 2, 2);
        let mut grid = Grid::empty(&hands);

        assert_eq!(first_fit(&hands, &grid, &block, false), Some((1, 1)));
        grid.occupy(1, 1, 2, 2);
        assert_eq!(first_fit(&hands, &grid, &block, false), Some((3, 1)));
        grid.occupy(3, 1, 2, 2);
        assert_eq!(first_fit(&hands, &grid, &block, false), Some((1, 3)));

        // Same input, same answer
        assert_eq!(first_fit(&hands, &grid, &block, false), first_fit(&hands, &grid, &block, false));
    }

    #[test]
    fn auto_place_falls_back_to_other_rotation() {
        let hands = container(ContainerId::Hands);
        let plank = definition("other", 4, 1);
        let mut grid = Grid::empty(&hands);
        // Leave only the first column free
        grid.occupy(2, 1, 3, 4);

        let placed = auto_place(&hands, &grid, &plank, false).unwrap();
        assert_eq!(placed, Placement { x: 1, y: 1, rotated: true });

        grid.occupy(1, 1, 1, 4);
        assert_eq!(auto_place(&hands, &grid, &plank, false), None);
    }

    #[test]
    fn slots_hold_a_single_item() {
        let slot = container(ContainerId::Equip(EquipSlot::WeaponMain));
        let sword = definition("weapon", 1, 3);
        let axe = definition("weapon", 2, 3);
        let definitions: Definitions = [(sword.id, sword.clone()), (axe.id, axe.clone())].into();

        let grid = Grid::empty(&slot);
        assert_eq!(can_place(&slot, &grid, &sword, 1, 1, false), Ok(()));
        assert_eq!(can_place(&slot, &grid, &sword, 1, 1, true), Err(PlacementError::RotationNotAllowed));

        let mut equipped = ItemInstance::new(AccountId::new(), &sword, ContainerId::Main);
        equipped.place(slot.id, 1, 1, false);
        let grid = Grid::of(&slot, &[equipped], &definitions, &[]);
        assert_eq!(can_place(&slot, &grid, &axe, 1, 1, false), Err(PlacementError::Overlap));
        assert_eq!(auto_place(&slot, &grid, &axe, false), None);
    }
}
