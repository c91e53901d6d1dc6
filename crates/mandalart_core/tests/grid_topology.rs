use mandalart_core::grid::{
    action_block, action_slots, block_of, is_mirror_center, mirror_center, sub_goal_slot,
    CELL_COUNT, SUB_GOAL_INDICES, ULTIMATE_GOAL_INDEX,
};
use mandalart_core::{classify, mirror_owner, place, ActionItems, CellRole, GridError, GridIndex};
use std::collections::HashSet;

fn sub_goals() -> [String; 8] {
    std::array::from_fn(|slot| format!("Goal {slot}"))
}

fn full_items() -> ActionItems {
    ActionItems::from_slots(std::array::from_fn(|slot| {
        (0..8).map(|item| format!("Do {slot}.{item}")).collect()
    }))
}

#[test]
fn roles_partition_the_grid() {
    let mut counts = [0usize; 3];
    for index in 0..CELL_COUNT {
        match classify(index).unwrap() {
            CellRole::UltimateGoal => counts[0] += 1,
            CellRole::SubGoal => counts[1] += 1,
            CellRole::ActionItem => counts[2] += 1,
        }
    }
    assert_eq!(counts, [1, 8, 72]);
    assert_eq!(classify(40).unwrap(), CellRole::UltimateGoal);
    assert_eq!(classify(81), Err(GridError::IndexOutOfRange(81)));
}

#[test]
fn sub_goals_surround_the_center() {
    let raw: Vec<usize> = SUB_GOAL_INDICES.iter().map(|index| index.get()).collect();
    assert_eq!(raw, vec![30, 31, 32, 39, 41, 48, 49, 50]);
    for (slot, index) in SUB_GOAL_INDICES.iter().enumerate() {
        assert_eq!(sub_goal_slot(*index), Some(slot));
        assert_eq!(block_of(*index), (1, 1));
    }
    assert_eq!(sub_goal_slot(ULTIMATE_GOAL_INDEX), None);
}

#[test]
fn mirror_centers_pair_with_sub_goals_one_to_one() {
    let expected = [10, 13, 16, 37, 43, 64, 67, 70];
    let mut seen = HashSet::new();
    for (sub_goal, center) in SUB_GOAL_INDICES.iter().zip(expected) {
        let mirror = mirror_center(*sub_goal).unwrap();
        assert_eq!(mirror.get(), center);
        assert!(seen.insert(mirror));
        assert_eq!(mirror_owner(center).unwrap(), Some(*sub_goal));
        assert_eq!(classify(center).unwrap(), CellRole::ActionItem);
    }

    let mirrors = (0..CELL_COUNT)
        .filter(|index| mirror_owner(*index).unwrap().is_some())
        .count();
    assert_eq!(mirrors, 8);
    assert_eq!(mirror_owner(0).unwrap(), None);
    assert_eq!(mirror_owner(40).unwrap(), None);
    assert_eq!(mirror_owner(90), Err(GridError::IndexOutOfRange(90)));
}

#[test]
fn action_blocks_cover_all_outer_cells_exactly_once() {
    let mut covered = HashSet::new();
    for sub_goal in SUB_GOAL_INDICES {
        let block = action_block(sub_goal).unwrap();
        let slots = action_slots(sub_goal).unwrap();
        assert_eq!(block[4], mirror_center(sub_goal).unwrap());
        assert!(slots.iter().all(|index| !is_mirror_center(*index)));
        assert!(slots.iter().all(|index| block.contains(index)));
        for index in block {
            assert_ne!(block_of(index), (1, 1));
            assert!(covered.insert(index));
        }
    }
    assert_eq!(covered.len(), 72);
    assert!(action_block(ULTIMATE_GOAL_INDEX).is_none());
    assert!(action_slots(GridIndex::new(0).unwrap()).is_none());
}

#[test]
fn full_recommendation_fills_every_index_once() {
    let placements = place("Become a senior engineer", &sub_goals(), &full_items());
    assert_eq!(placements.len(), CELL_COUNT);

    let indices: HashSet<GridIndex> = placements.iter().map(|placement| placement.index).collect();
    assert_eq!(indices.len(), CELL_COUNT);
    for placement in &placements {
        assert_eq!(placement.role, placement.index.role());
        if let Some(owner) = placement.mirror_of {
            let label = placements
                .iter()
                .find(|candidate| candidate.index == owner)
                .unwrap();
            assert_eq!(placement.text, label.text);
            assert!(!placement.is_stored());
        }
    }
}

#[test]
fn action_items_stay_inside_their_sub_goal_block() {
    let placements = place("Objective", &sub_goals(), &full_items());
    for (slot, sub_goal) in SUB_GOAL_INDICES.iter().enumerate() {
        let block = action_block(*sub_goal).unwrap();
        let prefix = format!("Do {slot}.");
        for placement in placements
            .iter()
            .filter(|placement| placement.text.starts_with(&prefix))
        {
            assert!(block.contains(&placement.index));
            assert!(placement.is_stored());
        }
    }
}

#[test]
fn sparse_recommendation_leaves_cells_unassigned() {
    let mut by_slot: [Vec<String>; 8] = Default::default();
    by_slot[2] = vec!["one".to_string(), "two".to_string(), "three".to_string()];
    let placements = place("Objective", &sub_goals(), &ActionItems::from_slots(by_slot));

    // ultimate + 8 labels + 8 mirrors + 3 items
    assert_eq!(placements.len(), 20);
    let slots = action_slots(SUB_GOAL_INDICES[2]).unwrap();
    let placed: Vec<GridIndex> = placements
        .iter()
        .filter(|placement| placement.role == CellRole::ActionItem && placement.is_stored())
        .map(|placement| placement.index)
        .collect();
    assert_eq!(placed, slots[..3].to_vec());
}

#[test]
fn grid_index_coordinates_roundtrip() {
    for index in GridIndex::all() {
        let rebuilt = GridIndex::from_row_col(index.row(), index.col()).unwrap();
        assert_eq!(rebuilt, index);
        assert_eq!(u8::try_from(index.get()).unwrap(), u8::from(index));
    }
    assert!(GridIndex::from_row_col(9, 0).is_err());
    assert!(GridIndex::try_from(81u8).is_err());
}
