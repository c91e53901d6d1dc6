//! Mirror resolver: sub-goal ownership of the outer mini-grids.
//!
//! The layout of the eight sub-goals around the ultimate goal repeats one
//! level down: sub-goal `s` owns the outer block sitting in the same relative
//! position, and that block's center cell shows `s`'s label again.
//!
//! # Invariants
//! - Each sub-goal owns exactly 9 indices; one of them is its mirror center.
//! - Mirror centers never store independent content.

use super::position::{
    GridIndex, BLOCK_SIZE, GRID_SIZE, SUB_GOAL_COUNT, SUB_GOAL_INDICES, ULTIMATE_GOAL_INDEX,
};
use super::{sub_goal_slot, GridError};

const BLOCK_CELLS: usize = BLOCK_SIZE * BLOCK_SIZE;

/// Owned 9-index block per sub-goal slot, row-major.
const ACTION_BLOCKS: [[GridIndex; BLOCK_CELLS]; SUB_GOAL_COUNT] = owned_blocks();

/// Mirror center per sub-goal slot.
const MIRROR_CENTERS: [GridIndex; SUB_GOAL_COUNT] = owned_centers();

/// Owned block minus its mirror center, per sub-goal slot.
const ACTION_SLOTS: [[GridIndex; BLOCK_CELLS - 1]; SUB_GOAL_COUNT] = owned_slots();

/// Block coordinates owned by the sub-goal at `slot`.
const fn owned_block_origin(slot: usize) -> (usize, usize) {
    let sub_goal = SUB_GOAL_INDICES[slot].get();
    let center = ULTIMATE_GOAL_INDEX.get();
    let block_row = sub_goal / GRID_SIZE + 1 - center / GRID_SIZE;
    let block_col = sub_goal % GRID_SIZE + 1 - center % GRID_SIZE;
    (block_row * BLOCK_SIZE, block_col * BLOCK_SIZE)
}

const fn owned_blocks() -> [[GridIndex; BLOCK_CELLS]; SUB_GOAL_COUNT] {
    let mut out = [[GridIndex::from_raw(0); BLOCK_CELLS]; SUB_GOAL_COUNT];
    let mut slot = 0;
    while slot < SUB_GOAL_COUNT {
        let (top, left) = owned_block_origin(slot);
        let mut offset = 0;
        while offset < BLOCK_CELLS {
            let row = top + offset / BLOCK_SIZE;
            let col = left + offset % BLOCK_SIZE;
            out[slot][offset] = GridIndex::from_raw((row * GRID_SIZE + col) as u8);
            offset += 1;
        }
        slot += 1;
    }
    out
}

const fn owned_centers() -> [GridIndex; SUB_GOAL_COUNT] {
    let mut out = [GridIndex::from_raw(0); SUB_GOAL_COUNT];
    let mut slot = 0;
    while slot < SUB_GOAL_COUNT {
        let (top, left) = owned_block_origin(slot);
        let row = top + BLOCK_SIZE / 2;
        let col = left + BLOCK_SIZE / 2;
        out[slot] = GridIndex::from_raw((row * GRID_SIZE + col) as u8);
        slot += 1;
    }
    out
}

const fn owned_slots() -> [[GridIndex; BLOCK_CELLS - 1]; SUB_GOAL_COUNT] {
    let mut out = [[GridIndex::from_raw(0); BLOCK_CELLS - 1]; SUB_GOAL_COUNT];
    let mut slot = 0;
    while slot < SUB_GOAL_COUNT {
        let mut next = 0;
        let mut offset = 0;
        while offset < BLOCK_CELLS {
            if offset != BLOCK_CELLS / 2 {
                out[slot][next] = ACTION_BLOCKS[slot][offset];
                next += 1;
            }
            offset += 1;
        }
        slot += 1;
    }
    out
}

/// Returns the sub-goal index mirrored at `index`, if any.
///
/// # Errors
/// - `GridError::IndexOutOfRange` when `index >= 81`.
pub fn mirror_owner(index: usize) -> Result<Option<GridIndex>, GridError> {
    let index = GridIndex::new(index)?;
    Ok(MIRROR_CENTERS
        .iter()
        .position(|center| *center == index)
        .map(|slot| SUB_GOAL_INDICES[slot]))
}

pub fn is_mirror_center(index: GridIndex) -> bool {
    MIRROR_CENTERS.contains(&index)
}

/// Mirror center of the block owned by `sub_goal`; `None` for non sub-goals.
pub fn mirror_center(sub_goal: GridIndex) -> Option<GridIndex> {
    sub_goal_slot(sub_goal).map(|slot| MIRROR_CENTERS[slot])
}

/// All 9 indices owned by `sub_goal`, row-major, mirror center included.
pub fn action_block(sub_goal: GridIndex) -> Option<[GridIndex; 9]> {
    sub_goal_slot(sub_goal).map(|slot| ACTION_BLOCKS[slot])
}

/// The 8 indices eligible for action-item text, in fixed row-major order.
pub fn action_slots(sub_goal: GridIndex) -> Option<[GridIndex; 8]> {
    sub_goal_slot(sub_goal).map(|slot| ACTION_SLOTS[slot])
}
