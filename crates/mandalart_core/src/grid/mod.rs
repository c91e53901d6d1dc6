//! Mandalart grid topology engine.
//!
//! # Responsibility
//! - Map the flat 81-cell index space onto semantic roles.
//! - Resolve mirror centers that redisplay a sub-goal inside its outer block.
//! - Place generated goal text deterministically into the index space.
//!
//! # Invariants
//! - Every table here is a `const`; the engine has no I/O and no mutable state.
//! - Indices are row-major: `index = row * 9 + col`, always in `[0, 81)`.
//! - Sub-goal to block ownership is a fixed bijection.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod mirror;
pub mod placement;
pub mod position;

pub use mirror::{action_block, action_slots, is_mirror_center, mirror_center, mirror_owner};
pub use placement::{place, truncate_display, ActionItems, Placement, DISPLAY_TEXT_LIMIT};
pub use position::{
    block_of, classify, sub_goal_slot, CellRole, GridIndex, BLOCK_SIZE, CELL_COUNT, GRID_SIZE,
    SUB_GOAL_COUNT, SUB_GOAL_INDICES, ULTIMATE_GOAL_INDEX,
};

/// Topology lookup failure.
///
/// Out-of-range indices are caller bugs, never runtime data conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridError {
    /// Index is not inside `[0, 81)`.
    IndexOutOfRange(usize),
}

impl Display for GridError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IndexOutOfRange(index) => write!(
                f,
                "grid index {index} is out of range; expected 0..{}",
                CELL_COUNT - 1
            ),
        }
    }
}

impl Error for GridError {}
