//! Position classifier for the 9x9 grid.
//!
//! # Responsibility
//! - Validate flat indices and expose row/column/block coordinates.
//! - Classify each index as ultimate goal, sub-goal or action item.
//!
//! # Invariants
//! - Exactly one ultimate-goal index (40), eight sub-goal indices, and 72
//!   action-item indices.
//! - `SUB_GOAL_INDICES` lists the center's eight neighbours in row-major
//!   order, skipping the center itself.

use super::GridError;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Cells per grid side.
pub const GRID_SIZE: usize = 9;
/// Cells per mini-grid side.
pub const BLOCK_SIZE: usize = 3;
/// Total addressable cells.
pub const CELL_COUNT: usize = GRID_SIZE * GRID_SIZE;
/// Sub-goals surrounding the ultimate goal.
pub const SUB_GOAL_COUNT: usize = 8;

const CENTER: usize = GRID_SIZE / 2;

/// Absolute center cell (row 4, col 4).
pub const ULTIMATE_GOAL_INDEX: GridIndex = GridIndex((CENTER * GRID_SIZE + CENTER) as u8);

/// Sub-goal indices in their fixed slot order.
pub const SUB_GOAL_INDICES: [GridIndex; SUB_GOAL_COUNT] = central_neighbours();

const fn central_neighbours() -> [GridIndex; SUB_GOAL_COUNT] {
    let mut out = [GridIndex(0); SUB_GOAL_COUNT];
    let first = CENTER - 1;
    let mut slot = 0;
    let mut offset = 0;
    while offset < BLOCK_SIZE * BLOCK_SIZE {
        let row = first + offset / BLOCK_SIZE;
        let col = first + offset % BLOCK_SIZE;
        if !(row == CENTER && col == CENTER) {
            out[slot] = GridIndex((row * GRID_SIZE + col) as u8);
            slot += 1;
        }
        offset += 1;
    }
    out
}

/// Validated flat cell index in `[0, 81)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct GridIndex(u8);

impl GridIndex {
    /// Validates a raw flat index.
    ///
    /// # Errors
    /// - `GridError::IndexOutOfRange` when `index >= 81`.
    pub fn new(index: usize) -> Result<Self, GridError> {
        if index < CELL_COUNT {
            Ok(Self(index as u8))
        } else {
            Err(GridError::IndexOutOfRange(index))
        }
    }

    /// Builds an index from row and column, each in `[0, 9)`.
    pub fn from_row_col(row: usize, col: usize) -> Result<Self, GridError> {
        if row >= GRID_SIZE || col >= GRID_SIZE {
            return Err(GridError::IndexOutOfRange(
                row.saturating_mul(GRID_SIZE).saturating_add(col),
            ));
        }
        Self::new(row * GRID_SIZE + col)
    }

    pub const fn get(self) -> usize {
        self.0 as usize
    }

    pub const fn row(self) -> usize {
        self.get() / GRID_SIZE
    }

    pub const fn col(self) -> usize {
        self.get() % GRID_SIZE
    }

    /// Semantic role of this cell.
    pub fn role(self) -> CellRole {
        if self == ULTIMATE_GOAL_INDEX {
            CellRole::UltimateGoal
        } else if SUB_GOAL_INDICES.contains(&self) {
            CellRole::SubGoal
        } else {
            CellRole::ActionItem
        }
    }

    /// Iterates all 81 indices in ascending order.
    pub fn all() -> impl Iterator<Item = GridIndex> {
        (0..CELL_COUNT as u8).map(GridIndex)
    }

    pub(crate) const fn from_raw(raw: u8) -> Self {
        Self(raw)
    }
}

impl TryFrom<u8> for GridIndex {
    type Error = GridError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(usize::from(value))
    }
}

impl From<GridIndex> for u8 {
    fn from(value: GridIndex) -> Self {
        value.0
    }
}

impl Display for GridIndex {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Semantic role derived from a cell's position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellRole {
    /// The single objective at the grid center.
    UltimateGoal,
    /// One of the eight supporting goals around the center.
    SubGoal,
    /// A concrete step inside an outer mini-grid.
    ActionItem,
}

impl CellRole {
    /// Storage/wire name (`ultimate_goal|sub_goal|action_item`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UltimateGoal => "ultimate_goal",
            Self::SubGoal => "sub_goal",
            Self::ActionItem => "action_item",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "ultimate_goal" => Some(Self::UltimateGoal),
            "sub_goal" => Some(Self::SubGoal),
            "action_item" => Some(Self::ActionItem),
            _ => None,
        }
    }
}

/// Classifies a raw flat index.
///
/// # Errors
/// - `GridError::IndexOutOfRange` when `index >= 81`.
pub fn classify(index: usize) -> Result<CellRole, GridError> {
    GridIndex::new(index).map(GridIndex::role)
}

/// Returns the `0..8` slot of a sub-goal index, or `None` for other roles.
pub fn sub_goal_slot(index: GridIndex) -> Option<usize> {
    SUB_GOAL_INDICES.iter().position(|candidate| *candidate == index)
}

/// Returns `(block_row, block_col)` of the 3x3 block holding `index`.
pub fn block_of(index: GridIndex) -> (usize, usize) {
    (index.row() / BLOCK_SIZE, index.col() / BLOCK_SIZE)
}
