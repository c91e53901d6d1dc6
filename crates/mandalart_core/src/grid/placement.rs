//! Recommendation placer.
//!
//! # Responsibility
//! - Assign ultimate goal, sub-goal and action-item text to flat indices.
//! - Emit the derived mirror placement for each outer block center.
//! - Apply the uniform display-length cap to every placed text.
//!
//! # Invariants
//! - Mirror centers never receive action-item text; their placement always
//!   carries the owning sub-goal's text and is flagged via `mirror_of`.
//! - Missing or short action-item lists yield fewer placements, never errors.
//! - Action items are keyed by sub-goal slot, so duplicate sub-goal texts
//!   cannot overwrite each other.

use super::mirror::{action_slots, mirror_center};
use super::position::{CellRole, GridIndex, SUB_GOAL_COUNT, SUB_GOAL_INDICES, ULTIMATE_GOAL_INDEX};
use serde::Serialize;
use std::collections::HashMap;

/// Maximum Unicode scalar values stored per cell text.
pub const DISPLAY_TEXT_LIMIT: usize = 50;

/// Cuts `text` to at most `DISPLAY_TEXT_LIMIT` characters.
pub fn truncate_display(text: &str) -> String {
    text.chars().take(DISPLAY_TEXT_LIMIT).collect()
}

/// Action-item lists, one per sub-goal slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionItems {
    by_slot: [Vec<String>; SUB_GOAL_COUNT],
}

impl ActionItems {
    pub fn from_slots(by_slot: [Vec<String>; SUB_GOAL_COUNT]) -> Self {
        Self { by_slot }
    }

    /// Resolves a text-keyed map against the ordered sub-goal list.
    ///
    /// Sub-goals without a matching key get an empty list.
    pub fn from_keyed(
        sub_goals: &[String; SUB_GOAL_COUNT],
        keyed: &HashMap<String, Vec<String>>,
    ) -> Self {
        let by_slot = std::array::from_fn(|slot| {
            keyed
                .get(sub_goals[slot].as_str())
                .cloned()
                .unwrap_or_default()
        });
        Self { by_slot }
    }

    /// Items for one slot; empty for unknown slots.
    pub fn for_slot(&self, slot: usize) -> &[String] {
        self.by_slot.get(slot).map_or(&[], Vec::as_slice)
    }

    pub fn into_slots(self) -> [Vec<String>; SUB_GOAL_COUNT] {
        self.by_slot
    }
}

/// One text assignment produced by `place`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Placement {
    pub index: GridIndex,
    pub role: CellRole,
    /// Already truncated to `DISPLAY_TEXT_LIMIT`.
    pub text: String,
    /// Set on mirror centers: the sub-goal whose label is redisplayed here.
    /// Such placements are display-only and must not be persisted as content.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mirror_of: Option<GridIndex>,
}

impl Placement {
    fn new(index: GridIndex, text: &str) -> Self {
        Self {
            index,
            role: index.role(),
            text: truncate_display(text),
            mirror_of: None,
        }
    }

    fn mirror(index: GridIndex, sub_goal: GridIndex, text: &str) -> Self {
        Self {
            mirror_of: Some(sub_goal),
            ..Self::new(index, text)
        }
    }

    /// Whether this placement carries independently stored text.
    pub fn is_stored(&self) -> bool {
        self.mirror_of.is_none()
    }
}

/// Places a full recommendation into the grid.
///
/// A complete recommendation (8 items per sub-goal) yields 81 placements,
/// one per index. Output order follows ultimate goal, then per sub-goal its
/// label, its mirror and its action items; callers must index by
/// `Placement::index`, not by order. Empty action-item strings leave their
/// slot unassigned.
pub fn place(
    ultimate_goal: &str,
    sub_goals: &[String; SUB_GOAL_COUNT],
    action_items: &ActionItems,
) -> Vec<Placement> {
    let mut placements = Vec::with_capacity(1 + SUB_GOAL_COUNT * (SUB_GOAL_COUNT + 2));
    placements.push(Placement::new(ULTIMATE_GOAL_INDEX, ultimate_goal));

    for (slot, (sub_goal_index, sub_goal)) in SUB_GOAL_INDICES.iter().zip(sub_goals).enumerate() {
        placements.push(Placement::new(*sub_goal_index, sub_goal));

        if let Some(center) = mirror_center(*sub_goal_index) {
            placements.push(Placement::mirror(center, *sub_goal_index, sub_goal));
        }

        let Some(eligible) = action_slots(*sub_goal_index) else {
            continue;
        };
        for (index, item) in eligible.iter().zip(action_items.for_slot(slot)) {
            if item.is_empty() {
                continue;
            }
            placements.push(Placement::new(*index, item));
        }
    }

    placements
}
