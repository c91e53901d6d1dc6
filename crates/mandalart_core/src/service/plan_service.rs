//! Plan use-case service.
//!
//! # Responsibility
//! - Create plans together with their 81 cells, compensating on failure.
//! - Apply cell edits and status cycling under grid-role rules.
//! - Project stored cells into display values and progress statistics.
//!
//! # Invariants
//! - A created plan either has all 81 cells or is deleted again.
//! - Mirror centers are never written; they display the owning sub-goal.
//! - Status cycling applies to non-mirror action-item cells only.
//! - Every stored text is capped at `DISPLAY_TEXT_LIMIT` characters.

use crate::grid::{
    is_mirror_center, mirror_owner, truncate_display, CellRole, GridError, GridIndex, Placement,
    CELL_COUNT, SUB_GOAL_INDICES,
};
use crate::model::plan::{
    Cell, CellStatus, CellUpdate, NewCell, Plan, PlanDraft, PlanId, PlanValidationError,
    PlanWithCells,
};
use crate::repo::plan_repo::{PlanRepository, RepoError};
use log::{error, info, warn};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for plan use-cases.
#[derive(Debug)]
pub enum PlanServiceError {
    /// Caller-provided plan fields are invalid.
    Validation(PlanValidationError),
    /// Target plan does not exist.
    PlanNotFound(PlanId),
    /// Grid lookup failed for a raw position.
    Grid(GridError),
    /// Write addressed a mirror center, which only redisplays a sub-goal.
    MirrorCell(GridIndex),
    /// Status change addressed a cell that is not an action item.
    NotActionItem(GridIndex),
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Cell insert failed and the compensating plan delete failed too.
    Rollback {
        original: RepoError,
        rollback: RepoError,
    },
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl Display for PlanServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::PlanNotFound(id) => write!(f, "plan not found: {id}"),
            Self::Grid(err) => write!(f, "{err}"),
            Self::MirrorCell(position) => write!(
                f,
                "cell {position} mirrors a sub-goal; edit the sub-goal instead"
            ),
            Self::NotActionItem(position) => {
                write!(f, "cell {position} is not an action item")
            }
            Self::Repo(err) => write!(f, "{err}"),
            Self::Rollback { original, rollback } => write!(
                f,
                "cell insert failed ({original}) and plan cleanup failed ({rollback})"
            ),
            Self::InconsistentState(details) => write!(f, "inconsistent plan state: {details}"),
        }
    }
}

impl Error for PlanServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Grid(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::Rollback { original, .. } => Some(original),
            _ => None,
        }
    }
}

impl From<RepoError> for PlanServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::PlanNotFound(id) => Self::PlanNotFound(id),
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

impl From<PlanValidationError> for PlanServiceError {
    fn from(value: PlanValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<GridError> for PlanServiceError {
    fn from(value: GridError) -> Self {
        Self::Grid(value)
    }
}

/// Display projection of one grid position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayCell {
    pub position: GridIndex,
    pub role: CellRole,
    /// Stored content, or the owning sub-goal's content on mirror centers.
    pub text: Option<String>,
    /// Present for non-mirror action items only.
    pub status: Option<CellStatus>,
    /// Owning sub-goal when this position is a mirror center.
    pub mirror_of: Option<GridIndex>,
}

/// Action-item progress summary for one plan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PlanProgress {
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
    pub failed: usize,
    /// `round((completed + in_progress) / total * 100)`, 0 when empty.
    pub percentage: u8,
}

/// Plan service facade over repository implementations.
pub struct PlanService<R: PlanRepository> {
    repo: R,
}

impl<R: PlanRepository> PlanService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates one plan with its 81 cells.
    ///
    /// `seed` typically comes from `grid::place`; display-only mirror
    /// placements and empty texts are skipped, every other position starts
    /// empty. All cells start `pending`.
    ///
    /// # Errors
    /// - `Validation` for a blank title.
    /// - `Repo` when the plan or its cells cannot be written; a plan whose
    ///   cells failed is deleted before returning.
    /// - `Rollback` when that compensating delete fails as well.
    pub fn create_plan(
        &self,
        draft: &PlanDraft,
        seed: &[Placement],
    ) -> Result<PlanWithCells, PlanServiceError> {
        draft.validate()?;
        let cells = seed_cells(seed);

        let plan = self.repo.create_plan(draft)?;
        info!(
            "event=plan_create module=plan status=start plan_id={} seeded={}",
            plan.id,
            cells.iter().filter(|cell| cell.content.is_some()).count()
        );

        if let Err(original) = self.repo.insert_cells(plan.id, &cells) {
            error!(
                "event=plan_create module=plan status=error plan_id={} error_code=cells_insert_failed error={}",
                plan.id, original
            );
            return match self.repo.delete_plan(plan.id) {
                Ok(()) => {
                    warn!(
                        "event=plan_rollback module=plan status=ok plan_id={}",
                        plan.id
                    );
                    Err(PlanServiceError::Repo(original))
                }
                Err(rollback) => {
                    error!(
                        "event=plan_rollback module=plan status=error plan_id={} error={}",
                        plan.id, rollback
                    );
                    Err(PlanServiceError::Rollback { original, rollback })
                }
            };
        }

        let cells = self.repo.list_cells(plan.id)?;
        if cells.len() != CELL_COUNT {
            return Err(PlanServiceError::InconsistentState(
                "created plan does not have 81 cells",
            ));
        }
        info!(
            "event=plan_create module=plan status=ok plan_id={}",
            plan.id
        );
        Ok(PlanWithCells { plan, cells })
    }

    /// Loads plan metadata with cells ordered by position.
    pub fn get_plan_with_cells(&self, plan_id: PlanId) -> Result<PlanWithCells, PlanServiceError> {
        let plan = self.require_plan(plan_id)?;
        let cells = self.repo.list_cells(plan_id)?;
        Ok(PlanWithCells { plan, cells })
    }

    /// Lists plans newest first.
    pub fn list_plans(&self) -> Result<Vec<Plan>, PlanServiceError> {
        self.repo.list_plans().map_err(Into::into)
    }

    /// Replaces plan title, objective and target date.
    pub fn update_plan(&self, plan_id: PlanId, draft: &PlanDraft) -> Result<Plan, PlanServiceError> {
        draft.validate()?;
        let plan = self.repo.update_plan(plan_id, draft)?;
        info!("event=plan_update module=plan status=ok plan_id={plan_id}");
        Ok(plan)
    }

    /// Deletes a plan and, through the cascade, its cells.
    pub fn delete_plan(&self, plan_id: PlanId) -> Result<(), PlanServiceError> {
        self.repo.delete_plan(plan_id)?;
        info!("event=plan_delete module=plan status=ok plan_id={plan_id}");
        Ok(())
    }

    /// Applies partial cell updates and returns the refreshed cells.
    ///
    /// Content is trimmed and capped at 50 characters; blank content clears
    /// the cell. The batch is rejected as a whole when any update targets a
    /// mirror center or sets a status outside the action items.
    pub fn update_cells(
        &self,
        plan_id: PlanId,
        updates: &[CellUpdate],
    ) -> Result<Vec<Cell>, PlanServiceError> {
        for update in updates {
            if is_mirror_center(update.position) {
                return Err(PlanServiceError::MirrorCell(update.position));
            }
            if update.status.is_some() && update.position.role() != CellRole::ActionItem {
                return Err(PlanServiceError::NotActionItem(update.position));
            }
        }

        let normalized: Vec<CellUpdate> = updates
            .iter()
            .map(|update| CellUpdate {
                position: update.position,
                content: update.content.as_ref().map(|content| {
                    content
                        .as_deref()
                        .map(str::trim)
                        .filter(|value| !value.is_empty())
                        .map(truncate_display)
                }),
                status: update.status,
            })
            .collect();

        self.repo.update_cells(plan_id, &normalized)?;
        info!(
            "event=cells_update module=plan status=ok plan_id={} count={}",
            plan_id,
            normalized.len()
        );
        self.repo.list_cells(plan_id).map_err(Into::into)
    }

    /// Advances one action item to its next status.
    ///
    /// # Errors
    /// - `Grid` for a position outside the grid.
    /// - `MirrorCell` / `NotActionItem` for cells without a status.
    pub fn cycle_status(&self, plan_id: PlanId, position: usize) -> Result<Cell, PlanServiceError> {
        let position = GridIndex::new(position)?;
        if position.role() != CellRole::ActionItem {
            return Err(PlanServiceError::NotActionItem(position));
        }
        if is_mirror_center(position) {
            return Err(PlanServiceError::MirrorCell(position));
        }

        self.require_plan(plan_id)?;
        let cell = self
            .repo
            .get_cell(plan_id, position)?
            .ok_or(PlanServiceError::InconsistentState("plan is missing a cell"))?;
        let next = cell.status.next();
        self.repo
            .update_cells(plan_id, &[CellUpdate::set_status(position, next)])?;

        self.repo
            .get_cell(plan_id, position)?
            .ok_or(PlanServiceError::InconsistentState(
                "updated cell not found in read-back",
            ))
    }

    /// Projects stored cells into the 81 values a grid view shows.
    pub fn display_grid(&self, plan_id: PlanId) -> Result<Vec<DisplayCell>, PlanServiceError> {
        let plan = self.get_plan_with_cells(plan_id)?;
        if plan.cells.len() != CELL_COUNT {
            return Err(PlanServiceError::InconsistentState(
                "plan does not have 81 cells",
            ));
        }
        display_cells(&plan.cells)
    }

    /// Counts action-item statuses, excluding mirror centers.
    pub fn progress(&self, plan_id: PlanId) -> Result<PlanProgress, PlanServiceError> {
        self.require_plan(plan_id)?;
        let cells = self.repo.list_cells(plan_id)?;
        Ok(progress_of(&cells))
    }

    fn require_plan(&self, plan_id: PlanId) -> Result<Plan, PlanServiceError> {
        self.repo
            .get_plan(plan_id)?
            .ok_or(PlanServiceError::PlanNotFound(plan_id))
    }
}

fn seed_cells(seed: &[Placement]) -> Vec<NewCell> {
    let mut cells: Vec<NewCell> = GridIndex::all().map(NewCell::empty).collect();
    for placement in seed.iter().filter(|placement| placement.is_stored()) {
        let text = truncate_display(placement.text.trim());
        if text.is_empty() {
            continue;
        }
        cells[placement.index.get()].content = Some(text);
    }
    cells
}

/// Builds display values from 81 position-ordered cells.
pub fn display_cells(cells: &[Cell]) -> Result<Vec<DisplayCell>, PlanServiceError> {
    let mut sub_goal_text = Vec::with_capacity(SUB_GOAL_INDICES.len());
    for sub_goal in SUB_GOAL_INDICES {
        let cell = cells
            .get(sub_goal.get())
            .filter(|cell| cell.position == sub_goal)
            .ok_or(PlanServiceError::InconsistentState(
                "cells are not ordered by position",
            ))?;
        sub_goal_text.push((sub_goal, cell.content.clone()));
    }

    cells
        .iter()
        .map(|cell| -> Result<DisplayCell, PlanServiceError> {
            let mirror_of = mirror_owner(cell.position.get())?;
            let text = match mirror_of {
                Some(owner) => sub_goal_text
                    .iter()
                    .find(|(sub_goal, _)| *sub_goal == owner)
                    .and_then(|(_, text)| text.clone()),
                None => cell.content.clone(),
            };
            let status = (cell.cell_type == CellRole::ActionItem && mirror_of.is_none())
                .then_some(cell.status);
            Ok(DisplayCell {
                position: cell.position,
                role: cell.cell_type,
                text,
                status,
                mirror_of,
            })
        })
        .collect()
}

/// Progress over non-mirror action items.
pub fn progress_of(cells: &[Cell]) -> PlanProgress {
    let mut progress = PlanProgress::default();
    for cell in cells
        .iter()
        .filter(|cell| cell.cell_type == CellRole::ActionItem && !is_mirror_center(cell.position))
    {
        progress.total += 1;
        match cell.status {
            CellStatus::Completed => progress.completed += 1,
            CellStatus::InProgress => progress.in_progress += 1,
            CellStatus::Failed => progress.failed += 1,
            CellStatus::Pending => {}
        }
    }
    if progress.total > 0 {
        let active = (progress.completed + progress.in_progress) as f64;
        progress.percentage = (active / progress.total as f64 * 100.0).round() as u8;
    }
    progress
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::mirror_center;
    use uuid::Uuid;

    fn cell(position: usize, status: CellStatus, content: Option<&str>) -> Cell {
        let position = GridIndex::new(position).unwrap();
        Cell {
            id: Uuid::new_v4(),
            plan_id: Uuid::nil(),
            position,
            content: content.map(str::to_string),
            cell_type: position.role(),
            status,
            updated_at: 0,
        }
    }

    fn grid() -> Vec<Cell> {
        (0..CELL_COUNT)
            .map(|position| cell(position, CellStatus::Pending, None))
            .collect()
    }

    #[test]
    fn seed_cells_skip_mirrors_and_blank_text() {
        let sub_goal = SUB_GOAL_INDICES[0];
        let center = mirror_center(sub_goal).unwrap();
        let seed = vec![
            Placement {
                index: sub_goal,
                role: CellRole::SubGoal,
                text: "Health".to_string(),
                mirror_of: None,
            },
            Placement {
                index: center,
                role: CellRole::ActionItem,
                text: "Health".to_string(),
                mirror_of: Some(sub_goal),
            },
            Placement {
                index: GridIndex::new(0).unwrap(),
                role: CellRole::ActionItem,
                text: "   ".to_string(),
                mirror_of: None,
            },
        ];

        let cells = seed_cells(&seed);
        assert_eq!(cells.len(), CELL_COUNT);
        assert_eq!(cells[sub_goal.get()].content.as_deref(), Some("Health"));
        assert_eq!(cells[center.get()].content, None);
        assert_eq!(cells[0].content, None);
    }

    #[test]
    fn progress_excludes_mirrors_and_rounds() {
        let mut cells = grid();
        cells[0].status = CellStatus::Completed;
        cells[1].status = CellStatus::InProgress;
        cells[2].status = CellStatus::Failed;
        cells[10].status = CellStatus::Completed; // mirror center, ignored

        let progress = progress_of(&cells);
        assert_eq!(progress.total, 64);
        assert_eq!(progress.completed, 1);
        assert_eq!(progress.in_progress, 1);
        assert_eq!(progress.failed, 1);
        assert_eq!(progress.percentage, 3);
    }

    #[test]
    fn empty_progress_is_zero() {
        assert_eq!(progress_of(&[]), PlanProgress::default());
    }

    #[test]
    fn display_mirrors_show_owning_sub_goal() {
        let mut cells = grid();
        cells[30].content = Some("Health".to_string());
        cells[10].content = Some("stale".to_string());

        let view = display_cells(&cells).unwrap();
        assert_eq!(view[10].text.as_deref(), Some("Health"));
        assert_eq!(view[10].mirror_of, Some(SUB_GOAL_INDICES[0]));
        assert_eq!(view[10].status, None);
        assert_eq!(view[0].status, Some(CellStatus::Pending));
        assert_eq!(view[30].status, None);
    }

    #[test]
    fn display_rejects_unordered_cells() {
        let mut cells = grid();
        cells.swap(30, 31);
        assert!(matches!(
            display_cells(&cells),
            Err(PlanServiceError::InconsistentState(_))
        ));
    }
}
