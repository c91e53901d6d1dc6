//! Plan and cell records.
//!
//! # Responsibility
//! - Define plan metadata, the 81 cell rows it owns, and partial updates.
//! - Provide the fixed status cycle used by action-item cells.
//!
//! # Invariants
//! - `Cell::cell_type` always equals `Cell::position.role()`.
//! - Status cycles `pending -> in_progress -> completed -> failed -> pending`.
//! - `PlanDraft::validate()` must pass before any plan write.

use crate::grid::{CellRole, GridIndex};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable plan identifier.
pub type PlanId = Uuid;

/// Stable cell row identifier.
pub type CellId = Uuid;

/// Progress state of one cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellStatus {
    /// Not started.
    #[default]
    Pending,
    /// Work is underway.
    InProgress,
    /// Achieved.
    Completed,
    /// Abandoned or missed.
    Failed,
}

impl CellStatus {
    /// Cycle order applied by `next()`.
    pub const CYCLE: [CellStatus; 4] = [
        Self::Pending,
        Self::InProgress,
        Self::Completed,
        Self::Failed,
    ];

    /// Next status in the fixed cycle, wrapping `Failed` back to `Pending`.
    pub fn next(self) -> Self {
        match self {
            Self::Pending => Self::InProgress,
            Self::InProgress => Self::Completed,
            Self::Completed => Self::Failed,
            Self::Failed => Self::Pending,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "in_progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

/// Persisted plan metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub id: PlanId,
    pub title: String,
    /// The ultimate goal as originally typed by the user.
    pub core_objective: Option<String>,
    /// Serialized as `YYYY-MM-DD`.
    pub target_date: Option<NaiveDate>,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds.
    pub updated_at: i64,
}

impl Plan {
    /// Signed day count from `today` to the target date ("D-Day").
    ///
    /// Negative once the target date has passed; `None` without a target.
    pub fn days_until_target(&self, today: NaiveDate) -> Option<i64> {
        self.target_date
            .map(|target| target.signed_duration_since(today).num_days())
    }
}

/// One persisted grid cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub id: CellId,
    pub plan_id: PlanId,
    pub position: GridIndex,
    pub content: Option<String>,
    pub cell_type: CellRole,
    pub status: CellStatus,
    /// Unix epoch milliseconds.
    pub updated_at: i64,
}

/// Plan metadata together with its cells ordered by position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanWithCells {
    #[serde(flatten)]
    pub plan: Plan,
    pub cells: Vec<Cell>,
}

/// Caller-provided plan fields for create and update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanDraft {
    pub title: String,
    #[serde(default)]
    pub core_objective: Option<String>,
    #[serde(default)]
    pub target_date: Option<NaiveDate>,
}

impl PlanDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Validates required fields.
    ///
    /// # Errors
    /// - `PlanValidationError::EmptyTitle` when the title is blank after trim.
    pub fn validate(&self) -> Result<(), PlanValidationError> {
        if self.title.trim().is_empty() {
            return Err(PlanValidationError::EmptyTitle);
        }
        Ok(())
    }

    /// Trims the title and maps a blank objective to `None`.
    pub fn normalized(&self) -> Self {
        Self {
            title: self.title.trim().to_string(),
            core_objective: self
                .core_objective
                .as_deref()
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string),
            target_date: self.target_date,
        }
    }
}

/// Validation failures for `PlanDraft`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanValidationError {
    EmptyTitle,
}

impl Display for PlanValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "plan title is required"),
        }
    }
}

impl Error for PlanValidationError {}

/// Initial state of one cell inserted alongside its plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCell {
    pub position: GridIndex,
    pub content: Option<String>,
    pub status: CellStatus,
}

impl NewCell {
    pub fn empty(position: GridIndex) -> Self {
        Self {
            position,
            content: None,
            status: CellStatus::Pending,
        }
    }

    pub fn role(&self) -> CellRole {
        self.position.role()
    }
}

/// Partial update of one cell addressed by position.
///
/// `content: None` leaves content untouched; `Some(None)` clears it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellUpdate {
    pub position: GridIndex,
    pub content: Option<Option<String>>,
    pub status: Option<CellStatus>,
}

impl CellUpdate {
    pub fn set_content(position: GridIndex, content: impl Into<String>) -> Self {
        Self {
            position,
            content: Some(Some(content.into())),
            status: None,
        }
    }

    pub fn clear_content(position: GridIndex) -> Self {
        Self {
            position,
            content: Some(None),
            status: None,
        }
    }

    pub fn set_status(position: GridIndex, status: CellStatus) -> Self {
        Self {
            position,
            content: None,
            status: Some(status),
        }
    }

    /// Whether the update would change nothing.
    pub fn is_noop(&self) -> bool {
        self.content.is_none() && self.status.is_none()
    }
}
