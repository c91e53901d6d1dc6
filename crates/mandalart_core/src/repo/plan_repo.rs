//! Plan repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD APIs over `plans` and the 81 `cells` each plan owns.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths validate `PlanDraft` before SQL mutations.
//! - `insert_cells` and `update_cells` are all-or-nothing.
//! - Read paths reject invalid persisted state instead of masking it,
//!   including a `cell_type` that disagrees with the position's role.
//! - Cell listing is ordered by `position ASC`.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::grid::{CellRole, GridIndex};
use crate::model::plan::{
    Cell, CellStatus, CellUpdate, NewCell, Plan, PlanDraft, PlanId, PlanValidationError,
};
use chrono::NaiveDate;
use log::debug;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const TARGET_DATE_FORMAT: &str = "%Y-%m-%d";

const PLAN_SELECT_SQL: &str = "SELECT
    id,
    title,
    core_objective,
    target_date,
    created_at,
    updated_at
FROM plans";

const CELL_SELECT_SQL: &str = "SELECT
    id,
    plan_id,
    position,
    content,
    cell_type,
    status,
    updated_at
FROM cells";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for plan and cell persistence.
#[derive(Debug)]
pub enum RepoError {
    /// Plan fields failed validation.
    Validation(PlanValidationError),
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Plan does not exist.
    PlanNotFound(PlanId),
    /// Plan exists but has no cell at `position`.
    CellNotFound { plan_id: PlanId, position: GridIndex },
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Persisted data cannot be converted to a valid read model.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::PlanNotFound(id) => write!(f, "plan not found: {id}"),
            Self::CellNotFound { plan_id, position } => {
                write!(f, "cell {position} not found in plan {plan_id}")
            }
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "plan repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted plan data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<PlanValidationError> for RepoError {
    fn from(value: PlanValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for plan and cell persistence.
pub trait PlanRepository {
    /// Inserts plan metadata only; cells follow via `insert_cells`.
    fn create_plan(&self, draft: &PlanDraft) -> RepoResult<Plan>;
    /// Inserts cell rows for an existing plan in one transaction.
    fn insert_cells(&self, plan_id: PlanId, cells: &[NewCell]) -> RepoResult<()>;
    fn get_plan(&self, plan_id: PlanId) -> RepoResult<Option<Plan>>;
    /// Lists plans newest first.
    fn list_plans(&self) -> RepoResult<Vec<Plan>>;
    /// Replaces title, objective and target date.
    fn update_plan(&self, plan_id: PlanId, draft: &PlanDraft) -> RepoResult<Plan>;
    /// Deletes a plan; its cells cascade.
    fn delete_plan(&self, plan_id: PlanId) -> RepoResult<()>;
    /// Lists cells ordered by position.
    fn list_cells(&self, plan_id: PlanId) -> RepoResult<Vec<Cell>>;
    fn get_cell(&self, plan_id: PlanId, position: GridIndex) -> RepoResult<Option<Cell>>;
    /// Applies partial updates in one transaction.
    fn update_cells(&self, plan_id: PlanId, updates: &[CellUpdate]) -> RepoResult<()>;
}

/// SQLite-backed plan repository.
pub struct SqlitePlanRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePlanRepository<'conn> {
    /// Creates repository from a migrated connection.
    ///
    /// # Errors
    /// - `RepoError::UninitializedConnection` when migrations were not applied.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let expected_version = latest_version();
        let actual_version = current_user_version(conn)?;
        if actual_version != expected_version {
            return Err(RepoError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }
        Ok(Self { conn })
    }
}

impl PlanRepository for SqlitePlanRepository<'_> {
    fn create_plan(&self, draft: &PlanDraft) -> RepoResult<Plan> {
        draft.validate()?;
        let draft = draft.normalized();
        let plan_id = Uuid::new_v4();

        self.conn.execute(
            "INSERT INTO plans (id, title, core_objective, target_date)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                plan_id.to_string(),
                draft.title.as_str(),
                draft.core_objective.as_deref(),
                draft.target_date.map(format_target_date),
            ],
        )?;

        load_required_plan(self.conn, plan_id)
    }

    fn insert_cells(&self, plan_id: PlanId, cells: &[NewCell]) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        ensure_plan_exists(&tx, plan_id)?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO cells (id, plan_id, position, content, cell_type, status)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            )?;
            for cell in cells {
                stmt.execute(params![
                    Uuid::new_v4().to_string(),
                    plan_id.to_string(),
                    i64::from(u8::from(cell.position)),
                    cell.content.as_deref(),
                    cell.role().as_str(),
                    cell.status.as_str(),
                ])?;
            }
        }
        tx.commit()?;

        debug!(
            "event=cells_insert module=repo status=ok plan_id={} count={}",
            plan_id,
            cells.len()
        );
        Ok(())
    }

    fn get_plan(&self, plan_id: PlanId) -> RepoResult<Option<Plan>> {
        load_plan(self.conn, plan_id)
    }

    fn list_plans(&self) -> RepoResult<Vec<Plan>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PLAN_SELECT_SQL} ORDER BY created_at DESC, rowid DESC;"))?;
        let mut rows = stmt.query([])?;
        let mut plans = Vec::new();
        while let Some(row) = rows.next()? {
            plans.push(parse_plan_row(row)?);
        }
        Ok(plans)
    }

    fn update_plan(&self, plan_id: PlanId, draft: &PlanDraft) -> RepoResult<Plan> {
        draft.validate()?;
        let draft = draft.normalized();

        let changed = self.conn.execute(
            "UPDATE plans
             SET
                title = ?1,
                core_objective = ?2,
                target_date = ?3,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?4;",
            params![
                draft.title.as_str(),
                draft.core_objective.as_deref(),
                draft.target_date.map(format_target_date),
                plan_id.to_string(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::PlanNotFound(plan_id));
        }

        load_required_plan(self.conn, plan_id)
    }

    fn delete_plan(&self, plan_id: PlanId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM plans WHERE id = ?1;", [plan_id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::PlanNotFound(plan_id));
        }
        Ok(())
    }

    fn list_cells(&self, plan_id: PlanId) -> RepoResult<Vec<Cell>> {
        let mut stmt = self.conn.prepare(&format!(
            "{CELL_SELECT_SQL}
             WHERE plan_id = ?1
             ORDER BY position ASC;"
        ))?;
        let mut rows = stmt.query([plan_id.to_string()])?;
        let mut cells = Vec::new();
        while let Some(row) = rows.next()? {
            cells.push(parse_cell_row(row)?);
        }
        Ok(cells)
    }

    fn get_cell(&self, plan_id: PlanId, position: GridIndex) -> RepoResult<Option<Cell>> {
        let mut stmt = self.conn.prepare(&format!(
            "{CELL_SELECT_SQL}
             WHERE plan_id = ?1
               AND position = ?2;"
        ))?;
        let mut rows = stmt.query(params![
            plan_id.to_string(),
            i64::from(u8::from(position))
        ])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_cell_row(row)?));
        }
        Ok(None)
    }

    fn update_cells(&self, plan_id: PlanId, updates: &[CellUpdate]) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        ensure_plan_exists(&tx, plan_id)?;

        for update in updates.iter().filter(|update| !update.is_noop()) {
            let changed = match (&update.content, update.status) {
                (Some(content), Some(status)) => tx.execute(
                    "UPDATE cells
                     SET content = ?1, status = ?2,
                         updated_at = (strftime('%s', 'now') * 1000)
                     WHERE plan_id = ?3 AND position = ?4;",
                    params![
                        content.as_deref(),
                        status.as_str(),
                        plan_id.to_string(),
                        i64::from(u8::from(update.position)),
                    ],
                )?,
                (Some(content), None) => tx.execute(
                    "UPDATE cells
                     SET content = ?1,
                         updated_at = (strftime('%s', 'now') * 1000)
                     WHERE plan_id = ?2 AND position = ?3;",
                    params![
                        content.as_deref(),
                        plan_id.to_string(),
                        i64::from(u8::from(update.position)),
                    ],
                )?,
                (None, Some(status)) => tx.execute(
                    "UPDATE cells
                     SET status = ?1,
                         updated_at = (strftime('%s', 'now') * 1000)
                     WHERE plan_id = ?2 AND position = ?3;",
                    params![
                        status.as_str(),
                        plan_id.to_string(),
                        i64::from(u8::from(update.position)),
                    ],
                )?,
                (None, None) => continue,
            };
            if changed == 0 {
                return Err(RepoError::CellNotFound {
                    plan_id,
                    position: update.position,
                });
            }
        }

        tx.execute(
            "UPDATE plans
             SET updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            [plan_id.to_string()],
        )?;
        tx.commit()?;
        Ok(())
    }
}

fn ensure_plan_exists(tx: &Transaction<'_>, plan_id: PlanId) -> RepoResult<()> {
    let found: Option<i64> = tx
        .query_row(
            "SELECT 1 FROM plans WHERE id = ?1;",
            [plan_id.to_string()],
            |row| row.get(0),
        )
        .optional()?;
    match found {
        Some(_) => Ok(()),
        None => Err(RepoError::PlanNotFound(plan_id)),
    }
}

fn load_plan(conn: &Connection, plan_id: PlanId) -> RepoResult<Option<Plan>> {
    let mut stmt = conn.prepare(&format!("{PLAN_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([plan_id.to_string()])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_plan_row(row)?));
    }
    Ok(None)
}

fn load_required_plan(conn: &Connection, plan_id: PlanId) -> RepoResult<Plan> {
    load_plan(conn, plan_id)?.ok_or(RepoError::PlanNotFound(plan_id))
}

fn parse_plan_row(row: &Row<'_>) -> RepoResult<Plan> {
    let id_text: String = row.get("id")?;
    let target_date = match row.get::<_, Option<String>>("target_date")? {
        Some(value) => Some(parse_target_date(&value)?),
        None => None,
    };

    Ok(Plan {
        id: parse_uuid(&id_text, "plans.id")?,
        title: row.get("title")?,
        core_objective: row.get("core_objective")?,
        target_date,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn parse_cell_row(row: &Row<'_>) -> RepoResult<Cell> {
    let id_text: String = row.get("id")?;
    let plan_id_text: String = row.get("plan_id")?;

    let raw_position: i64 = row.get("position")?;
    let position = usize::try_from(raw_position)
        .ok()
        .and_then(|value| GridIndex::new(value).ok())
        .ok_or_else(|| {
            RepoError::InvalidData(format!("invalid position `{raw_position}` in cells.position"))
        })?;

    let type_text: String = row.get("cell_type")?;
    let cell_type = CellRole::parse(&type_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid cell type `{type_text}` in cells.cell_type"))
    })?;
    if cell_type != position.role() {
        return Err(RepoError::InvalidData(format!(
            "cell type `{type_text}` does not match role of position {position}"
        )));
    }

    let status_text: String = row.get("status")?;
    let status = CellStatus::parse(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid status `{status_text}` in cells.status"))
    })?;

    Ok(Cell {
        id: parse_uuid(&id_text, "cells.id")?,
        plan_id: parse_uuid(&plan_id_text, "cells.plan_id")?,
        position,
        content: row.get("content")?,
        cell_type,
        status,
        updated_at: row.get("updated_at")?,
    })
}

fn parse_uuid(value: &str, column: &'static str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid `{value}` in {column}")))
}

fn format_target_date(date: NaiveDate) -> String {
    date.format(TARGET_DATE_FORMAT).to_string()
}

fn parse_target_date(value: &str) -> RepoResult<NaiveDate> {
    NaiveDate::parse_from_str(value, TARGET_DATE_FORMAT).map_err(|_| {
        RepoError::InvalidData(format!("invalid date `{value}` in plans.target_date"))
    })
}
