use chrono::NaiveDate;
use mandalart_core::db::open_db_in_memory;
use mandalart_core::grid::{GridIndex, CELL_COUNT, ULTIMATE_GOAL_INDEX};
use mandalart_core::model::plan::NewCell;
use mandalart_core::{
    CellRole, CellStatus, CellUpdate, PlanDraft, PlanRepository, PlanValidationError, RepoError,
    SqlitePlanRepository,
};
use rusqlite::Connection;
use uuid::Uuid;

fn empty_cells() -> Vec<NewCell> {
    GridIndex::all().map(NewCell::empty).collect()
}

fn index(raw: usize) -> GridIndex {
    GridIndex::new(raw).unwrap()
}

#[test]
fn create_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePlanRepository::try_new(&conn).unwrap();

    let draft = PlanDraft {
        title: "  2026 plan ".to_string(),
        core_objective: Some("Become a senior engineer".to_string()),
        target_date: NaiveDate::from_ymd_opt(2026, 12, 31),
    };
    let created = repo.create_plan(&draft).unwrap();

    let loaded = repo.get_plan(created.id).unwrap().unwrap();
    assert_eq!(loaded, created);
    assert_eq!(loaded.title, "2026 plan");
    assert_eq!(loaded.core_objective.as_deref(), Some("Become a senior engineer"));
    assert_eq!(loaded.target_date, NaiveDate::from_ymd_opt(2026, 12, 31));
    assert!(loaded.created_at > 0);
}

#[test]
fn create_rejects_blank_title() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePlanRepository::try_new(&conn).unwrap();

    let err = repo.create_plan(&PlanDraft::new("   ")).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(PlanValidationError::EmptyTitle)
    ));
    assert!(repo.list_plans().unwrap().is_empty());
}

#[test]
fn insert_cells_stores_roles_by_position() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePlanRepository::try_new(&conn).unwrap();
    let plan = repo.create_plan(&PlanDraft::new("Grid")).unwrap();

    let mut cells = empty_cells();
    cells[ULTIMATE_GOAL_INDEX.get()].content = Some("Objective".to_string());
    repo.insert_cells(plan.id, &cells).unwrap();

    let stored = repo.list_cells(plan.id).unwrap();
    assert_eq!(stored.len(), CELL_COUNT);
    for (raw, cell) in stored.iter().enumerate() {
        assert_eq!(cell.position.get(), raw);
        assert_eq!(cell.cell_type, cell.position.role());
        assert_eq!(cell.status, CellStatus::Pending);
        assert_eq!(cell.plan_id, plan.id);
    }
    assert_eq!(stored[40].cell_type, CellRole::UltimateGoal);
    assert_eq!(stored[40].content.as_deref(), Some("Objective"));
    assert_eq!(stored[30].cell_type, CellRole::SubGoal);
}

#[test]
fn insert_cells_is_all_or_nothing() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePlanRepository::try_new(&conn).unwrap();
    let plan = repo.create_plan(&PlanDraft::new("Grid")).unwrap();

    let mut cells = empty_cells();
    cells.push(NewCell::empty(index(0)));

    assert!(matches!(
        repo.insert_cells(plan.id, &cells),
        Err(RepoError::Db(_))
    ));
    assert!(repo.list_cells(plan.id).unwrap().is_empty());
}

#[test]
fn insert_cells_for_unknown_plan_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePlanRepository::try_new(&conn).unwrap();

    let missing = Uuid::new_v4();
    assert!(matches!(
        repo.insert_cells(missing, &empty_cells()),
        Err(RepoError::PlanNotFound(id)) if id == missing
    ));
}

#[test]
fn list_plans_returns_newest_first() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePlanRepository::try_new(&conn).unwrap();

    let first = repo.create_plan(&PlanDraft::new("first")).unwrap();
    let second = repo.create_plan(&PlanDraft::new("second")).unwrap();
    let third = repo.create_plan(&PlanDraft::new("third")).unwrap();

    let ids: Vec<Uuid> = repo.list_plans().unwrap().iter().map(|plan| plan.id).collect();
    assert_eq!(ids, vec![third.id, second.id, first.id]);
}

#[test]
fn update_plan_replaces_metadata() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePlanRepository::try_new(&conn).unwrap();
    let plan = repo
        .create_plan(&PlanDraft {
            title: "Draft".to_string(),
            core_objective: Some("Old".to_string()),
            target_date: NaiveDate::from_ymd_opt(2026, 6, 1),
        })
        .unwrap();

    let updated = repo
        .update_plan(
            plan.id,
            &PlanDraft {
                title: "Final".to_string(),
                core_objective: Some("  ".to_string()),
                target_date: None,
            },
        )
        .unwrap();
    assert_eq!(updated.title, "Final");
    assert_eq!(updated.core_objective, None);
    assert_eq!(updated.target_date, None);

    assert!(matches!(
        repo.update_plan(Uuid::new_v4(), &PlanDraft::new("x")),
        Err(RepoError::PlanNotFound(_))
    ));
}

#[test]
fn delete_plan_cascades_to_cells() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePlanRepository::try_new(&conn).unwrap();
    let plan = repo.create_plan(&PlanDraft::new("Doomed")).unwrap();
    repo.insert_cells(plan.id, &empty_cells()).unwrap();

    repo.delete_plan(plan.id).unwrap();

    assert!(repo.get_plan(plan.id).unwrap().is_none());
    assert_eq!(cell_row_count(&conn, plan.id), 0);
    assert!(matches!(
        repo.delete_plan(plan.id),
        Err(RepoError::PlanNotFound(_))
    ));
}

#[test]
fn update_cells_applies_partial_fields() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePlanRepository::try_new(&conn).unwrap();
    let plan = repo.create_plan(&PlanDraft::new("Edits")).unwrap();
    let mut cells = empty_cells();
    cells[1].content = Some("keep me".to_string());
    cells[2].content = Some("clear me".to_string());
    repo.insert_cells(plan.id, &cells).unwrap();

    repo.update_cells(
        plan.id,
        &[
            CellUpdate::set_content(index(0), "Run 5k"),
            CellUpdate::set_status(index(1), CellStatus::Completed),
            CellUpdate::clear_content(index(2)),
            CellUpdate {
                position: index(3),
                content: Some(Some("Both".to_string())),
                status: Some(CellStatus::Failed),
            },
        ],
    )
    .unwrap();

    let stored = repo.list_cells(plan.id).unwrap();
    assert_eq!(stored[0].content.as_deref(), Some("Run 5k"));
    assert_eq!(stored[0].status, CellStatus::Pending);
    assert_eq!(stored[1].content.as_deref(), Some("keep me"));
    assert_eq!(stored[1].status, CellStatus::Completed);
    assert_eq!(stored[2].content, None);
    assert_eq!(stored[3].content.as_deref(), Some("Both"));
    assert_eq!(stored[3].status, CellStatus::Failed);
}

#[test]
fn update_cells_rolls_back_when_a_cell_is_missing() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePlanRepository::try_new(&conn).unwrap();
    let plan = repo.create_plan(&PlanDraft::new("Sparse")).unwrap();
    let cells: Vec<NewCell> = empty_cells().into_iter().take(10).collect();
    repo.insert_cells(plan.id, &cells).unwrap();

    let err = repo
        .update_cells(
            plan.id,
            &[
                CellUpdate::set_content(index(0), "written"),
                CellUpdate::set_content(index(50), "missing"),
            ],
        )
        .unwrap_err();
    match err {
        RepoError::CellNotFound { plan_id, position } => {
            assert_eq!(plan_id, plan.id);
            assert_eq!(position.get(), 50);
        }
        other => panic!("unexpected error: {other}"),
    }

    let cell = repo.get_cell(plan.id, index(0)).unwrap().unwrap();
    assert_eq!(cell.content, None);
}

#[test]
fn get_cell_returns_none_for_absent_position() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePlanRepository::try_new(&conn).unwrap();
    let plan = repo.create_plan(&PlanDraft::new("Empty")).unwrap();

    assert!(repo.get_cell(plan.id, index(0)).unwrap().is_none());
}

#[test]
fn read_rejects_cell_type_that_disagrees_with_position() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePlanRepository::try_new(&conn).unwrap();
    let plan = repo.create_plan(&PlanDraft::new("Corrupt")).unwrap();
    conn.execute(
        "INSERT INTO cells (id, plan_id, position, cell_type)
         VALUES (?1, ?2, 0, 'sub_goal');",
        [Uuid::new_v4().to_string(), plan.id.to_string()],
    )
    .unwrap();

    assert!(matches!(
        repo.list_cells(plan.id),
        Err(RepoError::InvalidData(_))
    ));
}

fn cell_row_count(conn: &Connection, plan_id: Uuid) -> i64 {
    conn.query_row(
        "SELECT COUNT(*) FROM cells WHERE plan_id = ?1;",
        [plan_id.to_string()],
        |row| row.get(0),
    )
    .unwrap()
}
