use navigaite_core::db::open_db_in_memory;
use navigaite_core::{
    DashboardService, NewTask, RecommendationService, ServiceError, TaskService, TaskSource,
    UserService, ValidationError,
};
use rusqlite::Connection;
use std::thread;
use std::time::Duration;

#[test]
fn unseen_user_gets_default_dashboard() {
    let mut conn = open_db_in_memory().unwrap();

    let user = UserService::new(&mut conn).ensure_user("fresh").unwrap();
    assert!(user.needs_recalc);

    let dashboard = DashboardService::new(&mut conn).get_dashboard("fresh").unwrap();
    assert_eq!(dashboard.user.id, "fresh");
    assert!(dashboard.user.needs_recalc);
    assert!(dashboard.tasks.is_empty());
}

#[test]
fn ensure_user_returns_existing_row_unchanged() {
    let mut conn = open_db_in_memory().unwrap();
    let first = UserService::new(&mut conn).ensure_user("u1").unwrap();
    RecommendationService::new(&mut conn)
        .clear_needs_recalc("u1")
        .unwrap();

    let second = UserService::new(&mut conn).ensure_user("u1").unwrap();
    assert_eq!(second.created_at, first.created_at);
    assert!(!second.needs_recalc);
    assert_eq!(count_rows(&conn, "users"), 1);
}

#[test]
fn add_task_creates_user_task_and_marks_stale() {
    let mut conn = open_db_in_memory().unwrap();
    UserService::new(&mut conn).ensure_user("u1").unwrap();
    RecommendationService::new(&mut conn)
        .clear_needs_recalc("u1")
        .unwrap();

    let mut request = NewTask::new("  Write essay ");
    request.note = Some("Common App prompt 2".to_string());
    request.due_date = Some("2026-11-01".to_string());
    let created = TaskService::new(&mut conn).add_task("u1", &request).unwrap();

    assert_eq!(created.title, "Write essay");
    assert_eq!(created.source, TaskSource::User);
    assert!(!created.done);
    assert!(created.completed_at.is_none());

    let tasks = TaskService::new(&mut conn).list_tasks("u1").unwrap();
    assert_eq!(tasks, vec![created]);

    let user = UserService::new(&mut conn).get_user("u1").unwrap().unwrap();
    assert!(user.needs_recalc);
}

#[test]
fn add_task_rejects_blank_title_without_writing() {
    let mut conn = open_db_in_memory().unwrap();

    let err = TaskService::new(&mut conn)
        .add_task("u1", &NewTask::new("   "))
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Validation(ValidationError::EmptyTitle)
    ));
    assert_eq!(count_rows(&conn, "tasks"), 0);
    assert_eq!(count_rows(&conn, "users"), 0);
}

#[test]
fn blank_user_id_is_rejected() {
    let mut conn = open_db_in_memory().unwrap();
    let err = TaskService::new(&mut conn).list_tasks("  ").unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Validation(ValidationError::EmptyUserId)
    ));
}

#[test]
fn user_ids_are_stored_exactly_as_supplied() {
    let mut conn = open_db_in_memory().unwrap();
    let plain = UserService::new(&mut conn).ensure_user("u1").unwrap();
    let padded = UserService::new(&mut conn).ensure_user(" u1").unwrap();

    assert_eq!(plain.id, "u1");
    assert_eq!(padded.id, " u1");
    assert_eq!(count_rows(&conn, "users"), 2);

    TaskService::new(&mut conn)
        .add_task(" u1", &NewTask::new("Padded task"))
        .unwrap();
    assert!(TaskService::new(&mut conn).list_tasks("u1").unwrap().is_empty());
    assert_eq!(TaskService::new(&mut conn).list_tasks(" u1").unwrap().len(), 1);
}

#[test]
fn list_tasks_keeps_insertion_order() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = TaskService::new(&mut conn);
    for title in ["Draft essay", "Ask for letters", "Submit FAFSA"] {
        service.add_task("u1", &NewTask::new(title)).unwrap();
    }

    let titles: Vec<String> = service
        .list_tasks("u1")
        .unwrap()
        .into_iter()
        .map(|task| task.title)
        .collect();
    assert_eq!(titles, ["Draft essay", "Ask for letters", "Submit FAFSA"]);
}

#[test]
fn toggle_sets_and_clears_completion_timestamp() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = TaskService::new(&mut conn);
    let task = service.add_task("u1", &NewTask::new("Write essay")).unwrap();

    assert!(service.toggle_task("u1", &task.id, true).unwrap());
    let done = service.get_task("u1", &task.id).unwrap().unwrap();
    assert!(done.done);
    assert!(done.completed_at.is_some());

    assert!(service.toggle_task("u1", &task.id, false).unwrap());
    let reopened = service.get_task("u1", &task.id).unwrap().unwrap();
    assert!(!reopened.done);
    assert!(reopened.completed_at.is_none());
}

#[test]
fn toggle_to_current_state_still_reports_updated() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = TaskService::new(&mut conn);
    let task = service.add_task("u1", &NewTask::new("Write essay")).unwrap();

    assert!(service.toggle_task("u1", &task.id, true).unwrap());
    let first = service
        .get_task("u1", &task.id)
        .unwrap()
        .unwrap()
        .completed_at
        .unwrap();

    thread::sleep(Duration::from_millis(5));
    assert!(service.toggle_task("u1", &task.id, true).unwrap());
    let again = service.get_task("u1", &task.id).unwrap().unwrap();
    assert!(again.done);
    assert!(again.completed_at.unwrap() > first);
}

#[test]
fn toggle_foreign_task_reports_not_updated() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = TaskService::new(&mut conn);
    let owned = service.add_task("owner", &NewTask::new("Owner task")).unwrap();

    assert!(!service.toggle_task("intruder", &owned.id, true).unwrap());
    assert!(!service.toggle_task("owner", "missing-task", true).unwrap());

    let untouched = service.get_task("owner", &owned.id).unwrap().unwrap();
    assert!(!untouched.done);
    assert!(untouched.completed_at.is_none());
    assert!(service.get_task("intruder", &owned.id).unwrap().is_none());
}

#[test]
fn toggle_marks_stale_even_when_nothing_matched() {
    let mut conn = open_db_in_memory().unwrap();
    UserService::new(&mut conn).ensure_user("u1").unwrap();
    RecommendationService::new(&mut conn)
        .clear_needs_recalc("u1")
        .unwrap();

    let updated = TaskService::new(&mut conn)
        .toggle_task("u1", "missing-task", true)
        .unwrap();
    assert!(!updated);

    let user = UserService::new(&mut conn).get_user("u1").unwrap().unwrap();
    assert!(user.needs_recalc);
}

fn count_rows(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })
    .unwrap()
}
