use navigaite_core::db::open_db_in_memory;
use navigaite_core::{
    DashboardService, NewTask, RecommendationItem, RecommendationResource, RecommendationService,
    ServiceError, TaskService, TaskSource, UserService, ValidationError,
};
use rusqlite::Connection;

#[test]
fn clear_needs_recalc_reports_change_only_once() {
    let mut conn = open_db_in_memory().unwrap();
    UserService::new(&mut conn).ensure_user("u1").unwrap();

    let mut service = RecommendationService::new(&mut conn);
    assert!(service.clear_needs_recalc("u1").unwrap());
    assert!(!service.clear_needs_recalc("u1").unwrap());
}

#[test]
fn clear_needs_recalc_does_not_create_unknown_users() {
    let mut conn = open_db_in_memory().unwrap();
    let cleared = RecommendationService::new(&mut conn)
        .clear_needs_recalc("ghost")
        .unwrap();
    assert!(!cleared);
    assert!(UserService::new(&mut conn).get_user("ghost").unwrap().is_none());
}

#[test]
fn set_recommendations_stores_tasks_with_resources() {
    let mut conn = open_db_in_memory().unwrap();
    let mut item = item_with_resource("Visit campus", "Tour page", "http://x");
    item.id = Some("rec-visit".to_string());
    item.due_date = Some("2026-12-01".to_string());

    let batch = RecommendationService::new(&mut conn)
        .set_recommendations("u1", &[item])
        .unwrap();

    assert_eq!(batch.stored_count, 1);
    let stored = &batch.tasks[0];
    assert_eq!(stored.id, "rec-visit");
    assert_eq!(stored.source, TaskSource::Llm);
    assert_eq!(stored.resources.len(), 1);
    assert_eq!(stored.resources[0].url, "http://x");
    assert_eq!(stored.resources[0].task_id, "rec-visit");

    let listed = TaskService::new(&mut conn).list_tasks("u1").unwrap();
    assert_eq!(listed, batch.tasks);
}

#[test]
fn set_recommendations_twice_does_not_duplicate_llm_tasks() {
    let mut conn = open_db_in_memory().unwrap();
    let items = vec![
        item_with_resource("Visit campus", "Tour page", "http://x"),
        RecommendationItem::new("Request transcript"),
    ];

    let mut service = RecommendationService::new(&mut conn);
    service.set_recommendations("u1", &items).unwrap();
    service.set_recommendations("u1", &items).unwrap();

    let llm_tasks = TaskService::new(&mut conn)
        .list_tasks("u1")
        .unwrap()
        .into_iter()
        .filter(|task| task.source == TaskSource::Llm)
        .count();
    assert_eq!(llm_tasks, items.len());
    assert_eq!(count_rows(&conn, "resources"), 1);
}

#[test]
fn set_recommendations_preserves_user_tasks_and_clears_flag() {
    let mut conn = open_db_in_memory().unwrap();
    let manual = TaskService::new(&mut conn)
        .add_task("u1", &NewTask::new("Write essay"))
        .unwrap();

    RecommendationService::new(&mut conn)
        .set_recommendations("u1", &[RecommendationItem::new("Visit campus")])
        .unwrap();
    RecommendationService::new(&mut conn)
        .set_recommendations("u1", &[])
        .unwrap();

    let dashboard = DashboardService::new(&mut conn).get_dashboard("u1").unwrap();
    assert_eq!(dashboard.tasks, vec![manual]);
    assert!(!dashboard.user.needs_recalc);
}

#[test]
fn failed_replacement_rolls_back_everything() {
    let mut conn = open_db_in_memory().unwrap();
    let mut first = RecommendationItem::new("Visit campus");
    first.id = Some("rec-1".to_string());
    RecommendationService::new(&mut conn)
        .set_recommendations("u1", &[first.clone()])
        .unwrap();
    TaskService::new(&mut conn)
        .add_task("u1", &NewTask::new("Write essay"))
        .unwrap();

    let mut duplicate_a = RecommendationItem::new("Apply early");
    duplicate_a.id = Some("dup".to_string());
    let mut duplicate_b = RecommendationItem::new("Apply regular");
    duplicate_b.id = Some("dup".to_string());
    let err = RecommendationService::new(&mut conn)
        .set_recommendations("u1", &[duplicate_a, duplicate_b])
        .unwrap_err();
    assert!(matches!(err, ServiceError::Repo(_)));

    let dashboard = DashboardService::new(&mut conn).get_dashboard("u1").unwrap();
    let llm_ids: Vec<&str> = dashboard
        .tasks
        .iter()
        .filter(|task| task.source == TaskSource::Llm)
        .map(|task| task.id.as_str())
        .collect();
    assert_eq!(llm_ids, ["rec-1"]);
    assert!(dashboard.user.needs_recalc);
}

#[test]
fn invalid_item_rejects_whole_batch() {
    let mut conn = open_db_in_memory().unwrap();
    RecommendationService::new(&mut conn)
        .set_recommendations("u1", &[RecommendationItem::new("Visit campus")])
        .unwrap();

    let err = RecommendationService::new(&mut conn)
        .set_recommendations(
            "u1",
            &[RecommendationItem::new("Valid"), RecommendationItem::new(" ")],
        )
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Validation(ValidationError::EmptyTitle)
    ));

    let tasks = TaskService::new(&mut conn).list_tasks("u1").unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].title, "Visit campus");
}

#[test]
fn replaced_tasks_take_their_resources_with_them() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = RecommendationService::new(&mut conn);
    service
        .set_recommendations(
            "u1",
            &[item_with_resource("Visit campus", "Tour page", "http://x")],
        )
        .unwrap();
    service
        .set_recommendations("u1", &[RecommendationItem::new("Request transcript")])
        .unwrap();

    assert_eq!(count_rows(&conn, "resources"), 0);
}

#[test]
fn replacement_is_scoped_to_one_user() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = RecommendationService::new(&mut conn);
    service
        .set_recommendations("u1", &[RecommendationItem::new("Visit campus")])
        .unwrap();
    service
        .set_recommendations("u2", &[RecommendationItem::new("Request transcript")])
        .unwrap();

    let u1_tasks = TaskService::new(&mut conn).list_tasks("u1").unwrap();
    assert_eq!(u1_tasks.len(), 1);
    assert_eq!(u1_tasks[0].title, "Visit campus");
}

#[test]
fn checklist_scenario_end_to_end() {
    let mut conn = open_db_in_memory().unwrap();

    let essay = TaskService::new(&mut conn)
        .add_task("u1", &NewTask::new("Write essay"))
        .unwrap();
    assert!(TaskService::new(&mut conn)
        .toggle_task("u1", &essay.id, true)
        .unwrap());

    let before = DashboardService::new(&mut conn).get_dashboard("u1").unwrap();
    assert_eq!(before.tasks.len(), 1);
    assert!(before.tasks[0].done);
    assert!(before.user.needs_recalc);

    RecommendationService::new(&mut conn)
        .set_recommendations(
            "u1",
            &[item_with_resource("Visit campus", "Tour page", "http://x")],
        )
        .unwrap();

    let after = DashboardService::new(&mut conn).get_dashboard("u1").unwrap();
    assert_eq!(after.tasks.len(), 2);
    let sources: Vec<TaskSource> = after.tasks.iter().map(|task| task.source).collect();
    assert_eq!(sources, [TaskSource::User, TaskSource::Llm]);
    assert!(!after.user.needs_recalc);
    assert_eq!(after.pending_count(), 1);
}

fn item_with_resource(title: &str, resource_title: &str, url: &str) -> RecommendationItem {
    let mut item = RecommendationItem::new(title);
    item.resources.push(RecommendationResource {
        title: resource_title.to_string(),
        url: url.to_string(),
        description: None,
    });
    item
}

fn count_rows(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })
    .unwrap()
}
