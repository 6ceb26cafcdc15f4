use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use chrono::{Duration, Utc};
use common::{Task, TaskStats};
use http_body_util::BodyExt; // For `collect`
use serde_json::json;
use server::database::TaskStore;
use server::routes::create_router;
use tower::ServiceExt; // For `oneshot`

/// Helper function to set up a fresh, in-memory store for each test.
async fn setup_test_app() -> (Router, TaskStore) {
    let store = TaskStore::open("sqlite::memory:")
        .await
        .expect("Failed to open in-memory store");
    (create_router(store.clone()), store)
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn read_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

async fn create(app: &Router, description: &str, deadline: Option<chrono::DateTime<Utc>>) -> Task {
    let payload = json!({ "description": description, "deadline": deadline });
    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/tasks", payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    read_json(response).await
}

#[tokio::test]
async fn test_create_and_list_tasks() {
    let (app, _store) = setup_test_app().await;

    // Act: Create a new task via POST request
    let created_task = create(&app, "Test Task Description", None).await;
    assert_eq!(created_task.description, "Test Task Description");
    assert!(!created_task.done);

    // Act: List tasks via GET request
    let response = app
        .oneshot(empty_request("GET", "/api/tasks"))
        .await
        .unwrap();

    // Assert: Check that the list contains the new task
    assert_eq!(response.status(), StatusCode::OK);
    let tasks: Vec<Task> = read_json(response).await;
    assert_eq!(tasks, vec![created_task]);
}

#[tokio::test]
async fn test_overdue_filter_and_stats() {
    let (app, _store) = setup_test_app().await;
    let yesterday = Utc::now() - Duration::days(1);

    create(&app, "A", None).await;
    let b = create(&app, "B", Some(yesterday)).await;
    let c = create(&app, "C", Some(yesterday)).await;
    let response = app
        .clone()
        .oneshot(empty_request("PATCH", &format!("/api/tasks/{}/toggle", c.id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/api/tasks?filter=overdue"))
        .await
        .unwrap();
    let overdue: Vec<Task> = read_json(response).await;
    assert_eq!(overdue.len(), 1);
    assert_eq!(overdue[0].id, b.id);

    let response = app
        .oneshot(empty_request("GET", "/api/stats"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let stats: TaskStats = read_json(response).await;
    assert_eq!(
        stats,
        TaskStats {
            total: 3,
            pending: 2,
            completed: 1,
            overdue: 1
        }
    );
}

#[tokio::test]
async fn test_unknown_filter_is_rejected() {
    let (app, _store) = setup_test_app().await;

    let response = app
        .oneshot(empty_request("GET", "/api/tasks?filter=someday"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_and_toggle_task() {
    let (app, _store) = setup_test_app().await;
    let created = create(&app, "Draft", None).await;
    let deadline = Utc::now() + Duration::days(3);

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/tasks/{}", created.id),
            json!({ "description": "Final", "deadline": deadline }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated: Task = read_json(response).await;
    assert_eq!(updated.description, "Final");
    assert_eq!(updated.deadline, Some(deadline));
    assert_eq!(updated.created_at, created.created_at);

    let response = app
        .clone()
        .oneshot(empty_request("PATCH", &format!("/api/tasks/{}/toggle", created.id)))
        .await
        .unwrap();
    let toggled: Task = read_json(response).await;
    assert!(toggled.done);

    let response = app
        .oneshot(empty_request("GET", &format!("/api/tasks/{}", created.id)))
        .await
        .unwrap();
    let fetched: Task = read_json(response).await;
    assert_eq!(fetched, toggled);
}

#[tokio::test]
async fn test_update_missing_task_returns_not_found() {
    let (app, store) = setup_test_app().await;
    create(&app, "Existing", None).await;
    let before = store.get_all().await.unwrap();

    let response = app
        .oneshot(json_request(
            "PUT",
            "/api/tasks/1",
            json!({ "description": "Ghost" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let error_response: serde_json::Value = read_json(response).await;
    assert_eq!(error_response["error"], "Task with ID 1 not found.");
    assert_eq!(store.get_all().await.unwrap(), before);
}

#[tokio::test]
async fn test_delete_task() {
    let (app, _store) = setup_test_app().await;
    let created_task = create(&app, "A task to be deleted", None).await;

    // Act: Send a DELETE request for the created task
    let response = app
        .clone()
        .oneshot(empty_request("DELETE", &format!("/api/tasks/{}", created_task.id)))
        .await
        .unwrap();

    // Assert: The delete was successful (204 NO_CONTENT)
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // Assert: The task list is now empty
    let response = app
        .oneshot(empty_request("GET", "/api/tasks"))
        .await
        .unwrap();
    let tasks: Vec<Task> = read_json(response).await;
    assert!(tasks.is_empty());
}

#[tokio::test]
async fn test_delete_missing_task_is_idempotent() {
    let (app, store) = setup_test_app().await;
    create(&app, "Survivor", None).await;

    let response = app
        .oneshot(empty_request("DELETE", "/api/tasks/1"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(store.get_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_create_task_empty_description() {
    let (app, store) = setup_test_app().await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/tasks",
            json!({ "description": "" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error_response: serde_json::Value = read_json(response).await;
    assert_eq!(error_response["error"], "Description cannot be empty.");
    assert!(store.get_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_health_probe_answers_head() {
    let (app, _store) = setup_test_app().await;

    let response = app
        .oneshot(empty_request("HEAD", "/api/health"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_stats_report_zeros_when_store_is_closed() {
    let (app, store) = setup_test_app().await;
    create(&app, "Counted", None).await;
    store.close().await;

    let response = app
        .oneshot(empty_request("GET", "/api/stats"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let stats: TaskStats = read_json(response).await;
    assert_eq!(stats, TaskStats::default());
}
