mod common;

use actix_web::{http::StatusCode, test};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use common::{bearer, create_task, init_app, register, test_state};

#[actix_rt::test]
async fn test_create_task_unauthorized() {
    let (store, state) = test_state();
    let app = init_app(state).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/tasks")
        .set_json(json!({ "title": "Unauthorized Task" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(store.task_count().await, 0);
}

#[actix_rt::test]
async fn test_task_crud_for_owner() {
    let (_, state) = test_state();
    let app = init_app(state).await;
    let alice = register(&app, "alice").await;

    let req = test::TestRequest::post()
        .uri("/api/v1/tasks")
        .insert_header(bearer(&alice.access_token))
        .set_json(json!({ "title": "Buy milk", "description": "2 litres" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let task: Value = test::read_body_json(resp).await;
    assert_eq!(task["status"], "pending");
    assert_eq!(task["owner_id"], 1);
    let uri = format!("/api/v1/tasks/{}", task["id"].as_str().unwrap());

    let req = test::TestRequest::get()
        .uri(&uri)
        .insert_header(bearer(&alice.access_token))
        .to_request();
    let fetched: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(fetched, task);

    let req = test::TestRequest::put()
        .uri(&uri)
        .insert_header(bearer(&alice.access_token))
        .set_json(json!({ "status": "done" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Value = test::read_body_json(resp).await;
    assert_eq!(updated["status"], "done");
    assert_eq!(updated["title"], "Buy milk");
    assert_eq!(updated["description"], "2 litres");

    let req = test::TestRequest::delete()
        .uri(&uri)
        .insert_header(bearer(&alice.access_token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::get()
        .uri(&uri)
        .insert_header(bearer(&alice.access_token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_other_users_task_is_forbidden_and_unchanged() {
    let (_, state) = test_state();
    let app = init_app(state).await;
    let alice = register(&app, "alice").await;
    let bob = register(&app, "bob").await;

    let task = create_task(&app, &alice.access_token, "Buy milk").await;
    let uri = format!("/api/v1/tasks/{}", task["id"].as_str().unwrap());

    let requests = [
        test::TestRequest::get().uri(&uri),
        test::TestRequest::put()
            .uri(&uri)
            .set_json(json!({ "title": "Hijacked" })),
        test::TestRequest::patch()
            .uri(&uri)
            .set_json(json!({ "status": "done" })),
        test::TestRequest::delete().uri(&uri),
    ];
    for req in requests {
        let req = req.insert_header(bearer(&bob.access_token)).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    let req = test::TestRequest::get()
        .uri(&uri)
        .insert_header(bearer(&alice.access_token))
        .to_request();
    let current: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(current, task);
}

#[actix_rt::test]
async fn test_status_filter_returns_only_matching_tasks() {
    let (_, state) = test_state();
    let app = init_app(state).await;
    let alice = register(&app, "alice").await;
    let bob = register(&app, "bob").await;

    let first = create_task(&app, &alice.access_token, "First").await;
    create_task(&app, &alice.access_token, "Second").await;
    create_task(&app, &bob.access_token, "Bob's").await;

    let req = test::TestRequest::patch()
        .uri(&format!("/api/v1/tasks/{}", first["id"].as_str().unwrap()))
        .insert_header(bearer(&alice.access_token))
        .set_json(json!({ "status": "in_progress" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri("/api/v1/tasks?status=in_progress")
        .insert_header(bearer(&alice.access_token))
        .to_request();
    let in_progress: Vec<Value> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(in_progress.len(), 1);
    assert_eq!(in_progress[0]["title"], "First");

    let req = test::TestRequest::get()
        .uri("/api/v1/tasks")
        .insert_header(bearer(&alice.access_token))
        .to_request();
    let all: Vec<Value> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(all.len(), 2);
    assert!(all.iter().all(|task| task["owner_id"] == 1));

    let req = test::TestRequest::get()
        .uri("/api/v1/tasks?status=done")
        .insert_header(bearer(&alice.access_token))
        .to_request();
    let done: Vec<Value> = test::call_and_read_body_json(&app, req).await;
    assert!(done.is_empty());
}

#[actix_rt::test]
async fn test_explicit_null_clears_description() {
    let (_, state) = test_state();
    let app = init_app(state).await;
    let alice = register(&app, "alice").await;

    let req = test::TestRequest::post()
        .uri("/api/v1/tasks")
        .insert_header(bearer(&alice.access_token))
        .set_json(json!({ "title": "Buy milk", "description": "2 litres" }))
        .to_request();
    let task: Value = test::call_and_read_body_json(&app, req).await;
    let uri = format!("/api/v1/tasks/{}", task["id"].as_str().unwrap());

    // Omitting description keeps it.
    let req = test::TestRequest::patch()
        .uri(&uri)
        .insert_header(bearer(&alice.access_token))
        .set_json(json!({ "title": "Buy oat milk" }))
        .to_request();
    let renamed: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(renamed["description"], "2 litres");

    let req = test::TestRequest::patch()
        .uri(&uri)
        .insert_header(bearer(&alice.access_token))
        .set_json(json!({ "description": null }))
        .to_request();
    let cleared: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(cleared["description"], Value::Null);
    assert_eq!(cleared["title"], "Buy oat milk");
}

#[actix_rt::test]
async fn test_invalid_task_payloads() {
    let (_, state) = test_state();
    let app = init_app(state).await;
    let alice = register(&app, "alice").await;

    let req = test::TestRequest::post()
        .uri("/api/v1/tasks")
        .insert_header(bearer(&alice.access_token))
        .set_json(json!({ "title": "" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let req = test::TestRequest::post()
        .uri("/api/v1/tasks")
        .insert_header(bearer(&alice.access_token))
        .set_json(json!({ "title": "    " }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let task = create_task(&app, &alice.access_token, "Valid").await;
    let req = test::TestRequest::patch()
        .uri(&format!("/api/v1/tasks/{}", task["id"].as_str().unwrap()))
        .insert_header(bearer(&alice.access_token))
        .set_json(json!({ "status": "archived" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[actix_rt::test]
async fn test_unknown_task_is_not_found() {
    let (_, state) = test_state();
    let app = init_app(state).await;
    let alice = register(&app, "alice").await;

    let req = test::TestRequest::delete()
        .uri(&format!("/api/v1/tasks/{}", uuid::Uuid::new_v4()))
        .insert_header(bearer(&alice.access_token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_alice_and_bob() {
    let (_, state) = test_state();
    let app = init_app(state).await;

    let alice = register(&app, "alice").await;
    assert!(!alice.access_token.is_empty());
    assert_ne!(alice.access_token, alice.refresh_token);

    for (password, expected) in [
        ("password123", StatusCode::OK),
        ("wrongpass", StatusCode::UNAUTHORIZED),
    ] {
        let req = test::TestRequest::post()
            .uri("/api/v1/auth/login")
            .set_json(json!({ "username": "alice", "password": password }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), expected);
    }

    let task = create_task(&app, &alice.access_token, "Buy milk").await;
    assert_eq!(task["status"], "pending");
    assert_eq!(task["owner_id"], 1);

    let bob = register(&app, "bob").await;
    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/tasks/{}", task["id"].as_str().unwrap()))
        .insert_header(bearer(&bob.access_token))
        .set_json(json!({ "title": "Buy beer" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}
