// tests/export_tests.rs

use std::{sync::Arc, time::Duration};

use classtrack::{
    config::Config,
    models::completion::NewCompletion,
    routes,
    state::AppState,
    store::{ClassStore, MemoryStore},
    utils::jwt::sign_jwt,
};

const JWT_SECRET: &str = "export_test_secret";

async fn spawn_app() -> (String, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());

    let config = Config {
        database_url: "postgres://unused".to_string(),
        jwt_secret: JWT_SECRET.to_string(),
        jwt_expiration: 600,
        rust_log: "error".to_string(),
        admin_username: None,
        admin_password: None,
        public_base_url: "http://localhost:3000/".to_string(),
        fetch_timeout: Duration::from_secs(5),
        port: 0,
    };

    let state = AppState {
        store: store.clone(),
        config,
    };
    let app = routes::create_router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (address, store)
}

async fn export(address: &str, path: &str) -> reqwest::Response {
    reqwest::Client::new()
        .get(format!("{}{}", address, path))
        .bearer_auth(sign_jwt(1, "admin", JWT_SECRET, 600).unwrap())
        .send()
        .await
        .expect("Export request failed")
}

async fn complete(store: &MemoryStore, student_id: i64, exercise_id: i64, at: &str) {
    store
        .insert_completion(NewCompletion {
            student_id,
            exercise_id,
            student_email: String::new(),
            completed_at: at.to_string(),
        })
        .await
        .unwrap()
        .expect("Completion should be new");
}

/// Math101 with Alice and Bob, HW1 and HW2, and Alice done with HW1.
async fn seed_math101(store: &MemoryStore) -> i64 {
    let class = store.create_class("Math101", "M101").await.unwrap();
    let alice = store
        .create_student(class.id, "Alice", "alice@x.com")
        .await
        .unwrap();
    store
        .create_student(class.id, "Bob", "bob@x.com")
        .await
        .unwrap();
    let hw1 = store.create_exercise(class.id, "HW1", "t-hw1").await.unwrap();
    store.create_exercise(class.id, "HW2", "t-hw2").await.unwrap();
    complete(store, alice.id, hw1.id, "2024-01-05T10:00:00Z").await;

    class.id
}

#[tokio::test]
async fn export_requires_session() {
    let (address, store) = spawn_app().await;
    let class_id = seed_math101(&store).await;

    let response = reqwest::Client::new()
        .get(format!("{}/api/classes/{}/export", address, class_id))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 401);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Unauthorized");
}

#[tokio::test]
async fn class_export_matches_expected_report() {
    let (address, store) = spawn_app().await;
    let class_id = seed_math101(&store).await;

    let response = export(&address, &format!("/api/classes/{}/export", class_id)).await;

    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(
        response.headers()["content-type"].to_str().unwrap(),
        "text/csv; charset=utf-8"
    );
    assert_eq!(
        response.headers()["content-disposition"].to_str().unwrap(),
        "attachment; filename=\"Math101_all_exercises.csv\""
    );

    let body = response.text().await.unwrap();
    let lines: Vec<&str> = body.split("\r\n").collect();
    assert_eq!(
        lines,
        [
            "Student Name,Email,HW1,HW2,Total Completed,Completion Rate",
            "Alice,alice@x.com,2024-01-05 10:00,,1/2,50.0%",
            "Bob,bob@x.com,,,0/2,0.0%",
            "",
            "Summary Statistics",
            "Total Students,2",
            "Total Exercises,2",
            "",
        ]
    );
}

#[tokio::test]
async fn repeated_exports_are_identical() {
    let (address, store) = spawn_app().await;
    let class_id = seed_math101(&store).await;
    let path = format!("/api/classes/{}/export", class_id);

    let first = export(&address, &path).await.bytes().await.unwrap();
    let second = export(&address, &path).await.bytes().await.unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn class_without_exercises_is_not_found() {
    let (address, store) = spawn_app().await;
    let class = store.create_class("Empty", "E").await.unwrap();
    store
        .create_student(class.id, "Alice", "alice@x.com")
        .await
        .unwrap();

    let response = export(&address, &format!("/api/classes/{}/export", class.id)).await;

    assert_eq!(response.status().as_u16(), 404);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "No exercises found for this class");
}

#[tokio::test]
async fn missing_class_is_not_found() {
    let (address, _) = spawn_app().await;

    let response = export(&address, "/api/classes/4242/export").await;

    assert_eq!(response.status().as_u16(), 404);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Class not found");
}

#[tokio::test]
async fn orphaned_completions_are_skipped() {
    let (address, store) = spawn_app().await;
    let class_id = seed_math101(&store).await;

    let alice = store
        .find_student_by_email(class_id, "alice@x.com")
        .await
        .unwrap()
        .unwrap();
    store.delete_student(alice.id).await.unwrap();

    let response = export(&address, &format!("/api/classes/{}/export", class_id)).await;
    assert_eq!(response.status().as_u16(), 200);

    let body = response.text().await.unwrap();
    let lines: Vec<&str> = body.split("\r\n").collect();
    assert_eq!(lines[1], "Bob,bob@x.com,,,0/2,0.0%");
    assert_eq!(lines[2], "");
    assert!(lines.contains(&"Total Students,1"));
    assert!(!body.contains("Alice"));
}

#[tokio::test]
async fn exercises_sharing_a_name_collapse() {
    let (address, store) = spawn_app().await;
    let class = store.create_class("Bio", "B1").await.unwrap();
    let alice = store
        .create_student(class.id, "Alice", "alice@x.com")
        .await
        .unwrap();
    let quiz_a = store.create_exercise(class.id, "Quiz", "q-a").await.unwrap();
    let quiz_b = store.create_exercise(class.id, "Quiz", "q-b").await.unwrap();
    complete(&store, alice.id, quiz_a.id, "2024-03-01T09:00:00Z").await;
    complete(&store, alice.id, quiz_b.id, "2024-03-08T09:30:00Z").await;

    let body = export(&address, &format!("/api/classes/{}/export", class.id))
        .await
        .text()
        .await
        .unwrap();
    let lines: Vec<&str> = body.split("\r\n").collect();

    assert_eq!(lines[0], "Student Name,Email,Quiz,Quiz,Total Completed,Completion Rate");
    assert_eq!(
        lines[1],
        "Alice,alice@x.com,2024-03-08 09:30,2024-03-08 09:30,2/2,100.0%"
    );
}

#[tokio::test]
async fn exercise_export_lists_completions() {
    let (address, store) = spawn_app().await;
    let class_id = seed_math101(&store).await;
    let exercises = store.list_exercises(class_id).await.unwrap();
    let hw1 = &exercises[0];

    let bob = store
        .find_student_by_email(class_id, "bob@x.com")
        .await
        .unwrap()
        .unwrap();
    store
        .insert_completion(NewCompletion {
            student_id: bob.id,
            exercise_id: hw1.id,
            student_email: "bob@x.com".to_string(),
            completed_at: "2024-01-06T11:30:00Z".to_string(),
        })
        .await
        .unwrap();
    store.delete_student(bob.id).await.unwrap();

    let response = export(&address, &format!("/api/exercises/{}/export", hw1.id)).await;

    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(
        response.headers()["content-disposition"].to_str().unwrap(),
        "attachment; filename=\"HW1_completions.csv\""
    );
    assert_eq!(
        response.text().await.unwrap(),
        "Student Name,Email,Completed At\r\n\
         Alice,,2024-01-05T10:00:00Z\r\n\
         Unknown,bob@x.com,2024-01-06T11:30:00Z\r\n"
    );
}

#[tokio::test]
async fn exercise_export_of_missing_exercise_is_not_found() {
    let (address, _) = spawn_app().await;

    let response = export(&address, "/api/exercises/777/export").await;

    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn non_ascii_class_name_survives_in_download_name() {
    let (address, store) = spawn_app().await;
    let class = store.create_class("Mathé 101", "M101").await.unwrap();
    store.create_exercise(class.id, "HW1", "t-hw1").await.unwrap();

    let response = export(&address, &format!("/api/classes/{}/export", class.id)).await;

    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(
        response.headers()["content-disposition"].to_str().unwrap(),
        "attachment; filename=\"Math_ 101_all_exercises.csv\"; \
         filename*=UTF-8''Math%C3%A9%20101_all_exercises.csv"
    );
}
