// tests/api_tests.rs

use std::sync::Arc;

use quizdesk::{
    config::Config,
    routes,
    state::AppState,
    storage::MemoryStore,
    utils::clock::SystemClock,
};
use tempfile::TempDir;

const SHEET: &str = "Question,Option1,Option2,Option3,Option4\n\
    Which keyword declares a constant in Java?,var,final,static,const\n\
    What is the default value of an int field?,null,0,1,undefined\n";

/// Helper function to spawn the app on a random port for testing.
/// Returns the base URL (e.g., "http://127.0.0.1:12345") and the directory
/// holding the question sheet, which must outlive the test.
async fn spawn_app() -> (String, TempDir) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    std::fs::create_dir_all(dir.path().join("Data")).unwrap();
    let sheet = dir.path().join("Data").join("Questions.csv");
    std::fs::write(&sheet, SHEET).unwrap();

    let config = Config {
        database_url: None,
        jwt_secret: "test_secret_for_integration_tests".to_string(),
        jwt_expiration: 600,
        rust_log: "error".to_string(),
        questions_source: sheet.to_string_lossy().into_owned(),
        quiz_id: "java-basics".to_string(),
        lock_window_hours: 24,
        sweep_interval_secs: 600,
        static_dir: dir.path().to_string_lossy().into_owned(),
        bind_addr: "127.0.0.1:0".to_string(),
    };

    let state = AppState::new(
        config,
        Arc::new(MemoryStore::default()),
        Arc::new(SystemClock),
    );
    let app = routes::create_router(state);

    // Bind to port 0 to get a random available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (address, dir)
}

fn unique_email() -> String {
    format!("s_{}@example.com", &uuid::Uuid::new_v4().to_string()[..8])
}

fn signup_body(email: &str) -> serde_json::Value {
    serde_json::json!({
        "username": "asha",
        "rollNo": "CS1042",
        "email": email,
        "password": "hunter42!",
        "cpassword": "hunter42!"
    })
}

#[tokio::test]
async fn health_check_404() {
    let (address, _dir) = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(&format!("{}/random_path_that_does_not_exist", address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn signup_works() {
    let (address, _dir) = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(&format!("{}/api/auth/signup", address))
        .json(&signup_body(&unique_email()))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 201);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["uid"].as_str().unwrap().len(), 28);
}

#[tokio::test]
async fn signup_fails_validation() {
    let (address, _dir) = spawn_app().await;
    let client = reqwest::Client::new();

    // Act: passwords do not match
    let mut body = signup_body(&unique_email());
    body["cpassword"] = serde_json::json!("hunter43!");

    let response = client
        .post(&format!("{}/api/auth/signup", address))
        .json(&body)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn duplicate_signup_conflicts() {
    let (address, _dir) = spawn_app().await;
    let client = reqwest::Client::new();
    let email = unique_email();

    for expected in [201, 409] {
        let response = client
            .post(&format!("{}/api/auth/signup", address))
            .json(&signup_body(&email))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), expected);
    }
}

#[tokio::test]
async fn login_error_messages() {
    let (address, _dir) = spawn_app().await;
    let client = reqwest::Client::new();
    let email = unique_email();

    let unknown: serde_json::Value = client
        .post(&format!("{}/api/auth/login", address))
        .json(&serde_json::json!({"email": email, "password": "hunter42!"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(unknown["error"], "User not found, Please Sign Up!");

    client
        .post(&format!("{}/api/auth/signup", address))
        .json(&signup_body(&email))
        .send()
        .await
        .unwrap();

    let wrong = client
        .post(&format!("{}/api/auth/login", address))
        .json(&serde_json::json!({"email": email, "password": "hunter43!"}))
        .send()
        .await
        .unwrap();
    assert_eq!(wrong.status().as_u16(), 401);
    let body: serde_json::Value = wrong.json().await.unwrap();
    assert_eq!(body["error"], "Invalid email or password");
}

#[tokio::test]
async fn tagged_form_endpoint() {
    let (address, _dir) = spawn_app().await;
    let client = reqwest::Client::new();
    let email = unique_email();

    let mut signup = signup_body(&email);
    signup["mode"] = serde_json::json!("signup");
    let response = client
        .post(&format!("{}/api/auth/form", address))
        .json(&signup)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 201);

    let login: serde_json::Value = client
        .post(&format!("{}/api/auth/form", address))
        .json(&serde_json::json!({"mode": "login", "email": email, "password": "hunter42!"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(login["type"], "Bearer");
    assert!(login["token"].as_str().is_some());
}

#[tokio::test]
async fn student_profile_lookup() {
    let (address, _dir) = spawn_app().await;
    let client = reqwest::Client::new();

    let signup: serde_json::Value = client
        .post(&format!("{}/api/auth/signup", address))
        .json(&signup_body(&unique_email()))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let uid = signup["uid"].as_str().unwrap();

    let profile: serde_json::Value = client
        .get(&format!("{}/api/students/{}", address, uid))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(profile["username"], "asha");
    assert_eq!(profile["rollNo"], "CS1042");

    // Malformed route id: redirected to the error view
    let response = client
        .get(&format!("{}/api/students/not-a-uid", address))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);

    // Well-formed but unknown
    let response = client
        .get(&format!("{}/api/students/{}", address, "A".repeat(28)))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "No such document");
}

#[tokio::test]
async fn question_sheet_is_served() {
    let (address, _dir) = spawn_app().await;

    let body = reqwest::get(&format!("{}/Data/Questions.csv", address))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    assert!(body.starts_with("Question,Option1,Option2,Option3,Option4"));
}
