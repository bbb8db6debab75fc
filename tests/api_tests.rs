use newsnotes::{
    AppConfig, AppState, InMemoryRepository, create_router,
    models::{NoteListPage, TokenResponse},
    repository::RepositoryState,
};
use reqwest::{StatusCode, header, redirect};
use std::sync::Arc;
use tokio::net::TcpListener;

#[derive(Debug)]
pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
}

/// Serves the real router over the in-memory store on an ephemeral port.
async fn spawn_app() -> TestApp {
    let repo = Arc::new(InMemoryRepository::new()) as RepositoryState;
    let state = AppState {
        repo,
        config: AppConfig::default(),
    };
    let router = create_router(state);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    // Redirects are part of what is under test.
    let client = reqwest::Client::builder()
        .redirect(redirect::Policy::none())
        .build()
        .unwrap();

    TestApp { address, client }
}

#[tokio::test]
async fn test_health_check() {
    let app = spawn_app().await;
    let response = app
        .client
        .get(format!("{}/health", app.address))
        .send()
        .await
        .expect("req fail");
    assert!(response.status().is_success());
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = spawn_app().await;
    let doc: serde_json::Value = app
        .client
        .get(format!("{}/api-docs/openapi.json", app.address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(doc["paths"]["/notes/add/"].is_object());
}

#[tokio::test]
async fn test_signup_login_and_create_note() {
    let app = spawn_app().await;
    let credentials = [("username", "Автор"), ("password", "long-enough-password")];

    // Anonymous callers are sent to login, remembering where they were going.
    let response = app
        .client
        .get(format!("{}/notes/add/", app.address))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        response.headers()[header::LOCATION],
        "/auth/login/?next=/notes/add/"
    );

    // Signup
    let response = app
        .client
        .post(format!("{}/auth/signup/", app.address))
        .form(&credentials)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(response.headers()[header::LOCATION], "/auth/login/");

    // Login, carrying next through
    let token: TokenResponse = app
        .client
        .post(format!("{}/auth/login/?next=/notes/add/", app.address))
        .form(&credentials)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(token.next, "/notes/add/");

    // Create
    let response = app
        .client
        .post(format!("{}/notes/add/", app.address))
        .bearer_auth(&token.access_token)
        .form(&[("title", "Новый заголовок"), ("text", "Новый текст")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(response.headers()[header::LOCATION], "/notes/done/");

    // List
    let page: NoteListPage = app
        .client
        .get(format!("{}/notes/list/", app.address))
        .bearer_auth(&token.access_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(page.object_list.len(), 1);
    assert_eq!(page.object_list[0].slug, "novyij-zagolovok");
}

#[tokio::test]
async fn test_duplicate_signup_is_rejected() {
    let app = spawn_app().await;
    let credentials = [("username", "Автор"), ("password", "long-enough-password")];

    for expected in [StatusCode::FOUND, StatusCode::OK] {
        let response = app
            .client
            .post(format!("{}/auth/signup/", app.address))
            .form(&credentials)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), expected);
    }
}
