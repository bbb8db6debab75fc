//! Shared fixtures for the router-level test suites.
//!
//! Each test builds its own `TestApp`: a router over a fresh `InMemoryRepository`,
//! with an author, a second user, one news item and one comment by the author.

#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode, header},
};
use newsnotes::{
    AppState, config::AppConfig, create_router,
    models::{Comment, News, Note},
    repository::{InMemoryRepository, NewsRepository, NoteRepository, UserRepository},
};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;


pub struct TestApp {
    pub router: Router,
    pub repo: Arc<InMemoryRepository>,
    pub config: AppConfig,
    pub author: Uuid,
    pub not_author: Uuid,
    pub news: News,
    pub comment: Comment,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(AppConfig::default()).await
    }

    pub async fn with_config(config: AppConfig) -> Self {
        let repo = Arc::new(InMemoryRepository::new());
        let author = repo.create_user("Автор", "unused").await.unwrap().id;
        let not_author = repo.create_user("Пользователь", "unused").await.unwrap().id;
        let news = repo
            .create_news("Заголовок", "Новость", chrono::Utc::now().date_naive())
            .await
            .unwrap();
        let comment = repo.add_comment(news.id, author, "Комментарий").await.unwrap();

        let router = create_router(AppState {
            repo: repo.clone(),
            config: config.clone(),
        });

        Self {
            router,
            repo,
            config,
            author,
            not_author,
            news,
            comment,
        }
    }

    /// A note owned by the author, as in the notes fixtures.
    pub async fn author_note(&self) -> Note {
        self.repo
            .create_note(self.author, "Заголовок", "Текст", "slug_author")
            .await
            .unwrap()
    }

    pub async fn get(&self, uri: &str, user: Option<Uuid>) -> Response<Body> {
        self.send("GET", uri, user, None).await
    }

    pub async fn get_with_bearer(&self, uri: &str, token: &str) -> Response<Body> {
        let request = Request::builder()
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn post(&self, uri: &str, user: Option<Uuid>, form: &[(&str, &str)]) -> Response<Body> {
        self.send("POST", uri, user, Some(encode_form(form))).await
    }

    /// POSTs `body` with no `Content-Type` header at all.
    pub async fn post_untyped(&self, uri: &str, user: Option<Uuid>, body: &str) -> Response<Body> {
        let mut builder = Request::builder().method("POST").uri(uri);
        if let Some(user) = user {
            builder = builder.header("x-user-id", user.to_string());
        }
        self.router
            .clone()
            .oneshot(builder.body(Body::from(body.to_string())).unwrap())
            .await
            .unwrap()
    }

    pub async fn delete(&self, uri: &str, user: Option<Uuid>) -> Response<Body> {
        self.send("DELETE", uri, user, None).await
    }

    async fn send(
        &self,
        method: &str,
        uri: &str,
        user: Option<Uuid>,
        body: Option<String>,
    ) -> Response<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            builder = builder.header("x-user-id", user.to_string());
        }
        let body = match body {
            Some(body) => {
                builder = builder.header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
                Body::from(body)
            }
            None => Body::empty(),
        };
        self.router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap()
    }
}

pub fn encode_form(fields: &[(&str, &str)]) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(fields)
        .finish()
}

pub fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .expect("redirect without Location")
        .to_str()
        .unwrap()
}

pub fn assert_redirect(response: &Response<Body>, expected: &str) {
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(response), expected);
}

pub async fn json<T: DeserializeOwned>(response: Response<Body>) -> T {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).expect("response body is not the expected JSON page")
}

pub async fn json_value(response: Response<Body>) -> serde_json::Value {
    json(response).await
}
