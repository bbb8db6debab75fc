mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::{TestApp, assert_redirect, json, json_value};
use newsnotes::{
    models::{CommentPage, NewsDetailPage, NewsListPage},
    repository::NewsRepository,
    validation::{BAD_WORDS, COMMENT_WARNING},
};

const FORM_TEXT: &str = "Новый комментарий";

// --- Routes ---

#[tokio::test]
async fn test_public_pages_are_available_to_anonymous() {
    let app = TestApp::new().await;
    let detail = format!("/news/{}/", app.news.id);

    for uri in [
        "/",
        "/news/",
        "/auth/login/",
        "/auth/logout/",
        "/auth/signup/",
        detail.as_str(),
        "/health",
    ] {
        let response = app.get(uri, None).await;
        assert_eq!(response.status(), StatusCode::OK, "GET {uri}");
    }
}

#[tokio::test]
async fn test_comment_pages_by_role() {
    let app = TestApp::new().await;
    let edit = format!("/news/comments/{}/edit/", app.comment.id);
    let delete = format!("/news/comments/{}/delete/", app.comment.id);

    for uri in [&edit, &delete] {
        assert_eq!(app.get(uri, Some(app.author)).await.status(), StatusCode::OK);
        assert_eq!(
            app.get(uri, Some(app.not_author)).await.status(),
            StatusCode::NOT_FOUND
        );
    }
}

#[tokio::test]
async fn test_anonymous_is_redirected_to_login_from_comment_pages() {
    let app = TestApp::new().await;

    for uri in [
        format!("/news/comments/{}/edit/", app.comment.id),
        format!("/news/comments/{}/delete/", app.comment.id),
    ] {
        let response = app.get(&uri, None).await;
        assert_redirect(&response, &format!("/auth/login/?next={uri}"));
    }
}

#[tokio::test]
async fn test_unknown_news_is_404() {
    let app = TestApp::new().await;
    let response = app.get("/news/9999/", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// --- Content ---

#[tokio::test]
async fn test_home_page_is_limited_and_newest_first() {
    let app = TestApp::new().await;
    let today = Utc::now().date_naive();
    for i in 0..=app.config.news_page_size {
        app.repo
            .create_news(
                &format!("Заголовок {i}"),
                &format!("Новость {i}"),
                today - Duration::days(i + 1),
            )
            .await
            .unwrap();
    }

    let page: NewsListPage = json(app.get("/", None).await).await;

    assert_eq!(page.object_list.len() as i64, app.config.news_page_size);
    let dates: Vec<_> = page.object_list.iter().map(|n| n.date).collect();
    let mut sorted = dates.clone();
    sorted.sort_by(|a, b| b.cmp(a));
    assert_eq!(dates, sorted);
}

#[tokio::test]
async fn test_comments_are_oldest_first() {
    let app = TestApp::new().await;
    let now = Utc::now();
    // Stored out of chronological order.
    for i in [5, 2, 8, 1, 9, 0, 3, 7, 4, 6] {
        app.repo
            .insert_comment_at(
                app.news.id,
                app.author,
                &format!("Комментарий {i}"),
                now + Duration::days(i),
            )
            .unwrap();
    }

    let page: NewsDetailPage = json(app.get(&format!("/news/{}/", app.news.id), None).await).await;

    let created: Vec<_> = page.news.comment_set.iter().map(|c| c.created).collect();
    let mut sorted = created.clone();
    sorted.sort();
    assert_eq!(page.news.comment_set.len(), 11);
    assert_eq!(created, sorted);
}

#[tokio::test]
async fn test_comment_form_only_for_authenticated_reader() {
    let app = TestApp::new().await;
    let uri = format!("/news/{}/", app.news.id);

    let anonymous = json_value(app.get(&uri, None).await).await;
    assert!(anonymous.get("form").is_none());
    assert!(anonymous.get("news").is_some());

    let author: NewsDetailPage = json(app.get(&uri, Some(app.author)).await).await;
    let form = author.form.expect("form for an authenticated reader");
    assert!(form.data.text.is_empty());
    assert!(form.errors.is_empty());
}

// --- Logic ---

#[tokio::test]
async fn test_anonymous_user_cant_create_comment() {
    let app = TestApp::new().await;
    let uri = format!("/news/{}/", app.news.id);
    let before = app.repo.count_comments().await;

    let response = app.post(&uri, None, &[("text", FORM_TEXT)]).await;

    assert_redirect(&response, &format!("/auth/login/?next={uri}"));
    assert_eq!(app.repo.count_comments().await, before);
}

#[tokio::test]
async fn test_author_user_can_create_comment() {
    let app = TestApp::new().await;
    app.repo.clear_comments();
    let uri = format!("/news/{}/", app.news.id);

    let response = app.post(&uri, Some(app.author), &[("text", FORM_TEXT)]).await;

    assert_redirect(&response, &format!("{uri}#comments"));
    assert_eq!(app.repo.count_comments().await, 1);
    let comment = &app.repo.list_comments_ordered_by_timestamp_asc(app.news.id).await[0];
    assert_eq!(comment.text, FORM_TEXT);
    assert_eq!(comment.news_id, app.news.id);
    assert_eq!(comment.author_id, app.author);
}

#[tokio::test]
async fn test_cant_create_comment_with_bad_words() {
    let app = TestApp::new().await;
    let before = app.repo.count_comments().await;
    let text = format!("Какой-то текст, {}, еще текст", BAD_WORDS[0]);

    let response = app
        .post(
            &format!("/news/{}/", app.news.id),
            Some(app.author),
            &[("text", &text)],
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let page: NewsDetailPage = json(response).await;
    let form = page.form.expect("re-rendered form");
    assert_eq!(form.errors.get("text"), [COMMENT_WARNING.to_string()]);
    assert_eq!(form.data.text, text);
    assert_eq!(app.repo.count_comments().await, before);
}

#[tokio::test]
async fn test_comment_on_unknown_news_is_404() {
    let app = TestApp::new().await;
    let response = app
        .post("/news/9999/", Some(app.author), &[("text", FORM_TEXT)])
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_author_can_delete_comment() {
    let app = TestApp::new().await;
    let before = app.repo.count_comments().await;

    let response = app
        .post(
            &format!("/news/comments/{}/delete/", app.comment.id),
            Some(app.author),
            &[],
        )
        .await;

    assert_redirect(&response, &format!("/news/{}/#comments", app.news.id));
    assert_eq!(app.repo.count_comments().await, before - 1);
}

#[tokio::test]
async fn test_author_can_edit_comment() {
    let app = TestApp::new().await;

    let response = app
        .post(
            &format!("/news/comments/{}/edit/", app.comment.id),
            Some(app.author),
            &[("text", FORM_TEXT)],
        )
        .await;

    assert_redirect(&response, &format!("/news/{}/#comments", app.news.id));
    let comment = app.repo.comment(app.comment.id).unwrap();
    assert_eq!(comment.text, FORM_TEXT);
    assert_eq!(comment.news_id, app.news.id);
    assert_eq!(comment.author_id, app.author);
    assert_eq!(comment.created, app.comment.created);
}

#[tokio::test]
async fn test_edit_with_bad_words_keeps_the_comment() {
    let app = TestApp::new().await;

    let response = app
        .post(
            &format!("/news/comments/{}/edit/", app.comment.id),
            Some(app.author),
            &[("text", BAD_WORDS[1])],
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let page: CommentPage = json(response).await;
    let form = page.form.expect("re-rendered form");
    assert_eq!(form.errors.get("text"), [COMMENT_WARNING.to_string()]);
    assert_eq!(app.repo.comment(app.comment.id), Some(app.comment.clone()));
}

#[tokio::test]
async fn test_not_author_cant_delete_comment() {
    let app = TestApp::new().await;
    let before = app.repo.count_comments().await;

    let response = app
        .post(
            &format!("/news/comments/{}/delete/", app.comment.id),
            Some(app.not_author),
            &[],
        )
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(app.repo.count_comments().await, before);
}

#[tokio::test]
async fn test_not_author_cant_edit_comment() {
    let app = TestApp::new().await;

    let response = app
        .post(
            &format!("/news/comments/{}/edit/", app.comment.id),
            Some(app.not_author),
            &[("text", FORM_TEXT)],
        )
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(app.repo.comment(app.comment.id), Some(app.comment.clone()));
}

#[tokio::test]
async fn test_not_author_edit_is_404_whatever_the_body() {
    let app = TestApp::new().await;
    let uri = format!("/news/comments/{}/edit/", app.comment.id);

    let response = app.post_untyped(&uri, Some(app.not_author), "{}").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Only the owner gets to hear about a malformed body.
    let response = app.post_untyped(&uri, Some(app.author), "{}").await;
    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(app.repo.comment(app.comment.id), Some(app.comment.clone()));
}
