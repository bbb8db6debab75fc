use crate::{
    AppState,
    handlers::{news, notes, users},
};
use axum::{Router, routing::get};

/// Public Router Module
///
/// Endpoints reachable without logging in: the account pages, the news feed and
/// detail pages, and the notes landing page.
///
/// `/news/{id}/` lives here for both methods. GET is public; POST extracts `AuthUser`
/// itself, so an anonymous comment is redirected to login like any guarded route.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for monitoring and load balancers.
        .route("/health", get(|| async { "ok" }))
        // --- Accounts ---
        .route("/auth/login/", get(users::login_page).post(users::login))
        .route("/auth/logout/", get(users::logout).post(users::logout))
        .route("/auth/signup/", get(users::signup_page).post(users::signup))
        // --- News ---
        // GET / and GET /news/
        // The latest news, newest publication date first.
        .route("/", get(news::news_home))
        .route("/news/", get(news::news_home))
        // GET /news/{id}/ renders the item and its comments; POST adds a comment.
        .route("/news/{id}/", get(news::news_detail).post(news::add_comment))
        // --- Notes ---
        .route("/notes/", get(notes::notes_home))
}
