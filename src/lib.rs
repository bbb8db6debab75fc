use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Core application services and components.
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod seed;
pub mod slug;
pub mod validation;

// Routing split by access level (public, authenticated).
pub mod routes;
use auth::AuthUser;
use routes::{authenticated, public};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use error::{AppError, RepoError};
pub use repository::{InMemoryRepository, PostgresRepository, Repository, RepositoryState};

/// ApiDoc
///
/// Generated OpenAPI document for every page and form endpoint, served at
/// `/api-docs/openapi.json` and browsable under `/swagger-ui`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::users::login_page, handlers::users::login, handlers::users::logout,
        handlers::users::signup_page, handlers::users::signup,
        handlers::news::news_home, handlers::news::news_detail, handlers::news::add_comment,
        handlers::news::edit_comment_page, handlers::news::edit_comment,
        handlers::news::delete_comment_page, handlers::news::delete_comment,
        handlers::notes::notes_home, handlers::notes::list_notes, handlers::notes::notes_done,
        handlers::notes::add_note_page, handlers::notes::add_note, handlers::notes::note_detail,
        handlers::notes::edit_note_page, handlers::notes::edit_note,
        handlers::notes::delete_note_page, handlers::notes::delete_note
    ),
    components(
        schemas(
            models::News, models::Comment, models::Note, models::CommentForm, models::NoteForm,
            models::CredentialsForm, models::FormErrors, models::CommentFormContext,
            models::NoteFormContext, models::CredentialsFormContext, models::NewsListPage,
            models::NewsWithComments, models::NewsDetailPage, models::CommentPage,
            models::NoteListPage, models::NotePage, models::NoteFormPage,
            models::CredentialsPage, models::MessagePage, models::TokenResponse,
        )
    ),
    tags(
        (name = "newsnotes", description = "News comments and personal notes")
    )
)]
struct ApiDoc;

/// AppState
///
/// Everything a request needs, cloned cheaply into each handler: the persistence layer
/// and the configuration loaded at startup.
#[derive(Clone)]
pub struct AppState {
    /// Persistence: Postgres in production, in-memory in tests and `memory://` local runs.
    pub repo: RepositoryState,
    /// Configuration: The loaded, immutable environment configuration.
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

// Let extractors such as `AuthUser` pull single components out of the shared state.

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// auth_middleware
///
/// The login gate for `authenticated_routes`.
///
/// *Mechanism*: Extracting `AuthUser` either succeeds or rejects with a `LoginRedirect`
/// (302 to `/auth/login/?next=<path>`), so no guarded handler runs for an anonymous
/// caller. The resolved identity is stored in the request extensions, where the
/// handler's own `AuthUser` extractor picks it up without a second lookup.
async fn auth_middleware(auth_user: AuthUser, mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(auth_user);
    next.run(request).await
}

/// create_router
///
/// Assembles the routing structure, applies global and scoped middleware, and registers
/// the application state.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Header name constant for Request Correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Base Router Assembly
    let base_router = Router::new()
        // Documentation: Serve the auto-generated Swagger UI.
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Public Routes: No middleware applied.
        .merge(public::public_routes())
        // Authenticated Routes: Behind the login gate.
        .merge(
            authenticated::authenticated_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            )),
        )
        .with_state(state);

    // 3. Observability and Correlation Layers
    base_router
        .layer(
            ServiceBuilder::new()
                // 3a. Request ID Generation: a UUID for every incoming request.
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                // 3b. Request Tracing: one span per request, tagged with the request ID.
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // 3c. Request ID Propagation: echo x-request-id back to the client.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        // 4. CORS Layer
        .layer(cors)
}

/// trace_span_logger
///
/// Builds the `TraceLayer` span: HTTP method, URI and the `x-request-id` set by the
/// layer above, so every log line of a request can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
