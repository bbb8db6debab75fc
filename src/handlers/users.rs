use crate::{
    AppState,
    auth::{self, LOGIN_URL},
    error::{AppError, RepoError},
    handlers::found,
    models::{
        CredentialsForm, CredentialsFormContext, CredentialsPage, FormErrors, MessagePage,
        TokenResponse,
    },
    validation,
};
use axum::{
    Form, Json,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;

const INVALID_LOGIN: &str = "Пожалуйста, введите правильные имя пользователя и пароль. Оба поля могут быть чувствительны к регистру.";

/// NextParam
///
/// The `?next=` return pointer carried from the login redirect through the login form.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
pub struct NextParam {
    /// Path to continue at after a successful login.
    pub next: Option<String>,
}

impl NextParam {
    /// The return path if it stays on this site, otherwise `/`.
    ///
    /// Browsers read `\` as `/`, so `/\host` is as off-site as `//host`.
    pub fn safe_next(&self) -> String {
        match self.next.as_deref() {
            Some(next) if is_local_path(next) => next.to_string(),
            _ => "/".to_string(),
        }
    }
}

fn is_local_path(next: &str) -> bool {
    next.starts_with('/')
        && !next.starts_with("//")
        && !next.chars().any(|c| c == '\\' || c.is_control())
}

fn credentials_page(data: CredentialsForm, errors: FormErrors, next: Option<String>) -> Response {
    Json(CredentialsPage {
        form: CredentialsFormContext { data, errors },
        next,
    })
    .into_response()
}

/// login_page
///
/// [Public Route] Empty login form. Echoes `next` so the client can post it back.
#[utoipa::path(
    get,
    path = "/auth/login/",
    params(NextParam),
    responses((status = 200, description = "Login form", body = CredentialsPage))
)]
pub async fn login_page(Query(params): Query<NextParam>) -> Json<CredentialsPage> {
    Json(CredentialsPage {
        form: CredentialsFormContext::default(),
        next: params.next,
    })
}

/// login
///
/// [Public Route] Exchanges a username and password for a signed access token.
///
/// Unknown users and wrong passwords get the same form-wide error.
#[utoipa::path(
    post,
    path = "/auth/login/",
    params(NextParam),
    request_body(content = CredentialsForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Token issued; on bad credentials the form page with a form-wide error", body = TokenResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Query(params): Query<NextParam>,
    Form(form): Form<CredentialsForm>,
) -> Result<Response, AppError> {
    let user = state.repo.get_user_by_username(form.username.trim()).await;

    let verified = match &user {
        Some(user) => {
            let password = form.password.clone();
            let hash = user.password_hash.clone();
            // Argon2 verification blocks for tens of milliseconds.
            tokio::task::spawn_blocking(move || auth::verify_password(&password, &hash))
                .await
                .map_err(|e| AppError::Internal(format!("password check aborted: {e}")))?
        }
        None => false,
    };

    let Some(user) = user.filter(|_| verified) else {
        tracing::info!(username = %form.username, "login rejected");
        let mut errors = FormErrors::default();
        errors.add(FormErrors::NON_FIELD, INVALID_LOGIN);
        return Ok(credentials_page(form, errors, params.next));
    };

    let access_token = auth::issue_token(
        user.id,
        &state.config.jwt_secret,
        state.config.jwt_ttl_seconds,
    )?;
    tracing::info!(user_id = %user.id, "user logged in");

    Ok(Json(TokenResponse {
        access_token,
        token_type: "Bearer".to_string(),
        next: params.safe_next(),
    })
    .into_response())
}

/// logout
///
/// [Public Route] Tokens are stateless, so logging out is the client dropping its token.
/// Answers both GET and POST.
#[utoipa::path(
    post,
    path = "/auth/logout/",
    responses((status = 200, description = "Logged out", body = MessagePage))
)]
pub async fn logout() -> Json<MessagePage> {
    Json(MessagePage {
        message: "Вы вышли из своей учётной записи.".to_string(),
    })
}

/// signup_page
///
/// [Public Route] Empty registration form.
#[utoipa::path(
    get,
    path = "/auth/signup/",
    responses((status = 200, description = "Signup form", body = CredentialsPage))
)]
pub async fn signup_page() -> Json<CredentialsPage> {
    Json(CredentialsPage::default())
}

/// signup
///
/// [Public Route] Registers an account and sends the client on to the login page.
#[utoipa::path(
    post,
    path = "/auth/signup/",
    request_body(content = CredentialsForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 302, description = "Registered; redirects to /auth/login/"),
        (status = 200, description = "Rejected; form with errors", body = CredentialsPage)
    )
)]
pub async fn signup(
    State(state): State<AppState>,
    Form(form): Form<CredentialsForm>,
) -> Result<Response, AppError> {
    if let Err(errors) = validation::validate_signup(&form) {
        return Ok(credentials_page(form, errors, None));
    }

    let password = form.password.clone();
    let password_hash = tokio::task::spawn_blocking(move || auth::hash_password(&password))
        .await
        .map_err(|e| AppError::Internal(format!("password hashing aborted: {e}")))??;

    match state
        .repo
        .create_user(form.username.trim(), &password_hash)
        .await
    {
        Ok(user) => {
            tracing::info!(user_id = %user.id, username = %user.username, "user registered");
            Ok(found(LOGIN_URL))
        }
        Err(RepoError::UsernameTaken(_)) => {
            let mut errors = FormErrors::default();
            errors.add("username", validation::username_taken());
            Ok(credentials_page(form, errors, None))
        }
        Err(e) => Err(e.into()),
    }
}
