use std::{
    convert::Infallible,
    time::{SystemTime, UNIX_EPOCH},
};

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{StatusCode, header, request::Parts},
    response::{IntoResponse, Response},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    config::{AppConfig, Env},
    repository::RepositoryState,
};

/// Where anonymous callers are sent when they hit a guarded endpoint.
pub const LOGIN_URL: &str = "/auth/login/";

/// Claims
///
/// Payload of an access token. Signed with the configured secret (HS256) and validated
/// on every authenticated request.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): the user id.
    pub sub: Uuid,
    /// Expiration Time (exp): seconds since the epoch.
    pub exp: usize,
    /// Issued At (iat): seconds since the epoch.
    pub iat: usize,
}

/// AuthUser
///
/// The resolved identity of an authenticated request. Handlers compare `id` against a
/// record's owner; nothing else about the caller is needed.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub username: String,
}

/// LoginRedirect
///
/// Rejection for requests without a valid identity: 302 to the login page carrying the
/// originally requested path as `next`. Anonymous callers never see a 404 or a form
/// from a guarded endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginRedirect {
    pub next: String,
}

impl LoginRedirect {
    pub fn location(&self) -> String {
        format!("{LOGIN_URL}?next={}", encode_next(&self.next))
    }
}

impl IntoResponse for LoginRedirect {
    fn into_response(self) -> Response {
        (StatusCode::FOUND, [(header::LOCATION, self.location())]).into_response()
    }
}

/// Everything but the unreserved characters and `/`.
const NEXT_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'_')
    .remove(b'.')
    .remove(b'-')
    .remove(b'~')
    .remove(b'/');

/// Percent-encodes a return path for the `next` query parameter, leaving `/` and the
/// unreserved characters readable.
pub fn encode_next(path: &str) -> String {
    utf8_percent_encode(path, NEXT_ENCODE_SET).to_string()
}

/// AuthUser Extractor Implementation
///
/// Resolution order:
/// 1. An identity already placed in the request extensions by `auth_middleware`.
/// 2. Local bypass: in `Env::Local`, an `x-user-id` header naming an existing user.
/// 3. `Authorization: Bearer <token>`, decoded and checked for expiry.
/// 4. A repository lookup, so tokens of deleted users stop working.
///
/// Any failure rejects with `LoginRedirect` for the current path.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = LoginRedirect;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(user.clone());
        }

        let reject = || LoginRedirect {
            next: parts
                .uri
                .path_and_query()
                .map(|pq| pq.as_str().to_string())
                .unwrap_or_else(|| parts.uri.path().to_string()),
        };

        let repo = RepositoryState::from_ref(state);
        let config = AppConfig::from_ref(state);

        if config.env == Env::Local {
            if let Some(user_id) = parts
                .headers
                .get("x-user-id")
                .and_then(|value| value.to_str().ok())
                .and_then(|raw| Uuid::parse_str(raw).ok())
            {
                if let Some(user) = repo.get_user(user_id).await {
                    return Ok(AuthUser {
                        id: user.id,
                        username: user.username,
                    });
                }
            }
        }

        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(reject)?;

        let user_id = verify_token(token, &config.jwt_secret).map_err(|e| {
            tracing::debug!("rejected access token: {}", e);
            reject()
        })?;

        let user = repo.get_user(user_id).await.ok_or_else(reject)?;

        Ok(AuthUser {
            id: user.id,
            username: user.username,
        })
    }
}

/// MaybeUser
///
/// The caller's identity when there is one. Never rejects; for pages that anonymous
/// readers may see but that offer more to signed-in ones.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<AuthUser>);

impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(
            AuthUser::from_request_parts(parts, state).await.ok(),
        ))
    }
}

fn unix_now() -> usize {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as usize)
        .unwrap_or_default()
}

/// Signs an access token for `user_id` valid for `ttl_seconds`.
pub fn issue_token(
    user_id: Uuid,
    secret: &str,
    ttl_seconds: u64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let iat = unix_now();
    let claims = Claims {
        sub: user_id,
        iat,
        exp: iat.saturating_add(usize::try_from(ttl_seconds).unwrap_or(usize::MAX)),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Validates signature and expiry, returning the subject.
pub fn verify_token(token: &str, secret: &str) -> Result<Uuid, jsonwebtoken::errors::Error> {
    let mut validation = Validation::default();
    validation.validate_exp = true;
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )?;
    Ok(data.claims.sub)
}

/// Hashes a password into an Argon2 PHC string with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

/// Verifies if a provided password matches a stored Argon2 hash.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(p) => p,
        Err(_) => return false,
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}
