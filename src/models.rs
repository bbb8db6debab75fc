use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Core Records (Mapped to Database) ---

/// User
///
/// An account from the `users` table. Owns notes and comments; ownership never transfers.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, Default)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    // Argon2 PHC string. Never serialized into responses.
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// News
///
/// A news item from the `news` table. Read-only for this service; items are seeded externally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct News {
    pub id: i64,
    pub title: String,
    pub text: String,
    // Publication date; the home page orders by it, newest first.
    #[ts(type = "string")]
    pub date: NaiveDate,
}

/// Comment
///
/// A reader comment attached to one news item. Only `text` ever changes after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Comment {
    pub id: i64,
    pub news_id: i64,
    pub author_id: Uuid,
    pub text: String,
    // Assigned by the server at write time; listings order by it, oldest first.
    #[ts(type = "string")]
    pub created: DateTime<Utc>,
}

/// Note
///
/// A personal note from the `notes` table. `slug` is unique across all notes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Note {
    pub id: i64,
    pub author_id: Uuid,
    pub title: String,
    pub text: String,
    pub slug: String,
}

// --- Form Payloads (Input Schemas) ---
//
// Every field defaults to empty so that an omitted field is reported as a field error
// on the re-rendered form rather than rejected by the extractor.

/// CommentForm
///
/// Body of a comment create or edit (`application/x-www-form-urlencoded`).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CommentForm {
    #[serde(default)]
    pub text: String,
}

/// NoteForm
///
/// Body of a note create or edit. An empty `slug` asks the server to derive one from `title`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct NoteForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub slug: String,
}

/// CredentialsForm
///
/// Body of the login and signup forms. The password is hashed or verified and then dropped;
/// it is never echoed back in a re-rendered form.
#[derive(Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct CredentialsForm {
    #[serde(default)]
    pub username: String,
    #[serde(default, skip_serializing)]
    pub password: String,
}

impl std::fmt::Debug for CredentialsForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsForm")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// FormErrors
///
/// Field name to messages. Form-wide errors live under `__all__`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct FormErrors(pub BTreeMap<String, Vec<String>>);

impl FormErrors {
    /// Key for errors that do not belong to a single field.
    pub const NON_FIELD: &'static str = "__all__";

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn has(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }
}

// --- Page Contexts (Output Schemas) ---
//
// Each page is the JSON form of what a template would receive: the record(s) being shown
// and, where the page accepts input, a `form` with the submitted data and its errors.

/// CommentFormContext
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CommentFormContext {
    pub data: CommentForm,
    pub errors: FormErrors,
}

/// NoteFormContext
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct NoteFormContext {
    pub data: NoteForm,
    pub errors: FormErrors,
}

/// CredentialsFormContext
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct CredentialsFormContext {
    pub data: CredentialsForm,
    pub errors: FormErrors,
}

/// NewsListPage
///
/// Home page of the news app (GET /news/).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct NewsListPage {
    pub object_list: Vec<News>,
}

/// NewsWithComments
///
/// A news item together with its comments, oldest first.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct NewsWithComments {
    #[serde(flatten)]
    pub news: News,
    pub comment_set: Vec<Comment>,
}

/// NewsDetailPage
///
/// Detail page of a news item (GET /news/{id}/). The comment form is only offered to an
/// authenticated reader, so `form` is absent for anonymous requests.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct NewsDetailPage {
    pub news: NewsWithComments,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub form: Option<CommentFormContext>,
}

/// CommentPage
///
/// Comment edit page (with `form`) or delete confirmation (without).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CommentPage {
    pub comment: Comment,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub form: Option<CommentFormContext>,
}

/// NoteListPage
///
/// The requesting user's notes (GET /notes/list/).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct NoteListPage {
    pub object_list: Vec<Note>,
}

/// NotePage
///
/// Note detail page and delete confirmation.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct NotePage {
    pub note: Note,
}

/// NoteFormPage
///
/// Note add and edit pages.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct NoteFormPage {
    pub form: NoteFormContext,
}

/// CredentialsPage
///
/// Login and signup pages. `next` carries the return pointer through the login form.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct CredentialsPage {
    pub form: CredentialsFormContext,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

/// MessagePage
///
/// Static pages: notes home, "done" page, logout confirmation.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct MessagePage {
    pub message: String,
}

/// TokenResponse
///
/// Successful login. The client sends `access_token` as a Bearer token and continues at `next`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub next: String,
}
