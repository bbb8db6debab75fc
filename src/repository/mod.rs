use crate::{
    error::RepoError,
    models::{Comment, News, Note, User},
};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;
use uuid::Uuid;

mod memory;
mod postgres;

pub use memory::InMemoryRepository;
pub use postgres::PostgresRepository;

// Reads follow one convention: a storage failure is logged and reported as "nothing
// found", so a broken read degrades to an empty page or a 404. Writes return `Result`
// because callers must tell a conflict from a success.

/// UserRepository
///
/// Accounts that own notes and comments.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn get_user(&self, id: Uuid) -> Option<User>;
    async fn get_user_by_username(&self, username: &str) -> Option<User>;
    /// Fails with `UsernameTaken` when the name is in use.
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User, RepoError>;
}

/// NewsRepository
///
/// News items (read-only for the web layer) and their comments.
///
/// Every operation that mutates or reveals a single comment on behalf of a user takes
/// the caller's id and filters by `author_id` inside the query, so "not yours" and
/// "does not exist" look the same to the caller.
#[async_trait]
pub trait NewsRepository: Send + Sync {
    /// At most `limit` items, newest publication date first.
    async fn list_news_ordered_by_date_desc(&self, limit: i64) -> Vec<News>;
    async fn get_news(&self, id: i64) -> Option<News>;
    /// Seeding entry point; the HTTP surface never creates news.
    async fn create_news(&self, title: &str, text: &str, date: NaiveDate)
    -> Result<News, RepoError>;

    /// All comments of one news item, oldest first.
    async fn list_comments_ordered_by_timestamp_asc(&self, news_id: i64) -> Vec<Comment>;
    /// Inserts with a server-assigned creation time.
    async fn add_comment(
        &self,
        news_id: i64,
        author_id: Uuid,
        text: &str,
    ) -> Result<Comment, RepoError>;
    async fn get_comment_owned(&self, id: i64, author_id: Uuid) -> Option<Comment>;
    /// Returns `None` when no comment with this id belongs to `author_id`.
    async fn update_comment_text(
        &self,
        id: i64,
        author_id: Uuid,
        text: &str,
    ) -> Result<Option<Comment>, RepoError>;
    /// Returns the removed comment, or `None` when nothing owned by `author_id` matched.
    async fn delete_comment(&self, id: i64, author_id: Uuid) -> Result<Option<Comment>, RepoError>;
    async fn count_comments(&self) -> i64;
}

/// NoteRepository
///
/// Personal notes, keyed by a globally unique slug. Owner-scoped like comments.
#[async_trait]
pub trait NoteRepository: Send + Sync {
    async fn list_notes_by_author(&self, author_id: Uuid) -> Vec<Note>;
    /// Exact, case-sensitive match across all owners.
    async fn find_by_slug(&self, slug: &str) -> Option<Note>;
    async fn get_note_owned(&self, slug: &str, author_id: Uuid) -> Option<Note>;
    /// Fails with `SlugTaken` when another note holds `slug`, even if a prior lookup said it was free.
    async fn create_note(
        &self,
        author_id: Uuid,
        title: &str,
        text: &str,
        slug: &str,
    ) -> Result<Note, RepoError>;
    /// Returns `None` when note `id` does not belong to `author_id`.
    async fn update_note(
        &self,
        id: i64,
        author_id: Uuid,
        title: &str,
        text: &str,
        slug: &str,
    ) -> Result<Option<Note>, RepoError>;
    /// True when a note owned by `author_id` was removed.
    async fn delete_note(&self, slug: &str, author_id: Uuid) -> Result<bool, RepoError>;
    async fn count_notes(&self) -> i64;
}

/// Repository
///
/// Everything the web layer persists. Implemented automatically for any type that
/// implements the three narrow traits.
pub trait Repository: UserRepository + NewsRepository + NoteRepository {}

impl<T: UserRepository + NewsRepository + NoteRepository> Repository for T {}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;
