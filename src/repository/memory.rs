use super::{NewsRepository, NoteRepository, UserRepository};
use crate::{
    error::RepoError,
    models::{Comment, News, Note, User},
};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::{
    collections::BTreeMap,
    sync::{Mutex, MutexGuard, PoisonError},
};
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    users: BTreeMap<Uuid, User>,
    news: BTreeMap<i64, News>,
    comments: BTreeMap<i64, Comment>,
    notes: BTreeMap<i64, Note>,
    next_news_id: i64,
    next_comment_id: i64,
    next_note_id: i64,
}

fn next_id(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

/// InMemoryRepository
///
/// A process-local implementation of the repository traits, used by the test suites and
/// by local runs with `DATABASE_URL=memory://`.
///
/// All tables sit behind one mutex, so a uniqueness check and the insert that follows it
/// happen under the same lock and cannot interleave with another writer.
#[derive(Default)]
pub struct InMemoryRepository {
    tables: Mutex<Tables>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Inserts a comment with an explicit creation time. Lets seeding and tests build
    /// histories whose storage order differs from their chronological order.
    pub fn insert_comment_at(
        &self,
        news_id: i64,
        author_id: Uuid,
        text: &str,
        created: DateTime<Utc>,
    ) -> Result<Comment, RepoError> {
        let mut tables = self.tables();
        if !tables.news.contains_key(&news_id) {
            return Err(RepoError::MissingParent("news"));
        }
        let comment = Comment {
            id: next_id(&mut tables.next_comment_id),
            news_id,
            author_id,
            text: text.to_string(),
            created,
        };
        tables.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    /// Looks a comment up regardless of owner. Test helper for asserting that a
    /// rejected edit left the record untouched.
    pub fn comment(&self, id: i64) -> Option<Comment> {
        self.tables().comments.get(&id).cloned()
    }

    /// Looks a note up by id regardless of owner.
    pub fn note(&self, id: i64) -> Option<Note> {
        self.tables().notes.get(&id).cloned()
    }

    /// Removes every comment. Mirrors wiping a table before a "exactly one row" assertion.
    pub fn clear_comments(&self) {
        self.tables().comments.clear();
    }

    /// Removes every note.
    pub fn clear_notes(&self) {
        self.tables().notes.clear();
    }
}

#[async_trait]
impl UserRepository for InMemoryRepository {
    async fn get_user(&self, id: Uuid) -> Option<User> {
        self.tables().users.get(&id).cloned()
    }

    async fn get_user_by_username(&self, username: &str) -> Option<User> {
        self.tables()
            .users
            .values()
            .find(|user| user.username == username)
            .cloned()
    }

    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User, RepoError> {
        let mut tables = self.tables();
        if tables.users.values().any(|user| user.username == username) {
            return Err(RepoError::UsernameTaken(username.to_string()));
        }
        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }
}

#[async_trait]
impl NewsRepository for InMemoryRepository {
    async fn list_news_ordered_by_date_desc(&self, limit: i64) -> Vec<News> {
        let mut news: Vec<News> = self.tables().news.values().cloned().collect();
        news.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        news.truncate(usize::try_from(limit).unwrap_or(0));
        news
    }

    async fn get_news(&self, id: i64) -> Option<News> {
        self.tables().news.get(&id).cloned()
    }

    async fn create_news(
        &self,
        title: &str,
        text: &str,
        date: NaiveDate,
    ) -> Result<News, RepoError> {
        let mut tables = self.tables();
        let news = News {
            id: next_id(&mut tables.next_news_id),
            title: title.to_string(),
            text: text.to_string(),
            date,
        };
        tables.news.insert(news.id, news.clone());
        Ok(news)
    }

    async fn list_comments_ordered_by_timestamp_asc(&self, news_id: i64) -> Vec<Comment> {
        let mut comments: Vec<Comment> = self
            .tables()
            .comments
            .values()
            .filter(|comment| comment.news_id == news_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| a.created.cmp(&b.created).then(a.id.cmp(&b.id)));
        comments
    }

    async fn add_comment(
        &self,
        news_id: i64,
        author_id: Uuid,
        text: &str,
    ) -> Result<Comment, RepoError> {
        self.insert_comment_at(news_id, author_id, text, Utc::now())
    }

    async fn get_comment_owned(&self, id: i64, author_id: Uuid) -> Option<Comment> {
        self.tables()
            .comments
            .get(&id)
            .filter(|comment| comment.author_id == author_id)
            .cloned()
    }

    async fn update_comment_text(
        &self,
        id: i64,
        author_id: Uuid,
        text: &str,
    ) -> Result<Option<Comment>, RepoError> {
        let mut tables = self.tables();
        let updated = tables
            .comments
            .get_mut(&id)
            .filter(|comment| comment.author_id == author_id)
            .map(|comment| {
                comment.text = text.to_string();
                comment.clone()
            });
        Ok(updated)
    }

    async fn delete_comment(&self, id: i64, author_id: Uuid) -> Result<Option<Comment>, RepoError> {
        let mut tables = self.tables();
        let owned = tables
            .comments
            .get(&id)
            .is_some_and(|comment| comment.author_id == author_id);
        Ok(if owned { tables.comments.remove(&id) } else { None })
    }

    async fn count_comments(&self) -> i64 {
        self.tables().comments.len() as i64
    }
}

#[async_trait]
impl NoteRepository for InMemoryRepository {
    async fn list_notes_by_author(&self, author_id: Uuid) -> Vec<Note> {
        self.tables()
            .notes
            .values()
            .filter(|note| note.author_id == author_id)
            .cloned()
            .collect()
    }

    async fn find_by_slug(&self, slug: &str) -> Option<Note> {
        self.tables()
            .notes
            .values()
            .find(|note| note.slug == slug)
            .cloned()
    }

    async fn get_note_owned(&self, slug: &str, author_id: Uuid) -> Option<Note> {
        self.tables()
            .notes
            .values()
            .find(|note| note.slug == slug && note.author_id == author_id)
            .cloned()
    }

    async fn create_note(
        &self,
        author_id: Uuid,
        title: &str,
        text: &str,
        slug: &str,
    ) -> Result<Note, RepoError> {
        let mut tables = self.tables();
        if tables.notes.values().any(|note| note.slug == slug) {
            return Err(RepoError::SlugTaken(slug.to_string()));
        }
        let note = Note {
            id: next_id(&mut tables.next_note_id),
            author_id,
            title: title.to_string(),
            text: text.to_string(),
            slug: slug.to_string(),
        };
        tables.notes.insert(note.id, note.clone());
        Ok(note)
    }

    async fn update_note(
        &self,
        id: i64,
        author_id: Uuid,
        title: &str,
        text: &str,
        slug: &str,
    ) -> Result<Option<Note>, RepoError> {
        let mut tables = self.tables();
        if tables
            .notes
            .values()
            .any(|note| note.slug == slug && note.id != id)
        {
            return Err(RepoError::SlugTaken(slug.to_string()));
        }
        let updated = tables
            .notes
            .get_mut(&id)
            .filter(|note| note.author_id == author_id)
            .map(|note| {
                note.title = title.to_string();
                note.text = text.to_string();
                note.slug = slug.to_string();
                note.clone()
            });
        Ok(updated)
    }

    async fn delete_note(&self, slug: &str, author_id: Uuid) -> Result<bool, RepoError> {
        let mut tables = self.tables();
        let id = tables
            .notes
            .values()
            .find(|note| note.slug == slug && note.author_id == author_id)
            .map(|note| note.id);
        Ok(id.and_then(|id| tables.notes.remove(&id)).is_some())
    }

    async fn count_notes(&self) -> i64 {
        self.tables().notes.len() as i64
    }
}
