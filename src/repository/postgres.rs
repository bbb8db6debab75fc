use super::{NewsRepository, NoteRepository, UserRepository};
use crate::{
    error::RepoError,
    models::{Comment, News, Note, User},
};
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

const NEWS_COLUMNS: &str = "id, title, text, date";
const COMMENT_COLUMNS: &str = "id, news_id, author_id, text, created";
const NOTE_COLUMNS: &str = "id, author_id, title, text, slug";
const USER_COLUMNS: &str = "id, username, password_hash, created_at";

/// PostgresRepository
///
/// The production implementation of the repository traits, backed by PostgreSQL.
/// Queries are built at runtime so the crate compiles without a live database.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies the embedded migrations in `./migrations`.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_foreign_key_violation())
}

#[async_trait]
impl UserRepository for PostgresRepository {
    async fn get_user(&self, id: Uuid) -> Option<User> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("get_user error: {:?}", e);
                None
            })
    }

    async fn get_user_by_username(&self, username: &str) -> Option<User> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("get_user_by_username error: {:?}", e);
            None
        })
    }

    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User, RepoError> {
        sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (id, username, password_hash, created_at) \
             VALUES ($1, $2, $3, NOW()) RETURNING {USER_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(username)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                RepoError::UsernameTaken(username.to_string())
            } else {
                RepoError::Database(e)
            }
        })
    }
}

#[async_trait]
impl NewsRepository for PostgresRepository {
    /// Served by `news_date_idx`.
    async fn list_news_ordered_by_date_desc(&self, limit: i64) -> Vec<News> {
        match sqlx::query_as::<_, News>(&format!(
            "SELECT {NEWS_COLUMNS} FROM news ORDER BY date DESC, id DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        {
            Ok(news) => news,
            Err(e) => {
                tracing::error!("list_news error: {:?}", e);
                vec![]
            }
        }
    }

    async fn get_news(&self, id: i64) -> Option<News> {
        sqlx::query_as::<_, News>(&format!("SELECT {NEWS_COLUMNS} FROM news WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("get_news error: {:?}", e);
                None
            })
    }

    async fn create_news(
        &self,
        title: &str,
        text: &str,
        date: NaiveDate,
    ) -> Result<News, RepoError> {
        let news = sqlx::query_as::<_, News>(&format!(
            "INSERT INTO news (title, text, date) VALUES ($1, $2, $3) RETURNING {NEWS_COLUMNS}"
        ))
        .bind(title)
        .bind(text)
        .bind(date)
        .fetch_one(&self.pool)
        .await?;
        Ok(news)
    }

    /// Served by `comments_news_created_idx`.
    async fn list_comments_ordered_by_timestamp_asc(&self, news_id: i64) -> Vec<Comment> {
        match sqlx::query_as::<_, Comment>(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments WHERE news_id = $1 ORDER BY created ASC, id ASC"
        ))
        .bind(news_id)
        .fetch_all(&self.pool)
        .await
        {
            Ok(comments) => comments,
            Err(e) => {
                tracing::error!("list_comments error: {:?}", e);
                vec![]
            }
        }
    }

    async fn add_comment(
        &self,
        news_id: i64,
        author_id: Uuid,
        text: &str,
    ) -> Result<Comment, RepoError> {
        sqlx::query_as::<_, Comment>(&format!(
            "INSERT INTO comments (news_id, author_id, text, created) \
             VALUES ($1, $2, $3, NOW()) RETURNING {COMMENT_COLUMNS}"
        ))
        .bind(news_id)
        .bind(author_id)
        .bind(text)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                RepoError::MissingParent("news")
            } else {
                RepoError::Database(e)
            }
        })
    }

    async fn get_comment_owned(&self, id: i64, author_id: Uuid) -> Option<Comment> {
        sqlx::query_as::<_, Comment>(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments WHERE id = $1 AND author_id = $2"
        ))
        .bind(id)
        .bind(author_id)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("get_comment_owned error: {:?}", e);
            None
        })
    }

    async fn update_comment_text(
        &self,
        id: i64,
        author_id: Uuid,
        text: &str,
    ) -> Result<Option<Comment>, RepoError> {
        let comment = sqlx::query_as::<_, Comment>(&format!(
            "UPDATE comments SET text = $3 WHERE id = $1 AND author_id = $2 \
             RETURNING {COMMENT_COLUMNS}"
        ))
        .bind(id)
        .bind(author_id)
        .bind(text)
        .fetch_optional(&self.pool)
        .await?;
        Ok(comment)
    }

    async fn delete_comment(&self, id: i64, author_id: Uuid) -> Result<Option<Comment>, RepoError> {
        let comment = sqlx::query_as::<_, Comment>(&format!(
            "DELETE FROM comments WHERE id = $1 AND author_id = $2 RETURNING {COMMENT_COLUMNS}"
        ))
        .bind(id)
        .bind(author_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(comment)
    }

    async fn count_comments(&self) -> i64 {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM comments")
            .fetch_one(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("count_comments error: {:?}", e);
                0
            })
    }
}

#[async_trait]
impl NoteRepository for PostgresRepository {
    async fn list_notes_by_author(&self, author_id: Uuid) -> Vec<Note> {
        match sqlx::query_as::<_, Note>(&format!(
            "SELECT {NOTE_COLUMNS} FROM notes WHERE author_id = $1 ORDER BY id ASC"
        ))
        .bind(author_id)
        .fetch_all(&self.pool)
        .await
        {
            Ok(notes) => notes,
            Err(e) => {
                tracing::error!("list_notes_by_author error: {:?}", e);
                vec![]
            }
        }
    }

    async fn find_by_slug(&self, slug: &str) -> Option<Note> {
        sqlx::query_as::<_, Note>(&format!("SELECT {NOTE_COLUMNS} FROM notes WHERE slug = $1"))
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("find_by_slug error: {:?}", e);
                None
            })
    }

    async fn get_note_owned(&self, slug: &str, author_id: Uuid) -> Option<Note> {
        sqlx::query_as::<_, Note>(&format!(
            "SELECT {NOTE_COLUMNS} FROM notes WHERE slug = $1 AND author_id = $2"
        ))
        .bind(slug)
        .bind(author_id)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("get_note_owned error: {:?}", e);
            None
        })
    }

    async fn create_note(
        &self,
        author_id: Uuid,
        title: &str,
        text: &str,
        slug: &str,
    ) -> Result<Note, RepoError> {
        // The unique index on slug settles races between concurrent creates.
        sqlx::query_as::<_, Note>(&format!(
            "INSERT INTO notes (author_id, title, text, slug) VALUES ($1, $2, $3, $4) \
             RETURNING {NOTE_COLUMNS}"
        ))
        .bind(author_id)
        .bind(title)
        .bind(text)
        .bind(slug)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                RepoError::SlugTaken(slug.to_string())
            } else {
                RepoError::Database(e)
            }
        })
    }

    async fn update_note(
        &self,
        id: i64,
        author_id: Uuid,
        title: &str,
        text: &str,
        slug: &str,
    ) -> Result<Option<Note>, RepoError> {
        sqlx::query_as::<_, Note>(&format!(
            "UPDATE notes SET title = $3, text = $4, slug = $5 \
             WHERE id = $1 AND author_id = $2 RETURNING {NOTE_COLUMNS}"
        ))
        .bind(id)
        .bind(author_id)
        .bind(title)
        .bind(text)
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                RepoError::SlugTaken(slug.to_string())
            } else {
                RepoError::Database(e)
            }
        })
    }

    async fn delete_note(&self, slug: &str, author_id: Uuid) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM notes WHERE slug = $1 AND author_id = $2")
            .bind(slug)
            .bind(author_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_notes(&self) -> i64 {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM notes")
            .fetch_one(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("count_notes error: {:?}", e);
                0
            })
    }
}
