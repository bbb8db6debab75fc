//! Content validators for comments, notes and signups.
//!
//! Validators never touch storage except for the slug availability lookup; they return
//! either a cleaned value ready to persist or `FormErrors` for the re-rendered form.

use crate::{
    models::{CommentForm, CredentialsForm, FormErrors, NoteForm},
    repository::NoteRepository,
    slug::{SLUG_MAX_LENGTH, slugify},
};

/// Words a comment may not contain. Matched case-sensitively as substrings.
pub const BAD_WORDS: [&str; 2] = ["редиска", "негодяй"];

/// Error attached to `text` when a comment contains a banned word.
pub const COMMENT_WARNING: &str = "Не ругайтесь!";

/// Suffix of the error attached to `slug` when it collides with another note.
pub const SLUG_WARNING: &str = " - такой slug уже существует, придумайте уникальное значение!";

pub const REQUIRED_FIELD: &str = "Обязательное поле.";

pub const INVALID_SLUG: &str =
    "Значение должно состоять только из латинских букв, цифр, знаков подчеркивания или дефиса.";

pub const TITLE_MAX_LENGTH: usize = 100;
pub const USERNAME_MAX_LENGTH: usize = 150;
pub const PASSWORD_MIN_LENGTH: usize = 8;

pub const INVALID_USERNAME: &str = "Введите правильное имя пользователя. Оно может содержать только буквы, цифры и знаки @/./+/-/_.";

pub fn too_long(limit: usize, actual: usize) -> String {
    format!("Убедитесь, что это значение содержит не более {limit} символов (сейчас {actual}).")
}

pub fn too_short_password() -> String {
    format!("Введённый пароль слишком короткий. Он должен содержать как минимум {PASSWORD_MIN_LENGTH} символов.")
}

pub fn username_taken() -> String {
    "Пользователь с таким именем уже существует.".to_string()
}

pub fn slug_taken(slug: &str) -> String {
    format!("{slug}{SLUG_WARNING}")
}

/// Returns the first banned word contained in `text`, if any.
pub fn find_bad_word(text: &str) -> Option<&'static str> {
    BAD_WORDS.into_iter().find(|word| text.contains(word))
}

/// validate_comment
///
/// Cleans a comment body: required, and free of banned words.
pub fn validate_comment(form: &CommentForm) -> Result<String, FormErrors> {
    let mut errors = FormErrors::default();
    let text = form.text.trim();
    if text.is_empty() {
        errors.add("text", REQUIRED_FIELD);
    } else if find_bad_word(text).is_some() {
        errors.add("text", COMMENT_WARNING);
    }

    if errors.is_empty() {
        Ok(text.to_string())
    } else {
        Err(errors)
    }
}

/// A note that passed every field check, with its final slug resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanNote {
    pub title: String,
    pub text: String,
    pub slug: String,
}

/// clean_note_fields
///
/// Field-level checks that need no storage: required fields, lengths, slug syntax,
/// and slug derivation from the title when none was supplied.
pub fn clean_note_fields(form: &NoteForm) -> Result<CleanNote, FormErrors> {
    let mut errors = FormErrors::default();

    let title = form.title.trim();
    let title_len = title.chars().count();
    if title.is_empty() {
        errors.add("title", REQUIRED_FIELD);
    } else if title_len > TITLE_MAX_LENGTH {
        errors.add("title", too_long(TITLE_MAX_LENGTH, title_len));
    }

    let text = form.text.trim();
    if text.is_empty() {
        errors.add("text", REQUIRED_FIELD);
    }

    let explicit = form.slug.trim();
    let slug = if explicit.is_empty() {
        // Derivation needs a usable title; its own error already covers the other case.
        if errors.has("title") {
            String::new()
        } else {
            let derived = slugify(title);
            if derived.is_empty() {
                errors.add("slug", INVALID_SLUG);
            }
            derived
        }
    } else {
        let slug_len = explicit.chars().count();
        if slug_len > SLUG_MAX_LENGTH {
            errors.add("slug", too_long(SLUG_MAX_LENGTH, slug_len));
        } else if !is_valid_slug(explicit) {
            errors.add("slug", INVALID_SLUG);
        }
        explicit.to_string()
    };

    if errors.is_empty() {
        Ok(CleanNote {
            title: title.to_string(),
            text: text.to_string(),
            slug,
        })
    } else {
        Err(errors)
    }
}

/// clean_note
///
/// Full note validation: field checks, then slug uniqueness against every other note.
/// `editing` is the id of the note being updated, which may keep its own slug.
///
/// The lookup is advisory: the unique index still decides concurrent inserts, and the
/// handler maps that conflict to the same field error.
pub async fn clean_note<R: NoteRepository + ?Sized>(
    repo: &R,
    form: &NoteForm,
    editing: Option<i64>,
) -> Result<CleanNote, FormErrors> {
    let clean = clean_note_fields(form)?;

    if let Some(existing) = repo.find_by_slug(&clean.slug).await {
        if Some(existing.id) != editing {
            let mut errors = FormErrors::default();
            errors.add("slug", slug_taken(&clean.slug));
            return Err(errors);
        }
    }

    Ok(clean)
}

/// validate_signup
///
/// Username syntax and length, password length. Availability is decided by the store.
pub fn validate_signup(form: &CredentialsForm) -> Result<(), FormErrors> {
    let mut errors = FormErrors::default();

    let username = form.username.trim();
    let username_len = username.chars().count();
    if username.is_empty() {
        errors.add("username", REQUIRED_FIELD);
    } else if username_len > USERNAME_MAX_LENGTH {
        errors.add("username", too_long(USERNAME_MAX_LENGTH, username_len));
    } else if !username.chars().all(is_username_char) {
        errors.add("username", INVALID_USERNAME);
    }

    if form.password.is_empty() {
        errors.add("password", REQUIRED_FIELD);
    } else if form.password.chars().count() < PASSWORD_MIN_LENGTH {
        errors.add("password", too_short_password());
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

fn is_valid_slug(slug: &str) -> bool {
    slug.chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn is_username_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_')
}
