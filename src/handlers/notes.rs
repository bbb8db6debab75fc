use crate::{
    AppState,
    auth::AuthUser,
    error::{AppError, RepoError},
    handlers::found,
    models::{
        FormErrors, MessagePage, NoteForm, NoteFormContext, NoteFormPage, NoteListPage, NotePage,
    },
    validation::{self, CleanNote},
};
use axum::{
    Form, Json,
    extract::{Path, State, rejection::FormRejection},
    response::{IntoResponse, Response},
};

/// Landing page after every successful note write.
pub const NOTES_DONE_URL: &str = "/notes/done/";

fn form_page(data: NoteForm, errors: FormErrors) -> Response {
    Json(NoteFormPage {
        form: NoteFormContext { data, errors },
    })
    .into_response()
}

fn slug_conflict(data: NoteForm, slug: &str) -> Response {
    let mut errors = FormErrors::default();
    errors.add("slug", validation::slug_taken(slug));
    form_page(data, errors)
}

/// notes_home
///
/// [Public Route] Landing page of the notes app.
#[utoipa::path(
    get,
    path = "/notes/",
    responses((status = 200, description = "Landing page", body = MessagePage))
)]
pub async fn notes_home() -> Json<MessagePage> {
    Json(MessagePage {
        message: "Заметки: личные записи, видимые только автору.".to_string(),
    })
}

/// list_notes
///
/// [Authenticated Route] The caller's notes. Notes of other users never appear.
#[utoipa::path(
    get,
    path = "/notes/list/",
    responses((status = 200, description = "My notes", body = NoteListPage))
)]
pub async fn list_notes(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
) -> Json<NoteListPage> {
    let object_list = state.repo.list_notes_by_author(id).await;
    Json(NoteListPage { object_list })
}

/// notes_done
///
/// [Authenticated Route] Confirmation shown after a note was added, edited or deleted.
#[utoipa::path(
    get,
    path = "/notes/done/",
    responses((status = 200, description = "Success page", body = MessagePage))
)]
pub async fn notes_done() -> Json<MessagePage> {
    Json(MessagePage {
        message: "Успешно!".to_string(),
    })
}

/// add_note_page
///
/// [Authenticated Route] Empty note form.
#[utoipa::path(
    get,
    path = "/notes/add/",
    responses((status = 200, description = "Empty form", body = NoteFormPage))
)]
pub async fn add_note_page() -> Json<NoteFormPage> {
    Json(NoteFormPage::default())
}

/// add_note
///
/// [Authenticated Route] Creates a note owned by the caller. Without a slug, one is
/// derived from the title. A slug held by any other note re-renders the form with an
/// error naming that slug, and nothing is written.
#[utoipa::path(
    post,
    path = "/notes/add/",
    request_body(content = NoteForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 302, description = "Created; redirects to /notes/done/"),
        (status = 200, description = "Rejected; form with errors", body = NoteFormPage)
    )
)]
pub async fn add_note(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    Form(form): Form<NoteForm>,
) -> Result<Response, AppError> {
    let CleanNote { title, text, slug } =
        match validation::clean_note(state.repo.as_ref(), &form, None).await {
            Ok(clean) => clean,
            Err(errors) => return Ok(form_page(form, errors)),
        };

    match state.repo.create_note(user_id, &title, &text, &slug).await {
        Ok(note) => {
            tracing::info!(note_id = note.id, slug = %note.slug, "note created");
            Ok(found(NOTES_DONE_URL))
        }
        // Lost a race with a concurrent create after the availability check passed.
        Err(RepoError::SlugTaken(slug)) => Ok(slug_conflict(form, &slug)),
        Err(e) => Err(e.into()),
    }
}

/// note_detail
///
/// [Authenticated Route] One of the caller's notes. Someone else's note is a 404.
#[utoipa::path(
    get,
    path = "/notes/note/{slug}/",
    params(("slug" = String, Path, description = "Note slug")),
    responses(
        (status = 200, description = "Note", body = NotePage),
        (status = 404, description = "Not Found or Not Yours")
    )
)]
pub async fn note_detail(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<NotePage>, AppError> {
    let note = state
        .repo
        .get_note_owned(&slug, user_id)
        .await
        .ok_or(AppError::NotFound)?;
    Ok(Json(NotePage { note }))
}

/// edit_note_page
///
/// [Authenticated Route] Note form prefilled with the current values.
#[utoipa::path(
    get,
    path = "/notes/edit/{slug}/",
    params(("slug" = String, Path, description = "Note slug")),
    responses(
        (status = 200, description = "Prefilled form", body = NoteFormPage),
        (status = 404, description = "Not Found or Not Yours")
    )
)]
pub async fn edit_note_page(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<NoteFormPage>, AppError> {
    let note = state
        .repo
        .get_note_owned(&slug, user_id)
        .await
        .ok_or(AppError::NotFound)?;
    Ok(Json(NoteFormPage {
        form: NoteFormContext {
            data: NoteForm {
                title: note.title,
                text: note.text,
                slug: note.slug,
            },
            errors: FormErrors::default(),
        },
    }))
}

/// edit_note
///
/// [Authenticated Route] Updates one of the caller's notes. The note may keep its own
/// slug; taking another note's slug is rejected like on create.
#[utoipa::path(
    post,
    path = "/notes/edit/{slug}/",
    params(("slug" = String, Path, description = "Note slug")),
    request_body(content = NoteForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 302, description = "Updated; redirects to /notes/done/"),
        (status = 200, description = "Rejected; form with errors", body = NoteFormPage),
        (status = 404, description = "Not Found or Not Yours")
    )
)]
pub async fn edit_note(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(slug): Path<String>,
    form: Result<Form<NoteForm>, FormRejection>,
) -> Result<Response, AppError> {
    let note = state
        .repo
        .get_note_owned(&slug, user_id)
        .await
        .ok_or(AppError::NotFound)?;
    let Form(form) = match form {
        Ok(form) => form,
        Err(rejection) => return Ok(rejection.into_response()),
    };

    let clean = match validation::clean_note(state.repo.as_ref(), &form, Some(note.id)).await {
        Ok(clean) => clean,
        Err(errors) => return Ok(form_page(form, errors)),
    };

    match state
        .repo
        .update_note(note.id, user_id, &clean.title, &clean.text, &clean.slug)
        .await
    {
        Ok(Some(updated)) => {
            tracing::info!(note_id = updated.id, slug = %updated.slug, "note updated");
            Ok(found(NOTES_DONE_URL))
        }
        // Deleted between the lookup and the update.
        Ok(None) => Err(AppError::NotFound),
        Err(RepoError::SlugTaken(slug)) => Ok(slug_conflict(form, &slug)),
        Err(e) => Err(e.into()),
    }
}

/// delete_note_page
///
/// [Authenticated Route] Delete confirmation for one of the caller's notes.
#[utoipa::path(
    get,
    path = "/notes/delete/{slug}/",
    params(("slug" = String, Path, description = "Note slug")),
    responses(
        (status = 200, description = "Confirmation", body = NotePage),
        (status = 404, description = "Not Found or Not Yours")
    )
)]
pub async fn delete_note_page(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<NotePage>, AppError> {
    let note = state
        .repo
        .get_note_owned(&slug, user_id)
        .await
        .ok_or(AppError::NotFound)?;
    Ok(Json(NotePage { note }))
}

/// delete_note
///
/// [Authenticated Route] Deletes one of the caller's notes (POST or DELETE).
#[utoipa::path(
    delete,
    path = "/notes/delete/{slug}/",
    params(("slug" = String, Path, description = "Note slug")),
    responses(
        (status = 302, description = "Deleted; redirects to /notes/done/"),
        (status = 404, description = "Not Found or Not Yours")
    )
)]
pub async fn delete_note(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Response, AppError> {
    if state.repo.delete_note(&slug, user_id).await? {
        tracing::info!(%slug, "note deleted");
        Ok(found(NOTES_DONE_URL))
    } else {
        Err(AppError::NotFound)
    }
}
