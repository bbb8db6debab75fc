use crate::{
    AppState,
    handlers::{news, notes},
};
use axum::{Router, routing::get};

/// Authenticated Router Module
///
/// Endpoints that require a logged-in caller. The whole router is wrapped in
/// `auth_middleware`, which redirects anonymous callers to
/// `/auth/login/?next=<requested path>` before any handler runs.
///
/// Ownership is a second layer: every handler here passes the caller's id down to the
/// repository, and a record owned by someone else is answered with 404.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // --- Comment moderation by their authors ---
        // GET shows the edit form; POST saves it (same banned-word filter as on create).
        .route(
            "/news/comments/{id}/edit/",
            get(news::edit_comment_page).post(news::edit_comment),
        )
        // GET shows the confirmation; POST deletes.
        .route(
            "/news/comments/{id}/delete/",
            get(news::delete_comment_page).post(news::delete_comment),
        )
        // --- Notes ---
        // GET /notes/list/
        // Only the caller's own notes.
        .route("/notes/list/", get(notes::list_notes))
        // GET /notes/done/
        // Where every successful note write lands.
        .route("/notes/done/", get(notes::notes_done))
        .route(
            "/notes/add/",
            get(notes::add_note_page).post(notes::add_note),
        )
        .route("/notes/note/{slug}/", get(notes::note_detail))
        .route(
            "/notes/edit/{slug}/",
            get(notes::edit_note_page).post(notes::edit_note),
        )
        // POST and DELETE both remove the note.
        .route(
            "/notes/delete/{slug}/",
            get(notes::delete_note_page)
                .post(notes::delete_note)
                .delete(notes::delete_note),
        )
}
