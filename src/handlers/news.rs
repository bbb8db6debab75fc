use crate::{
    AppState,
    auth::{AuthUser, MaybeUser},
    error::AppError,
    handlers::found,
    models::{
        CommentForm, CommentFormContext, CommentPage, FormErrors, NewsDetailPage, NewsListPage,
        NewsWithComments,
    },
    validation,
};
use axum::{
    Form, Json,
    extract::{Path, State, rejection::FormRejection},
    response::{IntoResponse, Response},
};

/// Where a comment write lands: the parent item's detail page, scrolled to its comments.
pub fn news_comments_url(news_id: i64) -> String {
    format!("/news/{news_id}/#comments")
}

/// Builds the detail page for `news_id`, attaching `form` when the caller may comment.
async fn detail_page(
    state: &AppState,
    news_id: i64,
    form: Option<CommentFormContext>,
) -> Result<NewsDetailPage, AppError> {
    let news = state.repo.get_news(news_id).await.ok_or(AppError::NotFound)?;
    let comment_set = state
        .repo
        .list_comments_ordered_by_timestamp_asc(news_id)
        .await;
    Ok(NewsDetailPage {
        news: NewsWithComments { news, comment_set },
        form,
    })
}

/// news_home
///
/// [Public Route] The news feed: at most `news_page_size` items, newest first.
#[utoipa::path(
    get,
    path = "/news/",
    responses((status = 200, description = "Latest news", body = NewsListPage))
)]
pub async fn news_home(State(state): State<AppState>) -> Json<NewsListPage> {
    let object_list = state
        .repo
        .list_news_ordered_by_date_desc(state.config.news_page_size)
        .await;
    Json(NewsListPage { object_list })
}

/// news_detail
///
/// [Public Route] One news item with its comments in chronological order. An empty
/// comment form is included only for an authenticated reader.
#[utoipa::path(
    get,
    path = "/news/{id}/",
    params(("id" = i64, Path, description = "News ID")),
    responses(
        (status = 200, description = "News with comments", body = NewsDetailPage),
        (status = 404, description = "Not Found")
    )
)]
pub async fn news_detail(
    MaybeUser(user): MaybeUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<NewsDetailPage>, AppError> {
    let form = user.map(|_| CommentFormContext::default());
    Ok(Json(detail_page(&state, id, form).await?))
}

/// add_comment
///
/// [Authenticated Route] Posts a comment on a news item. The author is always the
/// caller. A banned word re-renders the detail page with the error on `text` and
/// writes nothing.
#[utoipa::path(
    post,
    path = "/news/{id}/",
    params(("id" = i64, Path, description = "News ID")),
    request_body(content = CommentForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 302, description = "Created; redirects to the comments anchor"),
        (status = 200, description = "Rejected; form with errors", body = NewsDetailPage),
        (status = 404, description = "Not Found")
    )
)]
pub async fn add_comment(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(news_id): Path<i64>,
    Form(form): Form<CommentForm>,
) -> Result<Response, AppError> {
    if state.repo.get_news(news_id).await.is_none() {
        return Err(AppError::NotFound);
    }

    let text = match validation::validate_comment(&form) {
        Ok(text) => text,
        Err(errors) => {
            let context = CommentFormContext { data: form, errors };
            let page = detail_page(&state, news_id, Some(context)).await?;
            return Ok(Json(page).into_response());
        }
    };

    let comment = state.repo.add_comment(news_id, user_id, &text).await?;
    tracing::info!(comment_id = comment.id, news_id, "comment created");
    Ok(found(news_comments_url(news_id)))
}

/// edit_comment_page
///
/// [Authenticated Route] Edit form for the caller's own comment. Someone else's comment
/// is reported as 404.
#[utoipa::path(
    get,
    path = "/news/comments/{id}/edit/",
    params(("id" = i64, Path, description = "Comment ID")),
    responses(
        (status = 200, description = "Edit form", body = CommentPage),
        (status = 404, description = "Not Found or Not Yours")
    )
)]
pub async fn edit_comment_page(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<CommentPage>, AppError> {
    let comment = state
        .repo
        .get_comment_owned(id, user_id)
        .await
        .ok_or(AppError::NotFound)?;
    let form = CommentFormContext {
        data: CommentForm {
            text: comment.text.clone(),
        },
        errors: FormErrors::default(),
    };
    Ok(Json(CommentPage {
        comment,
        form: Some(form),
    }))
}

/// edit_comment
///
/// [Authenticated Route] Replaces the text of the caller's own comment. The same banned
/// word filter as for new comments applies. Ownership is checked before validation, so
/// a stranger learns nothing from the error shape.
#[utoipa::path(
    post,
    path = "/news/comments/{id}/edit/",
    params(("id" = i64, Path, description = "Comment ID")),
    request_body(content = CommentForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 302, description = "Updated; redirects to the comments anchor"),
        (status = 200, description = "Rejected; form with errors", body = CommentPage),
        (status = 404, description = "Not Found or Not Yours")
    )
)]
pub async fn edit_comment(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    form: Result<Form<CommentForm>, FormRejection>,
) -> Result<Response, AppError> {
    let comment = state
        .repo
        .get_comment_owned(id, user_id)
        .await
        .ok_or(AppError::NotFound)?;
    // Body errors are only reported to the owner.
    let Form(form) = match form {
        Ok(form) => form,
        Err(rejection) => return Ok(rejection.into_response()),
    };

    let text = match validation::validate_comment(&form) {
        Ok(text) => text,
        Err(errors) => {
            let page = CommentPage {
                comment,
                form: Some(CommentFormContext { data: form, errors }),
            };
            return Ok(Json(page).into_response());
        }
    };

    let updated = state
        .repo
        .update_comment_text(id, user_id, &text)
        .await?
        .ok_or(AppError::NotFound)?;
    tracing::info!(comment_id = updated.id, "comment updated");
    Ok(found(news_comments_url(updated.news_id)))
}

/// delete_comment_page
///
/// [Authenticated Route] Delete confirmation for the caller's own comment.
#[utoipa::path(
    get,
    path = "/news/comments/{id}/delete/",
    params(("id" = i64, Path, description = "Comment ID")),
    responses(
        (status = 200, description = "Confirmation", body = CommentPage),
        (status = 404, description = "Not Found or Not Yours")
    )
)]
pub async fn delete_comment_page(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<CommentPage>, AppError> {
    let comment = state
        .repo
        .get_comment_owned(id, user_id)
        .await
        .ok_or(AppError::NotFound)?;
    Ok(Json(CommentPage {
        comment,
        form: None,
    }))
}

/// delete_comment
///
/// [Authenticated Route] Deletes the caller's own comment.
///
/// *Authorization*: The repository deletes only where `author_id` matches, so a missing
/// comment and someone else's comment both end in 404.
#[utoipa::path(
    post,
    path = "/news/comments/{id}/delete/",
    params(("id" = i64, Path, description = "Comment ID")),
    responses(
        (status = 302, description = "Deleted; redirects to the comments anchor"),
        (status = 404, description = "Not Found or Not Yours")
    )
)]
pub async fn delete_comment(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    match state.repo.delete_comment(id, user_id).await? {
        Some(comment) => {
            tracing::info!(comment_id = comment.id, "comment deleted");
            Ok(found(news_comments_url(comment.news_id)))
        }
        None => Err(AppError::NotFound),
    }
}
