use askama::Template;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Form;
use serde::Deserialize;

use crate::db::models::{Comment, NewComment};
use crate::error::{AppError, AppResult};
use crate::extractors::CurrentUser;
use crate::routes::home::Html;
use crate::routes::posts::PostQuery;
use crate::routes::views::{is_blank, parse_id};
use crate::state::AppState;

const EMPTY_COMMENT: &str = "Please write a comment";

// --- Templates ---

#[derive(Template)]
#[template(path = "pages/newcomment.html")]
pub struct NewCommentTemplate {
    pub user: Option<String>,
    pub post_id: i64,
    pub subject: String,
    pub comment: String,
    pub error: String,
}

#[derive(Template)]
#[template(path = "pages/editcomment.html")]
pub struct EditCommentTemplate {
    pub user: Option<String>,
    pub comment_id: i64,
    pub post_url: String,
    pub comment: String,
    pub error: String,
}

#[derive(Template)]
#[template(path = "pages/deletecomment.html")]
pub struct DeleteCommentTemplate {
    pub user: Option<String>,
    pub comment_id: i64,
    pub post_url: String,
    pub comment: String,
}

// --- Forms ---

#[derive(Deserialize)]
pub struct CommentQuery {
    #[serde(default)]
    pub comment: String,
}

#[derive(Deserialize)]
pub struct NewCommentForm {
    #[serde(default)]
    pub post: String,
    #[serde(default)]
    pub comment: String,
}

#[derive(Deserialize)]
pub struct EditCommentForm {
    #[serde(default)]
    pub comment_id: String,
    #[serde(default)]
    pub comment: String,
}

// --- Helpers ---

fn load_comment(state: &AppState, raw_id: &str) -> AppResult<Comment> {
    let id = parse_id(raw_id)?;
    state.store.comment_by_id(id)?.ok_or(AppError::NotFound)
}

/// Load a comment the user is allowed to change. Someone else's comment
/// yields the redirect back to its post instead.
fn owned_comment(
    state: &AppState,
    raw_id: &str,
    username: &str,
) -> AppResult<Result<Comment, Redirect>> {
    let comment = load_comment(state, raw_id)?;
    if comment.is_owned_by(username) {
        Ok(Ok(comment))
    } else {
        tracing::warn!(comment_id = comment.id, user = %username, "Refused change to someone else's comment");
        Ok(Err(Redirect::to(&comment.post_url())))
    }
}

// --- Handlers ---

/// GET /newcomment?post=ID
pub async fn new_comment_page(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<PostQuery>,
) -> AppResult<Html<NewCommentTemplate>> {
    let id = parse_id(&query.post)?;
    let post = state.store.post_by_id(id)?.ok_or(AppError::NotFound)?;

    Ok(Html(NewCommentTemplate {
        user: Some(user.name),
        post_id: post.id,
        subject: post.subject,
        comment: String::new(),
        error: String::new(),
    }))
}

/// POST /newcomment
pub async fn create_comment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Form(form): Form<NewCommentForm>,
) -> AppResult<Response> {
    let id = parse_id(&form.post)?;
    let post = state.store.post_by_id(id)?.ok_or(AppError::NotFound)?;

    if is_blank(&form.comment) {
        return Ok(Html(NewCommentTemplate {
            user: Some(user.name),
            post_id: post.id,
            subject: post.subject,
            comment: form.comment,
            error: EMPTY_COMMENT.to_string(),
        })
        .into_response());
    }

    let comment = state.store.insert_comment(NewComment {
        comment: form.comment,
        creator: user.name,
        post: post.reference(),
    })?;
    tracing::info!(comment_id = comment.id, post_id = post.id, "Created comment");

    Ok(Redirect::to(&comment.post_url()).into_response())
}

/// GET /editcomment?comment=ID
pub async fn edit_comment_page(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<CommentQuery>,
) -> AppResult<Response> {
    let comment = match owned_comment(&state, &query.comment, &user.name)? {
        Ok(comment) => comment,
        Err(redirect) => return Ok(redirect.into_response()),
    };

    Ok(Html(EditCommentTemplate {
        user: Some(user.name),
        comment_id: comment.id,
        post_url: comment.post_url(),
        comment: comment.comment,
        error: String::new(),
    })
    .into_response())
}

/// POST /editcomment
pub async fn update_comment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Form(form): Form<EditCommentForm>,
) -> AppResult<Response> {
    let mut comment = match owned_comment(&state, &form.comment_id, &user.name)? {
        Ok(comment) => comment,
        Err(redirect) => return Ok(redirect.into_response()),
    };

    if is_blank(&form.comment) {
        return Ok(Html(EditCommentTemplate {
            user: Some(user.name),
            comment_id: comment.id,
            post_url: comment.post_url(),
            comment: form.comment,
            error: EMPTY_COMMENT.to_string(),
        })
        .into_response());
    }

    comment.comment = form.comment;
    state.store.update_comment(&comment)?;
    tracing::info!(comment_id = comment.id, "Edited comment");

    Ok(Redirect::to(&comment.post_url()).into_response())
}

/// GET /deletecomment?comment=ID: confirmation page
pub async fn delete_comment_page(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<CommentQuery>,
) -> AppResult<Response> {
    let comment = match owned_comment(&state, &query.comment, &user.name)? {
        Ok(comment) => comment,
        Err(redirect) => return Ok(redirect.into_response()),
    };

    Ok(Html(DeleteCommentTemplate {
        user: Some(user.name),
        comment_id: comment.id,
        post_url: comment.post_url(),
        comment: comment.comment,
    })
    .into_response())
}

/// POST /deletecomment
pub async fn delete_comment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Form(form): Form<EditCommentForm>,
) -> AppResult<Response> {
    let comment = match owned_comment(&state, &form.comment_id, &user.name)? {
        Ok(comment) => comment,
        Err(redirect) => return Ok(redirect.into_response()),
    };

    state.store.delete_comment(comment.id)?;
    tracing::info!(comment_id = comment.id, "Deleted comment");

    Ok(Redirect::to(&comment.post_url()).into_response())
}
