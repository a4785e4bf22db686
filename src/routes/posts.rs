use askama::Template;
use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Form;
use serde::Deserialize;

use crate::db::models::{NewPost, Post};
use crate::error::{AppError, AppResult};
use crate::extractors::{CurrentUser, MaybeUser};
use crate::routes::home::Html;
use crate::routes::views::{is_blank, parse_id, CommentView, PostView};
use crate::state::AppState;

// --- Templates ---

#[derive(Template)]
#[template(path = "pages/permalink.html")]
pub struct PermalinkTemplate {
    pub user: Option<String>,
    pub post: PostView,
    pub comments: Vec<CommentView>,
}

#[derive(Template)]
#[template(path = "pages/newpost.html")]
pub struct NewPostTemplate {
    pub user: Option<String>,
    pub subject: String,
    pub content: String,
    pub error: String,
}

#[derive(Template)]
#[template(path = "pages/editpost.html")]
pub struct EditPostTemplate {
    pub user: Option<String>,
    pub post_id: i64,
    pub subject: String,
    pub content: String,
    pub error: String,
}

#[derive(Template)]
#[template(path = "pages/delete.html")]
pub struct DeletePostTemplate {
    pub user: Option<String>,
    pub post_id: i64,
    pub subject: String,
}

#[derive(Template)]
#[template(path = "pages/deletion.html")]
pub struct DeletionTemplate {
    pub user: Option<String>,
}

// --- Forms ---

#[derive(Deserialize)]
pub struct PostQuery {
    #[serde(default)]
    pub post: String,
}

#[derive(Deserialize)]
pub struct NewPostForm {
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Deserialize)]
pub struct EditPostForm {
    #[serde(default)]
    pub post: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub content: String,
}

// --- Helpers ---

fn load_post(state: &AppState, raw_id: &str) -> AppResult<Post> {
    let id = parse_id(raw_id)?;
    state.store.post_by_id(id)?.ok_or(AppError::NotFound)
}

fn post_url(id: i64) -> String {
    format!("/{}", id)
}

// --- Handlers ---

/// GET /{id}
pub async fn permalink(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Path(id): Path<String>,
) -> AppResult<Html<PermalinkTemplate>> {
    let post = load_post(&state, &id)?;
    let user = viewer.name();
    let comments = state
        .store
        .comments_for_post(&post.reference())?
        .iter()
        .map(|c| CommentView::new(c, user.as_deref()))
        .collect();

    Ok(Html(PermalinkTemplate {
        post: PostView::new(&post, user.as_deref()),
        user,
        comments,
    }))
}

/// GET /newpost
pub async fn new_post_page(CurrentUser(user): CurrentUser) -> Html<NewPostTemplate> {
    Html(NewPostTemplate {
        user: Some(user.name),
        subject: String::new(),
        content: String::new(),
        error: String::new(),
    })
}

/// POST /newpost
pub async fn create_post(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Form(form): Form<NewPostForm>,
) -> AppResult<Response> {
    if is_blank(&form.subject) || is_blank(&form.content) {
        return Ok(Html(NewPostTemplate {
            user: Some(user.name),
            subject: form.subject,
            content: form.content,
            error: "You need a subject and content to post a new entry.".to_string(),
        })
        .into_response());
    }

    let post = state.store.insert_post(NewPost {
        subject: form.subject,
        content: form.content,
        creator: user.name,
    })?;
    tracing::info!(post_id = post.id, creator = %post.creator, "Created post");

    Ok(Redirect::to(&post_url(post.id)).into_response())
}

/// GET /editpost?post=ID
pub async fn edit_post_page(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<PostQuery>,
) -> AppResult<Response> {
    let post = load_post(&state, &query.post)?;
    if !post.is_owned_by(&user.name) {
        tracing::warn!(post_id = post.id, user = %user.name, "Refused edit of someone else's post");
        return Ok(Redirect::to("/").into_response());
    }

    Ok(Html(EditPostTemplate {
        user: Some(user.name),
        post_id: post.id,
        subject: post.subject,
        content: post.content,
        error: String::new(),
    })
    .into_response())
}

/// POST /editpost
pub async fn update_post(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Form(form): Form<EditPostForm>,
) -> AppResult<Response> {
    let mut post = load_post(&state, &form.post)?;
    if !post.is_owned_by(&user.name) {
        tracing::warn!(post_id = post.id, user = %user.name, "Refused edit of someone else's post");
        return Ok(Redirect::to("/").into_response());
    }

    if is_blank(&form.subject) || is_blank(&form.content) {
        return Ok(Html(EditPostTemplate {
            user: Some(user.name),
            post_id: post.id,
            subject: form.subject,
            content: form.content,
            error: "Please fill in both a subject and content.".to_string(),
        })
        .into_response());
    }

    post.edit(form.subject, form.content);
    state.store.update_post(&post)?;
    tracing::info!(post_id = post.id, "Edited post");

    Ok(Redirect::to(&post_url(post.id)).into_response())
}

/// GET /delete?post=ID: confirmation page
pub async fn delete_post_page(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<PostQuery>,
) -> AppResult<Response> {
    let post = load_post(&state, &query.post)?;
    if !post.is_owned_by(&user.name) {
        tracing::warn!(post_id = post.id, user = %user.name, "Refused delete of someone else's post");
        return Ok(Redirect::to("/").into_response());
    }

    Ok(Html(DeletePostTemplate {
        user: Some(user.name),
        post_id: post.id,
        subject: post.subject,
    })
    .into_response())
}

/// POST /delete
pub async fn delete_post(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Form(form): Form<PostQuery>,
) -> AppResult<Response> {
    let post = load_post(&state, &form.post)?;
    if !post.is_owned_by(&user.name) {
        tracing::warn!(post_id = post.id, user = %user.name, "Refused delete of someone else's post");
        return Ok(Redirect::to("/").into_response());
    }

    state.store.delete_post(post.id)?;
    let removed = state.store.delete_comments_for_post(&post.reference())?;
    tracing::info!(post_id = post.id, comments = removed, "Deleted post");

    Ok(Redirect::to("/deletion").into_response())
}

/// GET /deletion
pub async fn deletion(viewer: MaybeUser) -> Html<DeletionTemplate> {
    Html(DeletionTemplate {
        user: viewer.name(),
    })
}

/// GET /{id}/like
///
/// Liking your own post, or liking twice, changes nothing; either way the
/// browser lands back on the post.
pub async fn like_post(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Redirect> {
    let mut post = load_post(&state, &id)?;

    if post.like(&user.name) {
        state.store.update_post(&post)?;
        tracing::info!(post_id = post.id, user = %user.name, likes = post.likes, "Liked post");
    }

    Ok(Redirect::to(&post_url(post.id)))
}
