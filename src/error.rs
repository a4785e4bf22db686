use askama::Template;
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};

use crate::auth::session::resolve_user;
use crate::db::StoreError;
use crate::state::AppState;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found")]
    NotFound,

    #[error("Login required")]
    LoginRequired,

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Template)]
#[template(path = "pages/error.html")]
struct ErrorTemplate {
    user: Option<String>,
    status: u16,
    message: String,
}

/// Marks a response as a rendered error page so [`error_page_viewer`] can
/// render it again with the session user's name in the navigation bar.
#[derive(Debug, Clone, Copy)]
struct ErrorPage {
    status: StatusCode,
    message: &'static str,
}

fn error_page(status: StatusCode, message: &'static str, user: Option<String>) -> Response {
    let page = ErrorTemplate {
        user,
        status: status.as_u16(),
        message: message.to_string(),
    };
    let mut response = match page.render() {
        Ok(body) => (
            status,
            [(axum::http::header::CONTENT_TYPE, "text/html; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Template render error: {}", e);
            (status, message).into_response()
        }
    };
    response.extensions_mut().insert(ErrorPage { status, message });
    response
}

/// Middleware that fills in the signed-in user on error pages. Errors are
/// raised far from the extractors, so the page is first rendered anonymous.
pub async fn error_page_viewer(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    let headers = req.headers().clone();
    let response = next.run(req).await;

    let Some(page) = response.extensions().get::<ErrorPage>().copied() else {
        return response;
    };

    match resolve_user(
        &headers,
        &state.config.auth.cookie_name,
        &state.signer,
        state.store.as_ref(),
    ) {
        Ok(Some(user)) => error_page(page.status, page.message, Some(user.name)),
        Ok(None) => response,
        Err(e) => {
            tracing::warn!("Could not resolve user for error page: {}", e);
            response
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::NotFound => error_page(StatusCode::NOT_FOUND, "That page does not exist.", None),
            AppError::LoginRequired => Redirect::to("/login").into_response(),
            AppError::Store(e) => {
                tracing::error!("Storage error: {}", e);
                error_page(StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong.", None)
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                error_page(StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong.", None)
            }
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
