use askama::Template;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::error::AppResult;
use crate::extractors::MaybeUser;
use crate::routes::views::PostView;
use crate::state::AppState;

#[derive(Template)]
#[template(path = "pages/front.html")]
pub struct FrontTemplate {
    pub user: Option<String>,
    pub posts: Vec<PostView>,
}

/// Wrapper to render askama templates as axum responses
pub struct Html<T: Template>(pub T);

impl<T: Template> IntoResponse for Html<T> {
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(body) => (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
                body,
            )
                .into_response(),
            Err(e) => {
                tracing::error!("Template render error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Template error").into_response()
            }
        }
    }
}

/// GET /: the most recent posts
pub async fn index(
    State(state): State<AppState>,
    viewer: MaybeUser,
) -> AppResult<Html<FrontTemplate>> {
    let user = viewer.name();
    let posts = state
        .store
        .recent_posts(state.config.blog.front_page_limit)?
        .iter()
        .map(|p| PostView::new(p, user.as_deref()))
        .collect();

    Ok(Html(FrontTemplate { user, posts }))
}
