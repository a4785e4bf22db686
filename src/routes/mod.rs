pub mod accounts;
pub mod assets;
pub mod comments;
pub mod home;
pub mod posts;
pub mod views;

use axum::middleware;
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::error::error_page_viewer;
use crate::state::AppState;

/// Every route of the blog, with request tracing.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home::index))
        .route("/assets/{*path}", get(assets::serve))
        .route("/{id}", get(posts::permalink))
        .route("/{id}/like", get(posts::like_post))
        .route(
            "/newpost",
            get(posts::new_post_page).post(posts::create_post),
        )
        .route(
            "/editpost",
            get(posts::edit_post_page).post(posts::update_post),
        )
        .route(
            "/delete",
            get(posts::delete_post_page).post(posts::delete_post),
        )
        .route("/deletion", get(posts::deletion))
        .route(
            "/newcomment",
            get(comments::new_comment_page).post(comments::create_comment),
        )
        .route(
            "/editcomment",
            get(comments::edit_comment_page).post(comments::update_comment),
        )
        .route(
            "/deletecomment",
            get(comments::delete_comment_page).post(comments::delete_comment),
        )
        .route(
            "/signup",
            get(accounts::signup_page).post(accounts::signup),
        )
        .route("/login", get(accounts::login_page).post(accounts::login))
        .route("/logout", get(accounts::logout))
        .layer(middleware::from_fn_with_state(state.clone(), error_page_viewer))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
