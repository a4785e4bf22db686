use askama::Template;
use axum::extract::State;
use axum::http::header;
use axum::response::{AppendHeaders, IntoResponse, Redirect, Response};
use axum::Form;
use serde::Deserialize;

use crate::auth::session::{login_cookie, logout_cookie};
use crate::auth::validation::{check_signup, SignupErrors};
use crate::auth::{make_pw_hash, valid_pw};
use crate::db::models::{NewUser, User};
use crate::db::StoreError;
use crate::error::AppResult;
use crate::extractors::MaybeUser;
use crate::routes::home::Html;
use crate::state::AppState;

const USERNAME_TAKEN: &str = "That username already exists";

// -- Templates --

#[derive(Template, Default)]
#[template(path = "pages/signup.html")]
pub struct SignupTemplate {
    pub user: Option<String>,
    pub username: String,
    pub email: String,
    pub error_username: String,
    pub error_password: String,
    pub error_password_conf: String,
    pub error_email: String,
}

impl SignupTemplate {
    fn with_errors(user: Option<String>, username: String, email: String, errors: SignupErrors) -> Self {
        Self {
            user,
            username,
            email,
            error_username: errors.username.unwrap_or_default(),
            error_password: errors.password.unwrap_or_default(),
            error_password_conf: errors.password_conf.unwrap_or_default(),
            error_email: errors.email.unwrap_or_default(),
        }
    }
}

#[derive(Template)]
#[template(path = "pages/login.html")]
pub struct LoginTemplate {
    pub user: Option<String>,
    pub username: String,
    pub error: String,
}

// -- Forms --

#[derive(Deserialize)]
pub struct SignupForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub password_conf: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

fn logged_in(state: &AppState, user: &User) -> Response {
    let cookie = login_cookie(&state.signer, &state.config.auth.cookie_name, user);
    (
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        Redirect::to("/"),
    )
        .into_response()
}

// -- Handlers --

/// GET /signup
pub async fn signup_page(viewer: MaybeUser) -> Html<SignupTemplate> {
    Html(SignupTemplate {
        user: viewer.name(),
        ..SignupTemplate::default()
    })
}

/// POST /signup
pub async fn signup(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Form(form): Form<SignupForm>,
) -> AppResult<Response> {
    let errors = check_signup(&form.username, &form.password, &form.password_conf, &form.email);
    if !errors.is_empty() {
        return Ok(
            Html(SignupTemplate::with_errors(viewer.name(), form.username, form.email, errors))
                .into_response(),
        );
    }

    let taken = || {
        Html(SignupTemplate {
            user: viewer.name(),
            username: form.username.clone(),
            email: form.email.clone(),
            error_username: USERNAME_TAKEN.to_string(),
            ..SignupTemplate::default()
        })
        .into_response()
    };

    if state.store.user_by_name(&form.username)?.is_some() {
        return Ok(taken());
    }

    let email = Some(form.email.clone()).filter(|e| !e.is_empty());
    let inserted = state.store.insert_user(NewUser {
        name: form.username.clone(),
        pw_hash: make_pw_hash(&form.username, &form.password, None),
        email,
    });

    let user = match inserted {
        Ok(user) => user,
        // Lost a race with a concurrent signup for the same name.
        Err(StoreError::UsernameTaken) => return Ok(taken()),
        Err(e) => return Err(e.into()),
    };
    tracing::info!(user_id = user.id, name = %user.name, "Registered user");

    Ok(logged_in(&state, &user))
}

/// GET /login
pub async fn login_page(viewer: MaybeUser) -> Html<LoginTemplate> {
    Html(LoginTemplate {
        user: viewer.name(),
        username: String::new(),
        error: String::new(),
    })
}

/// POST /login
pub async fn login(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    let user = state
        .store
        .user_by_name(&form.username)?
        .filter(|u| valid_pw(&form.username, &form.password, &u.pw_hash));

    match user {
        Some(user) => {
            tracing::info!(user_id = user.id, "Logged in");
            Ok(logged_in(&state, &user))
        }
        None => {
            tracing::warn!(name = %form.username, "Failed login");
            Ok(Html(LoginTemplate {
                user: viewer.name(),
                username: form.username,
                error: "Invalid login".to_string(),
            })
            .into_response())
        }
    }
}

/// GET /logout
pub async fn logout(State(state): State<AppState>) -> Response {
    (
        AppendHeaders([(
            header::SET_COOKIE,
            logout_cookie(&state.config.auth.cookie_name),
        )]),
        Redirect::to("/"),
    )
        .into_response()
}
