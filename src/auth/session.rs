use axum::http::{header, HeaderMap};

use crate::auth::cookie::CookieSigner;
use crate::db::models::User;
use crate::db::{BlogStore, StoreResult};

/// `Set-Cookie` value that logs `user` in.
pub fn login_cookie(signer: &CookieSigner, cookie_name: &str, user: &User) -> String {
    format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/",
        cookie_name,
        signer.make_secure_val(&user.id.to_string())
    )
}

/// `Set-Cookie` value that logs the browser out.
pub fn logout_cookie(cookie_name: &str) -> String {
    format!("{}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0", cookie_name)
}

pub fn get_cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|s| s.split(';'))
        .map(|s| s.trim())
        .find_map(|cookie| {
            let (key, val) = cookie.split_once('=')?;
            if key.trim() == name {
                Some(val.trim())
            } else {
                None
            }
        })
}

/// Resolve the session cookie to a user.
///
/// Missing, unsigned, non-numeric or dangling cookies all mean anonymous.
/// Only storage failures are errors.
pub fn resolve_user(
    headers: &HeaderMap,
    cookie_name: &str,
    signer: &CookieSigner,
    store: &dyn BlogStore,
) -> StoreResult<Option<User>> {
    let Some(raw) = get_cookie_value(headers, cookie_name) else {
        return Ok(None);
    };
    let Some(uid) = signer.check_secure_val(raw) else {
        tracing::debug!("Ignoring session cookie with a bad signature");
        return Ok(None);
    };
    let Ok(uid) = uid.parse::<i64>() else {
        return Ok(None);
    };
    store.user_by_id(uid)
}
