use regex::Regex;
use std::sync::LazyLock;

static USER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_-]{3,20}$").expect("valid username regex"));
static PASS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^.{3,20}$").expect("valid password regex"));
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\S]+@[\S]+\.[\S]+$").expect("valid email regex"));

pub fn valid_username(username: &str) -> bool {
    USER_RE.is_match(username)
}

pub fn valid_password(password: &str) -> bool {
    PASS_RE.is_match(password)
}

/// An empty email is fine; it is optional.
pub fn valid_email(email: &str) -> bool {
    email.is_empty() || EMAIL_RE.is_match(email)
}

/// Per-field messages for a rejected signup form.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SignupErrors {
    pub username: Option<String>,
    pub password: Option<String>,
    pub password_conf: Option<String>,
    pub email: Option<String>,
}

impl SignupErrors {
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.password.is_none()
            && self.password_conf.is_none()
            && self.email.is_none()
    }
}

/// Run the independent signup checks and collect every failure.
pub fn check_signup(username: &str, password: &str, password_conf: &str, email: &str) -> SignupErrors {
    let mut errors = SignupErrors::default();

    if !valid_username(username) {
        errors.username = Some("Please enter a valid username".to_string());
    }

    if !valid_password(password) {
        errors.password = Some("Please enter a valid password".to_string());
    } else if password != password_conf {
        errors.password_conf = Some("Your passwords don't match".to_string());
    }

    if !valid_email(email) {
        errors.email = Some("Please enter a valid email address".to_string());
    }

    errors
}
