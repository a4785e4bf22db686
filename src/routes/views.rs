use chrono::{NaiveDateTime, Utc};

use crate::db::models::{Comment, Post};
use crate::error::{AppError, AppResult};

// --- View structs ---

pub struct PostView {
    pub id: i64,
    pub subject: String,
    /// Body split on newlines; the template joins them with `<br>`.
    pub lines: Vec<String>,
    pub creator: String,
    pub created: String,
    pub edited: bool,
    pub likes: i64,
    pub can_manage: bool,
    pub can_like: bool,
    pub liked: bool,
}

impl PostView {
    pub fn new(post: &Post, viewer: Option<&str>) -> Self {
        let owner = viewer.is_some_and(|name| post.is_owned_by(name));
        let liked = viewer.is_some_and(|name| post.liked_by.iter().any(|u| u == name));
        Self {
            id: post.id,
            subject: post.subject.clone(),
            lines: split_lines(&post.content),
            creator: post.creator.clone(),
            created: format_relative_time(&post.created),
            edited: post.edited,
            likes: post.likes,
            can_manage: owner,
            can_like: viewer.is_some() && !owner && !liked,
            liked,
        }
    }
}

pub struct CommentView {
    pub id: i64,
    pub lines: Vec<String>,
    pub creator: String,
    pub created: String,
    pub can_manage: bool,
}

impl CommentView {
    pub fn new(comment: &Comment, viewer: Option<&str>) -> Self {
        Self {
            id: comment.id,
            lines: split_lines(&comment.comment),
            creator: comment.creator.clone(),
            created: format_relative_time(&comment.created),
            can_manage: viewer.is_some_and(|name| comment.is_owned_by(name)),
        }
    }
}

fn split_lines(text: &str) -> Vec<String> {
    text.replace("\r\n", "\n")
        .split('\n')
        .map(str::to_string)
        .collect()
}

/// Parse a numeric id from a path segment or form field. Anything else is
/// treated as a page that does not exist.
pub fn parse_id(raw: &str) -> AppResult<i64> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AppError::NotFound);
    }
    raw.parse::<i64>().map_err(|_| AppError::NotFound)
}

/// Form fields count as missing when they hold only whitespace.
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

// --- Time formatting ---

pub fn format_relative_time(dt: &NaiveDateTime) -> String {
    let now = Utc::now().naive_utc();
    let diff = now.signed_duration_since(*dt);

    let seconds = diff.num_seconds();
    if seconds < 60 {
        return "just now".to_string();
    }

    let minutes = diff.num_minutes();
    if minutes < 60 {
        return format!("{}m ago", minutes);
    }

    let hours = diff.num_hours();
    if hours < 24 {
        return format!("{}h ago", hours);
    }

    let days = diff.num_days();
    if days < 7 {
        return format!("{}d ago", days);
    }

    dt.format("%b %-d, %Y").to_string()
}
