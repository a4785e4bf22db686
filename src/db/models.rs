use chrono::{NaiveDateTime, Timelike, Utc};

/// Timestamp format used for every datetime column.
pub const DB_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Current UTC time at second precision, matching what the database keeps.
pub fn now() -> NaiveDateTime {
    let now = Utc::now().naive_utc();
    now.with_nanosecond(0).unwrap_or(now)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub pw_hash: String,
    pub email: Option<String>,
    pub created: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub pw_hash: String,
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub id: i64,
    pub subject: String,
    pub content: String,
    pub created: NaiveDateTime,
    pub last_modified: NaiveDateTime,
    pub creator: String,
    pub edited: bool,
    pub likes: i64,
    pub liked_by: Vec<String>,
}

impl Post {
    pub fn is_owned_by(&self, username: &str) -> bool {
        self.creator == username
    }

    /// The value comments use to point at this post.
    pub fn reference(&self) -> String {
        self.id.to_string()
    }

    /// Record a like from `username`. Returns false, leaving the post
    /// untouched, when the user wrote the post or already liked it.
    pub fn like(&mut self, username: &str) -> bool {
        if self.is_owned_by(username) || self.liked_by.iter().any(|u| u == username) {
            return false;
        }
        self.likes += 1;
        self.liked_by.push(username.to_string());
        true
    }

    pub fn edit(&mut self, subject: String, content: String) {
        self.subject = subject;
        self.content = content;
        self.edited = true;
        self.last_modified = now();
    }
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub subject: String,
    pub content: String,
    pub creator: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: i64,
    pub comment: String,
    pub creator: String,
    pub created: NaiveDateTime,
    /// Stringified id of the parent post.
    pub post: String,
}

impl Comment {
    pub fn is_owned_by(&self, username: &str) -> bool {
        self.creator == username
    }

    /// Where to send the user after touching this comment.
    pub fn post_url(&self) -> String {
        match self.post.parse::<i64>() {
            Ok(id) => format!("/{}", id),
            Err(_) => "/".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub comment: String,
    pub creator: String,
    pub post: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post_by(creator: &str) -> Post {
        let ts = now();
        Post {
            id: 1,
            subject: "s".into(),
            content: "c".into(),
            created: ts,
            last_modified: ts,
            creator: creator.into(),
            edited: false,
            likes: 0,
            liked_by: vec![],
        }
    }

    #[test]
    fn like_counts_once_per_user() {
        let mut post = post_by("alice");
        assert!(post.like("bob"));
        assert!(!post.like("bob"));
        assert_eq!(post.likes, 1);
        assert_eq!(post.liked_by, vec!["bob".to_string()]);
    }

    #[test]
    fn creator_cannot_like_own_post() {
        let mut post = post_by("alice");
        assert!(!post.like("alice"));
        assert_eq!(post.likes, 0);
        assert!(post.liked_by.is_empty());
    }

    #[test]
    fn several_users_can_like() {
        let mut post = post_by("alice");
        assert!(post.like("bob"));
        assert!(post.like("carol"));
        assert_eq!(post.likes, 2);
    }

    #[test]
    fn ownership_is_name_equality() {
        let post = post_by("alice");
        assert!(post.is_owned_by("alice"));
        assert!(!post.is_owned_by("Alice"));
    }

    #[test]
    fn edit_marks_post_edited() {
        let mut post = post_by("alice");
        post.edit("new".into(), "body".into());
        assert!(post.edited);
        assert_eq!(post.subject, "new");
        assert_eq!(post.content, "body");
    }

    #[test]
    fn comment_post_url() {
        let comment = Comment {
            id: 3,
            comment: "hi".into(),
            creator: "bob".into(),
            created: now(),
            post: "12".into(),
        };
        assert_eq!(comment.post_url(), "/12");

        let orphan = Comment {
            post: "junk".into(),
            ..comment
        };
        assert_eq!(orphan.post_url(), "/");
    }

    #[test]
    fn now_has_no_subseconds() {
        assert_eq!(now().nanosecond(), 0);
    }
}
