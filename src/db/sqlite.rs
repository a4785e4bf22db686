use chrono::NaiveDateTime;
use rusqlite::types::Type;
use rusqlite::{params, ErrorCode, OptionalExtension, Row};

use crate::db::models::{
    now, Comment, NewComment, NewPost, NewUser, Post, User, DB_TIME_FORMAT,
};
use crate::db::store::{BlogStore, StoreError, StoreResult};
use crate::db::DbPool;

/// `BlogStore` backed by a pooled SQLite database.
#[derive(Clone)]
pub struct SqliteStore {
    pool: DbPool,
}

impl SqliteStore {
    /// Wrap a pool whose schema is already migrated.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn time_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDateTime> {
    let raw: String = row.get(idx)?;
    NaiveDateTime::parse_from_str(&raw, DB_TIME_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn format_time(dt: &NaiveDateTime) -> String {
    dt.format(DB_TIME_FORMAT).to_string()
}

const USER_COLUMNS: &str = "id, name, pw_hash, email, created";
const POST_COLUMNS: &str =
    "id, subject, content, created, last_modified, creator, edited, likes, liked_by";
const COMMENT_COLUMNS: &str = "id, comment, creator, created, post";

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        pw_hash: row.get(2)?,
        email: row.get(3)?,
        created: time_column(row, 4)?,
    })
}

fn post_from_row(row: &Row<'_>) -> rusqlite::Result<Post> {
    let liked_by_json: String = row.get(8)?;
    let liked_by = serde_json::from_str(&liked_by_json)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(8, Type::Text, Box::new(e)))?;
    Ok(Post {
        id: row.get(0)?,
        subject: row.get(1)?,
        content: row.get(2)?,
        created: time_column(row, 3)?,
        last_modified: time_column(row, 4)?,
        creator: row.get(5)?,
        edited: row.get(6)?,
        likes: row.get(7)?,
        liked_by,
    })
}

fn comment_from_row(row: &Row<'_>) -> rusqlite::Result<Comment> {
    Ok(Comment {
        id: row.get(0)?,
        comment: row.get(1)?,
        creator: row.get(2)?,
        created: time_column(row, 3)?,
        post: row.get(4)?,
    })
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == ErrorCode::ConstraintViolation
                && e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

impl BlogStore for SqliteStore {
    fn user_by_id(&self, id: i64) -> StoreResult<Option<User>> {
        let conn = self.pool.get()?;
        let user = conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
                params![id],
                user_from_row,
            )
            .optional()?;
        Ok(user)
    }

    fn user_by_name(&self, name: &str) -> StoreResult<Option<User>> {
        let conn = self.pool.get()?;
        let user = conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE name = ?1"),
                params![name],
                user_from_row,
            )
            .optional()?;
        Ok(user)
    }

    fn insert_user(&self, user: NewUser) -> StoreResult<User> {
        let conn = self.pool.get()?;
        let created = now();
        conn.execute(
            "INSERT INTO users (name, pw_hash, email, created) VALUES (?1, ?2, ?3, ?4)",
            params![user.name, user.pw_hash, user.email, format_time(&created)],
        )
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::UsernameTaken
            } else {
                StoreError::Database(e)
            }
        })?;

        Ok(User {
            id: conn.last_insert_rowid(),
            name: user.name,
            pw_hash: user.pw_hash,
            email: user.email,
            created,
        })
    }

    fn post_by_id(&self, id: i64) -> StoreResult<Option<Post>> {
        let conn = self.pool.get()?;
        let post = conn
            .query_row(
                &format!("SELECT {POST_COLUMNS} FROM posts WHERE id = ?1"),
                params![id],
                post_from_row,
            )
            .optional()?;
        Ok(post)
    }

    fn recent_posts(&self, limit: usize) -> StoreResult<Vec<Post>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {POST_COLUMNS} FROM posts ORDER BY created DESC, id DESC LIMIT ?1"
        ))?;
        let posts = stmt
            .query_map(params![limit as i64], post_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(posts)
    }

    fn insert_post(&self, post: NewPost) -> StoreResult<Post> {
        let conn = self.pool.get()?;
        let created = now();
        let ts = format_time(&created);
        conn.execute(
            "INSERT INTO posts (subject, content, created, last_modified, creator, edited, likes, liked_by)
             VALUES (?1, ?2, ?3, ?3, ?4, 0, 0, '[]')",
            params![post.subject, post.content, ts, post.creator],
        )?;

        Ok(Post {
            id: conn.last_insert_rowid(),
            subject: post.subject,
            content: post.content,
            created,
            last_modified: created,
            creator: post.creator,
            edited: false,
            likes: 0,
            liked_by: Vec::new(),
        })
    }

    fn update_post(&self, post: &Post) -> StoreResult<()> {
        let conn = self.pool.get()?;
        let liked_by = serde_json::to_string(&post.liked_by)?;
        let changed = conn.execute(
            "UPDATE posts SET subject = ?1, content = ?2, last_modified = ?3, creator = ?4,
                              edited = ?5, likes = ?6, liked_by = ?7
             WHERE id = ?8",
            params![
                post.subject,
                post.content,
                format_time(&post.last_modified),
                post.creator,
                post.edited,
                post.likes,
                liked_by,
                post.id
            ],
        )?;
        if changed == 0 {
            return Err(StoreError::Corrupt(format!("post {} does not exist", post.id)));
        }
        Ok(())
    }

    fn delete_post(&self, id: i64) -> StoreResult<()> {
        let conn = self.pool.get()?;
        conn.execute("DELETE FROM posts WHERE id = ?1", params![id])?;
        Ok(())
    }

    fn comment_by_id(&self, id: i64) -> StoreResult<Option<Comment>> {
        let conn = self.pool.get()?;
        let comment = conn
            .query_row(
                &format!("SELECT {COMMENT_COLUMNS} FROM comments WHERE id = ?1"),
                params![id],
                comment_from_row,
            )
            .optional()?;
        Ok(comment)
    }

    fn comments_for_post(&self, post: &str) -> StoreResult<Vec<Comment>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments WHERE post = ?1 ORDER BY created ASC, id ASC"
        ))?;
        let comments = stmt
            .query_map(params![post], comment_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(comments)
    }

    fn insert_comment(&self, comment: NewComment) -> StoreResult<Comment> {
        let conn = self.pool.get()?;
        let created = now();
        conn.execute(
            "INSERT INTO comments (comment, creator, created, post) VALUES (?1, ?2, ?3, ?4)",
            params![comment.comment, comment.creator, format_time(&created), comment.post],
        )?;

        Ok(Comment {
            id: conn.last_insert_rowid(),
            comment: comment.comment,
            creator: comment.creator,
            created,
            post: comment.post,
        })
    }

    fn update_comment(&self, comment: &Comment) -> StoreResult<()> {
        let conn = self.pool.get()?;
        let changed = conn.execute(
            "UPDATE comments SET comment = ?1, creator = ?2, post = ?3 WHERE id = ?4",
            params![comment.comment, comment.creator, comment.post, comment.id],
        )?;
        if changed == 0 {
            return Err(StoreError::Corrupt(format!(
                "comment {} does not exist",
                comment.id
            )));
        }
        Ok(())
    }

    fn delete_comment(&self, id: i64) -> StoreResult<()> {
        let conn = self.pool.get()?;
        conn.execute("DELETE FROM comments WHERE id = ?1", params![id])?;
        Ok(())
    }

    fn delete_comments_for_post(&self, post: &str) -> StoreResult<usize> {
        let conn = self.pool.get()?;
        let removed = conn.execute("DELETE FROM comments WHERE post = ?1", params![post])?;
        Ok(removed)
    }
}
