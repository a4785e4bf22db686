use crate::db::models::{Comment, NewComment, NewPost, NewUser, Post, User};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("That username already exists")]
    UsernameTaken,

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("Malformed stored value: {0}")]
    Corrupt(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Everything the handlers need from persistence.
///
/// Each entity gets point lookups, a field query, put and delete. Nothing
/// here is transactional across calls: a read followed by an update can
/// interleave with another request doing the same.
pub trait BlogStore: Send + Sync {
    fn user_by_id(&self, id: i64) -> StoreResult<Option<User>>;
    fn user_by_name(&self, name: &str) -> StoreResult<Option<User>>;
    /// Fails with `StoreError::UsernameTaken` if the name is in use.
    fn insert_user(&self, user: NewUser) -> StoreResult<User>;

    fn post_by_id(&self, id: i64) -> StoreResult<Option<Post>>;
    /// Newest first.
    fn recent_posts(&self, limit: usize) -> StoreResult<Vec<Post>>;
    fn insert_post(&self, post: NewPost) -> StoreResult<Post>;
    fn update_post(&self, post: &Post) -> StoreResult<()>;
    fn delete_post(&self, id: i64) -> StoreResult<()>;

    fn comment_by_id(&self, id: i64) -> StoreResult<Option<Comment>>;
    /// Oldest first. `post` is the stringified post id.
    fn comments_for_post(&self, post: &str) -> StoreResult<Vec<Comment>>;
    fn insert_comment(&self, comment: NewComment) -> StoreResult<Comment>;
    fn update_comment(&self, comment: &Comment) -> StoreResult<()>;
    fn delete_comment(&self, id: i64) -> StoreResult<()>;
    fn delete_comments_for_post(&self, post: &str) -> StoreResult<usize>;
}
