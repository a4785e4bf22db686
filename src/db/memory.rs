use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use crate::db::models::{now, Comment, NewComment, NewPost, NewUser, Post, User};
use crate::db::store::{BlogStore, StoreError, StoreResult};

/// In-memory `BlogStore` for ephemeral runs and tests.
///
/// Data lives in the process and is gone on restart.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Tables>,
}

#[derive(Default)]
struct Tables {
    next_id: i64,
    users: BTreeMap<i64, User>,
    posts: BTreeMap<i64, Post>,
    comments: BTreeMap<i64, Comment>,
}

impl Tables {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        // A panic while holding the lock cannot leave a table half-written,
        // every mutation is a single map operation.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl BlogStore for MemoryStore {
    fn user_by_id(&self, id: i64) -> StoreResult<Option<User>> {
        Ok(self.tables().users.get(&id).cloned())
    }

    fn user_by_name(&self, name: &str) -> StoreResult<Option<User>> {
        Ok(self
            .tables()
            .users
            .values()
            .find(|u| u.name == name)
            .cloned())
    }

    fn insert_user(&self, user: NewUser) -> StoreResult<User> {
        let mut tables = self.tables();
        if tables.users.values().any(|u| u.name == user.name) {
            return Err(StoreError::UsernameTaken);
        }
        let user = User {
            id: tables.allocate_id(),
            name: user.name,
            pw_hash: user.pw_hash,
            email: user.email,
            created: now(),
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    fn post_by_id(&self, id: i64) -> StoreResult<Option<Post>> {
        Ok(self.tables().posts.get(&id).cloned())
    }

    fn recent_posts(&self, limit: usize) -> StoreResult<Vec<Post>> {
        let tables = self.tables();
        let mut posts: Vec<Post> = tables.posts.values().cloned().collect();
        posts.sort_by(|a, b| b.created.cmp(&a.created).then(b.id.cmp(&a.id)));
        posts.truncate(limit);
        Ok(posts)
    }

    fn insert_post(&self, post: NewPost) -> StoreResult<Post> {
        let mut tables = self.tables();
        let created = now();
        let post = Post {
            id: tables.allocate_id(),
            subject: post.subject,
            content: post.content,
            created,
            last_modified: created,
            creator: post.creator,
            edited: false,
            likes: 0,
            liked_by: Vec::new(),
        };
        tables.posts.insert(post.id, post.clone());
        Ok(post)
    }

    fn update_post(&self, post: &Post) -> StoreResult<()> {
        let mut tables = self.tables();
        match tables.posts.get_mut(&post.id) {
            Some(stored) => {
                *stored = post.clone();
                Ok(())
            }
            None => Err(StoreError::Corrupt(format!("post {} does not exist", post.id))),
        }
    }

    fn delete_post(&self, id: i64) -> StoreResult<()> {
        self.tables().posts.remove(&id);
        Ok(())
    }

    fn comment_by_id(&self, id: i64) -> StoreResult<Option<Comment>> {
        Ok(self.tables().comments.get(&id).cloned())
    }

    fn comments_for_post(&self, post: &str) -> StoreResult<Vec<Comment>> {
        let tables = self.tables();
        let mut comments: Vec<Comment> = tables
            .comments
            .values()
            .filter(|c| c.post == post)
            .cloned()
            .collect();
        comments.sort_by(|a, b| a.created.cmp(&b.created).then(a.id.cmp(&b.id)));
        Ok(comments)
    }

    fn insert_comment(&self, comment: NewComment) -> StoreResult<Comment> {
        let mut tables = self.tables();
        let comment = Comment {
            id: tables.allocate_id(),
            comment: comment.comment,
            creator: comment.creator,
            created: now(),
            post: comment.post,
        };
        tables.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    fn update_comment(&self, comment: &Comment) -> StoreResult<()> {
        let mut tables = self.tables();
        match tables.comments.get_mut(&comment.id) {
            Some(stored) => {
                *stored = comment.clone();
                Ok(())
            }
            None => Err(StoreError::Corrupt(format!(
                "comment {} does not exist",
                comment.id
            ))),
        }
    }

    fn delete_comment(&self, id: i64) -> StoreResult<()> {
        self.tables().comments.remove(&id);
        Ok(())
    }

    fn delete_comments_for_post(&self, post: &str) -> StoreResult<usize> {
        let mut tables = self.tables();
        let before = tables.comments.len();
        tables.comments.retain(|_, c| c.post != post);
        Ok(before - tables.comments.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(name: &str) -> NewUser {
        NewUser {
            name: name.into(),
            pw_hash: "salt,hash".into(),
            email: None,
        }
    }

    fn post(subject: &str) -> NewPost {
        NewPost {
            subject: subject.into(),
            content: "body".into(),
            creator: "alice".into(),
        }
    }

    #[test]
    fn insert_and_lookup_user() {
        let store = MemoryStore::new();
        let alice = store.insert_user(user("alice")).unwrap();
        assert_eq!(store.user_by_id(alice.id).unwrap(), Some(alice.clone()));
        assert_eq!(store.user_by_name("alice").unwrap(), Some(alice));
        assert_eq!(store.user_by_name("nobody").unwrap(), None);
    }

    #[test]
    fn duplicate_username_is_rejected() {
        let store = MemoryStore::new();
        store.insert_user(user("alice")).unwrap();
        assert!(matches!(
            store.insert_user(user("alice")),
            Err(StoreError::UsernameTaken)
        ));
    }

    #[test]
    fn recent_posts_are_newest_first() {
        let store = MemoryStore::new();
        let a = store.insert_post(post("a")).unwrap();
        let b = store.insert_post(post("b")).unwrap();
        let c = store.insert_post(post("c")).unwrap();

        let ids: Vec<i64> = store.recent_posts(2).unwrap().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![c.id, b.id]);
        assert_eq!(store.recent_posts(10).unwrap().len(), 3);
        assert!(a.id < b.id);
    }

    #[test]
    fn update_and_delete_post() {
        let store = MemoryStore::new();
        let mut p = store.insert_post(post("a")).unwrap();
        p.edit("b".into(), "new body".into());
        store.update_post(&p).unwrap();
        assert_eq!(store.post_by_id(p.id).unwrap(), Some(p.clone()));

        store.delete_post(p.id).unwrap();
        assert_eq!(store.post_by_id(p.id).unwrap(), None);
        assert!(store.update_post(&p).is_err());
    }

    #[test]
    fn comments_by_post() {
        let store = MemoryStore::new();
        let p = store.insert_post(post("a")).unwrap();
        for text in ["first", "second"] {
            store
                .insert_comment(NewComment {
                    comment: text.into(),
                    creator: "bob".into(),
                    post: p.reference(),
                })
                .unwrap();
        }
        store
            .insert_comment(NewComment {
                comment: "other".into(),
                creator: "bob".into(),
                post: "9999".into(),
            })
            .unwrap();

        let comments = store.comments_for_post(&p.reference()).unwrap();
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].comment, "first");

        assert_eq!(store.delete_comments_for_post(&p.reference()).unwrap(), 2);
        assert!(store.comments_for_post(&p.reference()).unwrap().is_empty());
        assert_eq!(store.comments_for_post("9999").unwrap().len(), 1);
    }
}
