//! In-memory stand-in for Postgres, mirroring its constraints closely enough
//! for handler and router tests.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use time::OffsetDateTime;

use super::error::{StoreError, StoreResult};
use super::{TodoStore, TokenStore, UserStore};
use crate::auth::tokens::Token;
use crate::todos::repo_types::{NewTodo, Todo};
use crate::users::repo_types::{NewUser, User};
use crate::versioned::VersionedTable;

#[derive(Default)]
struct Inner {
    users: Vec<User>,
    todos: Vec<Todo>,
    tokens: Vec<(Vec<u8>, i64, OffsetDateTime)>,
    last_user_id: i64,
    last_todo_id: i64,
    fail_next: Option<StoreError>,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Locks and yields the injected failure, if any.
    fn enter(&self) -> StoreResult<MutexGuard<'_, Inner>> {
        let mut inner = self.lock();
        match inner.fail_next.take() {
            Some(e) => Err(e),
            None => Ok(inner),
        }
    }

    /// The next store call fails with `e`.
    pub fn fail_next_with(&self, e: StoreError) {
        self.lock().fail_next = Some(e);
    }

    pub fn todo(&self, id: i64) -> Option<Todo> {
        self.lock().todos.iter().find(|t| t.id == id).cloned()
    }

    pub fn todos_snapshot(&self) -> Vec<Todo> {
        self.lock().todos.clone()
    }

    pub fn tokens_snapshot(&self) -> Vec<(Vec<u8>, i64, OffsetDateTime)> {
        self.lock().tokens.clone()
    }

    /// Rewrites the expiry of every token owned by `user_id`.
    pub fn set_token_expiry(&self, user_id: i64, expiry: OffsetDateTime) {
        for token in self.lock().tokens.iter_mut().filter(|t| t.1 == user_id) {
            token.2 = expiry;
        }
    }
}

fn email_taken(users: &[User], email: &str, except: Option<i64>) -> bool {
    users
        .iter()
        .any(|u| u.email == email && Some(u.id) != except)
}

fn duplicate_email() -> StoreError {
    StoreError::DuplicateKey {
        constraint: "users_email_key".into(),
    }
}

#[async_trait]
impl VersionedTable<User> for MemoryStore {
    async fn insert(&self, draft: NewUser) -> StoreResult<User> {
        let mut inner = self.enter()?;
        if email_taken(&inner.users, &draft.email, None) {
            return Err(duplicate_email());
        }
        inner.last_user_id += 1;
        let user = User {
            id: inner.last_user_id,
            created_at: OffsetDateTime::now_utc(),
            name: draft.name,
            email: draft.email,
            password_hash: draft.password_hash,
            version: 1,
        };
        inner.users.push(user.clone());
        Ok(user)
    }

    async fn update_if_version(&self, record: &User) -> StoreResult<Option<i32>> {
        let mut inner = self.enter()?;
        // A stale version matches no row, so the unique index is never consulted.
        let Some(idx) = inner
            .users
            .iter()
            .position(|u| u.id == record.id && u.version == record.version)
        else {
            return Ok(None);
        };
        if email_taken(&inner.users, &record.email, Some(record.id)) {
            return Err(duplicate_email());
        }
        let row = &mut inner.users[idx];
        row.name = record.name.clone();
        row.email = record.email.clone();
        row.password_hash = record.password_hash.clone();
        row.version += 1;
        Ok(Some(row.version))
    }

    async fn delete_row(&self, id: i64) -> StoreResult<u64> {
        let mut inner = self.enter()?;
        let before = inner.users.len();
        inner.users.retain(|u| u.id != id);
        let removed = (before - inner.users.len()) as u64;
        if removed > 0 {
            inner.tokens.retain(|t| t.1 != id);
            inner.todos.retain(|t| t.user_id != id);
        }
        Ok(removed)
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn get_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let inner = self.enter()?;
        Ok(inner.users.iter().find(|u| u.email == email).cloned())
    }

    async fn get_for_token(&self, token_hash: &[u8]) -> StoreResult<Option<User>> {
        let inner = self.enter()?;
        let now = OffsetDateTime::now_utc();
        let owner = inner
            .tokens
            .iter()
            .find(|(hash, _, expiry)| hash.as_slice() == token_hash && *expiry > now)
            .map(|t| t.1);
        Ok(owner.and_then(|id| inner.users.iter().find(|u| u.id == id).cloned()))
    }
}

#[async_trait]
impl TokenStore for MemoryStore {
    async fn insert_token(&self, token: &Token) -> StoreResult<()> {
        let mut inner = self.enter()?;
        if inner.tokens.iter().any(|t| t.0 == token.hash) {
            return Err(StoreError::DuplicateKey {
                constraint: "tokens_pkey".into(),
            });
        }
        inner
            .tokens
            .push((token.hash.clone(), token.user_id, token.expiry));
        Ok(())
    }
}

#[async_trait]
impl VersionedTable<Todo> for MemoryStore {
    async fn insert(&self, draft: NewTodo) -> StoreResult<Todo> {
        let mut inner = self.enter()?;
        inner.last_todo_id += 1;
        let todo = Todo {
            id: inner.last_todo_id,
            created_at: OffsetDateTime::now_utc(),
            name: draft.name,
            description: draft.description,
            done: false,
            user_id: draft.user_id,
            version: 1,
        };
        inner.todos.push(todo.clone());
        Ok(todo)
    }

    async fn update_if_version(&self, record: &Todo) -> StoreResult<Option<i32>> {
        let mut inner = self.enter()?;
        let Some(row) = inner
            .todos
            .iter_mut()
            .find(|t| t.id == record.id && t.version == record.version)
        else {
            return Ok(None);
        };
        row.name = record.name.clone();
        row.description = record.description.clone();
        row.done = record.done;
        row.version += 1;
        Ok(Some(row.version))
    }

    async fn delete_row(&self, id: i64) -> StoreResult<u64> {
        let mut inner = self.enter()?;
        let before = inner.todos.len();
        inner.todos.retain(|t| t.id != id);
        Ok((before - inner.todos.len()) as u64)
    }
}

#[async_trait]
impl TodoStore for MemoryStore {
    async fn get_by_id(&self, id: i64) -> StoreResult<Todo> {
        let inner = self.enter()?;
        inner
            .todos
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn list_by_user(&self, user_id: i64) -> StoreResult<Vec<Todo>> {
        let inner = self.enter()?;
        let mut todos: Vec<Todo> = inner
            .todos
            .iter()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect();
        todos.sort_by_key(|t| t.id);
        Ok(todos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::versioned;

    fn draft(email: &str) -> NewUser {
        NewUser {
            name: "Someone".into(),
            email: email.into(),
            password_hash: "x".into(),
        }
    }

    #[tokio::test]
    async fn stale_version_wins_over_duplicate_email() {
        let store = MemoryStore::default();
        versioned::insert::<User, _>(&store, draft("taken@x.com"))
            .await
            .unwrap();
        let me = versioned::insert::<User, _>(&store, draft("me@x.com"))
            .await
            .unwrap();

        let mut renamed = me.clone();
        renamed.name = "Renamed".into();
        versioned::update(&store, renamed).await.unwrap();

        let mut stale = me;
        stale.email = "taken@x.com".into();
        let err = versioned::update(&store, stale).await.unwrap_err();
        assert!(matches!(err, StoreError::EditConflict));
    }

    #[tokio::test]
    async fn current_version_with_taken_email_is_duplicate() {
        let store = MemoryStore::default();
        versioned::insert::<User, _>(&store, draft("taken@x.com"))
            .await
            .unwrap();
        let mut me = versioned::insert::<User, _>(&store, draft("me@x.com"))
            .await
            .unwrap();

        me.email = "taken@x.com".into();
        let err = versioned::update(&store, me).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::DuplicateKey { ref constraint } if constraint == "users_email_key"
        ));
    }
}
