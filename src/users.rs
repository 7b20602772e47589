//! In-memory user records.

use serde::{Deserialize, Serialize};
use std::sync::RwLock;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub age: u32,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UserError {
    #[error("User not found: {0}")]
    NotFound(u64),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub const MIN_AGE: u32 = 1;
pub const MAX_AGE: u32 = 150;

/// User persistence used by the HTTP layer.
pub trait UserStore: Send + Sync {
    fn list_all(&self) -> Vec<User>;
    fn get_by_id(&self, id: u64) -> Result<User, UserError>;
    fn create(&self, name: &str, age: u32) -> Result<User, UserError>;
}

#[derive(Debug)]
struct Inner {
    users: Vec<User>,
    next_id: u64,
}

#[derive(Debug)]
pub struct InMemoryUserStore {
    inner: RwLock<Inner>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                users: Vec::new(),
                next_id: 1,
            }),
        }
    }

    /// Store preloaded with three demo records, ids 1..=3.
    pub fn seeded() -> Self {
        let users = vec![
            User {
                id: 1,
                name: "Zhang San".to_string(),
                age: 25,
            },
            User {
                id: 2,
                name: "Li Si".to_string(),
                age: 30,
            },
            User {
                id: 3,
                name: "Wang Wu".to_string(),
                age: 28,
            },
        ];
        Self {
            inner: RwLock::new(Inner { users, next_id: 4 }),
        }
    }
}

impl Default for InMemoryUserStore {
    fn default() -> Self {
        Self::new()
    }
}

impl UserStore for InMemoryUserStore {
    fn list_all(&self) -> Vec<User> {
        let inner = self.inner.read().unwrap_or_else(|p| p.into_inner());
        inner.users.clone()
    }

    fn get_by_id(&self, id: u64) -> Result<User, UserError> {
        let inner = self.inner.read().unwrap_or_else(|p| p.into_inner());
        inner
            .users
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or(UserError::NotFound(id))
    }

    fn create(&self, name: &str, age: u32) -> Result<User, UserError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(UserError::InvalidInput("name is required".to_string()));
        }
        if !(MIN_AGE..=MAX_AGE).contains(&age) {
            return Err(UserError::InvalidInput(format!(
                "age must be between {} and {}",
                MIN_AGE, MAX_AGE
            )));
        }

        let mut inner = self.inner.write().unwrap_or_else(|p| p.into_inner());
        let user = User {
            id: inner.next_id,
            name: name.to_string(),
            age,
        };
        inner.next_id += 1;
        inner.users.push(user.clone());
        Ok(user)
    }
}
