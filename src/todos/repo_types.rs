use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;

use crate::versioned::Versioned;

/// Todo record in the database.
#[derive(Debug, Clone, Serialize, FromRow, PartialEq, Eq)]
pub struct Todo {
    pub id: i64,
    #[serde(skip_serializing)]
    pub created_at: OffsetDateTime,
    pub name: String,
    pub description: String,
    pub done: bool,
    pub user_id: i64,
    pub version: i32,
}

#[derive(Debug, Clone)]
pub struct NewTodo {
    pub name: String,
    pub description: String,
    pub user_id: i64,
}

impl Versioned for Todo {
    const KIND: &'static str = "todo";
    type Draft = NewTodo;

    fn id(&self) -> i64 {
        self.id
    }

    fn version(&self) -> i32 {
        self.version
    }

    fn set_version(&mut self, version: i32) {
        self.version = version;
    }
}
