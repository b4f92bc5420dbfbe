//! Persistence for todos.
//!
//! Handlers only talk to [`TodoStore`]; the process picks Postgres or the
//! in-memory store at startup and shares it through `AppState`.

mod memory;
mod postgres;

use async_trait::async_trait;

use crate::model::{Todo, TodoInput};

pub use memory::MemoryTodoStore;
pub use postgres::PgTodoStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("todo {id} has an unreadable row: {reason}")]
    CorruptRow { id: i64, reason: String },
}

/// Absence is `Ok(None)` / `Ok(false)`, never an error.
#[async_trait]
pub trait TodoStore: Send + Sync + 'static {
    /// Idempotently creates the table and its index.
    async fn ensure_schema(&self) -> Result<(), StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;

    /// All todos, newest first.
    async fn list_all(&self) -> Result<Vec<Todo>, StoreError>;

    async fn get_by_id(&self, id: i64) -> Result<Option<Todo>, StoreError>;

    async fn create(&self, input: &TodoInput) -> Result<Todo, StoreError>;

    /// Full replacement of the mutable fields. Never inserts.
    async fn update(&self, id: i64, input: &TodoInput) -> Result<Option<Todo>, StoreError>;

    async fn delete_by_id(&self, id: i64) -> Result<bool, StoreError>;
}
