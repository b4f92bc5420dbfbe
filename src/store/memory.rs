use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tokio::sync::RwLock;

use super::{StoreError, TodoStore};
use crate::model::{Todo, TodoInput};

/// Process-local store with the same observable behaviour as
/// [`super::PgTodoStore`]: ids are never reused and `updated_at` only moves
/// forward. Contents are lost on restart.
#[derive(Default)]
pub struct MemoryTodoStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    last_id: i64,
    todos: BTreeMap<i64, Todo>,
}

impl MemoryTodoStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TodoStore for MemoryTodoStore {
    async fn ensure_schema(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Todo>, StoreError> {
        let inner = self.inner.read().await;

        let mut todos: Vec<Todo> = inner.todos.values().cloned().collect();
        todos.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });

        Ok(todos)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Todo>, StoreError> {
        Ok(self.inner.read().await.todos.get(&id).cloned())
    }

    async fn create(&self, input: &TodoInput) -> Result<Todo, StoreError> {
        let mut inner = self.inner.write().await;

        inner.last_id += 1;
        let now = Utc::now();
        let todo = Todo {
            id: inner.last_id,
            title: input.title().to_string(),
            description: input.description().map(str::to_string),
            priority: input.priority(),
            completed: input.completed(),
            created_at: now,
            updated_at: now,
        };
        inner.todos.insert(todo.id, todo.clone());

        Ok(todo)
    }

    async fn update(&self, id: i64, input: &TodoInput) -> Result<Option<Todo>, StoreError> {
        let mut inner = self.inner.write().await;

        let Some(todo) = inner.todos.get_mut(&id) else {
            return Ok(None);
        };

        todo.title = input.title().to_string();
        todo.description = input.description().map(str::to_string);
        todo.priority = input.priority();
        todo.completed = input.completed();
        todo.updated_at = Utc::now().max(todo.updated_at + Duration::microseconds(1));

        Ok(Some(todo.clone()))
    }

    async fn delete_by_id(&self, id: i64) -> Result<bool, StoreError> {
        Ok(self.inner.write().await.todos.remove(&id).is_some())
    }
}
