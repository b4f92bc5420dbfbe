use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::{StoreError, TodoStore};
use crate::model::{Priority, Todo, TodoInput};

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS todos (
        id BIGSERIAL PRIMARY KEY,
        title VARCHAR(255) NOT NULL,
        description TEXT,
        priority TEXT NOT NULL DEFAULT 'MEDIUM'
            CHECK (priority IN ('LOW', 'MEDIUM', 'HIGH')),
        completed BOOLEAN NOT NULL DEFAULT FALSE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
"#;

const CREATE_INDEX: &str = r#"
    CREATE INDEX IF NOT EXISTS todos_created_at_idx ON todos (created_at DESC)
"#;

#[derive(Debug, sqlx::FromRow)]
struct TodoRow {
    id: i64,
    title: String,
    description: Option<String>,
    priority: String,
    completed: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TodoRow> for Todo {
    type Error = StoreError;

    fn try_from(row: TodoRow) -> Result<Self, Self::Error> {
        let priority = row.priority.parse::<Priority>().map_err(|e| StoreError::CorruptRow {
            id: row.id,
            reason: format!("{}", e),
        })?;

        Ok(Todo {
            id: row.id,
            title: row.title,
            description: row.description,
            priority,
            completed: row.completed,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Postgres-backed store. Each call borrows a connection from the pool for
/// the duration of one statement.
#[derive(Clone)]
pub struct PgTodoStore {
    pool: PgPool,
}

impl PgTodoStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TodoStore for PgTodoStore {
    async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
        sqlx::query(CREATE_INDEX).execute(&self.pool).await?;

        tracing::info!("todos table is ready");
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Todo>, StoreError> {
        let rows = sqlx::query_as::<_, TodoRow>(
            r#"
            SELECT id, title, description, priority, completed, created_at, updated_at
            FROM todos
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Todo::try_from).collect()
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Todo>, StoreError> {
        let row = sqlx::query_as::<_, TodoRow>(
            r#"
            SELECT id, title, description, priority, completed, created_at, updated_at
            FROM todos
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Todo::try_from).transpose()
    }

    async fn create(&self, input: &TodoInput) -> Result<Todo, StoreError> {
        let row = sqlx::query_as::<_, TodoRow>(
            r#"
            INSERT INTO todos (title, description, priority, completed)
            VALUES ($1, $2, $3, $4)
            RETURNING id, title, description, priority, completed, created_at, updated_at
            "#,
        )
        .bind(input.title())
        .bind(input.description())
        .bind(input.priority().as_str())
        .bind(input.completed())
        .fetch_one(&self.pool)
        .await?;

        Todo::try_from(row)
    }

    async fn update(&self, id: i64, input: &TodoInput) -> Result<Option<Todo>, StoreError> {
        // NOW() is the transaction start time, so bump past the previous
        // stamp to keep updated_at strictly increasing.
        let row = sqlx::query_as::<_, TodoRow>(
            r#"
            UPDATE todos
            SET
                title = $2,
                description = $3,
                priority = $4,
                completed = $5,
                updated_at = GREATEST(NOW(), updated_at + INTERVAL '1 microsecond')
            WHERE id = $1
            RETURNING id, title, description, priority, completed, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(input.title())
        .bind(input.description())
        .bind(input.priority().as_str())
        .bind(input.completed())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Todo::try_from).transpose()
    }

    async fn delete_by_id(&self, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            DELETE FROM todos
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// These run against a real database: `TEST_DATABASE_URL=... cargo test -- --ignored`.
#[cfg(test)]
mod tests {
    use super::*;

    async fn test_store() -> PgTodoStore {
        let url = std::env::var("TEST_DATABASE_URL").expect("TEST_DATABASE_URL missing");
        let pool = PgPool::connect(&url).await.expect("Error connecting DB");
        let store = PgTodoStore::new(pool);
        store.ensure_schema().await.expect("schema");
        store
    }

    #[tokio::test]
    #[ignore = "needs TEST_DATABASE_URL pointing at a Postgres database"]
    async fn test_ensure_schema_is_idempotent() {
        let store = test_store().await;

        store.ensure_schema().await.unwrap();
        store.ping().await.unwrap();
    }

    #[tokio::test]
    #[ignore = "needs TEST_DATABASE_URL pointing at a Postgres database"]
    async fn test_crud_round() {
        let store = test_store().await;

        let input = TodoInput::new("Buy milk", None, Priority::default(), false).unwrap();
        let created = store.create(&input).await.unwrap();
        assert!(created.id > 0);
        assert_eq!(created.priority, Priority::Medium);
        assert_eq!(created.created_at, created.updated_at);

        let fetched = store.get_by_id(created.id).await.unwrap();
        assert_eq!(fetched.as_ref(), Some(&created));

        let replacement =
            TodoInput::new("Buy oat milk", Some("2L".into()), Priority::High, true).unwrap();
        let updated = store.update(created.id, &replacement).await.unwrap().unwrap();
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at > created.updated_at);
        assert_eq!(updated.description.as_deref(), Some("2L"));

        assert!(store.delete_by_id(created.id).await.unwrap());
        assert!(!store.delete_by_id(created.id).await.unwrap());
        assert!(store.update(created.id, &replacement).await.unwrap().is_none());
        assert!(store.get_by_id(created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    #[ignore = "needs TEST_DATABASE_URL pointing at a Postgres database"]
    async fn test_list_is_newest_first() {
        let store = test_store().await;

        let mut ids = Vec::new();
        for title in ["first", "second", "third"] {
            let input = TodoInput::new(title, None, Priority::Low, false).unwrap();
            ids.push(store.create(&input).await.unwrap().id);
        }

        let listed: Vec<i64> = store
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.id)
            .filter(|id| ids.contains(id))
            .collect();
        ids.reverse();
        assert_eq!(listed, ids);

        for id in ids {
            store.delete_by_id(id).await.unwrap();
        }
    }
}
