use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer};

use crate::model::{Priority, TodoInput, ValidationError};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateTodo {
    #[serde(default, deserialize_with = "non_null")]
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "non_null")]
    pub priority: Option<String>,
    #[serde(default, deserialize_with = "non_null")]
    pub completed: Option<bool>,
    // Server-assigned fields a client may echo back; accepted and discarded.
    #[serde(rename = "id")]
    _id: Option<IgnoredAny>,
    #[serde(rename = "createdAt")]
    _created_at: Option<IgnoredAny>,
    #[serde(rename = "updatedAt")]
    _updated_at: Option<IgnoredAny>,
}

/// Full replacement: everything but `description` must be present, and a
/// missing `description` clears it.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateTodo {
    #[serde(default, deserialize_with = "non_null")]
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "non_null")]
    pub priority: Option<String>,
    #[serde(default, deserialize_with = "non_null")]
    pub completed: Option<bool>,
    // Server-assigned fields a client may echo back; accepted and discarded.
    #[serde(rename = "id")]
    _id: Option<IgnoredAny>,
    #[serde(rename = "createdAt")]
    _created_at: Option<IgnoredAny>,
    #[serde(rename = "updatedAt")]
    _updated_at: Option<IgnoredAny>,
}

/// An absent field stays `None`, but an explicit `null` is a type error
/// instead of falling back to the default.
fn non_null<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl CreateTodo {
    pub fn into_input(self) -> Result<TodoInput, ValidationError> {
        let title = self.title.ok_or(ValidationError::Missing { field: "title" })?;
        let priority = match self.priority {
            Some(raw) => raw.parse()?,
            None => Priority::default(),
        };

        TodoInput::new(
            &title,
            self.description,
            priority,
            self.completed.unwrap_or(false),
        )
    }
}

impl UpdateTodo {
    pub fn into_input(self) -> Result<TodoInput, ValidationError> {
        let title = self.title.ok_or(ValidationError::Missing { field: "title" })?;
        let priority = self
            .priority
            .ok_or(ValidationError::Missing { field: "priority" })?
            .parse()?;
        let completed = self
            .completed
            .ok_or(ValidationError::Missing { field: "completed" })?;

        TodoInput::new(&title, self.description, priority, completed)
    }
}
