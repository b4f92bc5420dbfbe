use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;

pub const TITLE_MAX_LEN: usize = 255;

// MODELS

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: i64,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub priority: Priority,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "LOW",
            Priority::Medium => "MEDIUM",
            Priority::High => "HIGH",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = ValidationError;

    /// Case-insensitive; the stored form is always upper case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LOW" => Ok(Priority::Low),
            "MEDIUM" => Ok(Priority::Medium),
            "HIGH" => Ok(Priority::High),
            _ => Err(ValidationError::InvalidVariant {
                field: "priority",
                value: s.to_string(),
            }),
        }
    }
}

/// The mutable fields of a todo, already validated.
///
/// Only constructible through [`TodoInput::new`], so a store never sees an
/// empty or oversized title.
#[derive(Debug, Clone, PartialEq)]
pub struct TodoInput {
    title: String,
    description: Option<String>,
    priority: Priority,
    completed: bool,
}

impl TodoInput {
    pub fn new(
        title: &str,
        description: Option<String>,
        priority: Priority,
        completed: bool,
    ) -> Result<Self, ValidationError> {
        let title = validate_title(title)?;
        if let Some(description) = &description {
            reject_nul("description", description)?;
        }

        Ok(Self {
            title,
            description,
            priority,
            completed,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn completed(&self) -> bool {
        self.completed
    }
}

// ERRORS

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Missing { field: &'static str },

    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    #[error("{field} is too long (Max: {max} characters)")]
    TooLong { field: &'static str, max: usize },

    #[error("{field} cannot contain NUL characters")]
    InvalidChar { field: &'static str },

    #[error("invalid {field} '{value}', must be one of: LOW, MEDIUM, HIGH")]
    InvalidVariant { field: &'static str, value: String },

    #[error("todo id '{0}' is not a valid integer")]
    MalformedId(String),

    #[error("invalid request body: {0}")]
    MalformedBody(String),
}

// HELPER FUNCTIONS

/// Postgres text columns cannot hold 0x00.
fn reject_nul(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.contains('\0') {
        return Err(ValidationError::InvalidChar { field });
    }

    Ok(())
}

/// Trims the title and checks it is non-empty, storable and within the
/// column size.
pub fn validate_title(title: &str) -> Result<String, ValidationError> {
    let title = title.trim();
    reject_nul("title", title)?;

    if title.is_empty() {
        return Err(ValidationError::Empty { field: "title" });
    }

    if title.chars().count() > TITLE_MAX_LEN {
        return Err(ValidationError::TooLong {
            field: "title",
            max: TITLE_MAX_LEN,
        });
    }

    Ok(title.to_string())
}

pub fn parse_id(raw: &str) -> Result<i64, ValidationError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| ValidationError::MalformedId(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_parsing() {
        assert_eq!("LOW".parse::<Priority>().unwrap(), Priority::Low);
        assert_eq!("medium".parse::<Priority>().unwrap(), Priority::Medium);
        assert_eq!(" High ".parse::<Priority>().unwrap(), Priority::High);

        let err = "URGENT".parse::<Priority>().unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidVariant {
                field: "priority",
                value: "URGENT".to_string()
            }
        );
        assert!("".parse::<Priority>().is_err());
    }

    #[test]
    fn test_priority_defaults_to_medium() {
        assert_eq!(Priority::default(), Priority::Medium);
    }

    #[test]
    fn test_validate_title() {
        assert_eq!(validate_title("  Buy milk ").unwrap(), "Buy milk");

        assert_eq!(
            validate_title("   ").unwrap_err(),
            ValidationError::Empty { field: "title" }
        );
        assert!(validate_title(&"a".repeat(TITLE_MAX_LEN)).is_ok());
        assert!(validate_title(&"a".repeat(TITLE_MAX_LEN + 1)).is_err());
        assert_eq!(
            validate_title("a\0b").unwrap_err(),
            ValidationError::InvalidChar { field: "title" }
        );
    }

    #[test]
    fn test_input_rejects_nul_in_description() {
        let err = TodoInput::new("Buy milk", Some("2\0L".to_string()), Priority::Low, false)
            .unwrap_err();
        assert_eq!(err, ValidationError::InvalidChar { field: "description" });

        assert!(TodoInput::new("Buy milk", Some("2L".to_string()), Priority::Low, false).is_ok());
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("42").unwrap(), 42);
        assert!(parse_id("abc").is_err());
        assert!(parse_id("4.2").is_err());
        assert!(parse_id("").is_err());
    }

    #[test]
    fn test_todo_serializes_camel_case() {
        let now = Utc::now();
        let todo = Todo {
            id: 7,
            title: "Buy milk".to_string(),
            description: None,
            priority: Priority::High,
            completed: false,
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_value(&todo).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["priority"], "HIGH");
        assert!(json.get("createdAt").is_some());
        assert!(json.get("updatedAt").is_some());
        assert!(json.get("description").is_none());
    }
}
