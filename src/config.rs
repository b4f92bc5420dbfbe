use dotenvy::dotenv;
use std::env;
use std::str::FromStr;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} missing, it is required")]
    Missing(&'static str),
    #[error("{name} has an invalid value '{value}': {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: &'static str,
    },
}

/// Which persistence backend serves requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Postgres,
    Memory,
}

impl FromStr for StoreKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StoreKind::Postgres),
            "memory" => Ok(StoreKind::Memory),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub store: StoreKind,
    pub database_url: Option<String>,
    pub max_connections: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();

        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the config from any variable source so it can be tested
    /// without touching the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string());

        let port = match lookup("PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                value: raw.clone(),
                reason: "must be a valid u16 number",
            })?,
            None => 8080,
        };

        let store = match lookup("TODO_STORE") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                name: "TODO_STORE",
                value: raw.clone(),
                reason: "must be 'postgres' or 'memory'",
            })?,
            None => StoreKind::Postgres,
        };

        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());
        if store == StoreKind::Postgres && database_url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }

        let max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(n) if n >= 1 => n,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "DATABASE_MAX_CONNECTIONS",
                        value: raw,
                        reason: "must be a positive integer",
                    })
                }
            },
            None => 5,
        };

        Ok(Self {
            host,
            port,
            store,
            database_url,
            max_connections,
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
