//! Client configuration.
//!
//! The backend base URL is the one required environment value; a missing
//! or empty variable is a fatal startup error that enumerates every
//! missing name.

use thiserror::Error;

/// Environment variable carrying the backend base URL.
pub const BACKEND_URL_VAR: &str = "AHA_BACKEND_URL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variables: {}", .0.join(", "))]
    MissingEnv(Vec<String>),
}

/// Resolved application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    backend_url: String,
}

impl AppConfig {
    /// Build a config from an explicit base URL.
    pub fn new(backend_url: impl Into<String>) -> Self {
        Self {
            backend_url: backend_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Read the config from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the config through an injected lookup.
    ///
    /// Empty values count as missing, matching the fail-fast startup
    /// contract.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut missing = Vec::new();
        let backend_url = match lookup(BACKEND_URL_VAR) {
            Some(value) if !value.is_empty() => Some(value),
            _ => {
                missing.push(BACKEND_URL_VAR.to_string());
                None
            }
        };

        if !missing.is_empty() {
            return Err(ConfigError::MissingEnv(missing));
        }
        // `missing` is empty, so the value is present.
        Ok(Self::new(backend_url.unwrap_or_default()))
    }

    /// The backend base URL, without a trailing slash.
    pub fn backend_url(&self) -> &str {
        &self.backend_url
    }

    /// Absolute URL for a backend path (`path` starts with `/`).
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.backend_url, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_variable_is_enumerated() {
        let err = AppConfig::from_lookup(|_| None).unwrap_err();
        let ConfigError::MissingEnv(names) = err;
        assert_eq!(names, vec![BACKEND_URL_VAR.to_string()]);
    }

    #[test]
    fn missing_variable_message_names_it() {
        let err = AppConfig::from_lookup(|_| None).unwrap_err();
        assert!(err.to_string().contains("AHA_BACKEND_URL"));
    }

    #[test]
    fn empty_value_counts_as_missing() {
        let err = AppConfig::from_lookup(|_| Some(String::new())).unwrap_err();
        let ConfigError::MissingEnv(names) = err;
        assert_eq!(names.len(), 1);
    }

    #[test]
    fn present_value_resolves() {
        let config =
            AppConfig::from_lookup(|_| Some("http://localhost:4000".to_string())).unwrap();
        assert_eq!(config.backend_url(), "http://localhost:4000");
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let config = AppConfig::new("http://localhost:4000/");
        assert_eq!(config.backend_url(), "http://localhost:4000");
        assert_eq!(
            config.endpoint("/user/login"),
            "http://localhost:4000/user/login"
        );
    }
}
