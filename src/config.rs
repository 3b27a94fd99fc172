use crate::error::{config::ConfigError, AppError};

const REDIS_URL_VAR: &str = "REDIS_URL";
const PRUNE_ON_STARTUP_VAR: &str = "PRUNE_ON_STARTUP";

pub struct Config {
    pub redis_url: String,

    /// Remove dangling IDs from the global listings before serving.
    pub prune_on_startup: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        Ok(Self {
            redis_url: std::env::var(REDIS_URL_VAR)
                .map_err(|_| ConfigError::MissingEnvVar(REDIS_URL_VAR.to_string()))?,
            prune_on_startup: parse_flag(
                PRUNE_ON_STARTUP_VAR,
                std::env::var(PRUNE_ON_STARTUP_VAR).ok(),
            )?,
        })
    }
}

/// Parses an optional boolean flag; an unset variable means `false`.
fn parse_flag(name: &str, value: Option<String>) -> Result<bool, ConfigError> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(false),
        Some(raw) => match raw.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::InvalidEnvVar {
                name: name.to_string(),
                value: raw.to_string(),
            }),
        },
    }
}
