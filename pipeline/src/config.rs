use std::env;

pub const OPENROUTER_API_KEY: &str = "OPENROUTER_API_KEY";
pub const GOOGLE_API_KEY: &str = "GOOGLE_API_KEY";

/// Credentials for the external capabilities.
///
/// Resolution precedence is "environment override beats file default":
/// `.env` supplies defaults for variables not already set, because
/// `dotenvy` never replaces an existing environment variable.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub openrouter_api_key: Option<String>,
    pub google_api_key: Option<String>,
}

impl Config {
    /// Load `.env` defaults (if present) and read the known keys.
    #[must_use]
    pub fn load() -> Self {
        dotenvy::dotenv().ok();
        Self::from_env()
    }

    /// Read the known keys from the current environment only.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            openrouter_api_key: non_empty_var(OPENROUTER_API_KEY),
            google_api_key: non_empty_var(GOOGLE_API_KEY),
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_keys_from_environment_and_skips_empty_values() {
        env::set_var(OPENROUTER_API_KEY, "test-key");
        env::set_var(GOOGLE_API_KEY, "");
        let config = Config::from_env();
        assert_eq!(config.openrouter_api_key.as_deref(), Some("test-key"));
        assert_eq!(config.google_api_key, None);
        env::remove_var(OPENROUTER_API_KEY);
        env::remove_var(GOOGLE_API_KEY);
    }
}

