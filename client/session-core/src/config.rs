use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub api_base_url: String,
    pub auth_token: Option<String>,
    pub tick_interval_ms: u64,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        // Determine environment (defaults to dev)
        let env = env::var("APP_ENV").unwrap_or_else(|_| "dev".to_string());

        // Build configuration from config/*.toml + ENV overrides
        let config_builder = config::Config::builder()
            .add_source(
                config::File::with_name(&format!("config/{}", env)).required(false), // Allow missing config file, fallback to ENV
            )
            // Override with environment variables (prefix: APP_)
            .add_source(config::Environment::with_prefix("APP").separator("__"));

        let settings = config_builder.build()?;

        let api_base_url = settings
            .get_string("api.base_url")
            .or_else(|_| env::var("API_BASE_URL"))
            .unwrap_or_else(|_| "http://localhost:8080/api/v1".to_string());

        let auth_token = settings
            .get_string("api.auth_token")
            .or_else(|_| env::var("AUTH_TOKEN"))
            .ok()
            .filter(|token| !token.is_empty());

        let tick_interval_ms = settings
            .get_string("timer.tick_interval_ms")
            .or_else(|_| env::var("TICK_INTERVAL_MS"))
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|v| *v > 0)
            .unwrap_or(1000);

        Ok(Config {
            api_base_url,
            auth_token,
            tick_interval_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        env::remove_var("API_BASE_URL");
        env::remove_var("AUTH_TOKEN");
        env::remove_var("TICK_INTERVAL_MS");
    }

    #[test]
    #[serial]
    fn defaults_without_env() {
        clear_env();
        let config = Config::load().expect("config should load");
        assert_eq!(config.api_base_url, "http://localhost:8080/api/v1");
        assert!(config.auth_token.is_none());
        assert_eq!(config.tick_interval_ms, 1000);
    }

    #[test]
    #[serial]
    fn env_vars_override_defaults() {
        clear_env();
        env::set_var("API_BASE_URL", "https://api.prepdeck.example/api/v1");
        env::set_var("AUTH_TOKEN", "token-123");
        env::set_var("TICK_INTERVAL_MS", "50");

        let config = Config::load().expect("config should load");
        assert_eq!(config.api_base_url, "https://api.prepdeck.example/api/v1");
        assert_eq!(config.auth_token.as_deref(), Some("token-123"));
        assert_eq!(config.tick_interval_ms, 50);

        clear_env();
    }

    #[test]
    #[serial]
    fn invalid_tick_interval_falls_back() {
        clear_env();
        env::set_var("TICK_INTERVAL_MS", "0");
        let config = Config::load().expect("config should load");
        assert_eq!(config.tick_interval_ms, 1000);
        clear_env();
    }

    #[test]
    #[serial]
    fn empty_auth_token_is_treated_as_absent() {
        clear_env();
        env::set_var("AUTH_TOKEN", "");
        let config = Config::load().expect("config should load");
        assert!(config.auth_token.is_none());
        clear_env();
    }
}
