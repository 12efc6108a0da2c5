use std::env;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct Config {
    pub mongo_conn_string: String,
    pub mongo_db_name: String,
    pub web_server_host: String,
    pub web_server_port: u16,
    /// Cadence of the background answer flush for an open attempt.
    pub autosave_interval_secs: u64,
    /// Cadence of the countdown tick driving the deadline check.
    pub countdown_tick_millis: u64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            mongo_conn_string: env::var("MONGO_CONN_STRING")
                .unwrap_or_else(|_| "mongodb://localhost:27017".to_string()),
            mongo_db_name: env::var("MONGO_DB_NAME").unwrap_or_else(|_| "cbt-local".to_string()),
            web_server_host: env::var("WEB_SERVER_HOST")
                .unwrap_or_else(|_| "localhost".to_string()),
            web_server_port: env::var("WEB_SERVER_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            autosave_interval_secs: env::var("AUTOSAVE_INTERVAL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
            countdown_tick_millis: env::var("COUNTDOWN_TICK_MILLIS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1000),
        }
    }

    pub fn autosave_interval(&self) -> Duration {
        Duration::from_secs(self.autosave_interval_secs.max(1))
    }

    pub fn countdown_tick(&self) -> Duration {
        Duration::from_millis(self.countdown_tick_millis.max(10))
    }

    #[cfg(test)]
    pub fn test_config() -> Self {
        Self {
            mongo_conn_string: "mongodb://localhost:27017".to_string(),
            mongo_db_name: "cbt-test".to_string(),
            web_server_host: "127.0.0.1".to_string(),
            web_server_port: 8080,
            autosave_interval_secs: 1,
            countdown_tick_millis: 20,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env_with_defaults() {
        let config = Config::from_env();

        // Should use env vars if set, or fall back to defaults
        assert!(!config.mongo_conn_string.is_empty());
        assert!(!config.mongo_db_name.is_empty());
        assert!(config.autosave_interval_secs > 0);
        assert!(config.countdown_tick_millis > 0);
    }

    #[test]
    fn test_test_config() {
        let config = Config::test_config();

        assert_eq!(config.mongo_conn_string, "mongodb://localhost:27017");
        assert_eq!(config.mongo_db_name, "cbt-test");
        assert_eq!(config.autosave_interval(), Duration::from_secs(1));
        assert_eq!(config.countdown_tick(), Duration::from_millis(20));
    }

    #[test]
    fn test_intervals_are_clamped() {
        let mut config = Config::test_config();
        config.autosave_interval_secs = 0;
        config.countdown_tick_millis = 0;

        assert_eq!(config.autosave_interval(), Duration::from_secs(1));
        assert_eq!(config.countdown_tick(), Duration::from_millis(10));
    }
}
