use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Caresignal";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default tracing filter when RUST_LOG is not set.
pub fn default_log_filter() -> String {
    format!("{}=info", env!("CARGO_PKG_NAME"))
}

/// Get the application data directory (`~/Caresignal/`).
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("Caresignal")
}

/// Default path of the SQLite store.
pub fn database_path() -> PathBuf {
    app_data_dir().join("caresignal.db")
}

/// Timeout budget for a single model-provider call, in seconds.
pub fn model_timeout_secs() -> u64 {
    env_u64("CARESIGNAL_MODEL_TIMEOUT_SECS", 30)
}

/// Trailing window bounding HIGH-level alert frequency per user, in hours.
/// CRITICAL alerts are exempt from the window.
pub fn rate_limit_window_hours() -> i64 {
    env_u64("CARESIGNAL_RATE_LIMIT_WINDOW_HOURS", 24) as i64
}

/// OpenRouter chat-completions endpoint base URL.
pub fn openrouter_base_url() -> String {
    std::env::var("CARESIGNAL_OPENROUTER_BASE_URL")
        .unwrap_or_else(|_| "https://openrouter.ai/api/v1".to_string())
}

/// OpenRouter API key. Empty when unset — the client reports a
/// configuration error rather than sending an unauthenticated request.
pub fn openrouter_api_key() -> String {
    std::env::var("CARESIGNAL_OPENROUTER_API_KEY").unwrap_or_default()
}

/// Model identifier sent to the provider.
pub fn openrouter_model() -> String {
    std::env::var("CARESIGNAL_OPENROUTER_MODEL")
        .unwrap_or_else(|_| "openai/gpt-4o-mini".to_string())
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_data_dir_under_home() {
        let dir = app_data_dir();
        let home = dirs::home_dir().unwrap();
        assert!(dir.starts_with(home));
        assert!(dir.ends_with("Caresignal"));
    }

    #[test]
    fn database_path_under_app_data() {
        let db = database_path();
        assert!(db.starts_with(app_data_dir()));
        assert!(db.ends_with("caresignal.db"));
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.1.0");
    }

    #[test]
    fn defaults_without_env() {
        assert_eq!(env_u64("CARESIGNAL_NO_SUCH_VAR", 30), 30);
    }

    #[test]
    fn default_filter_targets_crate() {
        assert!(default_log_filter().starts_with("caresignal"));
    }
}
