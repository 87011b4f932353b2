use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "MediAssist";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default base URL of the companion MediAssist API.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000";

/// Base URL of the companion API, overridable via `MEDIASSIST_API_URL`.
pub fn api_base_url() -> String {
    std::env::var("MEDIASSIST_API_URL")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
}

/// Get the application data directory
/// ~/MediAssist/ on all platforms (user-visible, per design requirement)
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("MediAssist")
}

/// Path of the persisted session file (token, cached profile, handoff keys).
pub fn session_file() -> PathBuf {
    app_data_dir().join("session.json")
}

/// Default tracing filter when `RUST_LOG` is unset.
pub fn default_log_filter() -> String {
    "info,mediassist=debug".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_data_dir_under_home() {
        let dir = app_data_dir();
        let home = dirs::home_dir().unwrap();
        assert!(dir.starts_with(home));
        assert!(dir.ends_with("MediAssist"));
    }

    #[test]
    fn session_file_under_app_data() {
        let file = session_file();
        assert!(file.starts_with(app_data_dir()));
        assert!(file.ends_with("session.json"));
    }

    #[test]
    fn app_name_is_mediassist() {
        assert_eq!(APP_NAME, "MediAssist");
    }

    #[test]
    fn default_base_url_is_local() {
        assert!(DEFAULT_API_BASE_URL.contains("localhost"));
    }
}
