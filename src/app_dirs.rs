use directories::ProjectDirs;
use std::path::PathBuf;

const APP_NAME: &str = "calcpad";

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    pub fn config_path() -> PathBuf {
        ProjectDirs::from("", "", APP_NAME)
            .map(|pd| pd.config_dir().join("config.json"))
            .unwrap_or_else(|| PathBuf::from("calcpad_config.json"))
    }

    pub fn log_path() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            let state_dir = PathBuf::from(home)
                .join(".local")
                .join("state")
                .join(APP_NAME);
            Some(state_dir.join("calcpad.log"))
        } else {
            ProjectDirs::from("", "", APP_NAME)
                .map(|proj_dirs| proj_dirs.data_local_dir().join("calcpad.log"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_file_is_json() {
        assert_eq!(
            AppDirs::config_path().extension().and_then(|e| e.to_str()),
            Some("json")
        );
    }

    #[test]
    fn log_file_name() {
        if let Some(path) = AppDirs::log_path() {
            assert!(path.ends_with("calcpad.log"));
        }
    }
}
