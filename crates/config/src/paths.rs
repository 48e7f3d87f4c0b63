//! Path utilities

use std::path::{Path, PathBuf};

/// nbpilot data directory (~/.nbpilot)
pub fn data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".nbpilot")
}

/// Config file location
pub fn config_path() -> PathBuf {
    data_dir().join("config.json")
}

/// Default workspace for the file tools
pub fn workspace_path() -> PathBuf {
    data_dir().join("workspace")
}

/// Expand a leading `~` to the home directory
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    } else if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

/// Ensure directory exists
pub async fn ensure_dir(path: &Path) -> std::io::Result<()> {
    tokio::fs::create_dir_all(path).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_path_is_inside_data_dir() {
        assert!(config_path().starts_with(data_dir()));
        assert!(config_path().ends_with("config.json"));
    }

    #[test]
    fn test_expand_home_relative_untouched() {
        assert_eq!(expand_home("relative/dir"), PathBuf::from("relative/dir"));
        assert_eq!(expand_home("/abs/dir"), PathBuf::from("/abs/dir"));
    }

    #[test]
    fn test_expand_home_tilde() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~/ws"), home.join("ws"));
            assert_eq!(expand_home("~"), home);
        }
    }
}
