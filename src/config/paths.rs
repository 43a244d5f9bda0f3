//! Configuration path resolution

use std::path::PathBuf;

const APP_NAME: &str = "kube-topology";

/// Get the configuration directory path
///
/// Checks KUBE_TOPOLOGY_CONFIG_DIR first, then the platform configuration
/// directory (`$XDG_CONFIG_HOME` or `~/.config` on Linux, the Known Folder
/// location on Windows).
pub fn config_dir() -> PathBuf {
    match std::env::var("KUBE_TOPOLOGY_CONFIG_DIR") {
        Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => directories::BaseDirs::new()
            .map(|dirs| dirs.config_dir().join(APP_NAME))
            .unwrap_or_else(|| PathBuf::from(".config").join(APP_NAME)),
    }
}

/// Get the root configuration file path
pub fn root_config_path() -> PathBuf {
    config_dir().join("config.yaml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_config_path() {
        let path = root_config_path();
        assert!(path.ends_with("config.yaml"));
        assert!(path.parent().and_then(|dir| dir.file_name()).is_some());
    }
}
