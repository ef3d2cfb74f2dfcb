//! Reading and writing the YAML config file
//!
//! The frontend never refuses to start over its config file: a missing file
//! means a fresh install and a broken one is reported, then ignored. Saving is
//! the explicit `--write-default-config` action, so its errors are returned.

use std::io::ErrorKind;
use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Parse `path`, or `None` if there is no file there
fn read_yaml<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e).with_context(|| format!("Cannot read {:?}", path)),
    };
    let value = serde_yaml::from_str(&text).with_context(|| format!("Cannot parse {:?}", path))?;
    Ok(Some(value))
}

/// Config stored at `path`, falling back to `T::default()`
///
/// Sections or keys the file leaves out take their defaults through
/// `#[serde(default)]` on the config types.
pub fn load_config<T>(path: &Path) -> T
where
    T: DeserializeOwned + Default,
{
    match read_yaml(path) {
        Ok(Some(config)) => {
            log::info!("Config: {:?}", path);
            config
        }
        Ok(None) => {
            log::info!("No config at {:?}, using built-in defaults", path);
            T::default()
        }
        Err(e) => {
            log::warn!("{:#}. Using built-in defaults.", e);
            T::default()
        }
    }
}

/// Write `config` to `path` as YAML
pub fn save_config<T: Serialize>(config: &T, path: &Path) -> Result<()> {
    let yaml = serde_yaml::to_string(config).context("Cannot serialize config")?;

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).with_context(|| format!("Cannot create {:?}", dir))?;
    }
    std::fs::write(path, yaml).with_context(|| format!("Cannot write {:?}", path))?;

    log::info!("Wrote config to {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FrontendConfig;

    #[test]
    fn test_missing_file_gives_defaults() {
        let config: FrontendConfig = load_config(Path::new("/nonexistent/path/config.yaml"));
        assert_eq!(config, FrontendConfig::default());
    }

    #[test]
    fn test_invalid_yaml_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.yaml");
        std::fs::write(&path, "audio: [not, a, map").unwrap();

        let config: FrontendConfig = load_config(&path);
        assert_eq!(config, FrontendConfig::default());
    }

    #[test]
    fn test_parse_error_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.yaml");
        std::fs::write(&path, "audio: [not, a, map").unwrap();

        let err = read_yaml::<FrontendConfig>(&path).unwrap_err();
        assert!(err.to_string().contains("broken.yaml"));
        assert!(read_yaml::<FrontendConfig>(&dir.path().join("absent.yaml"))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_save_then_load_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yaml");

        let mut config = FrontendConfig::default();
        config.audio.driver = "wav".to_string();
        config.audio.sync = false;
        config.video.fullscreen = true;

        save_config(&config, &path).unwrap();
        let loaded: FrontendConfig = load_config(&path);
        assert_eq!(loaded, config);
    }
}
