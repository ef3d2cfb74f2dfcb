//! Standard locations for emufront files

use std::path::PathBuf;

/// Directory holding emufront's configuration
///
/// Returns: `<config dir>/emufront`, falling back to `./emufront` when the
/// platform has no config directory.
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("emufront")
}

/// Default config file path: `<config dir>/emufront/config.yaml`
pub fn default_config_path() -> PathBuf {
    default_config_dir().join("config.yaml")
}
