//! Shader directory listing

use std::path::{Path, PathBuf};

/// File extension picked up from the shader directory
pub const SHADER_EXTENSION: &str = "shader";

/// List the `.shader` files in `dir`, sorted by path
///
/// An empty `dir` means no shader directory is configured. A directory that
/// can't be read is logged and yields an empty listing.
pub fn list_shaders(dir: &Path) -> Vec<PathBuf> {
    if dir.as_os_str().is_empty() {
        return Vec::new();
    }

    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            log::warn!("Cannot read shader directory {:?}: {}", dir, e);
            return Vec::new();
        }
    };

    let mut shaders: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            path.extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case(SHADER_EXTENSION))
        })
        .collect();
    shaders.sort();

    for shader in &shaders {
        log::info!("Found shader {:?}", shader);
    }

    shaders
}
