//! Config directory resolution.

use std::path::PathBuf;

use anyhow::{Context, Result};

/// Resolves the config file path.
///
/// - If `dir` is `Some`, returns `{dir}/config.toml`.
/// - Otherwise returns `~/.config/moviedeck/config.toml`.
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined (when `dir` is `None`).
pub fn resolve_config_path(dir: Option<&PathBuf>) -> Result<PathBuf> {
    resolve_in_config_dir(dir, "config.toml")
}

/// Resolves the persisted session path (`session.toml` next to `config.toml`).
///
/// # Errors
///
/// Same as [`resolve_config_path`].
pub fn resolve_session_path(dir: Option<&PathBuf>) -> Result<PathBuf> {
    resolve_in_config_dir(dir, "session.toml")
}

fn resolve_in_config_dir(dir: Option<&PathBuf>, file_name: &str) -> Result<PathBuf> {
    if let Some(d) = dir {
        return Ok(d.join(file_name));
    }

    let home = std::env::var("HOME").context("HOME environment variable is not set")?;
    Ok(PathBuf::from(home)
        .join(".config")
        .join("moviedeck")
        .join(file_name))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_resolve_with_dir() {
        // Arrange
        let dir = PathBuf::from("/tmp/moviedeck-test");

        // Act
        let config = resolve_config_path(Some(&dir)).unwrap();
        let session = resolve_session_path(Some(&dir)).unwrap();

        // Assert
        assert_eq!(config, PathBuf::from("/tmp/moviedeck-test/config.toml"));
        assert_eq!(session, PathBuf::from("/tmp/moviedeck-test/session.toml"));
    }

    #[test]
    fn test_resolve_default() {
        // Arrange & Act
        let path = resolve_session_path(None).unwrap();

        // Assert
        assert!(path.ends_with(".config/moviedeck/session.toml"));
    }
}
