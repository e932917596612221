//! `jsvalue.toml` configuration

use jv_resolve::ResolveOptions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name looked up by [`Config::discover`]
pub const CONFIG_FILE_NAME: &str = "jsvalue.toml";

/// Project configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Options of the resolution engine
    pub resolve: ResolveOptions,
}

/// Why a configuration file could not be loaded
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file exists but could not be read
    #[error("failed to read config file {}", path.display())]
    Read {
        /// Config file path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        error: io::Error,
    },
    /// The file is not valid configuration
    #[error("failed to parse config file {}", path.display())]
    Parse {
        /// Config file path
        path: PathBuf,
        /// Underlying TOML error
        #[source]
        error: toml::de::Error,
    },
}

impl Config {
    /// Load configuration from a file
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or is not valid TOML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|error| ConfigError::Read {
            path: path.to_path_buf(),
            error,
        })?;
        toml::from_str(&contents).map_err(|error| ConfigError::Parse {
            path: path.to_path_buf(),
            error,
        })
    }

    /// Find `jsvalue.toml` in `dir` or one of its ancestors and load it
    ///
    /// Returns the default configuration when no file exists.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a config file was found but could not be loaded.
    pub fn discover(dir: &Path) -> Result<(Self, Option<PathBuf>), ConfigError> {
        let found = dir
            .ancestors()
            .map(|ancestor| ancestor.join(CONFIG_FILE_NAME))
            .find(|candidate| candidate.is_file());
        match found {
            Some(path) => {
                tracing::debug!(path = %path.display(), "loading config");
                Ok((Self::from_file(&path)?, Some(path)))
            }
            None => Ok((Self::default(), None)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_sections_use_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());

        let config: Config = toml::from_str("[resolve]\nfollow-requires = false\n").unwrap();
        assert!(!config.resolve.follow_requires);
        assert_eq!(config.resolve.max_module_depth, None);
    }

    #[test]
    fn test_unknown_table_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "[resolver]\nfollow-requires = false\n").unwrap();
        let error = Config::from_file(&path).unwrap_err();
        assert!(matches!(error, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_discover_walks_ancestors() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[resolve]\nmax-module-depth = 2\n",
        )
        .unwrap();
        let nested = dir.path().join("src").join("lib");
        fs::create_dir_all(&nested).unwrap();

        let (config, path) = Config::discover(&nested).unwrap();
        assert_eq!(config.resolve.max_module_depth, Some(2));
        assert_eq!(path, Some(dir.path().join(CONFIG_FILE_NAME)));
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let error = Config::from_file(Path::new("/definitely/not/here/jsvalue.toml")).unwrap_err();
        assert!(matches!(error, ConfigError::Read { .. }));
    }
}
