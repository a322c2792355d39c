//! Server settings read from a TOML file
//!
//! ```toml
//! addr = "0.0.0.0:8080"
//! data = "./shifts.json"
//! admin-password = "hunter2"
//! log = "shiftboard=debug,info"
//! ```

use miette::Diagnostic;
use serde::Deserialize;
use std::{
    net::SocketAddr,
    path::{Path, PathBuf},
};
use thiserror::Error;

/// Error while loading a [`Config`].
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("could not read config `{}`", path.display())]
    #[diagnostic(help("make sure the file exists and can be read"))]
    Io {
        /// Config location
        path: PathBuf,
        /// Underlying failure
        #[source]
        source: std::io::Error,
    },

    /// The file is not a valid config.
    #[error("config `{}` is invalid", path.display())]
    #[diagnostic(help("recognized keys are `addr`, `data`, `admin-password`, and `log`"))]
    Parse {
        /// Config location
        path: PathBuf,
        /// Underlying failure
        #[source]
        source: toml::de::Error,
    },
}

/// Resolved server settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    /// Address the HTTP server listens on
    pub addr: SocketAddr,

    /// Snapshot file. [`None`] keeps everything in memory.
    pub data: Option<PathBuf>,

    /// Password required for administrative requests. [`None`] disables the check.
    pub admin_password: Option<String>,

    /// Log filter directives, used when `RUST_LOG` is not set
    pub log: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            data: None,
            admin_password: None,
            log: "info".to_string(),
        }
    }
}

impl std::str::FromStr for Config {
    type Err = toml::de::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        toml::from_str(s)
    }
}

impl Config {
    /// Read the config file at `path`, or the defaults when there is none.
    ///
    /// Keys missing from the file keep their default.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or is not a valid config.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        text.parse().map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// An empty admin password is the same as none.
    pub fn admin_password(&self) -> Option<&str> {
        self.admin_password.as_deref().filter(|password| !password.is_empty())
    }
}
