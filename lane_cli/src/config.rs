//! CLI configuration, read from a TOML file.
//!
//! Every key is optional; anything left out falls back to [`Config::default`].
//!
//! ```toml
//! log_level = "debug"
//! log_file = "strikepath.log"
//! roster_path = "/home/jess/bowling/roster.strk"
//! share_base_url = "https://strikepath.app/"
//! user_id = "jess"
//! ```

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::Context;
use lane_core::file_io::ROSTER_EXTENSION;
use serde::{Deserialize, Serialize};

/// Config file looked for in the working directory when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "strikepath.toml";

/// Default log destination; logging stays off while it is in place
#[cfg(windows)]
pub const DEFAULT_LOG_FILE: &str = "NUL";
#[cfg(not(windows))]
pub const DEFAULT_LOG_FILE: &str = "/dev/null";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_level: String,
    pub log_file: String,
    pub roster_path: PathBuf,
    pub share_base_url: String,
    /// Recorded in the roster lock file; defaults to the OS user name
    pub user_id: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            log_level: "info".to_string(),
            log_file: DEFAULT_LOG_FILE.to_string(),
            roster_path: PathBuf::from(format!("roster.{}", ROSTER_EXTENSION)),
            share_base_url: "https://strikepath.app/".to_string(),
            user_id: None,
        }
    }
}

impl Config {
    /// User id for the roster lock
    pub fn user_id(&self) -> String {
        self.user_id.clone().unwrap_or_else(whoami::username)
    }
}

/// Read the config file.
///
/// An explicitly given file must exist. The default file is optional.
pub fn read(path: Option<&Path>) -> anyhow::Result<Config> {
    let (path, required) = match path {
        Some(p) => (p.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
    };

    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound && !required => return Ok(Config::default()),
        Err(e) => {
            return Err(e).with_context(|| format!("reading config file {}", path.display()));
        }
    };

    parse(&content).with_context(|| format!("parsing config file {}", path.display()))
}

fn parse(content: &str) -> anyhow::Result<Config> {
    Ok(toml::from_str(content)?)
}
