//! Optional TOML configuration for batch conversion.
//!
//! ```toml
//! src = "docs"
//! dest = "site"
//! index = "index.xml"
//! args = ["draft"]
//! ```
//!
//! Command-line flags take precedence over file values.

use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG: &str = "zdoc.toml";

#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub src: Option<String>,
    pub dest: Option<String>,
    pub index: Option<String>,
    pub args: Vec<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config '{}'", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("invalid config '{}'", path.display()))
    }

    pub fn from_toml(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load `explicit`, or [`DEFAULT_CONFIG`] if it exists, or nothing.
    pub fn discover(explicit: Option<&Path>) -> anyhow::Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let path = Path::new(DEFAULT_CONFIG);
                if path.is_file() {
                    log::debug!("using {}", DEFAULT_CONFIG);
                    Self::load(path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }
}
