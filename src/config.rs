//! Site configuration, read from `_config.yml` in the source directory.

use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::fs::File;
use std::path::{Path, PathBuf};

/// The configuration file name, relative to the site source.
pub const CONFIG_FILE: &str = "_config.yml";

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Where the site is written. Relative paths are relative to the source.
    pub destination: PathBuf,

    /// Whether related posts are ranked by a similarity engine (`true`) or
    /// picked positionally (`false`).
    pub lsi: bool,

    /// The layouts directory, relative to the source.
    pub layouts: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            destination: PathBuf::from("_site"),
            lsi: false,
            layouts: PathBuf::from("_layouts"),
        }
    }
}

impl Config {
    /// Loads `{source}/_config.yml`, or the defaults if there isn't one.
    pub fn from_directory(source: &Path) -> Result<Config> {
        let path = source.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Config::default());
        }
        let file = File::open(&path)
            .map_err(|e| anyhow!("Opening config file `{}`: {}", path.display(), e))?;
        Config::from_reader(file)
            .map_err(|e| anyhow!("Loading configuration `{}`: {}", path.display(), e))
    }

    /// Parses a configuration. An empty document yields the defaults.
    pub fn from_reader<R: std::io::Read>(mut reader: R) -> Result<Config> {
        let mut contents = String::new();
        reader.read_to_string(&mut contents)?;
        if contents.trim().is_empty() {
            return Ok(Config::default());
        }
        Ok(serde_yaml::from_str(&contents)?)
    }

    /// The destination directory resolved against `source`.
    pub fn destination_in(&self, source: &Path) -> PathBuf {
        source.join(&self.destination)
    }

    /// The layouts directory resolved against `source`.
    pub fn layouts_in(&self, source: &Path) -> PathBuf {
        source.join(&self.layouts)
    }
}
