//! Deployment settings
//!
//! The fund-ID table, the catch-all fund ID and the matching blacklist vary
//! between deployments, so they live in a TOML file instead of the code.
//! Every key is optional; missing keys fall back to [`Settings::default`].

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::CotistasError;
use crate::normalize::DEFAULT_MATCH_TOKENS;

/// Fund ID used when a fund name is not in the table
pub const DEFAULT_FUND_ID: i32 = 20711;

/// Marker carried by the summary line closing each holder block
pub const DEFAULT_TOTAL_MARKER: &str = "TOTAL DA MOVIMENTAÇÃO:";

/// Width of the code prefix in front of the holder name (e.g. `"99999-"`)
pub const DEFAULT_HOLDER_PREFIX_WIDTH: usize = 6;

const CONFIG_FILENAME: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Catch-all fund ID for names absent from `fund_ids`
    pub default_fund_id: i32,
    /// Characters dropped from the start of the TITULAR field
    pub holder_prefix_width: usize,
    /// Rows whose TITULAR contains this text are summary rows
    pub total_marker: String,
    /// Tokens removed when building matching keys
    pub match_tokens: Vec<String>,
    /// Known fund names and their IDs
    pub fund_ids: BTreeMap<String, i32>,
}

impl Default for Settings {
    fn default() -> Self {
        let fund_ids = [
            ("COTADEF1", 20711),
            ("COTADEF2", 20731),
            ("COTADEF3", 20732),
            ("COTADEF4", 20733),
            ("COTADEF5", 20734),
            ("COTADEF6", 20735),
        ]
        .into_iter()
        .map(|(name, id)| (name.to_string(), id))
        .collect();

        Self {
            default_fund_id: DEFAULT_FUND_ID,
            holder_prefix_width: DEFAULT_HOLDER_PREFIX_WIDTH,
            total_marker: DEFAULT_TOTAL_MARKER.to_string(),
            match_tokens: DEFAULT_MATCH_TOKENS.iter().map(|t| t.to_string()).collect(),
            fund_ids,
        }
    }
}

impl Settings {
    pub fn from_toml_str(content: &str) -> std::result::Result<Self, CotistasError> {
        toml::from_str(content).map_err(|e| CotistasError::Config(e.to_string()))
    }

    pub fn to_toml_string(&self) -> std::result::Result<String, CotistasError> {
        toml::to_string_pretty(self).map_err(|e| CotistasError::Config(e.to_string()))
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        let settings = Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse config file {:?}", path))?;
        info!("Loaded settings from {:?}", path);
        Ok(settings)
    }

    /// Resolve settings: explicit path, then the user config file, then defaults
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from_path(path);
        }

        match default_config_path() {
            Ok(path) if path.exists() => Self::load_from_path(&path),
            Ok(path) => {
                debug!("No config file at {:?}, using defaults", path);
                Ok(Self::default())
            }
            Err(e) => {
                debug!("{}, using defaults", e);
                Ok(Self::default())
            }
        }
    }
}

pub fn default_config_path() -> Result<PathBuf> {
    let config_dir = dir_spec::config_home()
        .ok_or_else(|| anyhow!("Could not determine config directory"))?;

    Ok(config_dir.join("cotistas").join(CONFIG_FILENAME))
}
