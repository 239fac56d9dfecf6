use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::view::{DisplayFormat, ViewMode};

pub const CONFIG_FILE: &str = "config.yaml";

/// Workspace settings kept in `.opsdesk/config.yaml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeskConfig {
    pub currency_symbol: String,
    /// Rows per page in table views
    pub page_size: usize,
    pub default_view: ViewMode,
    /// Refuse module commands until `opsdesk login` succeeds
    pub require_login: bool,
    /// Simulated round trip of the login transport
    pub login_latency_ms: u64,
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self {
            currency_symbol: "$".to_string(),
            page_size: 10,
            default_view: ViewMode::Table,
            require_login: true,
            login_latency_ms: 300,
        }
    }
}

impl DeskConfig {
    /// Read the config from `dir`; a missing file gives the defaults.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(&path)?;
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(&text)?)
    }

    pub fn save(&self, dir: &Path) -> Result<()> {
        fs::write(dir.join(CONFIG_FILE), serde_yaml::to_string(self)?)?;
        Ok(())
    }

    pub fn display_format(&self) -> DisplayFormat {
        DisplayFormat::new(self.currency_symbol.clone())
    }
}
