//! Validation policy passed explicitly into every validator
//!
//! Nothing in the engine reads global settings; a `ValidationConfig` is built
//! once (usually from the host's TOML configuration) and handed to the
//! dispatcher and the serial manager.

use std::fs;
use std::path::Path;

use derive_more::{Display, Error, From};
use serde_derive::{Deserialize, Serialize};

#[derive(Debug, Display, From, Error)]
pub enum ConfigError {
    Io(std::io::Error),
    Toml(toml::de::Error),
}

type Result<T> = std::result::Result<T, ConfigError>;

/// RFC 2181 upper bound for a TTL
pub const MAX_TTL: u32 = 2_147_483_647;

/// Policy knobs for record validation and serial generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// TTL applied when a candidate record carries none
    pub default_ttl: u32,
    /// TTLs below this are accepted with a warning
    pub ttl_warning_threshold: u32,
    /// SOA RNAME substituted for a bare `.` mailbox
    pub hostmaster: String,
    /// Reject single-label hostnames such as `localhost`
    pub top_level_tld_check: bool,
    /// Offset from UTC of the clock used for date-based serials
    pub utc_offset_seconds: i32,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        ValidationConfig {
            default_ttl: 86400,
            ttl_warning_threshold: 60,
            hostmaster: "hostmaster.example.net".to_string(),
            top_level_tld_check: false,
            utc_offset_seconds: 0,
        }
    }
}

impl ValidationConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}
