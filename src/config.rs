//! Bridge configuration.
//!
//! Loaded from JSON with every field optional:
//!
//! ```
//! use dirlookup_wire::config::BridgeConfig;
//!
//! let config = BridgeConfig::from_json_str(r#"{
//!     "initial_buffer_size": 512,
//!     "resolver": { "map_ipv4_to_ipv6": true }
//! }"#).unwrap();
//!
//! assert_eq!(config.initial_buffer_size, 512);
//! assert!(config.resolver.map_ipv4_to_ipv6);
//! assert_eq!(config.max_buffer_size, 1024 * 1024);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, WireError};
use crate::protocol::Limits;

/// Default socket the daemon listens on.
pub const DEFAULT_SOCKET_PATH: &str = "/var/run/nslcd/socket";

/// Default first scratch buffer size.
pub const DEFAULT_INITIAL_BUFFER_SIZE: usize = 1024;

/// Default cap on scratch buffer growth.
pub const DEFAULT_MAX_BUFFER_SIZE: usize = 1024 * 1024;

/// Resolver behavior affecting address decoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverOptions {
    /// Return IPv4 addresses as IPv4-mapped IPv6 addresses.
    pub map_ipv4_to_ipv6: bool,
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Path of the daemon socket.
    pub socket_path: String,
    /// Scratch buffer size for the first attempt of a lookup.
    pub initial_buffer_size: usize,
    /// Largest scratch buffer a lookup may grow to.
    pub max_buffer_size: usize,
    /// Resolver options.
    pub resolver: ResolverOptions,
    /// Decode limits.
    pub limits: Limits,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            socket_path: DEFAULT_SOCKET_PATH.to_string(),
            initial_buffer_size: DEFAULT_INITIAL_BUFFER_SIZE,
            max_buffer_size: DEFAULT_MAX_BUFFER_SIZE,
            resolver: ResolverOptions::default(),
            limits: Limits::default(),
        }
    }
}

impl BridgeConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: BridgeConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Check that sizes and limits are usable.
    pub fn validate(&self) -> Result<()> {
        if self.initial_buffer_size == 0 {
            return Err(WireError::InvalidConfig(
                "initial_buffer_size must be greater than 0".to_string(),
            ));
        }
        if self.initial_buffer_size > self.max_buffer_size {
            return Err(WireError::InvalidConfig(format!(
                "initial_buffer_size {} exceeds max_buffer_size {}",
                self.initial_buffer_size, self.max_buffer_size
            )));
        }
        if self.limits.max_string_len == 0 || self.limits.max_list_len == 0 {
            return Err(WireError::InvalidConfig(
                "limits must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}
