//! Proxy configuration.
//!
//! Loaded from TOML; every field has a default, so an empty document is a
//! valid configuration.
//!
//! ```
//! use wsf_proxy::ProxyConfig;
//!
//! let config = ProxyConfig::from_toml_str(r#"
//!     msl_mover_types = ["WSF_AIR_MOVER", "WSF_SPACE_MOVER"]
//! "#).unwrap();
//! assert_eq!(config.route_mover_type, "WSF_ROUTE_MOVER");
//! assert_eq!(config.msl_mover_types.len(), 2);
//! ```

use std::path::Path as FsPath;

use serde::{Deserialize, Serialize};

use crate::error::ProxyError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Mover types whose local routes default to an MSL altitude reference.
    pub msl_mover_types: Vec<String>,
    /// Mover type every route-following mover derives from. Other movers
    /// deriving from it default to AGL.
    pub route_mover_type: String,
    /// Classification levels, lowest first, used when the scenario declares
    /// none.
    pub classification_levels: Vec<String>,
    /// Label reported as the parent of zones not owned by a platform.
    pub global_zone_label: String,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            msl_mover_types: vec!["WSF_AIR_MOVER".to_string()],
            route_mover_type: "WSF_ROUTE_MOVER".to_string(),
            classification_levels: vec![
                "UNCLASSIFIED".to_string(),
                "CONFIDENTIAL".to_string(),
                "SECRET".to_string(),
                "TOP SECRET".to_string(),
            ],
            global_zone_label: "Global Zones".to_string(),
        }
    }
}

impl ProxyConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ProxyError> {
        Ok(toml::from_str(text)?)
    }

    /// Read a TOML file. A missing file yields the defaults.
    pub fn load(path: &FsPath) -> Result<Self, ProxyError> {
        match std::fs::read_to_string(path) {
            Ok(text) => Self::from_toml_str(&text),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "proxy config not found, using defaults");
                Ok(Self::default())
            }
            Err(err) => Err(ProxyError::Io(err)),
        }
    }
}
