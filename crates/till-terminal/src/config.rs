//! # Terminal Configuration
//!
//! Static per-terminal settings, loaded once at startup from a JSON file
//! next to the database (or built in code for tests).

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{PosError, PosResult};
use till_core::TaxRate;

/// Per-terminal configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminalConfig {
    /// Identifier stamped on every shift and sale from this terminal.
    pub terminal_id: String,

    /// Store name for receipts.
    pub store_name: String,

    /// Tax rate applied to categories with no override, in basis points.
    pub default_tax_rate_bps: u32,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        TerminalConfig {
            terminal_id: "till-01".to_string(),
            store_name: "Tillpoint".to_string(),
            default_tax_rate_bps: 0,
        }
    }
}

impl TerminalConfig {
    /// Loads configuration from a JSON file.
    ///
    /// Missing fields fall back to defaults; a missing file is an error
    /// (a terminal must know its own id).
    pub fn load(path: impl AsRef<Path>) -> PosResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            PosError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;

        let config: TerminalConfig = serde_json::from_str(&raw).map_err(|e| {
            PosError::Config(format!("cannot parse {}: {}", path.display(), e))
        })?;

        info!(
            terminal_id = %config.terminal_id,
            default_tax_rate_bps = config.default_tax_rate_bps,
            "Terminal configuration loaded"
        );
        Ok(config)
    }

    /// The default tax rate as a TaxRate.
    pub fn default_tax_rate(&self) -> TaxRate {
        TaxRate::from_bps(self.default_tax_rate_bps)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let raw = r#"{
            "terminal_id": "till-07",
            "store_name": "Corner Shop",
            "default_tax_rate_bps": 1400
        }"#;
        let config: TerminalConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(config.terminal_id, "till-07");
        assert_eq!(config.default_tax_rate().bps(), 1400);
    }

    #[test]
    fn test_missing_fields_fall_back_to_defaults() {
        let config: TerminalConfig = serde_json::from_str(r#"{"terminal_id":"t9"}"#).unwrap();
        assert_eq!(config.terminal_id, "t9");
        assert_eq!(config.store_name, "Tillpoint");
        assert_eq!(config.default_tax_rate_bps, 0);
    }

    #[test]
    fn test_load_missing_file_is_config_error() {
        let err = TerminalConfig::load("/nonexistent/till.json").unwrap_err();
        assert!(matches!(err, PosError::Config(_)));
    }
}
