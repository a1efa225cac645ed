//! # Terminal Configuration
//!
//! Static description of the terminal a session runs on.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     MASON_STORE_NAME="Mason Hardware"                                  │
//! │     MASON_TERMINAL_ID=counter-02                                       │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/mason-pos/terminal.toml (Linux)                          │
//! │     ~/Library/Application Support/com.mason.pos/terminal.toml (macOS)  │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │                                                                         │
//! │  A missing file is NOT an error; a file that fails to parse is.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # terminal.toml
//! store_name = "Mason Hardware & Building Supply"
//! store_address = ["Main Bazaar Road", "Block C"]
//! terminal_id = "counter-01"
//! operator = "default"
//! currency_code = "PKR"
//! currency_symbol = "Rs"
//! ```
//!
//! Configuration is read-only after load, so no lock is needed; the session
//! keeps a plain clone.

use std::path::PathBuf;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use mason_core::Money;

use crate::error::SessionError;

// =============================================================================
// Terminal Config
// =============================================================================

/// Terminal configuration.
///
/// Most fields have sensible defaults for development; production terminals
/// should configure them properly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminalConfig {
    /// Store name (stamped into logs and receipts).
    pub store_name: String,

    /// Store address lines (for receipts).
    pub store_address: Vec<String>,

    /// Identifies this counter/terminal in logs.
    pub terminal_id: String,

    /// Operator name, when the shell tracks one.
    pub operator: Option<String>,

    /// Currency code (ISO 4217).
    pub currency_code: String,

    /// Currency symbol (display only; the engine never formats money).
    pub currency_symbol: String,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        TerminalConfig {
            store_name: "Mason Dev Store".to_string(),
            store_address: vec!["123 Main Street".to_string()],
            terminal_id: "counter-01".to_string(),
            operator: None,
            currency_code: "PKR".to_string(),
            currency_symbol: "Rs".to_string(),
        }
    }
}

impl TerminalConfig {
    /// Loads configuration: defaults, then the TOML file if present, then
    /// environment overrides.
    pub fn load() -> Result<Self, SessionError> {
        let mut config = match Self::config_path() {
            Some(path) if path.exists() => {
                debug!(path = %path.display(), "loading terminal config file");
                let raw = std::fs::read_to_string(&path).map_err(|e| {
                    SessionError::config(format!("failed to read {}: {}", path.display(), e))
                })?;
                Self::from_toml(&raw)?
            }
            Some(path) => {
                debug!(path = %path.display(), "no terminal config file, using defaults");
                TerminalConfig::default()
            }
            None => {
                warn!("no config directory available on this platform, using defaults");
                TerminalConfig::default()
            }
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Parses a configuration from TOML text.
    pub fn from_toml(raw: &str) -> Result<Self, SessionError> {
        toml::from_str(raw)
            .map_err(|e| SessionError::config(format!("invalid terminal config: {}", e)))
    }

    /// Platform config file location.
    fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "mason", "mason-pos")
            .map(|dirs| dirs.config_dir().join("terminal.toml"))
    }

    /// Applies `MASON_*` environment overrides in place.
    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("MASON_STORE_NAME") {
            self.store_name = v;
        }
        if let Ok(v) = std::env::var("MASON_TERMINAL_ID") {
            self.terminal_id = v;
        }
        if let Ok(v) = std::env::var("MASON_OPERATOR") {
            self.operator = Some(v);
        }
        if let Ok(v) = std::env::var("MASON_CURRENCY_CODE") {
            self.currency_code = v;
        }
        if let Ok(v) = std::env::var("MASON_CURRENCY_SYMBOL") {
            self.currency_symbol = v;
        }
    }

    /// Formats an amount for operator-facing text ("Rs 1250.00").
    pub fn format_amount(&self, amount: Money) -> String {
        format!("{} {}", self.currency_symbol, amount)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TerminalConfig::default();
        assert_eq!(config.terminal_id, "counter-01");
        assert_eq!(config.currency_code, "PKR");
    }

    #[test]
    fn test_from_toml() {
        let config = TerminalConfig::from_toml(
            r#"
            store_name = "Mason Hardware & Building Supply"
            store_address = ["Main Bazaar Road", "Block C"]
            terminal_id = "counter-02"
            currency_symbol = "Rs"
            "#,
        )
        .unwrap();

        assert_eq!(config.store_name, "Mason Hardware & Building Supply");
        assert_eq!(config.terminal_id, "counter-02");
        // unspecified fields fall back to defaults
        assert_eq!(config.currency_code, "PKR");
    }

    #[test]
    fn test_from_toml_rejects_garbage() {
        let err = TerminalConfig::from_toml("store_name = [not toml").unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Config);
    }

    #[test]
    fn test_env_overrides() {
        std::env::set_var("MASON_TERMINAL_ID", "counter-09");
        std::env::set_var("MASON_OPERATOR", "sameer");

        let mut config = TerminalConfig::default();
        config.apply_env_overrides();

        assert_eq!(config.terminal_id, "counter-09");
        assert_eq!(config.operator.as_deref(), Some("sameer"));

        std::env::remove_var("MASON_TERMINAL_ID");
        std::env::remove_var("MASON_OPERATOR");
    }

    #[test]
    fn test_format_amount() {
        let config = TerminalConfig::default();
        assert_eq!(config.format_amount(Money::from_minor(125000)), "Rs 1250.00");
    }
}
