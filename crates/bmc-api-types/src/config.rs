use alloy_primitives::{Address, address};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

/// First deployment address on a fresh local Anvil/Hardhat node.
pub const DEFAULT_CONTRACT_ADDRESS: Address = address!("5FbDB2315678afecb367f032d93F642f64180aa3");

/// Runtime settings for the page.
///
/// Starts from `Default`, then the build-time contract address, then a JSON
/// override (the browser keeps one under `localStorage["bmc_config"]`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub contract_address: Address,
    pub receipt_poll_interval_ms: u64,
    pub currency_symbol: String,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            contract_address: DEFAULT_CONTRACT_ADDRESS,
            receipt_poll_interval_ms: 1_500,
            currency_symbol: "ETH".to_owned(),
            log_level: "info".to_owned(),
        }
    }
}

impl AppConfig {
    /// Applies a contract address supplied at build time. Unparseable values
    /// are logged and ignored.
    pub fn with_contract_address(mut self, raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
            return self;
        };

        match raw.parse::<Address>() {
            Ok(address) => self.contract_address = address,
            Err(err) => warn!("ignoring contract address '{raw}': {err}"),
        }
        self
    }

    /// Overlays the keys present in a JSON object onto this config.
    pub fn with_json_override(self, raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
            return self;
        };

        match self.merged(raw) {
            Ok(config) => config,
            Err(err) => {
                warn!("ignoring config override: {err}");
                self
            }
        }
    }

    fn merged(&self, raw: &str) -> Result<Self, serde_json::Error> {
        let overrides: serde_json::Map<String, serde_json::Value> = serde_json::from_str(raw)?;
        let mut base = serde_json::to_value(self)?;
        if let Some(fields) = base.as_object_mut() {
            fields.extend(overrides);
        }
        serde_json::from_value(base)
    }

    pub fn receipt_poll_interval(&self) -> Duration {
        Duration::from_millis(self.receipt_poll_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_time_address_replaces_default() {
        let config = AppConfig::default()
            .with_contract_address(Some("0x00000000000000000000000000000000000000aa"));
        assert_eq!(config.contract_address, Address::with_last_byte(0xaa));
    }

    #[test]
    fn invalid_build_time_address_keeps_default() {
        let config = AppConfig::default().with_contract_address(Some("not-an-address"));
        assert_eq!(config.contract_address, DEFAULT_CONTRACT_ADDRESS);

        let config = AppConfig::default().with_contract_address(Some("  "));
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn json_override_only_touches_present_keys() {
        let config = AppConfig::default()
            .with_json_override(Some(r#"{"receipt_poll_interval_ms": 250, "currency_symbol": "SEP"}"#));
        assert_eq!(config.receipt_poll_interval(), Duration::from_millis(250));
        assert_eq!(config.currency_symbol, "SEP");
        assert_eq!(config.contract_address, DEFAULT_CONTRACT_ADDRESS);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn malformed_json_override_is_ignored() {
        let config = AppConfig::default().with_json_override(Some("{not json"));
        assert_eq!(config, AppConfig::default());

        let config = AppConfig::default().with_json_override(Some(r#"{"receipt_poll_interval_ms": "soon"}"#));
        assert_eq!(config, AppConfig::default());
    }
}
