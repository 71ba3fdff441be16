//! Page configuration and localStorage helpers.

use bmc_api_types::AppConfig;
use gloo_storage::{LocalStorage, Storage};

/// localStorage key holding a JSON override for [`AppConfig`].
pub const CONFIG_KEY: &str = "bmc_config";

pub fn local_get(key: &str) -> Option<String> {
    LocalStorage::raw().get_item(key).ok()?
}

/// Defaults, then the build-time contract address, then the stored override.
pub fn load() -> AppConfig {
    AppConfig::default()
        .with_contract_address(option_env!("BMC_CONTRACT_ADDRESS"))
        .with_json_override(local_get(CONFIG_KEY).as_deref())
}
