use alloy_primitives::utils::{format_ether, parse_ether};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use alloy_primitives::{Address, B256, U256};

mod config;

pub use config::{AppConfig, DEFAULT_CONTRACT_ADDRESS};

/// Alert text shown when any draft field is left blank.
pub const FILL_ALL_FIELDS: &str = "Please fill in all fields!";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct UnixTimestamp(pub u64);

impl UnixTimestamp {
    pub fn as_millis(&self) -> f64 {
        self.0 as f64 * 1000.0
    }
}

/// One on-chain record: a payment paired with a short message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Memo {
    pub sender: Address,
    pub name: String,
    pub message: String,
    pub timestamp: UnixTimestamp,
    /// Payment in wei.
    pub amount: U256,
}

impl Memo {
    /// Amount as an ether decimal string, e.g. `0.01` or `1.0`.
    pub fn amount_ether(&self) -> String {
        display_ether(self.amount)
    }
}

/// Formats wei as ether without the padding zeros `format_ether` emits,
/// keeping at least one fractional digit.
pub fn display_ether(wei: U256) -> String {
    let padded = format_ether(wei);
    match padded.split_once('.') {
        Some((whole, fraction)) => {
            let fraction = fraction.trim_end_matches('0');
            if fraction.is_empty() {
                format!("{whole}.0")
            } else {
                format!("{whole}.{fraction}")
            }
        }
        None => format!("{padded}.0"),
    }
}

/// Transient form state for the memo being written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    pub name: String,
    pub message: String,
    /// Ether amount as typed by the user.
    pub amount: String,
}

impl Draft {
    pub fn new(name: impl Into<String>, message: impl Into<String>, amount: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
            amount: amount.into(),
        }
    }

    /// True when none of the three fields is blank.
    pub fn is_complete(&self) -> bool {
        [&self.name, &self.message, &self.amount]
            .iter()
            .all(|field| !field.trim().is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.message.is_empty() && self.amount.is_empty()
    }

    pub fn clear(&mut self) {
        self.name.clear();
        self.message.clear();
        self.amount.clear();
    }
}

/// Checks the memo fields and converts the ether amount to wei.
pub fn validate_memo_fields(name: &str, message: &str, amount: &str) -> Result<U256, DappError> {
    if name.trim().is_empty() || message.trim().is_empty() || amount.trim().is_empty() {
        return Err(DappError::ValidationError(FILL_ALL_FIELDS.to_owned()));
    }

    let amount = amount.trim();
    if amount.starts_with('-') {
        return Err(DappError::ValidationError(format!(
            "amount must not be negative: {amount}"
        )));
    }

    parse_ether(amount)
        .map_err(|err| DappError::ValidationError(format!("invalid amount '{amount}': {err}")))
}

/// Connection phase of the page, carrying the account once connected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Session {
    #[default]
    Disconnected,
    Connecting,
    Connected(Address),
}

impl Session {
    pub fn connected_account(&self) -> Option<Address> {
        match self {
            Session::Connected(account) => Some(*account),
            _ => None,
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, Session::Connected(_))
    }
}

/// Authorization handle bound to one wallet account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signer {
    account: Address,
}

impl Signer {
    pub fn new(account: Address) -> Self {
        Self { account }
    }

    pub fn account(&self) -> Address {
        self.account
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DappError {
    #[error("no wallet provider is injected into the page")]
    WalletUnavailable,
    #[error("the wallet declined the request")]
    UserRejected,
    #[error("invalid input: {0}")]
    ValidationError(String),
    #[error("failed to read memos: {0}")]
    ReadError(String),
    #[error("transaction rejected: {0}")]
    TransactionRejected(String),
    #[error("insufficient funds to cover the amount plus network fee")]
    InsufficientFunds,
    #[error("unexpected error: {0}")]
    UnknownError(String),
}

impl DappError {
    /// Text for the blocking alert shown to the user.
    pub fn user_message(&self) -> String {
        match self {
            DappError::WalletUnavailable => "MetaMask is required! Please install it.".to_owned(),
            DappError::ValidationError(reason) => reason.clone(),
            other => other.to_string(),
        }
    }

    /// Failures the user caused or can fix themselves.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            DappError::WalletUnavailable
                | DappError::UserRejected
                | DappError::ValidationError(_)
                | DappError::InsufficientFunds
        )
    }
}
