use async_trait::async_trait;
use bmc_api_types::{Address, DappError, Signer};
use serde_json::{Value, json};
use std::rc::Rc;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

#[cfg(any(test, feature = "testing"))]
pub mod testing;

/// EIP-1193: user rejected the request.
pub const USER_REJECTED: i64 = 4001;
/// EIP-1193: method or account not authorized by the user.
pub const UNAUTHORIZED: i64 = 4100;

/// Error object returned by a provider's `request` promise.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("provider error {code}: {message}")]
pub struct RpcError {
    pub code: i64,
    pub message: String,
    pub data: Option<Value>,
}

impl RpcError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn is_user_rejection(&self) -> bool {
        self.code == USER_REJECTED || self.code == UNAUTHORIZED
    }
}

/// A browser-injected EIP-1193 provider (`window.ethereum`).
#[async_trait(?Send)]
pub trait Eip1193Provider {
    async fn request(&self, method: &str, params: Value) -> Result<Value, RpcError>;

    /// Suspends without blocking the host event loop. Used between receipt polls.
    async fn sleep(&self, duration: Duration);
}

#[async_trait(?Send)]
pub trait WalletBridge {
    fn is_available(&self) -> bool;
    async fn request_accounts(&self) -> Result<Address, DappError>;
    async fn get_signer(&self) -> Result<Signer, DappError>;
}

/// Wallet bridge over an optional injected provider.
pub struct InjectedWallet<P> {
    provider: Option<Rc<P>>,
}

impl<P> Clone for InjectedWallet<P> {
    fn clone(&self) -> Self {
        Self {
            provider: self.provider.clone(),
        }
    }
}

impl<P: Eip1193Provider> InjectedWallet<P> {
    pub fn new(provider: Option<Rc<P>>) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> Option<Rc<P>> {
        self.provider.clone()
    }

    fn require_provider(&self) -> Result<&P, DappError> {
        self.provider.as_deref().ok_or(DappError::WalletUnavailable)
    }

    async fn accounts(&self, method: &str) -> Result<Vec<Address>, DappError> {
        let provider = self.require_provider()?;
        let raw = provider
            .request(method, json!([]))
            .await
            .map_err(classify_wallet_error)?;
        parse_accounts(raw)
    }
}

#[async_trait(?Send)]
impl<P: Eip1193Provider> WalletBridge for InjectedWallet<P> {
    fn is_available(&self) -> bool {
        self.provider.is_some()
    }

    async fn request_accounts(&self) -> Result<Address, DappError> {
        let accounts = self.accounts("eth_requestAccounts").await?;
        let account = accounts.first().copied().ok_or(DappError::UserRejected)?;
        info!("wallet authorized account {account}");
        Ok(account)
    }

    async fn get_signer(&self) -> Result<Signer, DappError> {
        let authorized = self.accounts("eth_accounts").await?;
        let account = match authorized.first() {
            Some(account) => *account,
            None => self.request_accounts().await?,
        };
        Ok(Signer::new(account))
    }
}

/// Maps a provider error raised by an account request.
pub fn classify_wallet_error(err: RpcError) -> DappError {
    if err.is_user_rejection() {
        warn!("wallet declined request: {err}");
        DappError::UserRejected
    } else {
        DappError::UnknownError(err.to_string())
    }
}

fn parse_accounts(raw: Value) -> Result<Vec<Address>, DappError> {
    let entries: Vec<String> = serde_json::from_value(raw)
        .map_err(|err| DappError::UnknownError(format!("malformed account list: {err}")))?;

    entries
        .iter()
        .map(|entry| {
            entry
                .parse::<Address>()
                .map_err(|err| DappError::UnknownError(format!("malformed account '{entry}': {err}")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedProvider;

    const ACCOUNT: &str = "0x70997970c51812dc3a010c7d01b50e0d17dc79c8";

    fn wallet(provider: ScriptedProvider) -> (InjectedWallet<ScriptedProvider>, Rc<ScriptedProvider>) {
        let provider = Rc::new(provider);
        (InjectedWallet::new(Some(provider.clone())), provider)
    }

    #[tokio::test]
    async fn missing_provider_is_wallet_unavailable() {
        let wallet = InjectedWallet::<ScriptedProvider>::new(None);
        assert!(!wallet.is_available());
        assert_eq!(wallet.request_accounts().await, Err(DappError::WalletUnavailable));
        assert_eq!(wallet.get_signer().await, Err(DappError::WalletUnavailable));
    }

    #[tokio::test]
    async fn request_accounts_returns_first_account() {
        let provider = ScriptedProvider::default();
        provider.respond("eth_requestAccounts", json!([ACCOUNT, "0x0000000000000000000000000000000000000001"]));
        let (wallet, provider) = wallet(provider);

        let account = wallet.request_accounts().await.expect("account");
        assert_eq!(account, ACCOUNT.parse::<Address>().expect("address"));
        assert_eq!(provider.methods(), vec!["eth_requestAccounts"]);
    }

    #[tokio::test]
    async fn declined_prompt_is_user_rejected() {
        let provider = ScriptedProvider::default();
        provider.fail("eth_requestAccounts", RpcError::new(USER_REJECTED, "User rejected the request."));
        let (wallet, _) = wallet(provider);

        assert_eq!(wallet.request_accounts().await, Err(DappError::UserRejected));
    }

    #[tokio::test]
    async fn empty_account_list_is_user_rejected() {
        let provider = ScriptedProvider::default();
        provider.respond("eth_requestAccounts", json!([]));
        let (wallet, _) = wallet(provider);

        assert_eq!(wallet.request_accounts().await, Err(DappError::UserRejected));
    }

    #[tokio::test]
    async fn other_provider_failures_are_unknown() {
        let provider = ScriptedProvider::default();
        provider.fail("eth_requestAccounts", RpcError::new(-32603, "internal error"));
        provider.respond("eth_accounts", json!(["nonsense"]));
        let (wallet, _) = wallet(provider);

        assert!(matches!(wallet.request_accounts().await, Err(DappError::UnknownError(_))));
        assert!(matches!(wallet.get_signer().await, Err(DappError::UnknownError(_))));
    }

    #[tokio::test]
    async fn signer_uses_authorized_account_without_prompting() {
        let provider = ScriptedProvider::default();
        provider.respond("eth_accounts", json!([ACCOUNT]));
        let (wallet, provider) = wallet(provider);

        let signer = wallet.get_signer().await.expect("signer");
        assert_eq!(signer.account(), ACCOUNT.parse::<Address>().expect("address"));
        assert_eq!(provider.methods(), vec!["eth_accounts"]);
    }

    #[tokio::test]
    async fn signer_prompts_when_nothing_is_authorized() {
        let provider = ScriptedProvider::default();
        provider.respond("eth_accounts", json!([]));
        provider.respond("eth_requestAccounts", json!([ACCOUNT]));
        let (wallet, provider) = wallet(provider);

        let signer = wallet.get_signer().await.expect("signer");
        assert_eq!(signer.account(), ACCOUNT.parse::<Address>().expect("address"));
        assert_eq!(provider.methods(), vec!["eth_accounts", "eth_requestAccounts"]);
    }
}
