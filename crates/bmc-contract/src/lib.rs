use alloy_primitives::{Address, B256, Bytes, U64, hex};
use alloy_sol_types::SolCall;
use async_trait::async_trait;
use bmc_api_types::{AppConfig, DappError, Memo, Signer, UnixTimestamp, validate_memo_fields};
use bmc_wallet_bridge::{Eip1193Provider, RpcError};
use serde::Deserialize;
use serde_json::{Value, json};
use std::rc::Rc;
use std::time::Duration;
use tracing::{info, warn};

pub mod abi;

use abi::IBuyMeACoffee;

#[async_trait(?Send)]
pub trait ContractGateway {
    /// All memos in contract order.
    async fn list_memos(&self) -> Result<Vec<Memo>, DappError>;

    /// Pays `amount` ether with a memo and waits until the transaction is mined.
    async fn submit_memo(
        &self,
        signer: &Signer,
        name: &str,
        message: &str,
        amount: &str,
    ) -> Result<B256, DappError>;
}

/// Gateway to the deployed coffee contract through the wallet's provider.
pub struct MemoContract<P> {
    provider: Option<Rc<P>>,
    address: Address,
    poll_interval: Duration,
}

impl<P: Eip1193Provider> MemoContract<P> {
    pub fn new(provider: Option<Rc<P>>, address: Address, poll_interval: Duration) -> Self {
        Self {
            provider,
            address,
            poll_interval,
        }
    }

    pub fn from_config(provider: Option<Rc<P>>, config: &AppConfig) -> Self {
        Self::new(provider, config.contract_address, config.receipt_poll_interval())
    }

    pub fn address(&self) -> Address {
        self.address
    }

    fn require_provider(&self) -> Result<&P, DappError> {
        self.provider.as_deref().ok_or(DappError::WalletUnavailable)
    }

    async fn wait_for_receipt(&self, provider: &P, tx_hash: B256) -> Result<(), DappError> {
        loop {
            let raw = provider
                .request("eth_getTransactionReceipt", json!([tx_hash]))
                .await
                .map_err(|err| DappError::UnknownError(format!("awaiting {tx_hash}: {err}")))?;

            if raw.is_null() {
                provider.sleep(self.poll_interval).await;
                continue;
            }

            let receipt: ReceiptStatus = serde_json::from_value(raw)
                .map_err(|err| DappError::UnknownError(format!("malformed receipt for {tx_hash}: {err}")))?;

            return match receipt.status {
                Some(status) if status.is_zero() => Err(DappError::TransactionRejected(format!(
                    "transaction {tx_hash} reverted"
                ))),
                _ => Ok(()),
            };
        }
    }
}

// ── JSON-RPC wire types ──

#[derive(Debug, Deserialize)]
struct ReceiptStatus {
    #[serde(default)]
    status: Option<U64>,
}

#[async_trait(?Send)]
impl<P: Eip1193Provider> ContractGateway for MemoContract<P> {
    async fn list_memos(&self) -> Result<Vec<Memo>, DappError> {
        let provider = self
            .provider
            .as_deref()
            .ok_or_else(|| DappError::ReadError("no wallet provider to read from".to_owned()))?;
        let call = IBuyMeACoffee::getMemosCall {};
        let params = json!([
            { "to": self.address, "data": hex::encode_prefixed(call.abi_encode()) },
            "latest"
        ]);

        let raw = provider
            .request("eth_call", params)
            .await
            .map_err(|err| DappError::ReadError(err.to_string()))?;

        let output: Bytes = serde_json::from_value(raw)
            .map_err(|err| DappError::ReadError(format!("malformed eth_call result: {err}")))?;

        let memos = IBuyMeACoffee::getMemosCall::abi_decode_returns(&output)
            .map_err(|err| DappError::ReadError(format!("undecodable memo list: {err}")))?;

        Ok(memos
            .into_iter()
            .map(|memo| Memo {
                sender: memo.sender,
                name: memo.name,
                message: memo.message,
                timestamp: UnixTimestamp(memo.timestamp.saturating_to::<u64>()),
                amount: memo.amount,
            })
            .collect())
    }

    async fn submit_memo(
        &self,
        signer: &Signer,
        name: &str,
        message: &str,
        amount: &str,
    ) -> Result<B256, DappError> {
        let value = validate_memo_fields(name, message, amount)?;
        let provider = self.require_provider()?;

        let call = IBuyMeACoffee::buyCoffeeCall {
            name: name.to_owned(),
            message: message.to_owned(),
        };
        let params = json!([{
            "from": signer.account(),
            "to": self.address,
            "value": value,
            "data": hex::encode_prefixed(call.abi_encode())
        }]);

        let raw = provider
            .request("eth_sendTransaction", params)
            .await
            .map_err(classify_send_error)?;

        let tx_hash: B256 = serde_json::from_value(raw)
            .map_err(|err| DappError::UnknownError(format!("malformed transaction hash: {err}")))?;
        info!("transaction sent: {tx_hash}");

        self.wait_for_receipt(provider, tx_hash).await?;
        info!("transaction mined: {tx_hash}");

        Ok(tx_hash)
    }
}

/// Maps a provider error raised by `eth_sendTransaction`.
pub fn classify_send_error(err: RpcError) -> DappError {
    if err.is_user_rejection() {
        warn!("wallet declined transaction: {err}");
        return DappError::UserRejected;
    }

    let detail = err
        .data
        .as_ref()
        .map(Value::to_string)
        .unwrap_or_default()
        .to_lowercase();
    if err.message.to_lowercase().contains("insufficient funds") || detail.contains("insufficient funds") {
        return DappError::InsufficientFunds;
    }

    DappError::TransactionRejected(err.message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::U256;
    use alloy_sol_types::SolValue;
    use bmc_wallet_bridge::USER_REJECTED;
    use bmc_wallet_bridge::testing::ScriptedProvider;

    const TX_HASH: &str = "0x8f2b8a6d2e6a1a0b1f6d0d3a52c1c2a2a1b6b8e1c9a0c5d4e3f2a1b0c9d8e7f6";

    fn account() -> Address {
        Address::repeat_byte(0x42)
    }

    fn contract(provider: &Rc<ScriptedProvider>) -> MemoContract<ScriptedProvider> {
        MemoContract::new(
            Some(provider.clone()),
            Address::with_last_byte(0xc0),
            Duration::from_millis(10),
        )
    }

    fn encoded_memos(memos: Vec<IBuyMeACoffee::Memo>) -> Value {
        json!(hex::encode_prefixed(memos.abi_encode()))
    }

    fn one_hundredth_ether() -> U256 {
        U256::from(10_000_000_000_000_000_u64)
    }

    #[tokio::test]
    async fn list_memos_decodes_in_contract_order() {
        let provider = Rc::new(ScriptedProvider::default());
        provider.respond(
            "eth_call",
            encoded_memos(vec![
                IBuyMeACoffee::Memo {
                    sender: account(),
                    name: "Ana".to_owned(),
                    message: "Thanks!".to_owned(),
                    timestamp: U256::from(1_700_000_000_u64),
                    amount: one_hundredth_ether(),
                },
                IBuyMeACoffee::Memo {
                    sender: Address::repeat_byte(0x07),
                    name: "Bo".to_owned(),
                    message: "Great work".to_owned(),
                    timestamp: U256::from(1_700_000_600_u64),
                    amount: U256::from(1_000_000_000_000_000_000_u64),
                },
            ]),
        );

        let memos = contract(&provider).list_memos().await.expect("memos");

        assert_eq!(memos.len(), 2);
        assert_eq!(memos[0].sender, account());
        assert_eq!(memos[0].name, "Ana");
        assert_eq!(memos[0].timestamp, UnixTimestamp(1_700_000_000));
        assert_eq!(memos[0].amount_ether(), "0.01");
        assert_eq!(memos[1].name, "Bo");
        assert_eq!(memos[1].amount_ether(), "1.0");

        let calls = provider.calls();
        assert_eq!(calls[0].0, "eth_call");
        assert_eq!(
            calls[0].1[0]["data"],
            json!(hex::encode_prefixed(IBuyMeACoffee::getMemosCall {}.abi_encode()))
        );
        assert_eq!(calls[0].1[1], json!("latest"));
    }

    #[tokio::test]
    async fn empty_memo_list_is_not_an_error() {
        let provider = Rc::new(ScriptedProvider::default());
        provider.respond("eth_call", encoded_memos(Vec::new()));

        let memos = contract(&provider).list_memos().await.expect("memos");
        assert!(memos.is_empty());
    }

    #[tokio::test]
    async fn read_failures_are_read_errors() {
        let provider = Rc::new(ScriptedProvider::default());
        provider.fail("eth_call", RpcError::new(-32603, "upstream unavailable"));
        provider.respond("eth_call", json!("0x1234"));
        let gateway = contract(&provider);

        assert!(matches!(gateway.list_memos().await, Err(DappError::ReadError(_))));
        assert!(matches!(gateway.list_memos().await, Err(DappError::ReadError(_))));
    }

    #[tokio::test]
    async fn submit_sends_payment_and_waits_for_receipt() {
        let provider = Rc::new(ScriptedProvider::default());
        provider.respond("eth_sendTransaction", json!(TX_HASH));
        provider.respond("eth_getTransactionReceipt", Value::Null);
        provider.respond("eth_getTransactionReceipt", Value::Null);
        provider.respond("eth_getTransactionReceipt", json!({ "status": "0x1" }));

        let hash = contract(&provider)
            .submit_memo(&Signer::new(account()), "Ana", "Thanks!", "0.01")
            .await
            .expect("mined");

        assert_eq!(hash, TX_HASH.parse::<B256>().expect("hash"));
        assert_eq!(provider.calls_to("eth_getTransactionReceipt"), 3);
        assert_eq!(provider.sleeps(), vec![Duration::from_millis(10); 2]);

        let (method, params) = &provider.calls()[0];
        assert_eq!(method, "eth_sendTransaction");
        let tx = &params[0];
        assert_eq!(tx["value"], json!(one_hundredth_ether()));
        assert_eq!(tx["from"], json!(account()));
        assert_eq!(tx["to"], json!(Address::with_last_byte(0xc0)));
        let expected = IBuyMeACoffee::buyCoffeeCall {
            name: "Ana".to_owned(),
            message: "Thanks!".to_owned(),
        };
        assert_eq!(tx["data"], json!(hex::encode_prefixed(expected.abi_encode())));
    }

    #[tokio::test]
    async fn invalid_fields_never_reach_the_provider() {
        let provider = Rc::new(ScriptedProvider::default());
        let gateway = contract(&provider);
        let signer = Signer::new(account());

        for (name, message, amount) in [("", "Thanks!", "0.01"), ("Ana", "", "0.01"), ("Ana", "Thanks!", ""), ("Ana", "Thanks!", "abc")] {
            let result = gateway.submit_memo(&signer, name, message, amount).await;
            assert!(matches!(result, Err(DappError::ValidationError(_))), "{name}/{message}/{amount}");
        }
        assert!(provider.calls().is_empty());
    }

    #[tokio::test]
    async fn send_failures_are_classified() {
        let provider = Rc::new(ScriptedProvider::default());
        provider.fail("eth_sendTransaction", RpcError::new(USER_REJECTED, "User denied transaction signature."));
        provider.fail(
            "eth_sendTransaction",
            RpcError::new(-32000, "insufficient funds for gas * price + value"),
        );
        provider.fail("eth_sendTransaction", RpcError::new(-32603, "execution reverted"));
        let gateway = contract(&provider);
        let signer = Signer::new(account());

        assert_eq!(
            gateway.submit_memo(&signer, "Ana", "Thanks!", "0.01").await,
            Err(DappError::UserRejected)
        );
        assert_eq!(
            gateway.submit_memo(&signer, "Ana", "Thanks!", "0.01").await,
            Err(DappError::InsufficientFunds)
        );
        assert_eq!(
            gateway.submit_memo(&signer, "Ana", "Thanks!", "0.01").await,
            Err(DappError::TransactionRejected("execution reverted".to_owned()))
        );
        assert_eq!(provider.calls_to("eth_getTransactionReceipt"), 0);
    }

    #[tokio::test]
    async fn reverted_receipt_is_transaction_rejected() {
        let provider = Rc::new(ScriptedProvider::default());
        provider.respond("eth_sendTransaction", json!(TX_HASH));
        provider.respond("eth_getTransactionReceipt", json!({ "status": "0x0" }));

        let result = contract(&provider)
            .submit_memo(&Signer::new(account()), "Ana", "Thanks!", "0.01")
            .await;
        assert!(matches!(result, Err(DappError::TransactionRejected(_))));
    }

    #[tokio::test]
    async fn missing_provider_fails_reads_and_submissions() {
        let gateway = MemoContract::<ScriptedProvider>::new(None, Address::ZERO, Duration::ZERO);
        assert!(matches!(gateway.list_memos().await, Err(DappError::ReadError(_))));
        assert_eq!(
            gateway
                .submit_memo(&Signer::new(account()), "Ana", "Thanks!", "0.01")
                .await,
            Err(DappError::WalletUnavailable)
        );
    }
}
