//! Page controller for the coffee page.
//!
//! Owns the session, the draft form and the memo list, drives the wallet
//! bridge and the contract gateway, and reports every failure through a
//! [`Notifier`]. State sits in a `RefCell` and no borrow is held across an
//! `.await`, so handlers spawned from UI events may interleave.

use bmc_api_types::{DappError, Draft, FILL_ALL_FIELDS, Memo, Session};
use bmc_contract::ContractGateway;
use bmc_wallet_bridge::WalletBridge;
use std::cell::{Cell, RefCell};
use tracing::{debug, error, info, warn};

mod view;

pub use view::{Banner, FormView, MemoView, PageView};

/// Alert text after a mined submission.
pub const PURCHASE_SUCCEEDED: &str = "Coffee purchased successfully!";

/// Alert text when the page loads without an injected wallet.
pub const WALLET_NOT_INSTALLED: &str = "MetaMask is not installed! Please install it to use this app.";

/// Surfaces messages to the user (a blocking alert in the browser).
pub trait Notifier {
    fn alert(&self, message: &str);
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageState {
    pub session: Session,
    pub draft: Draft,
    pub memos: Vec<Memo>,
    /// A submission is awaiting confirmation.
    pub submitting: bool,
    pub wallet_available: bool,
}

type Listener = Box<dyn Fn(&PageState)>;

pub struct PageController<W, G, N> {
    wallet: W,
    gateway: G,
    notifier: N,
    state: RefCell<PageState>,
    listener: RefCell<Option<Listener>>,
    /// Ticket of the most recently started memo fetch.
    fetch_generation: Cell<u64>,
}

impl<W, G, N> PageController<W, G, N>
where
    W: WalletBridge,
    G: ContractGateway,
    N: Notifier,
{
    pub fn new(wallet: W, gateway: G, notifier: N) -> Self {
        let state = PageState {
            wallet_available: wallet.is_available(),
            ..PageState::default()
        };
        Self {
            wallet,
            gateway,
            notifier,
            state: RefCell::new(state),
            listener: RefCell::new(None),
            fetch_generation: Cell::new(0),
        }
    }

    /// Registers the callback invoked with a snapshot after every state change.
    pub fn set_listener(&self, listener: impl Fn(&PageState) + 'static) {
        *self.listener.borrow_mut() = Some(Box::new(listener));
        self.emit();
    }

    pub fn state(&self) -> PageState {
        self.state.borrow().clone()
    }

    pub fn session(&self) -> Session {
        self.state.borrow().session
    }

    pub fn view(&self, currency_symbol: &str) -> PageView {
        PageView::new(&self.state.borrow(), currency_symbol)
    }

    fn update(&self, mutate: impl FnOnce(&mut PageState)) {
        mutate(&mut self.state.borrow_mut());
        self.emit();
    }

    fn emit(&self) {
        let snapshot = self.state();
        if let Some(listener) = self.listener.borrow().as_ref() {
            listener(&snapshot);
        }
    }

    fn report(&self, err: &DappError) {
        if err.is_user_facing() {
            warn!("{err}");
        } else {
            error!("{err}");
        }
        self.notifier.alert(&err.user_message());
    }

    // ── Draft (controlled inputs) ──
    //
    // The draft is frozen while a submission is pending; it is cleared once
    // the transaction is mined.

    pub fn set_name(&self, name: &str) {
        self.edit_draft(|draft| draft.name = name.to_owned());
    }

    pub fn set_message(&self, message: &str) {
        self.edit_draft(|draft| draft.message = message.to_owned());
    }

    pub fn set_amount(&self, amount: &str) {
        self.edit_draft(|draft| draft.amount = amount.to_owned());
    }

    fn edit_draft(&self, edit: impl FnOnce(&mut Draft)) {
        if self.state.borrow().submitting {
            debug!("draft edit ignored; a transaction is pending");
            self.emit();
            return;
        }
        self.update(|state| edit(&mut state.draft));
    }

    // ── Wallet connection ──

    /// Page-load hook: reads the memo list when a provider is present, and
    /// tells the user to install a wallet otherwise. Fetch failures here are
    /// logged only.
    pub async fn load(&self) {
        if !self.wallet.is_available() {
            warn!("no wallet provider at load; skipping memo fetch");
            self.notifier.alert(WALLET_NOT_INSTALLED);
            return;
        }
        if let Err(err) = self.fetch_memos().await {
            warn!("initial memo fetch failed: {err}");
        }
    }

    pub async fn connect(&self) -> Result<(), DappError> {
        if self.session() != Session::Disconnected {
            debug!("connect ignored while {:?}", self.session());
            return Ok(());
        }

        self.update(|state| state.session = Session::Connecting);

        let account = match self.wallet.request_accounts().await {
            Ok(account) => account,
            Err(err) => {
                self.update(|state| state.session = Session::Disconnected);
                self.report(&err);
                return Err(err);
            }
        };

        info!("connected to {account}");
        self.update(|state| state.session = Session::Connected(account));
        self.refresh().await
    }

    // ── Memos ──

    /// Re-reads the memo list, reporting failures. The previous list stays on error.
    pub async fn refresh(&self) -> Result<(), DappError> {
        self.fetch_memos().await.inspect_err(|err| self.report(err))
    }

    /// Only the most recently started fetch may replace the list.
    async fn fetch_memos(&self) -> Result<(), DappError> {
        let ticket = self.fetch_generation.get() + 1;
        self.fetch_generation.set(ticket);

        let memos = self.gateway.list_memos().await?;
        if ticket != self.fetch_generation.get() {
            debug!("dropping stale memo list ({} memos)", memos.len());
            return Ok(());
        }
        debug!("fetched {} memos", memos.len());
        self.update(|state| state.memos = memos);
        Ok(())
    }

    /// Submits the draft. Ignored unless connected and idle.
    pub async fn submit(&self) -> Result<(), DappError> {
        let (session, submitting, draft) = {
            let state = self.state.borrow();
            (state.session, state.submitting, state.draft.clone())
        };

        if !session.is_connected() {
            warn!("submit ignored while {session:?}");
            return Ok(());
        }
        if submitting {
            debug!("submit ignored; a transaction is already pending");
            return Ok(());
        }
        if !draft.is_complete() {
            let err = DappError::ValidationError(FILL_ALL_FIELDS.to_owned());
            self.report(&err);
            return Err(err);
        }

        self.update(|state| state.submitting = true);
        let result = self.send(&draft).await;
        self.update(|state| state.submitting = false);

        if let Err(err) = result {
            self.report(&err);
            return Err(err);
        }

        self.notifier.alert(PURCHASE_SUCCEEDED);
        self.update(|state| state.draft.clear());
        self.refresh().await
    }

    async fn send(&self, draft: &Draft) -> Result<(), DappError> {
        let signer = self.wallet.get_signer().await?;
        let tx_hash = self
            .gateway
            .submit_memo(&signer, &draft.name, &draft.message, &draft.amount)
            .await?;
        info!("memo from {} confirmed in {tx_hash}", signer.account());
        Ok(())
    }
}
