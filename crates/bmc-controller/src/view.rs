use crate::PageState;
use bmc_api_types::{Memo, Session, UnixTimestamp};

/// Render model derived from [`PageState`]; the DOM layer only copies it out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageView {
    pub banner: Banner,
    pub show_connect_button: bool,
    /// Present only while connected.
    pub form: Option<FormView>,
    /// The memo section is part of the connected page.
    pub show_memos: bool,
    /// Exactly the order the gateway returned. Empty unless connected.
    pub memos: Vec<MemoView>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Banner {
    Disconnected,
    Connecting,
    Connected { account: String },
}

impl Banner {
    pub fn text(&self) -> String {
        match self {
            Banner::Disconnected => "Wallet not connected".to_owned(),
            Banner::Connecting => "Connecting to wallet…".to_owned(),
            Banner::Connected { account } => format!("Connected to: {account}"),
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, Banner::Connected { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormView {
    pub name: String,
    pub message: String,
    pub amount: String,
    pub amount_placeholder: String,
    /// Inputs are locked while a submission is pending.
    pub editable: bool,
    pub submit_enabled: bool,
    pub submit_label: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoView {
    pub sender: String,
    pub name: String,
    pub message: String,
    /// e.g. `0.01 ETH`
    pub amount: String,
    pub timestamp: UnixTimestamp,
}

impl PageView {
    pub fn new(state: &PageState, currency_symbol: &str) -> Self {
        let banner = match state.session {
            Session::Disconnected => Banner::Disconnected,
            Session::Connecting => Banner::Connecting,
            Session::Connected(account) => Banner::Connected {
                account: account.to_string(),
            },
        };

        let form = state.session.is_connected().then(|| FormView {
            name: state.draft.name.clone(),
            message: state.draft.message.clone(),
            amount: state.draft.amount.clone(),
            amount_placeholder: format!("Amount ({currency_symbol})"),
            editable: !state.submitting,
            submit_enabled: !state.submitting,
            submit_label: if state.submitting { "Waiting for confirmation…" } else { "Buy Coffee" },
        });

        let show_memos = state.session.is_connected();
        let visible: &[Memo] = if show_memos { &state.memos } else { &[] };
        let memos = visible
            .iter()
            .map(|memo| MemoView {
                sender: memo.sender.to_string(),
                name: memo.name.clone(),
                message: memo.message.clone(),
                amount: format!("{} {currency_symbol}", memo.amount_ether()),
                timestamp: memo.timestamp,
            })
            .collect();

        Self {
            show_connect_button: state.session == Session::Disconnected,
            banner,
            form,
            show_memos,
            memos,
        }
    }
}
