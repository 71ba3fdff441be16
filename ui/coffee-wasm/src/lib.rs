//! Buy Me A Coffee WASM frontend
//!
//! Pure Rust + WASM page: connect an injected wallet, pay for a coffee with
//! a memo, list the memos stored on-chain. Each concern lives in its own
//! module; the page logic itself is `bmc_controller::PageController`.

pub mod config;
pub mod dom;
pub mod ethereum;
pub mod events;
pub mod logging;
pub mod render;

use bmc_contract::MemoContract;
use bmc_controller::{Notifier, PageController, PageView};
use bmc_wallet_bridge::InjectedWallet;
use ethereum::BrowserEthereum;
use std::rc::Rc;
use tracing::info;
use wasm_bindgen::prelude::*;

pub type Page = PageController<InjectedWallet<BrowserEthereum>, MemoContract<BrowserEthereum>, AlertNotifier>;

/// Reports through blocking `window.alert` dialogs.
pub struct AlertNotifier;

impl Notifier for AlertNotifier {
    fn alert(&self, message: &str) {
        let _ = dom::window().alert_with_message(message);
    }
}

/// WASM entry point – called automatically when the module is instantiated.
#[wasm_bindgen(start)]
pub async fn start() -> Result<(), JsValue> {
    // Improve panic messages in the browser console
    console_error_panic_hook::set_once();

    init().await
}

/// Main initialisation sequence.
async fn init() -> Result<(), JsValue> {
    let config = config::load();
    logging::init(&config.log_level);
    info!(
        "contract {} (receipt poll {}ms)",
        config.contract_address, config.receipt_poll_interval_ms
    );

    let els = dom::Elements::bind()?;

    let provider = BrowserEthereum::detect();
    let wallet = InjectedWallet::new(provider.clone());
    let gateway = MemoContract::from_config(provider, &config);
    let page = Rc::new(PageController::new(wallet, gateway, AlertNotifier));

    // Re-render on every state change
    {
        let els = els.clone();
        let currency = config.currency_symbol.clone();
        page.set_listener(move |state| render::render(&els, &PageView::new(state, &currency)));
    }

    events::bind_events(&els, &page)?;

    page.load().await;

    Ok(())
}
