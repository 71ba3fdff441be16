//! Event binding.
//!
//! Wires the UI event listeners to the page controller. Async handlers are
//! spawned via `wasm_bindgen_futures::spawn_local`; their failures are
//! already reported by the controller, so results are dropped here.

use crate::Page;
use crate::dom::Elements;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

/// Helper: attach async click handler that drives the controller.
macro_rules! on_click_async {
    ($el:expr, $page:expr, $action:ident) => {{
        let page = $page.clone();
        let cb = Closure::wrap(Box::new(move |_: web_sys::MouseEvent| {
            let page = page.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let _ = page.$action().await;
            });
        }) as Box<dyn FnMut(_)>);
        $el.add_event_listener_with_callback("click", cb.as_ref().unchecked_ref())?;
        cb.forget();
    }};
}

/// Helper: forward an input's raw value to a draft setter on every keystroke.
macro_rules! on_input {
    ($el:expr, $page:expr, $setter:ident) => {{
        let page = $page.clone();
        let el = $el.clone();
        let cb = Closure::wrap(Box::new(move |_: web_sys::Event| {
            page.$setter(&el.value());
        }) as Box<dyn FnMut(_)>);
        $el.add_event_listener_with_callback("input", cb.as_ref().unchecked_ref())?;
        cb.forget();
    }};
}

/// Bind all UI event listeners. Call once after init.
pub fn bind_events(els: &Elements, page: &Rc<Page>) -> Result<(), JsValue> {
    // ── Connect ──
    on_click_async!(els.connect_btn, page, connect);

    // ── Draft form ──
    on_input!(els.name_input, page, set_name);
    on_input!(els.message_input, page, set_message);
    on_input!(els.amount_input, page, set_amount);

    // ── Submit ──
    on_click_async!(els.buy_btn, page, submit);

    Ok(())
}
