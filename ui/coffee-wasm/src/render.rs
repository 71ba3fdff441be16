//! Page rendering.
//!
//! Copies a [`PageView`] into the bound elements. Nothing here reads
//! controller state directly.

use crate::dom::{self, Elements};
use bmc_api_types::UnixTimestamp;
use bmc_controller::{Banner, MemoView, PageView};
use wasm_bindgen::prelude::*;

pub fn render(els: &Elements, view: &PageView) {
    render_banner(els, &view.banner);
    dom::set_visible(&els.connect_btn, view.show_connect_button);

    dom::set_visible(&els.memo_form, view.form.is_some());
    if let Some(form) = &view.form {
        dom::sync_input(&els.name_input, &form.name);
        dom::sync_textarea(&els.message_input, &form.message);
        dom::sync_input(&els.amount_input, &form.amount);
        els.amount_input.set_placeholder(&form.amount_placeholder);
        els.name_input.set_disabled(!form.editable);
        els.message_input.set_disabled(!form.editable);
        els.amount_input.set_disabled(!form.editable);
        els.buy_btn.set_disabled(!form.submit_enabled);
        dom::set_text(&els.buy_btn, form.submit_label);
    }

    dom::set_visible(&els.memo_section, view.show_memos);
    if let Err(err) = render_memo_list(&els.memo_list, &view.memos) {
        tracing::error!("rendering memo list: {err:?}");
    }
}

fn render_banner(els: &Elements, banner: &Banner) {
    let el = &els.connection_banner;
    dom::set_text(el, &banner.text());
    dom::toggle_class(el, "banner--connected", banner.is_connected());
    dom::toggle_class(el, "banner--pending", matches!(banner, Banner::Connecting));
    dom::toggle_class(el, "banner--disconnected", matches!(banner, Banner::Disconnected));
}

/// Rebuilds the list. Memo text is user-supplied, so it only ever goes in
/// through `textContent`.
fn render_memo_list(list: &web_sys::Element, memos: &[MemoView]) -> Result<(), JsValue> {
    dom::clear_children(list);

    for memo in memos {
        let item = dom::create_element("li")?;
        dom::add_class(&item, "memo-card");
        item.set_attribute("title", &memo.sender)?;

        for (class, text) in [
            ("memo-name", memo.name.clone()),
            ("memo-message", format!("\"{}\"", memo.message)),
            ("memo-amount", format!("Sent: {}", memo.amount)),
            ("memo-time", format!("At: {}", local_time(memo.timestamp))),
        ] {
            let line = dom::create_element("p")?;
            dom::add_class(&line, class);
            dom::set_text(&line, &text);
            item.append_child(&line)?;
        }

        list.append_child(&item)?;
    }
    Ok(())
}

/// Browser-locale rendering of a unix timestamp.
fn local_time(timestamp: UnixTimestamp) -> String {
    let date = js_sys::Date::new(&JsValue::from_f64(timestamp.as_millis()));
    date.to_locale_string("default", &JsValue::UNDEFINED).into()
}
