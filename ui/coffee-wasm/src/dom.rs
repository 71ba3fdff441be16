//! DOM element bindings.
//!
//! All fields are resolved once at startup. To add new UI elements, add a
//! field here and bind it in `Elements::bind()`.

use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlButtonElement, HtmlInputElement, HtmlTextAreaElement};

// ── Helpers ──

pub fn document() -> Document {
    gloo_utils::document()
}

pub fn window() -> web_sys::Window {
    gloo_utils::window()
}

pub fn by_id(id: &str) -> Option<Element> {
    document().get_element_by_id(id)
}

pub fn by_id_typed<T: JsCast>(id: &str) -> Option<T> {
    by_id(id).and_then(|e| e.dyn_into::<T>().ok())
}

pub fn create_element(tag: &str) -> Result<Element, JsValue> {
    document().create_element(tag)
}

pub fn set_text(el: &Element, text: &str) {
    el.set_text_content(Some(text));
}

pub fn clear_children(el: &Element) {
    el.set_text_content(None);
}

pub fn add_class(el: &Element, cls: &str) {
    let _ = el.class_list().add_1(cls);
}

pub fn toggle_class(el: &Element, cls: &str, force: bool) {
    let _ = el.class_list().toggle_with_force(cls, force);
}

/// Shows or hides an element via the `hidden` class.
pub fn set_visible(el: &Element, visible: bool) {
    toggle_class(el, "hidden", !visible);
}

/// Controlled-input write: only touches the element when the value differs,
/// so the caret stays put while typing.
pub fn sync_input(el: &HtmlInputElement, val: &str) {
    if el.value() != val {
        el.set_value(val);
    }
}

pub fn sync_textarea(el: &HtmlTextAreaElement, val: &str) {
    if el.value() != val {
        el.set_value(val);
    }
}

// ── Elements struct ──

/// All DOM element references used by the page.
/// Clone-friendly (all inner types are reference-counted via JS GC).
#[derive(Clone)]
pub struct Elements {
    // Connection
    pub connection_banner: Element,
    pub connect_btn: HtmlButtonElement,

    // Draft form
    pub memo_form: Element,
    pub name_input: HtmlInputElement,
    pub message_input: HtmlTextAreaElement,
    pub amount_input: HtmlInputElement,
    pub buy_btn: HtmlButtonElement,

    // Memos
    pub memo_section: Element,
    pub memo_list: Element,
}

macro_rules! get_el {
    ($id:expr) => {
        by_id($id).ok_or_else(|| JsValue::from_str(&format!("missing element #{}", $id)))?
    };
}

macro_rules! get_typed {
    ($ty:ty, $id:expr) => {
        by_id_typed::<$ty>($id)
            .ok_or_else(|| JsValue::from_str(&format!("missing {} #{}", stringify!($ty), $id)))?
    };
}

impl Elements {
    /// Resolve all DOM references. Call once after DOMContentLoaded.
    pub fn bind() -> Result<Elements, JsValue> {
        Ok(Elements {
            connection_banner: get_el!("connectionBanner"),
            connect_btn: get_typed!(HtmlButtonElement, "connectBtn"),

            memo_form: get_el!("memoForm"),
            name_input: get_typed!(HtmlInputElement, "nameInput"),
            message_input: get_typed!(HtmlTextAreaElement, "messageInput"),
            amount_input: get_typed!(HtmlInputElement, "amountInput"),
            buy_btn: get_typed!(HtmlButtonElement, "buyBtn"),

            memo_section: get_el!("memoSection"),
            memo_list: get_el!("memoList"),
        })
    }
}
