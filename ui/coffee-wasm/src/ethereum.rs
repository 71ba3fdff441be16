//! `window.ethereum` as an [`Eip1193Provider`].

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use bmc_wallet_bridge::{Eip1193Provider, RpcError};
use serde::Serialize;
use serde_json::{Value, json};
use std::rc::Rc;
use std::time::Duration;
use tracing::debug;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

/// JSON-RPC internal error, used when the provider throws something that is
/// not an EIP-1193 error object.
const INTERNAL_ERROR: i64 = -32603;

#[wasm_bindgen]
extern "C" {
    /// The injected provider object.
    pub type InjectedEthereum;

    #[wasm_bindgen(method, catch)]
    fn request(this: &InjectedEthereum, args: &JsValue) -> Result<js_sys::Promise, JsValue>;
}

pub struct BrowserEthereum {
    inner: InjectedEthereum,
}

impl BrowserEthereum {
    /// Looks up `window.ethereum`; `None` when no wallet extension injected one.
    pub fn detect() -> Option<Rc<Self>> {
        let window = crate::dom::window();
        let value = js_sys::Reflect::get(&window, &JsValue::from_str("ethereum")).ok()?;
        if value.is_undefined() || value.is_null() {
            debug!("window.ethereum not present");
            return None;
        }
        Some(Rc::new(Self {
            inner: value.unchecked_into(),
        }))
    }

    async fn call(&self, method: &str, params: Value) -> Result<JsValue, JsValue> {
        let args = to_js(&json!({ "method": method, "params": params }))
            .map_err(|err| JsValue::from_str(&err.to_string()))?;
        let promise = self.inner.request(&args)?;
        JsFuture::from(promise).await
    }
}

#[async_trait(?Send)]
impl Eip1193Provider for BrowserEthereum {
    async fn request(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        debug!("eip-1193 request {method}");
        let result = self.call(method, params).await.map_err(rpc_error)?;
        from_js(result).map_err(|err| RpcError::new(INTERNAL_ERROR, err.to_string()))
    }

    async fn sleep(&self, duration: Duration) {
        let millis = u32::try_from(duration.as_millis()).unwrap_or(u32::MAX);
        gloo_timers::future::TimeoutFuture::new(millis).await;
    }
}

fn to_js(value: &Value) -> Result<JsValue> {
    // Plain objects, not ES `Map`s, for JSON maps.
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|err| anyhow!("encoding request arguments: {err}"))
}

fn from_js(value: JsValue) -> Result<Value> {
    if value.is_undefined() {
        return Ok(Value::Null);
    }
    serde_wasm_bindgen::from_value(value).map_err(|err| anyhow!("decoding provider result: {err}"))
}

/// Reads `code`, `message` and `data` off a rejected request. Error instances
/// keep `message` non-enumerable, so the fields are read one by one.
fn rpc_error(raw: JsValue) -> RpcError {
    let field = |name: &str| js_sys::Reflect::get(&raw, &JsValue::from_str(name)).ok();

    let code = field("code")
        .and_then(|code| code.as_f64())
        .map(|code| code as i64)
        .unwrap_or(INTERNAL_ERROR);
    let message = field("message")
        .and_then(|message| message.as_string())
        .unwrap_or_else(|| format!("{raw:?}"));
    let data = field("data")
        .filter(|data| !data.is_undefined() && !data.is_null())
        .and_then(|data| from_js(data).ok());

    RpcError { code, message, data }
}
