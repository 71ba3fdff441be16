//! Scripted provider double for exercising code that talks EIP-1193.

use crate::{Eip1193Provider, RpcError};
use async_trait::async_trait;
use serde_json::Value;
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::time::Duration;

/// Replays queued responses per method and records every call.
///
/// Methods with nothing queued fail with `-32601` (method not found).
#[derive(Default)]
pub struct ScriptedProvider {
    responses: RefCell<HashMap<String, VecDeque<Result<Value, RpcError>>>>,
    calls: RefCell<Vec<(String, Value)>>,
    sleeps: RefCell<Vec<Duration>>,
}

impl ScriptedProvider {
    pub fn respond(&self, method: &str, value: Value) {
        self.push(method, Ok(value));
    }

    pub fn fail(&self, method: &str, err: RpcError) {
        self.push(method, Err(err));
    }

    fn push(&self, method: &str, response: Result<Value, RpcError>) {
        self.responses
            .borrow_mut()
            .entry(method.to_owned())
            .or_default()
            .push_back(response);
    }

    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.borrow().clone()
    }

    pub fn methods(&self) -> Vec<String> {
        self.calls.borrow().iter().map(|(method, _)| method.clone()).collect()
    }

    pub fn calls_to(&self, method: &str) -> usize {
        self.calls.borrow().iter().filter(|(called, _)| called == method).count()
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.borrow().clone()
    }
}

#[async_trait(?Send)]
impl Eip1193Provider for ScriptedProvider {
    async fn request(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        self.calls.borrow_mut().push((method.to_owned(), params));
        self.responses
            .borrow_mut()
            .get_mut(method)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| Err(RpcError::new(-32601, format!("no scripted response for {method}"))))
    }

    async fn sleep(&self, duration: Duration) {
        self.sleeps.borrow_mut().push(duration);
    }
}
