//! In-process fakes for the ports, shared by the unit tests.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mentorlink_domain::{ApiRequest, RawResponse};
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::sync::Semaphore;

use crate::ports::{
    HttpTransport, LoginRedirect, SessionNavigator, SessionStorage, StorageError, TransportError,
};

pub const REFRESH_PATH: &str = "/auth/refresh";

/// Success envelope around `data`.
pub fn ok(data: Value) -> Result<RawResponse, TransportError> {
    Ok(RawResponse::json(
        200,
        &json!({"respCode": "0", "description": "OK", "data": data}),
    ))
}

/// Error envelope with `code`.
pub fn fail(code: &str, description: &str) -> Result<RawResponse, TransportError> {
    Ok(RawResponse::json(
        200,
        &json!({"respCode": code, "description": description, "data": null}),
    ))
}

pub fn expired() -> Result<RawResponse, TransportError> {
    fail("TOKEN_EXPIRED", "Access token expired")
}

/// Key/value storage that writes a batch one entry at a time, optionally
/// sleeping between entries.
#[derive(Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, String>>,
    write_delay: Duration,
}

impl MemoryStorage {
    pub fn with_write_delay(write_delay: Duration) -> Self {
        Self {
            values: Mutex::default(),
            write_delay,
        }
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.values.lock().get(key).cloned()
    }

    pub fn insert(&self, key: &str, value: &str) {
        self.values.lock().insert(key.to_string(), value.to_string());
    }

    pub fn remove(&self, key: &str) {
        self.values.lock().remove(key);
    }

    pub fn is_empty(&self) -> bool {
        self.values.lock().is_empty()
    }
}

#[async_trait]
impl SessionStorage for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.raw(key))
    }

    async fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), StorageError> {
        for (key, value) in entries {
            self.insert(key, value);
            if !self.write_delay.is_zero() {
                tokio::time::sleep(self.write_delay).await;
            }
        }
        Ok(())
    }

    async fn remove_many(&self, keys: &[&str]) -> Result<(), StorageError> {
        for key in keys {
            self.values.lock().remove(*key);
            if !self.write_delay.is_zero() {
                tokio::time::sleep(self.write_delay).await;
            }
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingNavigator {
    redirects: Mutex<Vec<LoginRedirect>>,
}

impl RecordingNavigator {
    pub fn redirects(&self) -> Vec<LoginRedirect> {
        self.redirects.lock().clone()
    }
}

impl SessionNavigator for RecordingNavigator {
    fn redirect_to_login(&self, reason: LoginRedirect) {
        self.redirects.lock().push(reason);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub path: String,
    pub bearer: Option<String>,
}

type Handler =
    dyn Fn(&ApiRequest, Option<&str>) -> Result<RawResponse, TransportError> + Send + Sync;

/// Transport answering through a closure and recording every call.
///
/// Calls to the refresh endpoint can be held back until the test releases
/// them through [`ScriptedTransport::release_refresh`].
pub struct ScriptedTransport {
    handler: Box<Handler>,
    calls: Mutex<Vec<RecordedCall>>,
    refresh_gate: Option<Semaphore>,
}

impl ScriptedTransport {
    pub fn new<F>(handler: F) -> Arc<Self>
    where
        F: Fn(&ApiRequest, Option<&str>) -> Result<RawResponse, TransportError>
            + Send
            + Sync
            + 'static,
    {
        Arc::new(Self {
            handler: Box::new(handler),
            calls: Mutex::default(),
            refresh_gate: None,
        })
    }

    pub fn gated<F>(handler: F) -> Arc<Self>
    where
        F: Fn(&ApiRequest, Option<&str>) -> Result<RawResponse, TransportError>
            + Send
            + Sync
            + 'static,
    {
        Arc::new(Self {
            handler: Box::new(handler),
            calls: Mutex::default(),
            refresh_gate: Some(Semaphore::new(0)),
        })
    }

    pub fn release_refresh(&self) {
        if let Some(gate) = &self.refresh_gate {
            gate.add_permits(1);
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    pub fn calls_to(&self, path: &str) -> Vec<RecordedCall> {
        self.calls().into_iter().filter(|c| c.path == path).collect()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(
        &self,
        request: &ApiRequest,
        bearer: Option<&str>,
    ) -> Result<RawResponse, TransportError> {
        self.calls.lock().push(RecordedCall {
            path: request.path.clone(),
            bearer: bearer.map(String::from),
        });

        if request.path == REFRESH_PATH
            && let Some(gate) = &self.refresh_gate
        {
            gate.acquire().await.expect("gate closed").forget();
        }

        (self.handler)(request, bearer)
    }
}
