#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::Value;

use zos_lens::config::NetworkEnv;
use zos_lens::rmb::{
    BusFuture, ClientParams, RequestOptions, RmbClient, RmbConnector, SessionSettings,
};
use zos_lens::{Lens, NodeSelection};

#[derive(Debug, Clone, PartialEq)]
pub struct SentRequest {
    pub command: String,
    pub payload: String,
    pub destination: u32,
    pub expiration_hours: f64,
    pub retries: u32,
}

/// Bus double that answers reads from a script, in order.
#[derive(Default)]
pub struct ScriptedBus {
    replies: Mutex<VecDeque<Result<Value, String>>>,
    sent: Mutex<Vec<SentRequest>>,
    connects: AtomicUsize,
    disconnects: AtomicUsize,
}

impl ScriptedBus {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reply(self: &Arc<Self>, value: Value) -> Arc<Self> {
        self.replies.lock().unwrap().push_back(Ok(value));
        Arc::clone(self)
    }

    pub fn fail(self: &Arc<Self>, message: &str) -> Arc<Self> {
        self.replies.lock().unwrap().push_back(Err(message.to_string()));
        Arc::clone(self)
    }

    pub fn sent(&self) -> Vec<SentRequest> {
        self.sent.lock().unwrap().clone()
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn disconnects(&self) -> usize {
        self.disconnects.load(Ordering::SeqCst)
    }
}

impl RmbClient for ScriptedBus {
    fn connect(&self) -> BusFuture<'_, ()> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        Box::pin(async { Ok(()) })
    }

    fn disconnect(&self) -> BusFuture<'_, ()> {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
        Box::pin(async { Ok(()) })
    }

    fn send<'a>(
        &'a self,
        command: &'a str,
        payload: &'a str,
        destination: u32,
        expiration_hours: f64,
        retries: u32,
    ) -> BusFuture<'a, String> {
        Box::pin(async move {
            let mut sent = self.sent.lock().unwrap();
            sent.push(SentRequest {
                command: command.to_string(),
                payload: payload.to_string(),
                destination,
                expiration_hours,
                retries,
            });
            Ok(format!("req-{}", sent.len()))
        })
    }

    fn read<'a>(&'a self, _request_id: &'a str) -> BusFuture<'a, Value> {
        Box::pin(async move {
            let next = self.replies.lock().unwrap().pop_front();
            match next {
                Some(Ok(value)) => Ok(value),
                Some(Err(message)) => Err(anyhow::anyhow!(message)),
                None => anyhow::bail!("script exhausted"),
            }
        })
    }
}

/// Always hands out the same scripted bus; can be told to refuse.
pub struct ScriptedConnector {
    bus: Arc<ScriptedBus>,
    refuse_with: Option<String>,
    builds: Mutex<Vec<ClientParams>>,
}

impl ScriptedConnector {
    pub fn new(bus: Arc<ScriptedBus>) -> Arc<Self> {
        Arc::new(Self {
            bus,
            refuse_with: None,
            builds: Mutex::new(Vec::new()),
        })
    }

    pub fn refusing(bus: Arc<ScriptedBus>, message: &str) -> Arc<Self> {
        Arc::new(Self {
            bus,
            refuse_with: Some(message.to_string()),
            builds: Mutex::new(Vec::new()),
        })
    }

    pub fn builds(&self) -> usize {
        self.builds.lock().unwrap().len()
    }
}

impl RmbConnector for ScriptedConnector {
    fn name(&self) -> &str {
        "scripted"
    }

    fn build(&self, params: &ClientParams) -> anyhow::Result<Arc<dyn RmbClient>> {
        self.builds.lock().unwrap().push(params.clone());
        if let Some(message) = &self.refuse_with {
            anyhow::bail!("{message}");
        }
        Ok(Arc::clone(&self.bus) as Arc<dyn RmbClient>)
    }
}

pub const NODE_ID: u32 = 11;
pub const TWIN_ID: u32 = 89;

pub fn lens_over(connector: Arc<ScriptedConnector>) -> Lens {
    Lens::new(
        connector,
        NetworkEnv::Main,
        SessionSettings::default(),
        RequestOptions::default(),
    )
}

/// A lens with identity set and twin 89 selected.
pub async fn ready_lens(connector: Arc<ScriptedConnector>) -> Lens {
    let mut lens = lens_over(connector);
    lens.set_mnemonic(Some("scripted test words".into())).await;
    lens.select_node(Some(NodeSelection {
        node_id: NODE_ID,
        twin_id: TWIN_ID,
    }));
    lens
}
