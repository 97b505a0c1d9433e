//! Test doubles and common utilities for contract tests
//!
//! This module provides a scripted lookup service and helpers for driving a
//! controller over an in-memory form.

#![allow(dead_code)]

use formmask_core::error::{Error, Result};
use formmask_core::traits::{Address, AddressLookup, LookupResponse};
use formmask_core::{Cep, FormConfig, FormController, FormEvent, MemoryForm, MemoryFormHandle};
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Every field the default configuration binds
pub const ALL_FIELDS: [&str; 6] = ["cpf", "telefone", "cep", "endereco", "cidade", "estado"];

/// One scripted answer
#[derive(Clone)]
pub struct Scripted {
    pub response: std::result::Result<LookupResponse, String>,
    pub delay: Duration,
}

/// A lookup service that answers from a script and records its calls
///
/// When the script runs out it answers `NotFound`.
pub struct ScriptedLookup {
    script: std::sync::Mutex<VecDeque<Scripted>>,
    calls: AtomicUsize,
    ceps: std::sync::Mutex<Vec<String>>,
}

impl ScriptedLookup {
    pub fn new() -> Self {
        Self {
            script: std::sync::Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
            ceps: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Queue a found address answered after `delay`
    pub fn found_after(self, address: Address, delay: Duration) -> Self {
        self.push(Ok(LookupResponse::Found(address)), delay)
    }

    /// Queue an immediate found address
    pub fn found(self, address: Address) -> Self {
        self.found_after(address, Duration::ZERO)
    }

    /// Queue an immediate not-found answer
    pub fn not_found(self) -> Self {
        self.push(Ok(LookupResponse::NotFound), Duration::ZERO)
    }

    /// Queue an immediate failure
    pub fn failing(self, message: &str) -> Self {
        self.push(Err(message.to_string()), Duration::ZERO)
    }

    fn push(self, response: std::result::Result<LookupResponse, String>, delay: Duration) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back(Scripted { response, delay });
        self
    }

    /// Number of lookups performed
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// CEPs looked up, in call order
    pub fn looked_up(&self) -> Vec<String> {
        self.ceps.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl AddressLookup for ScriptedLookup {
    async fn lookup(&self, cep: &Cep) -> Result<LookupResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.ceps.lock().unwrap().push(cep.as_str().to_string());

        let next = self.script.lock().unwrap().pop_front();
        let Some(scripted) = next else {
            return Ok(LookupResponse::NotFound);
        };

        if !scripted.delay.is_zero() {
            tokio::time::sleep(scripted.delay).await;
        }

        scripted.response.map_err(|message| Error::service("scripted", message))
    }

    fn service_name(&self) -> &'static str {
        "scripted"
    }
}

/// The address ViaCEP returns for 01001-000
pub fn se_address() -> Address {
    Address {
        postal_code: "01001-000".to_string(),
        street: "Praça da Sé".to_string(),
        neighborhood: "Sé".to_string(),
        city: "São Paulo".to_string(),
        state: "SP".to_string(),
    }
}

/// Another address, for telling lookups apart
pub fn paulista_address() -> Address {
    Address {
        postal_code: "01310-100".to_string(),
        street: "Avenida Paulista".to_string(),
        neighborhood: "Bela Vista".to_string(),
        city: "São Paulo".to_string(),
        state: "SP".to_string(),
    }
}

/// Bind a controller over a memory form with `ids` and spawn it
pub fn start(
    ids: &[&str],
    lookup: Arc<ScriptedLookup>,
) -> (
    MemoryFormHandle,
    JoinHandle<Result<()>>,
    mpsc::Receiver<FormEvent>,
) {
    let (form, handle) = MemoryForm::new(ids.iter().copied());
    let (controller, events) =
        FormController::bind(Arc::new(form), lookup, FormConfig::default())
            .expect("controller binds");

    let task = tokio::spawn(async move { controller.run().await });
    (handle, task, events)
}

/// Give the controller and lookup tasks time to process queued work
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}

/// Collect every event until all senders are gone
pub async fn drain(mut events: mpsc::Receiver<FormEvent>) -> Vec<FormEvent> {
    let mut collected = Vec::new();
    while let Some(event) = events.recv().await {
        collected.push(event);
    }
    collected
}

/// The statuses of all `LookupFinished` events
pub fn lookup_statuses(events: &[FormEvent]) -> Vec<formmask_core::LookupStatus> {
    events
        .iter()
        .filter_map(|event| match event {
            FormEvent::LookupFinished { status, .. } => Some(status.clone()),
            _ => None,
        })
        .collect()
}
