//! Form controller
//!
//! The FormController is responsible for:
//! - Resolving the configured fields on an injected [`Form`]
//! - Binding the CPF, phone and CEP masks to their fields
//! - Binding the address lookup to the CEP field's focus-loss
//! - Dispatching field events and reporting outcomes as [`FormEvent`]s
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐
//! │    Form     │─── FieldEvent ───┐
//! └─────────────┘                  │
//!                                  ▼
//!                         ┌────────────────┐
//!                         │ FormController │
//!                         └────────────────┘
//!                                  │
//!         ┌────────────────────────┼────────────────────────┐
//!         │ Input                  │ Blur (cep)             │
//!         ▼                        ▼                        ▼
//! ┌──────────────┐        ┌───────────────┐        ┌──────────────┐
//! │ MaskBinding  │        │ AddressFiller │        │  FormEvent   │
//! │ (rewrite)    │        │ (spawned)     │        │  (notify)    │
//! └──────────────┘        └───────────────┘        └──────────────┘
//! ```
//!
//! ## Event Flow
//!
//! 1. Input on a masked field → reformat the field in place
//! 2. Blur on the CEP field → read its value, spawn a lookup task
//! 3. Lookup task finishes → emit `LookupFinished` with its status
//! 4. Form closes → wait for in-flight lookups, emit `Stopped`

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::{JoinError, JoinSet};
use tokio_stream::StreamExt;
use tracing::{debug, error, info, trace, warn};

use crate::config::FormConfig;
use crate::error::Result;
use crate::lookup::{AddressFiller, LookupStatus, OutputFields};
use crate::mask::{Mask, MaskBinding};
use crate::traits::{AddressLookup, FieldEvent, FieldEventKind, Form, FormField};

/// Events emitted by the FormController
///
/// This is the presentation layer's view of the form: it decides how to
/// show `LookupFinished` statuses (see [`LookupStatus::alert`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
    /// Controller started processing events
    Started {
        /// Ids of the fields with a mask bound, sorted
        masked_fields: Vec<String>,
        /// Whether the CEP lookup is bound
        lookup_bound: bool,
    },

    /// A mask rewrote a field
    MaskApplied { field: String, value: String },

    /// A focus-loss lookup finished
    LookupFinished { field: String, status: LookupStatus },

    /// Controller stopped
    Stopped { reason: String },
}

/// The CEP field and the filler its focus-loss triggers
struct LookupTrigger {
    field: Arc<dyn FormField>,
    filler: Arc<AddressFiller>,
}

/// Form controller
///
/// Created once per form with [`FormController::bind`], which plays the role
/// of a page-ready hook: every binding is decided there, and fields the form
/// lacks are skipped without error.
///
/// ## Lifecycle
///
/// 1. Bind with [`FormController::bind()`]
/// 2. Start with [`FormController::run()`]
/// 3. Controller runs until the form's event stream ends
///
/// ## Concurrency
///
/// Events are handled in order on one task. Each lookup runs on its own
/// task so formatting never waits for the network; overlapping lookups are
/// resolved by the filler's in-flight token.
pub struct FormController {
    form: Arc<dyn Form>,
    masks: HashMap<String, MaskBinding>,
    lookup: Option<LookupTrigger>,
    event_tx: mpsc::Sender<FormEvent>,
}

impl FormController {
    /// Bind masks and the address lookup to `form`
    ///
    /// # Parameters
    ///
    /// - `form`: The form to bind to
    /// - `lookup`: Address lookup service used on CEP focus-loss
    /// - `config`: Field identifiers and controller settings
    ///
    /// # Returns
    ///
    /// A tuple of (controller, event_receiver) where event_receiver yields form events
    pub fn bind(
        form: Arc<dyn Form>,
        lookup: Arc<dyn AddressLookup>,
        config: FormConfig,
    ) -> Result<(Self, mpsc::Receiver<FormEvent>)> {
        config.validate()?;

        let ids = &config.fields;
        let mut masks = HashMap::new();
        for (id, mask) in [
            (&ids.cpf, Mask::Cpf),
            (&ids.phone, Mask::Phone),
            (&ids.cep, Mask::Cep),
        ] {
            if let Some(binding) = MaskBinding::attach(form.as_ref(), id, mask) {
                masks.insert(id.clone(), binding);
            }
        }

        let lookup = form.field(&ids.cep).map(|field| LookupTrigger {
            field,
            filler: Arc::new(AddressFiller::new(
                lookup,
                OutputFields::resolve(form.as_ref(), ids),
            )),
        });

        let (tx, rx) = mpsc::channel(config.controller.event_channel_capacity);

        let controller = Self {
            form,
            masks,
            lookup,
            event_tx: tx,
        };

        Ok((controller, rx))
    }

    /// Ids of the fields with a mask bound, sorted
    pub fn masked_fields(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.masks.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Whether the CEP lookup is bound
    pub fn lookup_bound(&self) -> bool {
        self.lookup.is_some()
    }

    /// Run the controller
    ///
    /// Processes field events until the form's event stream ends, then waits
    /// for in-flight lookups to finish.
    pub async fn run(&self) -> Result<()> {
        self.run_internal(None).await
    }

    /// Run the controller until the stream ends or `shutdown_rx` fires
    ///
    /// On shutdown, in-flight lookups are aborted and write nothing.
    pub async fn run_with_shutdown(&self, shutdown_rx: oneshot::Receiver<()>) -> Result<()> {
        self.run_internal(Some(shutdown_rx)).await
    }

    async fn run_internal(&self, shutdown_rx: Option<oneshot::Receiver<()>>) -> Result<()> {
        self.emit_event(FormEvent::Started {
            masked_fields: self.masked_fields(),
            lookup_bound: self.lookup_bound(),
        });

        let mut field_events = self.form.watch();
        let mut lookups: JoinSet<()> = JoinSet::new();

        let shutdown = async move {
            match shutdown_rx {
                Some(rx) => {
                    let _ = rx.await;
                }
                None => std::future::pending::<()>().await,
            }
        };
        tokio::pin!(shutdown);

        // Once the form closes, keep looping until pending lookups finish so
        // the shutdown branch stays live while draining.
        let mut closed = false;

        let reason = loop {
            tokio::select! {
                event = field_events.next(), if !closed => match event {
                    Some(event) => self.handle_event(event, &mut lookups),
                    None => {
                        debug!("Form event stream ended, waiting for {} lookup(s)", lookups.len());
                        closed = true;
                        if lookups.is_empty() {
                            break "Form closed";
                        }
                    }
                },

                Some(result) = lookups.join_next(), if !lookups.is_empty() => {
                    reap(result);
                    if closed && lookups.is_empty() {
                        break "Form closed";
                    }
                }

                _ = &mut shutdown => {
                    info!("Shutdown signal received");
                    lookups.shutdown().await;
                    break "Shutdown signal";
                }
            }
        };

        self.emit_event(FormEvent::Stopped {
            reason: reason.to_string(),
        });
        info!("Form controller stopped: {}", reason);

        Ok(())
    }

    /// Dispatch one field event
    fn handle_event(&self, event: FieldEvent, lookups: &mut JoinSet<()>) {
        match event.kind {
            FieldEventKind::Input => {
                let Some(binding) = self.masks.get(&event.field) else {
                    trace!("No mask bound to field {}", event.field);
                    return;
                };

                let value = binding.apply();
                debug!("Applied {} mask to {}: {}", binding.name(), event.field, value);
                self.emit_event(FormEvent::MaskApplied {
                    field: event.field,
                    value,
                });
            }
            FieldEventKind::Blur => {
                let Some(trigger) = self
                    .lookup
                    .as_ref()
                    .filter(|trigger| trigger.field.id() == event.field)
                else {
                    trace!("No lookup bound to field {}", event.field);
                    return;
                };

                let raw = trigger.field.value();
                let filler = Arc::clone(&trigger.filler);
                let event_tx = self.event_tx.clone();
                let field = event.field;

                lookups.spawn(async move {
                    let status = filler.fill(&raw).await;
                    emit_to(&event_tx, FormEvent::LookupFinished { field, status });
                });
            }
        }
    }

    /// Emit a form event
    fn emit_event(&self, event: FormEvent) {
        emit_to(&self.event_tx, event);
    }
}

fn emit_to(tx: &mpsc::Sender<FormEvent>, event: FormEvent) {
    if let Err(mpsc::error::TrySendError::Full(_)) = tx.try_send(event) {
        warn!("Event channel full, dropping event. Consider increasing event_channel_capacity.");
    }
}

fn reap(result: std::result::Result<(), JoinError>) {
    if let Err(e) = result
        && e.is_panic()
    {
        error!("Lookup task panicked: {}", e);
    }
}
