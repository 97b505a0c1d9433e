// # Memory Form
//
// In-process implementation of Form.
//
// ## Purpose
//
// Stands in for a rendered page: fields live in memory, and a
// [`MemoryFormHandle`] plays the user by editing values and emitting input
// and focus-loss events. The event stream ends when the handle is dropped.
//
// ## When to Use
//
// - Tests of the controller and lookup wiring
// - Console or scripted front-ends

use std::collections::HashMap;
use std::pin::Pin;
use std::sync::{Arc, Mutex, RwLock};

use tokio::sync::mpsc;
use tokio_stream::Stream;
use tokio_stream::wrappers::UnboundedReceiverStream;

use crate::traits::{FieldEvent, Form, FormField};

/// A text field stored in memory
#[derive(Debug)]
pub struct MemoryField {
    id: String,
    value: RwLock<String>,
}

impl MemoryField {
    /// Create an empty field
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            value: RwLock::new(String::new()),
        }
    }
}

impl FormField for MemoryField {
    fn id(&self) -> &str {
        &self.id
    }

    fn value(&self) -> String {
        self.value
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn set_value(&self, value: &str) {
        let mut guard = self
            .value
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.clear();
        guard.push_str(value);
    }
}

type Fields = Arc<HashMap<String, Arc<MemoryField>>>;

/// In-memory form
///
/// # Example
///
/// ```rust
/// use formmask_core::form::MemoryForm;
/// use formmask_core::Form;
///
/// let (form, handle) = MemoryForm::new(["cep", "cidade"]);
/// handle.input("cep", "01001000");
///
/// assert_eq!(form.field("cep").map(|f| f.value()).as_deref(), Some("01001000"));
/// assert!(form.field("cpf").is_none());
/// ```
pub struct MemoryForm {
    fields: Fields,
    events: Mutex<Option<mpsc::UnboundedReceiver<FieldEvent>>>,
}

impl MemoryForm {
    /// Create a form with the given field identifiers
    ///
    /// # Returns
    ///
    /// A tuple of (form, handle) where the handle simulates the user
    pub fn new<I, S>(ids: I) -> (Self, MemoryFormHandle)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fields: HashMap<String, Arc<MemoryField>> = ids
            .into_iter()
            .map(|id| {
                let id = id.into();
                (id.clone(), Arc::new(MemoryField::new(id)))
            })
            .collect();
        let fields = Arc::new(fields);
        let (tx, rx) = mpsc::unbounded_channel();

        let form = Self {
            fields: Arc::clone(&fields),
            events: Mutex::new(Some(rx)),
        };
        let handle = MemoryFormHandle { fields, events: tx };

        (form, handle)
    }

    /// Identifiers of all fields, sorted
    pub fn field_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.fields.keys().cloned().collect();
        ids.sort();
        ids
    }
}

impl Form for MemoryForm {
    fn field(&self, id: &str) -> Option<Arc<dyn FormField>> {
        self.fields
            .get(id)
            .map(|field| Arc::clone(field) as Arc<dyn FormField>)
    }

    fn watch(&self) -> Pin<Box<dyn Stream<Item = FieldEvent> + Send + 'static>> {
        let rx = self
            .events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();

        match rx {
            Some(rx) => Box::pin(UnboundedReceiverStream::new(rx)),
            None => {
                tracing::warn!("MemoryForm::watch() called twice, returning an empty stream");
                Box::pin(tokio_stream::empty())
            }
        }
    }
}

/// Simulates a user interacting with a [`MemoryForm`]
///
/// Edits to unknown field ids are ignored, mirroring a page that lacks the
/// element. Events are still emitted for them.
#[derive(Clone)]
pub struct MemoryFormHandle {
    fields: Fields,
    events: mpsc::UnboundedSender<FieldEvent>,
}

impl MemoryFormHandle {
    /// Read a field's value
    pub fn value(&self, id: &str) -> Option<String> {
        self.fields.get(id).map(|field| field.value())
    }

    /// Set a field's value without emitting an event
    pub fn set_value(&self, id: &str, value: &str) {
        if let Some(field) = self.fields.get(id) {
            field.set_value(value);
        }
    }

    /// Replace a field's value and emit one input event (paste)
    pub fn input(&self, id: &str, value: &str) {
        self.set_value(id, value);
        self.emit(FieldEvent::input(id));
    }

    /// Append `text` one character at a time, emitting an input event per keystroke
    pub fn type_text(&self, id: &str, text: &str) {
        for c in text.chars() {
            if let Some(field) = self.fields.get(id) {
                let mut value = field.value();
                value.push(c);
                field.set_value(&value);
            }
            self.emit(FieldEvent::input(id));
        }
    }

    /// Emit a focus-loss event
    pub fn blur(&self, id: &str) {
        self.emit(FieldEvent::blur(id));
    }

    /// Emit an arbitrary event
    pub fn emit(&self, event: FieldEvent) {
        if self.events.send(event).is_err() {
            tracing::debug!("Form event stream closed, dropping event");
        }
    }
}
