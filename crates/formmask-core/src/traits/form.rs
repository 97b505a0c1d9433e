// # Form Traits
//
// Defines the page surface the controller works against.
//
// ## Implementations
//
// - In-memory: `formmask_core::form::MemoryForm`
// - Future: a wasm/DOM-backed form
//
// ## Usage
//
// ```rust,ignore
// use formmask_core::Form;
// use tokio_stream::StreamExt;
//
// let form = /* Form implementation */;
//
// if let Some(cep) = form.field("cep") {
//     println!("current CEP: {}", cep.value());
// }
//
// let mut events = form.watch();
// while let Some(event) = events.next().await {
//     println!("{:?}", event);
// }
// ```

use std::pin::Pin;
use std::sync::Arc;
use tokio_stream::Stream;

/// What happened to a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldEventKind {
    /// The user changed the field's content
    Input,
    /// The field lost focus
    Blur,
}

/// A user interaction on a single field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldEvent {
    /// Identifier of the field the event targets
    pub field: String,
    /// Kind of interaction
    pub kind: FieldEventKind,
}

impl FieldEvent {
    /// Create an input event for `field`
    pub fn input(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            kind: FieldEventKind::Input,
        }
    }

    /// Create a focus-loss event for `field`
    pub fn blur(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            kind: FieldEventKind::Blur,
        }
    }
}

/// A single text field
///
/// Reads and writes are synchronous, like assigning a DOM input's value.
/// Implementations must be thread-safe: lookup tasks write output fields
/// from outside the controller task.
pub trait FormField: Send + Sync {
    /// Field identifier
    fn id(&self) -> &str;

    /// Current displayed value
    fn value(&self) -> String;

    /// Replace the displayed value
    fn set_value(&self, value: &str);
}

/// A form: a set of fields addressable by identifier plus an event stream
pub trait Form: Send + Sync {
    /// Resolve a field by identifier
    ///
    /// # Returns
    ///
    /// `None` when the form has no such field. Callers treat that as
    /// "nothing to bind", never as an error.
    fn field(&self, id: &str) -> Option<Arc<dyn FormField>>;

    /// Watch for field events
    ///
    /// Returns a stream yielding input and focus-loss events in the order the
    /// user produced them. The stream ends when the form goes away.
    fn watch(&self) -> Pin<Box<dyn Stream<Item = FieldEvent> + Send + 'static>>;
}
