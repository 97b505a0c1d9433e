// # Mask Binder
//
// Ties a formatter to a field. The controller calls [`MaskBinding::apply`]
// for every input event on the bound field; the field's value is replaced
// with the formatter's output each time, even when nothing changed.

use std::sync::Arc;

use crate::mask::Mask;
use crate::traits::{Form, FormField};

/// A pure string-to-string formatter
pub type Formatter = fn(&str) -> String;

/// A formatter bound to one field
#[derive(Clone)]
pub struct MaskBinding {
    field: Arc<dyn FormField>,
    formatter: Formatter,
    name: &'static str,
}

impl std::fmt::Debug for MaskBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MaskBinding")
            .field("field", &self.field.id())
            .field("name", &self.name)
            .finish()
    }
}

impl MaskBinding {
    /// Bind an arbitrary formatter to a field
    pub fn new(field: Arc<dyn FormField>, name: &'static str, formatter: Formatter) -> Self {
        Self {
            field,
            formatter,
            name,
        }
    }

    /// Bind one of the built-in masks to a field
    pub fn for_mask(field: Arc<dyn FormField>, mask: Mask) -> Self {
        Self::new(field, mask.name(), mask.formatter())
    }

    /// Resolve `id` on `form` and bind `mask` to it
    ///
    /// Returns `None` when the form has no such field.
    pub fn attach(form: &dyn Form, id: &str, mask: Mask) -> Option<Self> {
        form.field(id).map(|field| Self::for_mask(field, mask))
    }

    /// Identifier of the bound field
    pub fn field_id(&self) -> &str {
        self.field.id()
    }

    /// Name of the bound mask
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Reformat the field's current value in place
    ///
    /// # Returns
    ///
    /// The value written to the field
    pub fn apply(&self) -> String {
        let formatted = (self.formatter)(&self.field.value());
        self.field.set_value(&formatted);
        formatted
    }
}
