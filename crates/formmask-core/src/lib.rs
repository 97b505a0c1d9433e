// # formmask-core
//
// Core library for live form masks and CEP address auto-fill.
//
// ## Architecture Overview
//
// - **Form / FormField**: Traits for the page surface (fields by id, event stream)
// - **AddressLookup**: Trait for resolving a CEP into an address
// - **mask**: Pure CPF, phone and CEP formatters plus the binder that applies them
// - **AddressFiller**: Normalizes a CEP, calls the lookup once, writes output fields
// - **FormController**: Resolves fields, binds masks and the lookup trigger, runs the event loop
// - **LookupRegistry**: Plugin-based registry for lookup implementations
//
// ## Design Principles
//
// 1. **Injected surface**: The controller never reaches for ambient globals
// 2. **Event-Driven**: Field input and focus-loss arrive as an async stream
// 3. **Status over alerts**: Lookups return a status, presentation decides what to show
// 4. **Library-First**: The console binary is a thin layer over this crate

pub mod traits;
pub mod mask;
pub mod lookup;
pub mod controller;
pub mod registry;
pub mod config;
pub mod error;
pub mod form;

// Re-export core types for convenience
pub use traits::{AddressLookup, Form, FormField};
pub use mask::Mask;
pub use lookup::{AddressFiller, Cep, LookupStatus};
pub use controller::{FormController, FormEvent};
pub use registry::LookupRegistry;
pub use config::{ControllerConfig, FieldIds, FormConfig, LookupConfig};
pub use error::{Error, Result};
pub use form::{MemoryForm, MemoryFormHandle};
