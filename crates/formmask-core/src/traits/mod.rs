//! Core traits for formmask
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`Form`] / [`FormField`]: The page surface (fields by id, input and focus-loss events)
//! - [`AddressLookup`]: Resolve a CEP into an address via an external service

pub mod form;
pub mod address_lookup;

pub use form::{FieldEvent, FieldEventKind, Form, FormField};
pub use address_lookup::{Address, AddressLookup, AddressLookupFactory, LookupResponse};
