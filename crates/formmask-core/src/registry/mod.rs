//! Plugin-based lookup registry
//!
//! The registry allows address lookup services to be registered at runtime
//! and chosen from configuration, avoiding hardcoded if-else chains.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use formmask_core::{LookupConfig, LookupRegistry};
//!
//! let registry = LookupRegistry::new();
//! formmask_viacep::register(&registry);
//!
//! let service = registry.create_lookup(&LookupConfig::default())?;
//! ```

use crate::config::LookupConfig;
use crate::error::{Error, Result};
use crate::traits::{AddressLookup, AddressLookupFactory};
use std::collections::HashMap;
use std::sync::RwLock;

/// Registry of lookup service factories keyed by type name
///
/// ## Thread Safety
///
/// The registry uses interior mutability with RwLock, allowing concurrent
/// reads and exclusive writes.
#[derive(Default)]
pub struct LookupRegistry {
    lookups: RwLock<HashMap<String, Box<dyn AddressLookupFactory>>>,
}

impl LookupRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a lookup factory
    ///
    /// # Parameters
    ///
    /// - `name`: Lookup type name (e.g., "viacep")
    /// - `factory`: Factory object for creating lookup instances
    pub fn register_lookup(&self, name: impl Into<String>, factory: Box<dyn AddressLookupFactory>) {
        let name = name.into();
        let mut lookups = self
            .lookups
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        lookups.insert(name, factory);
    }

    /// Create a lookup service from configuration
    ///
    /// # Returns
    ///
    /// - `Ok(Box<dyn AddressLookup>)`: Created lookup instance
    /// - `Err(Error)`: If the type is not registered or creation fails
    pub fn create_lookup(&self, config: &LookupConfig) -> Result<Box<dyn AddressLookup>> {
        let lookup_type = config.type_name();
        let lookups = self
            .lookups
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let factory = lookups
            .get(lookup_type)
            .ok_or_else(|| Error::config(format!("Unknown lookup type: {}", lookup_type)))?;

        factory.create(config)
    }

    /// List all registered lookup types
    pub fn list_lookups(&self) -> Vec<String> {
        let lookups = self
            .lookups
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        lookups.keys().cloned().collect()
    }

    /// Check if a lookup type is registered
    pub fn has_lookup(&self, name: &str) -> bool {
        let lookups = self
            .lookups
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        lookups.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::Cep;
    use crate::traits::LookupResponse;

    struct NullLookup;

    #[async_trait::async_trait]
    impl AddressLookup for NullLookup {
        async fn lookup(&self, _cep: &Cep) -> Result<LookupResponse> {
            Ok(LookupResponse::NotFound)
        }

        fn service_name(&self) -> &'static str {
            "null"
        }
    }

    struct NullFactory;

    impl AddressLookupFactory for NullFactory {
        fn create(&self, _config: &LookupConfig) -> Result<Box<dyn AddressLookup>> {
            Ok(Box::new(NullLookup))
        }
    }

    #[test]
    fn test_registry_registration() {
        let registry = LookupRegistry::new();

        assert!(!registry.has_lookup("null"));

        registry.register_lookup("null", Box::new(NullFactory));

        assert!(registry.has_lookup("null"));
        assert!(registry.list_lookups().contains(&"null".to_string()));
    }

    #[test]
    fn test_create_from_custom_config() {
        let registry = LookupRegistry::new();
        registry.register_lookup("null", Box::new(NullFactory));

        let config = LookupConfig::Custom {
            factory: "null".to_string(),
            config: serde_json::json!({}),
        };
        let lookup = registry.create_lookup(&config).unwrap();
        assert_eq!(lookup.service_name(), "null");
    }

    #[test]
    fn test_unknown_type() {
        let registry = LookupRegistry::new();
        let result = registry.create_lookup(&LookupConfig::default());
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
