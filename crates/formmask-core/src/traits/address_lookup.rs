// # Address Lookup Trait
//
// Defines the interface for resolving a CEP into a street address.
//
// ## Implementations
//
// - ViaCEP: `formmask-viacep` crate
// - Future: BrasilAPI, Correios
//
// ## Usage
//
// ```rust,ignore
// use formmask_core::{AddressLookup, Cep};
// use formmask_core::traits::LookupResponse;
//
// let service = /* AddressLookup implementation */;
// let cep = Cep::parse("01001-000").expect("8 digits");
//
// match service.lookup(&cep).await? {
//     LookupResponse::Found(address) => println!("{}", address.street),
//     LookupResponse::NotFound => println!("unknown CEP"),
// }
// ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::lookup::Cep;

/// An address resolved from a CEP
///
/// Absent values are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// The CEP as reported by the service (may include a separator)
    pub postal_code: String,
    /// Street name
    pub street: String,
    /// Neighborhood
    pub neighborhood: String,
    /// City
    pub city: String,
    /// Two-letter state code
    pub state: String,
}

/// Answer from a lookup service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupResponse {
    /// The service knows this CEP
    Found(Address),
    /// The service answered but does not know this CEP
    NotFound,
}

/// Trait for address lookup implementations
///
/// # Single-shot
///
/// One call to [`AddressLookup::lookup`] performs exactly one request to the
/// service. Implementations must not retry, back off, or cache: a failed
/// lookup is terminal and is reported to the user as a connectivity problem.
///
/// # Errors vs. misses
///
/// A service that answers "unknown CEP" returns `Ok(LookupResponse::NotFound)`.
/// `Err` is reserved for transport, status and parse failures.
#[async_trait]
pub trait AddressLookup: Send + Sync {
    /// Resolve a CEP
    ///
    /// # Returns
    ///
    /// - `Ok(LookupResponse::Found)`: The service returned an address
    /// - `Ok(LookupResponse::NotFound)`: The service flagged the CEP as unknown
    /// - `Err(Error)`: The request or its response could not be processed
    async fn lookup(&self, cep: &Cep) -> Result<LookupResponse, crate::Error>;

    /// Get the service name (for logging/debugging)
    fn service_name(&self) -> &'static str;
}

/// Helper trait for constructing lookup services from configuration
pub trait AddressLookupFactory: Send + Sync {
    /// Create an AddressLookup instance from configuration
    fn create(
        &self,
        config: &crate::config::LookupConfig,
    ) -> Result<Box<dyn AddressLookup>, crate::Error>;
}
