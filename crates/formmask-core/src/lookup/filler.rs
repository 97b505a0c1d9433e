// # Address Filler
//
// Runs one lookup per focus-loss and writes street, city and state.
//
// ## In-flight token
//
// Every lookup that reaches the service takes the next token. When the
// response arrives the filler writes only if its token is still the latest;
// otherwise a newer lookup owns the fields and this one reports `Superseded`.
// The token check and the field writes happen under the same lock.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, error, info, trace, warn};

use crate::config::FieldIds;
use crate::lookup::{Cep, LookupStatus};
use crate::mask::digits_only;
use crate::traits::{Address, AddressLookup, Form, FormField, LookupResponse};

/// The fields a successful lookup writes to
///
/// Each one is optional: a form without a city field still gets its street
/// and state filled.
#[derive(Clone, Default)]
pub struct OutputFields {
    /// Receives the street name
    pub street: Option<Arc<dyn FormField>>,
    /// Receives the city
    pub city: Option<Arc<dyn FormField>>,
    /// Receives the state code
    pub state: Option<Arc<dyn FormField>>,
}

impl OutputFields {
    /// Resolve the output fields named in `ids` on `form`
    pub fn resolve(form: &dyn Form, ids: &FieldIds) -> Self {
        Self {
            street: form.field(&ids.street),
            city: form.field(&ids.city),
            state: form.field(&ids.state),
        }
    }

    /// Number of output fields present
    pub fn len(&self) -> usize {
        [&self.street, &self.city, &self.state]
            .iter()
            .filter(|field| field.is_some())
            .count()
    }

    /// Whether no output field is present
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn write(&self, address: &Address) {
        let pairs = [
            (&self.street, &address.street),
            (&self.city, &address.city),
            (&self.state, &address.state),
        ];
        for (field, value) in pairs {
            if let Some(field) = field {
                field.set_value(value);
            }
        }
    }
}

/// Looks up a CEP and fills the output fields
pub struct AddressFiller {
    service: Arc<dyn AddressLookup>,
    outputs: OutputFields,
    latest: Mutex<u64>,
}

impl AddressFiller {
    /// Create a filler writing to `outputs`
    pub fn new(service: Arc<dyn AddressLookup>, outputs: OutputFields) -> Self {
        Self {
            service,
            outputs,
            latest: Mutex::new(0),
        }
    }

    /// Name of the underlying lookup service
    pub fn service_name(&self) -> &'static str {
        self.service.service_name()
    }

    /// Normalize `raw`, look it up, and write the result
    ///
    /// Never fails: every outcome, including transport errors, is reported
    /// through the returned [`LookupStatus`].
    pub async fn fill(&self, raw: &str) -> LookupStatus {
        let Some(cep) = Cep::parse(raw) else {
            let digits = digits_only(raw).len();
            trace!("CEP has {} digits, skipping lookup", digits);
            return LookupStatus::Incomplete { digits };
        };

        let token = {
            let mut latest = self.latest.lock().await;
            *latest += 1;
            *latest
        };

        debug!(
            "Looking up CEP {} via {} (token {})",
            cep,
            self.service.service_name(),
            token
        );
        let response = self.service.lookup(&cep).await;

        let latest = self.latest.lock().await;
        if *latest != token {
            debug!(
                "Lookup for CEP {} superseded (token {}, latest {})",
                cep, token, *latest
            );
            return LookupStatus::Superseded { cep };
        }

        match response {
            Ok(LookupResponse::Found(address)) => {
                self.outputs.write(&address);
                info!(
                    "Filled address for CEP {}: {}, {}/{}",
                    cep, address.street, address.city, address.state
                );
                LookupStatus::Filled(address)
            }
            Ok(LookupResponse::NotFound) => {
                warn!("CEP {} not found by {}", cep, self.service.service_name());
                LookupStatus::NotFound { cep }
            }
            Err(e) => {
                error!("Failed to look up CEP {}: {}", cep, e);
                LookupStatus::Unavailable {
                    cep,
                    error: e.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::MemoryForm;
    use async_trait::async_trait;

    struct FixedLookup(LookupResponse);

    #[async_trait]
    impl AddressLookup for FixedLookup {
        async fn lookup(&self, _cep: &Cep) -> crate::Result<LookupResponse> {
            Ok(self.0.clone())
        }

        fn service_name(&self) -> &'static str {
            "fixed"
        }
    }

    #[test]
    fn test_output_fields_resolve_partial() {
        let (form, _handle) = MemoryForm::new(["endereco", "estado"]);
        let outputs = OutputFields::resolve(&form, &FieldIds::default());
        assert_eq!(outputs.len(), 2);
        assert!(outputs.city.is_none());
        assert!(OutputFields::default().is_empty());
    }

    #[tokio::test]
    async fn test_fill_writes_present_fields_only() {
        let (form, handle) = MemoryForm::new(["endereco", "estado"]);
        let address = Address {
            street: "Praça da Sé".to_string(),
            city: "São Paulo".to_string(),
            state: "SP".to_string(),
            ..Address::default()
        };
        let filler = AddressFiller::new(
            Arc::new(FixedLookup(LookupResponse::Found(address.clone()))),
            OutputFields::resolve(&form, &FieldIds::default()),
        );

        let status = filler.fill("01001-000").await;
        assert_eq!(status, LookupStatus::Filled(address));
        assert_eq!(handle.value("endereco").as_deref(), Some("Praça da Sé"));
        assert_eq!(handle.value("estado").as_deref(), Some("SP"));
        assert_eq!(filler.service_name(), "fixed");
    }

    #[tokio::test]
    async fn test_fill_incomplete() {
        let filler = AddressFiller::new(
            Arc::new(FixedLookup(LookupResponse::NotFound)),
            OutputFields::default(),
        );
        assert_eq!(
            filler.fill("0100-10").await,
            LookupStatus::Incomplete { digits: 6 }
        );
    }
}
