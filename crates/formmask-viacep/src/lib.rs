// # ViaCEP Address Lookup
//
// This crate provides the ViaCEP implementation of `AddressLookup`.
//
// ## Behaviour
//
// - One GET per lookup: `{base_url}/ws/{cep}/json/`
// - No authentication, no retry, no caching
// - No timeout unless one is configured
// - `erro` in the body is evaluated the way a JavaScript caller would
//   (`true`, `"true"`, non-zero numbers and non-empty strings all count)
//
// ## API Reference
//
// - ViaCEP: https://viacep.com.br
// - Lookup: GET `/ws/:cep/json/`
//
// ```json
// {
//   "cep": "01001-000",
//   "logradouro": "Praça da Sé",
//   "bairro": "Sé",
//   "localidade": "São Paulo",
//   "uf": "SP"
// }
// ```
//
// An unknown CEP answers 200 with `{ "erro": true }`.

use async_trait::async_trait;
use formmask_core::config::{DEFAULT_VIACEP_BASE_URL, LookupConfig};
use formmask_core::traits::{Address, AddressLookup, AddressLookupFactory, LookupResponse};
use formmask_core::{Cep, Error, LookupRegistry, Result};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

/// Service name used in errors and logs
const SERVICE: &str = "viacep";

/// Body returned by `/ws/:cep/json/`
#[derive(Debug, Default, Deserialize)]
struct ViaCepResponse {
    #[serde(default)]
    cep: Option<String>,
    #[serde(default)]
    logradouro: Option<String>,
    #[serde(default)]
    bairro: Option<String>,
    #[serde(default)]
    localidade: Option<String>,
    #[serde(default)]
    uf: Option<String>,
    #[serde(default)]
    erro: Option<Value>,
}

impl ViaCepResponse {
    fn into_response(self) -> LookupResponse {
        if self.erro.as_ref().is_some_and(is_truthy) {
            return LookupResponse::NotFound;
        }

        LookupResponse::Found(Address {
            postal_code: self.cep.unwrap_or_default(),
            street: self.logradouro.unwrap_or_default(),
            neighborhood: self.bairro.unwrap_or_default(),
            city: self.localidade.unwrap_or_default(),
            state: self.uf.unwrap_or_default(),
        })
    }
}

/// JavaScript truthiness of a JSON value
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// ViaCEP lookup client
#[derive(Debug, Clone)]
pub struct ViaCepLookup {
    /// Base URL without trailing slash
    base_url: String,

    /// HTTP client for API requests
    client: reqwest::Client,
}

impl ViaCepLookup {
    /// Create a client for `base_url`
    ///
    /// # Parameters
    ///
    /// - `base_url`: Service root, e.g. `https://viacep.com.br`
    /// - `timeout`: Optional request timeout
    ///
    /// # Returns
    ///
    /// - `Ok(ViaCepLookup)`: Ready client
    /// - `Err(Error)`: If the HTTP client cannot be built
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self { base_url, client })
    }

    /// Client for the public ViaCEP service without a timeout
    pub fn public() -> Result<Self> {
        Self::new(DEFAULT_VIACEP_BASE_URL, None)
    }

    /// The URL looked up for `cep`
    pub fn endpoint(&self, cep: &Cep) -> String {
        format!("{}/ws/{}/json/", self.base_url, cep.as_str())
    }
}

#[async_trait]
impl AddressLookup for ViaCepLookup {
    /// Look up a CEP with a single GET
    ///
    /// # API Call
    ///
    /// ```http
    /// GET /ws/01001000/json/
    /// ```
    async fn lookup(&self, cep: &Cep) -> Result<LookupResponse> {
        let url = self.endpoint(cep);
        tracing::debug!("Requesting {}", url);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| Error::http(format!("ViaCEP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());

            return match status.as_u16() {
                400 => Err(Error::service(
                    SERVICE,
                    format!("Bad request for CEP {}. Status: {}", cep, status),
                )),
                429 => Err(Error::service(
                    SERVICE,
                    format!("Rate limit exceeded. Status: {}", status),
                )),
                500..=599 => Err(Error::service(
                    SERVICE,
                    format!("ViaCEP server error (transient): {} - {}", status, error_text),
                )),
                _ => Err(Error::service(
                    SERVICE,
                    format!("Lookup failed: {} - {}", status, error_text),
                )),
            };
        }

        let text = response
            .text()
            .await
            .map_err(|e| Error::http(format!("Failed to read ViaCEP response: {}", e)))?;
        let body: ViaCepResponse = serde_json::from_str(&text)?;

        let result = body.into_response();
        if result == LookupResponse::NotFound {
            tracing::debug!("ViaCEP reports CEP {} as unknown", cep);
        }
        Ok(result)
    }

    fn service_name(&self) -> &'static str {
        SERVICE
    }
}

/// Factory for creating ViaCEP lookups
pub struct ViaCepFactory;

impl AddressLookupFactory for ViaCepFactory {
    fn create(&self, config: &LookupConfig) -> Result<Box<dyn AddressLookup>> {
        match config {
            LookupConfig::ViaCep {
                base_url,
                timeout_secs,
            } => {
                if base_url.is_empty() {
                    return Err(Error::config("ViaCEP base URL is required"));
                }

                let timeout = timeout_secs.map(Duration::from_secs);
                Ok(Box::new(ViaCepLookup::new(base_url.clone(), timeout)?))
            }
            _ => Err(Error::config("Invalid config for ViaCEP lookup")),
        }
    }
}

/// Register the ViaCEP lookup with a registry
///
/// # Example
///
/// ```rust
/// use formmask_core::LookupRegistry;
///
/// let registry = LookupRegistry::new();
/// formmask_viacep::register(&registry);
/// assert!(registry.has_lookup("viacep"));
/// ```
pub fn register(registry: &LookupRegistry) {
    registry.register_lookup(SERVICE, Box::new(ViaCepFactory));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_creation() {
        let factory = ViaCepFactory;
        let lookup = factory.create(&LookupConfig::default());
        assert!(lookup.is_ok());
        assert_eq!(lookup.unwrap().service_name(), "viacep");
    }

    #[test]
    fn test_factory_rejects_other_config() {
        let config = LookupConfig::Custom {
            factory: "brasilapi".to_string(),
            config: serde_json::json!({}),
        };
        assert!(ViaCepFactory.create(&config).is_err());
    }

    #[test]
    fn test_factory_rejects_empty_url() {
        let config = LookupConfig::ViaCep {
            base_url: String::new(),
            timeout_secs: None,
        };
        assert!(ViaCepFactory.create(&config).is_err());
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let lookup = ViaCepLookup::new("http://localhost:8080/", None).unwrap();
        let cep = Cep::parse("01001-000").unwrap();
        assert_eq!(lookup.endpoint(&cep), "http://localhost:8080/ws/01001000/json/");
    }

    #[test]
    fn test_truthiness() {
        assert!(is_truthy(&serde_json::json!(true)));
        assert!(is_truthy(&serde_json::json!("true")));
        assert!(is_truthy(&serde_json::json!(1)));
        assert!(is_truthy(&serde_json::json!({})));
        assert!(!is_truthy(&serde_json::json!(false)));
        assert!(!is_truthy(&serde_json::json!("")));
        assert!(!is_truthy(&serde_json::json!(0)));
        assert!(!is_truthy(&Value::Null));
    }

    #[test]
    fn test_erro_false_is_found() {
        let body: ViaCepResponse = serde_json::from_value(serde_json::json!({
            "logradouro": "Praça da Sé",
            "localidade": "São Paulo",
            "uf": "SP",
            "erro": false
        }))
        .unwrap();

        match body.into_response() {
            LookupResponse::Found(address) => {
                assert_eq!(address.street, "Praça da Sé");
                assert_eq!(address.neighborhood, "");
            }
            other => panic!("expected Found, got {:?}", other),
        }
    }

    #[test]
    fn test_null_fields_become_empty() {
        let body: ViaCepResponse = serde_json::from_value(serde_json::json!({
            "logradouro": null,
            "localidade": "Brasília",
            "uf": "DF"
        }))
        .unwrap();

        let LookupResponse::Found(address) = body.into_response() else {
            panic!("expected Found");
        };
        assert_eq!(address.street, "");
        assert_eq!(address.city, "Brasília");
    }
}
