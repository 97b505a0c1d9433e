//! Configuration types for formmask
//!
//! This module defines all configuration structures used throughout the crate.

use serde::{Deserialize, Serialize};

/// Default base URL of the ViaCEP web service
pub const DEFAULT_VIACEP_BASE_URL: &str = "https://viacep.com.br";

/// Main form configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FormConfig {
    /// Field identifiers to bind
    #[serde(default)]
    pub fields: FieldIds,

    /// Address lookup service configuration
    #[serde(default)]
    pub lookup: LookupConfig,

    /// Optional controller settings
    #[serde(default)]
    pub controller: ControllerConfig,
}

impl FormConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.fields.validate()?;
        self.lookup.validate()?;
        self.controller.validate()?;
        Ok(())
    }
}

/// Identifiers of the fields the controller binds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldIds {
    /// CPF input
    #[serde(default = "default_cpf_id")]
    pub cpf: String,
    /// Phone input
    #[serde(default = "default_phone_id")]
    pub phone: String,
    /// CEP input, also the lookup trigger
    #[serde(default = "default_cep_id")]
    pub cep: String,
    /// Street output
    #[serde(default = "default_street_id")]
    pub street: String,
    /// City output
    #[serde(default = "default_city_id")]
    pub city: String,
    /// State output
    #[serde(default = "default_state_id")]
    pub state: String,
}

impl FieldIds {
    /// All identifiers in declaration order
    pub fn all(&self) -> [&str; 6] {
        [
            self.cpf.as_str(),
            self.phone.as_str(),
            self.cep.as_str(),
            self.street.as_str(),
            self.city.as_str(),
            self.state.as_str(),
        ]
    }

    /// Validate the field identifiers
    pub fn validate(&self) -> Result<(), crate::Error> {
        let ids = self.all();
        for (i, id) in ids.iter().enumerate() {
            if id.is_empty() {
                return Err(crate::Error::config("Field identifiers cannot be empty"));
            }
            if ids[..i].contains(id) {
                return Err(crate::Error::config(format!(
                    "Field identifier '{}' is used more than once",
                    id
                )));
            }
        }
        Ok(())
    }
}

impl Default for FieldIds {
    fn default() -> Self {
        Self {
            cpf: default_cpf_id(),
            phone: default_phone_id(),
            cep: default_cep_id(),
            street: default_street_id(),
            city: default_city_id(),
            state: default_state_id(),
        }
    }
}

fn default_cpf_id() -> String {
    "cpf".to_string()
}

fn default_phone_id() -> String {
    "telefone".to_string()
}

fn default_cep_id() -> String {
    "cep".to_string()
}

fn default_street_id() -> String {
    "endereco".to_string()
}

fn default_city_id() -> String {
    "cidade".to_string()
}

fn default_state_id() -> String {
    "estado".to_string()
}

/// Address lookup service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LookupConfig {
    /// ViaCEP web service
    ViaCep {
        /// Base URL; requests go to `{base_url}/ws/{cep}/json/`
        #[serde(default = "default_viacep_base_url")]
        base_url: String,
        /// Request timeout in seconds (none by default)
        #[serde(default)]
        timeout_secs: Option<u64>,
    },

    /// Custom lookup service
    Custom {
        /// Factory name to use
        factory: String,
        /// Custom configuration data
        config: serde_json::Value,
    },
}

impl LookupConfig {
    /// Validate the lookup configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            LookupConfig::ViaCep {
                base_url,
                timeout_secs,
            } => {
                if base_url.is_empty() {
                    return Err(crate::Error::config("ViaCEP base URL cannot be empty"));
                }
                if !base_url.starts_with("https://") && !base_url.starts_with("http://") {
                    return Err(crate::Error::config(format!(
                        "ViaCEP base URL must use HTTP or HTTPS scheme. Got: {}",
                        base_url
                    )));
                }
                if *timeout_secs == Some(0) {
                    return Err(crate::Error::config("ViaCEP timeout must be > 0"));
                }
                Ok(())
            }
            LookupConfig::Custom { factory, config } => {
                if factory.is_empty() {
                    return Err(crate::Error::config(
                        "Custom lookup factory cannot be empty",
                    ));
                }
                if config.is_null() {
                    return Err(crate::Error::config("Custom lookup config cannot be null"));
                }
                Ok(())
            }
        }
    }

    /// Get the lookup type name
    pub fn type_name(&self) -> &str {
        match self {
            LookupConfig::ViaCep { .. } => "viacep",
            LookupConfig::Custom { factory, .. } => factory,
        }
    }
}

impl Default for LookupConfig {
    fn default() -> Self {
        LookupConfig::ViaCep {
            base_url: default_viacep_base_url(),
            timeout_secs: None,
        }
    }
}

fn default_viacep_base_url() -> String {
    DEFAULT_VIACEP_BASE_URL.to_string()
}

/// Controller configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Capacity of the outgoing event channel
    ///
    /// When full, new events are dropped (with a warning log).
    ///
    /// Default: 1000 events
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl ControllerConfig {
    /// Validate the controller configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.event_channel_capacity == 0 {
            return Err(crate::Error::config("Event channel capacity must be > 0"));
        }
        Ok(())
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            event_channel_capacity: default_event_channel_capacity(),
        }
    }
}

fn default_event_channel_capacity() -> usize {
    1000
}
