//! CEP address lookup
//!
//! - [`Cep`]: an 8-digit postal code, the only key a lookup service accepts
//! - [`LookupStatus`]: what one focus-loss lookup ended with
//! - [`AddressFiller`]: runs a lookup and writes the output fields
//!
//! ## Outcomes
//!
//! ```text
//! raw CEP ── strip non-digits ── len != 8 ──▶ Incomplete   (silent)
//!                 │
//!                 ▼
//!        AddressLookup::lookup
//!                 │
//!     ┌───────────┼──────────────┬──────────────────┐
//!     ▼           ▼              ▼                  ▼
//!   Found      NotFound        Err          newer lookup started
//!     │           │              │                  │
//!  Filled     NotFound      Unavailable        Superseded
//! (writes)    (alert)    (logged + alert)      (silent)
//! ```

pub mod filler;

pub use filler::{AddressFiller, OutputFields};

use crate::mask::{CEP_DIGITS, digits_only};
use crate::traits::Address;

/// Message shown when the service does not know the CEP
pub const NOT_FOUND_MESSAGE: &str = "CEP não encontrado. Verifique e tente novamente.";

/// Message shown when the service could not be reached or understood
pub const UNAVAILABLE_MESSAGE: &str = "Erro ao buscar o CEP. Verifique sua conexão.";

/// A normalized 8-digit CEP
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cep(String);

impl Cep {
    /// Normalize `raw` into a CEP
    ///
    /// Every non-digit is dropped first, so `"01001-000"` and `" 01001000 "`
    /// both parse. Returns `None` unless exactly 8 digits remain.
    pub fn parse(raw: &str) -> Option<Self> {
        let digits = digits_only(raw);
        if digits.len() == CEP_DIGITS {
            Some(Self(digits))
        } else {
            None
        }
    }

    /// The 8 digits
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The CEP in `DDDDD-DDD` form
    pub fn formatted(&self) -> String {
        crate::mask::format_cep(&self.0)
    }
}

impl std::fmt::Display for Cep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Cep {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| {
            crate::Error::invalid_input(format!("CEP must have {} digits: {:?}", CEP_DIGITS, s))
        })
    }
}

/// Outcome of one lookup trigger
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupStatus {
    /// Fewer or more than 8 digits; no request was made
    Incomplete {
        /// Digits present after normalization
        digits: usize,
    },

    /// The address was found and written to the output fields
    Filled(Address),

    /// The service does not know this CEP; nothing was written
    NotFound { cep: Cep },

    /// The request or its response failed; nothing was written
    Unavailable { cep: Cep, error: String },

    /// A newer lookup for the same field started first; nothing was written
    Superseded { cep: Cep },
}

impl LookupStatus {
    /// User-facing message for this outcome, if the user should be told
    pub fn alert(&self) -> Option<&'static str> {
        match self {
            LookupStatus::NotFound { .. } => Some(NOT_FOUND_MESSAGE),
            LookupStatus::Unavailable { .. } => Some(UNAVAILABLE_MESSAGE),
            LookupStatus::Incomplete { .. }
            | LookupStatus::Filled(_)
            | LookupStatus::Superseded { .. } => None,
        }
    }

    /// Whether the output fields were written
    pub fn is_filled(&self) -> bool {
        matches!(self, LookupStatus::Filled(_))
    }
}
