//! Input masks
//!
//! Pure formatters for the three masked fields. Each one strips every
//! non-digit, keeps at most as many digits as its layout holds, and
//! re-inserts separators by position:
//!
//! | Mask  | Layout             | Digits |
//! |-------|--------------------|--------|
//! | CPF   | `DDD.DDD.DDD-DD`   | 11     |
//! | Phone | `(DD) DDDDD-DDDD`  | 11     |
//! | CEP   | `DDDDD-DDD`        | 8      |
//!
//! Partial input gives partially punctuated output, which is what a field
//! being typed into should show. No checksum validation is performed.
//!
//! ```rust
//! use formmask_core::mask::{format_cep, format_cpf, format_phone};
//!
//! assert_eq!(format_cpf("12345678901"), "123.456.789-01");
//! assert_eq!(format_phone("11987654321"), "(11) 98765-4321");
//! assert_eq!(format_cep("01001000"), "01001-000");
//! ```

pub mod binder;

pub use binder::{Formatter, MaskBinding};

/// Digits in a CPF
pub const CPF_DIGITS: usize = 11;

/// Digits in a mobile phone number including the area code
pub const PHONE_DIGITS: usize = 11;

/// Digits in a CEP
pub const CEP_DIGITS: usize = 8;

/// Phone digits after the area code needed before the dash is inserted
const PHONE_DASH_MIN_LOCAL_DIGITS: usize = 9;

/// The masks a form knows how to apply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mask {
    /// Brazilian taxpayer number
    Cpf,
    /// Phone number with area code
    Phone,
    /// Brazilian postal code
    Cep,
}

impl Mask {
    /// Format `raw` with this mask
    pub fn apply(&self, raw: &str) -> String {
        (self.formatter())(raw)
    }

    /// The formatter function backing this mask
    pub fn formatter(&self) -> Formatter {
        match self {
            Mask::Cpf => format_cpf,
            Mask::Phone => format_phone,
            Mask::Cep => format_cep,
        }
    }

    /// Maximum number of digits kept
    pub fn max_digits(&self) -> usize {
        match self {
            Mask::Cpf => CPF_DIGITS,
            Mask::Phone => PHONE_DIGITS,
            Mask::Cep => CEP_DIGITS,
        }
    }

    /// Short name used in logs and events
    pub fn name(&self) -> &'static str {
        match self {
            Mask::Cpf => "cpf",
            Mask::Phone => "phone",
            Mask::Cep => "cep",
        }
    }
}

impl std::fmt::Display for Mask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Remove every character that is not an ASCII digit
pub fn digits_only(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

fn leading_digits(raw: &str, max: usize) -> String {
    raw.chars().filter(char::is_ascii_digit).take(max).collect()
}

/// Format a CPF as `DDD.DDD.DDD-DD`
pub fn format_cpf(raw: &str) -> String {
    let digits = leading_digits(raw, CPF_DIGITS);
    let mut out = String::with_capacity(digits.len() + 3);

    for (i, c) in digits.chars().enumerate() {
        match i {
            3 | 6 => out.push('.'),
            9 => out.push('-'),
            _ => {}
        }
        out.push(c);
    }

    out
}

/// Format a phone number as `(DD) DDDDD-DDDD`
///
/// The area code is wrapped once a third digit exists. The dash only
/// appears for a full nine-digit local number, so ten-digit input stays
/// `(DD) DDDDDDDD`.
pub fn format_phone(raw: &str) -> String {
    let digits = leading_digits(raw, PHONE_DIGITS);
    if digits.len() < 3 {
        return digits;
    }

    let (area, local) = digits.split_at(2);
    if local.len() < PHONE_DASH_MIN_LOCAL_DIGITS {
        return format!("({}) {}", area, local);
    }

    let (head, tail) = local.split_at(local.len() - 4);
    format!("({}) {}-{}", area, head, tail)
}

/// Format a CEP as `DDDDD-DDD`
pub fn format_cep(raw: &str) -> String {
    let digits = leading_digits(raw, CEP_DIGITS);
    if digits.len() <= 5 {
        return digits;
    }

    let (head, tail) = digits.split_at(5);
    format!("{}-{}", head, tail)
}
