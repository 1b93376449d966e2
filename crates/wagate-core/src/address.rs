//! Destination address normalization.
//!
//! The messaging network addresses users as `<digits>@c.us`, where the
//! digits are an international-format phone number without `+`. Callers
//! supply numbers in whatever shape their users typed; normalization strips
//! formatting, maps the local `0` prefix to the configured country code, and
//! appends the user suffix.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Messaging-domain suffix for individual users.
pub const USER_SUFFIX: &str = "@c.us";

/// Country code substituted for a local `0` prefix when none is configured.
pub const DEFAULT_COUNTRY_CODE: &str = "62";

/// Error normalizing a destination identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    /// The raw identifier contained no digits at all.
    #[error("destination contains no digits")]
    NoDigits,
}

/// A canonical destination address (`<digits>@c.us`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    /// Wrap an already-canonical address without re-normalizing.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The canonical string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalize a raw destination identifier into canonical form.
///
/// Steps, in order:
/// 1. drop every non-digit byte (`+`, spaces, dashes, the `@c.us` of an
///    already-canonical input);
/// 2. replace a leading `0` (local format) with `country_code`;
/// 3. append [`USER_SUFFIX`].
///
/// Deterministic: the same input always yields the same address.
pub fn normalize(raw: &str, country_code: &str) -> Result<Address, AddressError> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return Err(AddressError::NoDigits);
    }

    let international = match digits.strip_prefix('0') {
        Some(rest) => format!("{country_code}{rest}"),
        None => digits,
    };

    Ok(Address(format!("{international}{USER_SUFFIX}")))
}
