//! Ticker symbol validation.
//!
//! Runs before any process is spawned. Accepts equities (`AAPL`,
//! `RELIANCE.NS`) and crypto pairs (`BTC-USD`).

use std::fmt;

use crate::errors::ValidationError;
use crate::models::Currency;

/// Longest symbol accepted, in characters.
pub const MAX_SYMBOL_LEN: usize = 15;

/// Suffix marking a symbol as a crypto pair quoted in dollars.
pub const CRYPTO_SUFFIX: &str = "-USD";

/// A validated, uppercased ticker symbol.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Symbol {
    code: String,
    is_crypto: bool,
}

impl Symbol {
    pub fn as_str(&self) -> &str {
        &self.code
    }

    pub fn is_crypto(&self) -> bool {
        self.is_crypto
    }

    /// Display currency. Decided by the symbol suffix alone.
    pub fn currency(&self) -> Currency {
        if self.is_crypto {
            Currency::Usd
        } else {
            Currency::Inr
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code)
    }
}

fn is_symbol_char(c: char) -> bool {
    c.is_ascii_uppercase() || c.is_ascii_digit() || c == '.' || c == '-'
}

/// Validates and canonicalizes a user supplied symbol.
///
/// The input is uppercased first; the length check (1..=15 characters) runs
/// before the character class check, so an overlong symbol with bad characters
/// reports [`ValidationError::EmptyOrTooLong`].
pub fn validate(input: &str) -> Result<Symbol, ValidationError> {
    let code = input.to_uppercase();
    let len = code.chars().count();
    if len == 0 || len > MAX_SYMBOL_LEN {
        return Err(ValidationError::EmptyOrTooLong);
    }
    if !code.chars().all(is_symbol_char) {
        return Err(ValidationError::BadFormat);
    }

    let is_crypto = code.ends_with(CRYPTO_SUFFIX);
    Ok(Symbol { code, is_crypto })
}
