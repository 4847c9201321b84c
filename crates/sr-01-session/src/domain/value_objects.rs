//! # Value Objects
//!
//! Validated inputs. Constructing one of these is the only way to get a
//! phone number or a code into the service.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::errors::{SessionError, SessionResult};
use super::invariants::{is_valid_code, is_valid_local_mobile};

/// A mobile number that passed validation, kept in normalized form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhoneNumber {
    local: String,
    normalized: String,
}

impl PhoneNumber {
    /// Strip whitespace, validate, and prefix `country_code`.
    ///
    /// Input that already carries a prefix (`+91...`, `91...`) is rejected.
    pub fn parse(raw: &str, country_code: &str) -> SessionResult<Self> {
        let local: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
        if !is_valid_local_mobile(&local) {
            return Err(SessionError::InvalidPhoneNumber(raw.to_string()));
        }
        Ok(Self {
            normalized: format!("{country_code}{local}"),
            local,
        })
    }

    /// Country-code-prefixed form sent to the backend.
    pub fn as_str(&self) -> &str {
        &self.normalized
    }

    /// The ten local digits.
    pub fn local(&self) -> &str {
        &self.local
    }

    /// Last four digits, safe to log.
    pub fn suffix(&self) -> &str {
        &self.local[self.local.len() - 4..]
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.normalized)
    }
}

/// A six-digit verification code.
#[derive(Clone, PartialEq, Eq)]
pub struct VerificationCode(String);

impl VerificationCode {
    /// Validate the code format. No trimming is applied.
    pub fn parse(raw: &str) -> SessionResult<Self> {
        if !is_valid_code(raw) {
            return Err(SessionError::InvalidCodeFormat);
        }
        Ok(Self(raw.to_string()))
    }

    /// The digits.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Codes are secrets; keep them out of debug output.
impl fmt::Debug for VerificationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("VerificationCode(******)")
    }
}

/// Opaque token correlating a sent code with its verification.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChallengeToken(pub String);

impl ChallengeToken {
    /// Wrap a backend-issued token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl fmt::Display for ChallengeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
