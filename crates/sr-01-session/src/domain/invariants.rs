//! # Domain Invariants
//!
//! Business rules that must always hold true.

use super::errors::{SessionError, SessionResult};

/// Default country prefix for normalization.
pub const DEFAULT_COUNTRY_CODE: &str = "+91";

/// Default wait between two verification codes.
pub const DEFAULT_RESEND_COOLDOWN_SECS: u64 = 30;

/// Default challenge lifetime (10 minutes).
pub const DEFAULT_CHALLENGE_TTL_SECS: u64 = 600;

/// Default cap on emergency contacts.
pub const DEFAULT_MAX_CONTACTS: usize = 5;

/// Digits in a local mobile number.
pub const MOBILE_DIGITS: usize = 10;

/// Digits in a verification code.
pub const CODE_DIGITS: usize = 6;

/// Invariant: a local mobile number is exactly ten ASCII digits and
/// the first one is 6, 7, 8 or 9.
///
/// The input must already have whitespace removed.
pub fn is_valid_local_mobile(digits: &str) -> bool {
    digits.len() == MOBILE_DIGITS
        && digits.bytes().all(|b| b.is_ascii_digit())
        && matches!(digits.as_bytes()[0], b'6'..=b'9')
}

/// Invariant: a verification code is exactly six ASCII digits.
pub fn is_valid_code(code: &str) -> bool {
    code.len() == CODE_DIGITS && code.bytes().all(|b| b.is_ascii_digit())
}

/// Invariant: a country prefix is `+` followed by one to three digits.
pub fn is_valid_country_code(code: &str) -> bool {
    match code.strip_prefix('+') {
        Some(digits) => {
            (1..=3).contains(&digits.len()) && digits.bytes().all(|b| b.is_ascii_digit())
        }
        None => false,
    }
}

/// Display names must contain something other than whitespace.
pub fn validate_display_name(name: &str) -> SessionResult<()> {
    if name.trim().is_empty() {
        return Err(SessionError::InvalidProfile(
            "display name must not be empty".to_string(),
        ));
    }
    Ok(())
}

/// Emails need a local part and a domain around a single `@`.
pub fn validate_email(email: &str) -> SessionResult<()> {
    let trimmed = email.trim();
    match trimmed.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => {
            Ok(())
        }
        _ => Err(SessionError::InvalidProfile(format!(
            "invalid email address: {trimmed}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_mobile_examples() {
        assert!(is_valid_local_mobile("9876543210"));
        assert!(is_valid_local_mobile("6000000000"));
        assert!(!is_valid_local_mobile("5876543210"));
        assert!(!is_valid_local_mobile("987654321"));
        assert!(!is_valid_local_mobile("98765432101"));
        assert!(!is_valid_local_mobile("98765a3210"));
        assert!(!is_valid_local_mobile(""));
    }

    #[test]
    fn test_country_code() {
        assert!(is_valid_country_code("+91"));
        assert!(is_valid_country_code("+1"));
        assert!(!is_valid_country_code("91"));
        assert!(!is_valid_country_code("+"));
        assert!(!is_valid_country_code("+1234"));
    }

    #[test]
    fn test_email() {
        assert!(validate_email("a@b.in").is_ok());
        assert!(validate_email("@b.in").is_err());
        assert!(validate_email("a@").is_err());
        assert!(validate_email("plain").is_err());
        assert!(validate_email("a@b@c").is_err());
    }

    proptest! {
        #[test]
        fn prop_accepts_every_valid_mobile(first in 6u8..=9, rest in "[0-9]{9}") {
            let number = format!("{first}{rest}");
            prop_assert!(is_valid_local_mobile(&number));
        }

        #[test]
        fn prop_rejects_low_leading_digit(first in 0u8..=5, rest in "[0-9]{9}") {
            let number = format!("{first}{rest}");
            prop_assert!(!is_valid_local_mobile(&number));
        }

        #[test]
        fn prop_rejects_wrong_length(digits in "[6-9][0-9]{0,8}|[6-9][0-9]{10,14}") {
            prop_assert!(!is_valid_local_mobile(&digits));
        }

        #[test]
        fn prop_code_requires_six_digits(code in "\\PC{0,10}") {
            let expected = code.len() == 6 && code.chars().all(|c| c.is_ascii_digit());
            prop_assert_eq!(is_valid_code(&code), expected);
        }
    }
}
