//! Phone number validation for shared contacts and typed numbers

use crate::domain::DomainError;

pub const MIN_PHONE_DIGITS: usize = 10;
pub const MAX_PHONE_DIGITS: usize = 15;

/// Normalize a phone number to `+<digits>`.
///
/// Formatting characters (spaces, `-`, `.`, parentheses) are dropped and a
/// single leading `+` is accepted. Anything else is rejected.
pub fn normalize_phone(raw: &str) -> Result<String, DomainError> {
    let trimmed = raw.trim();
    let body = trimmed.strip_prefix('+').unwrap_or(trimmed);

    let mut digits = String::with_capacity(body.len());
    for c in body.chars() {
        match c {
            '0'..='9' => digits.push(c),
            ' ' | '-' | '.' | '(' | ')' => {}
            _ => {
                return Err(DomainError::validation(format!(
                    "Phone number contains invalid character '{}'",
                    c
                )));
            }
        }
    }

    if digits.len() < MIN_PHONE_DIGITS || digits.len() > MAX_PHONE_DIGITS {
        return Err(DomainError::validation(format!(
            "Phone number must have between {} and {} digits",
            MIN_PHONE_DIGITS, MAX_PHONE_DIGITS
        )));
    }

    Ok(format!("+{}", digits))
}

pub fn is_valid_phone(raw: &str) -> bool {
    normalize_phone(raw).is_ok()
}
