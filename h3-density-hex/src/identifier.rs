use num_bigint::BigUint;
use thiserror::Error;

/// Reasons a decimal identifier field can be rejected.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum IdentifierError {
    #[error("empty identifier")]
    Empty,

    #[error("invalid digit {found:?} at position {position}")]
    InvalidDigit { position: usize, found: char },

    #[error("negative identifier")]
    Negative,
}

/// Parse the whole of `text` as a base-10 integer of arbitrary width.
///
/// A single leading `+` or `-` is accepted; everything after it must be ASCII
/// digits. Negative values other than zero are rejected, since cell indices
/// have no negative form.
pub fn parse_decimal(text: &str) -> Result<BigUint, IdentifierError> {
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    if digits.is_empty() {
        return Err(IdentifierError::Empty);
    }
    let sign_len = text.len() - digits.len();
    if let Some((i, c)) = digits.char_indices().find(|(_, c)| !c.is_ascii_digit()) {
        return Err(IdentifierError::InvalidDigit {
            position: sign_len + i,
            found: c,
        });
    }

    // Only ASCII digits remain, which `parse_bytes` always accepts.
    let value = BigUint::parse_bytes(digits.as_bytes(), 10)
        .ok_or(IdentifierError::Empty)?;
    if negative && value.bits() > 0 {
        return Err(IdentifierError::Negative);
    }
    Ok(value)
}

/// Lowercase hexadecimal, no prefix, no padding. Zero renders as `"0"`.
pub fn to_hex(value: &BigUint) -> String {
    format!("{:x}", value)
}
