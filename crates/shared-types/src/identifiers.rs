//! # Identifiers
//!
//! Tracking-number generation and identifier validation.

use rand::Rng;

/// Default tracking number prefix.
pub const DEFAULT_TRACKING_PREFIX: &str = "VCN";

/// Maximum accepted identifier length in bytes.
pub const MAX_IDENTIFIER_LEN: usize = 128;

/// Tracking number length: 3 letters + 12 digits.
const TRACKING_NUMBER_LEN: usize = 15;

/// Reason an identifier was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IdentifierIssue {
    /// Empty or whitespace only.
    Empty,
    /// Longer than [`MAX_IDENTIFIER_LEN`].
    TooLong,
    /// Contains control characters.
    ControlCharacter,
}

impl IdentifierIssue {
    /// Human readable description.
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Empty => "identifier is empty",
            Self::TooLong => "identifier exceeds 128 bytes",
            Self::ControlCharacter => "identifier contains control characters",
        }
    }
}

/// Validate an opaque identifier.
pub fn validate_identifier(id: &str) -> Result<(), IdentifierIssue> {
    if id.trim().is_empty() {
        return Err(IdentifierIssue::Empty);
    }
    if id.len() > MAX_IDENTIFIER_LEN {
        return Err(IdentifierIssue::TooLong);
    }
    if id.chars().any(char::is_control) {
        return Err(IdentifierIssue::ControlCharacter);
    }
    Ok(())
}

/// Generate a tracking number: prefix + millisecond clock digits + 4 random digits.
///
/// The prefix is forced to three uppercase letters (padded with `X`).
/// Output always satisfies [`is_tracking_number`].
pub fn generate_tracking_number(prefix: &str, now_millis: u64) -> String {
    let mut letters: String = prefix
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .take(3)
        .collect::<String>()
        .to_ascii_uppercase();
    while letters.len() < 3 {
        letters.push('X');
    }

    // Low 8 clock digits keep ordering within ~27 hours; the random tail
    // separates ids minted in the same millisecond.
    let clock = now_millis % 100_000_000;
    let random: u16 = rand::thread_rng().gen_range(0..10_000);

    let mut tracking = format!("{letters}{clock:08}{random:04}");
    tracking.truncate(TRACKING_NUMBER_LEN);
    tracking
}

/// Check the tracking number format: 3 uppercase letters + 9..=12 digits.
pub fn is_tracking_number(candidate: &str) -> bool {
    let bytes = candidate.as_bytes();
    if bytes.len() < 12 || bytes.len() > 15 {
        return false;
    }
    bytes[..3].iter().all(u8::is_ascii_uppercase) && bytes[3..].iter().all(u8::is_ascii_digit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_identifier() {
        assert!(validate_identifier("S1").is_ok());
        assert_eq!(validate_identifier(""), Err(IdentifierIssue::Empty));
        assert_eq!(validate_identifier("   "), Err(IdentifierIssue::Empty));
        assert_eq!(
            validate_identifier("bad\nid"),
            Err(IdentifierIssue::ControlCharacter)
        );
        assert_eq!(
            validate_identifier(&"x".repeat(129)),
            Err(IdentifierIssue::TooLong)
        );
    }

    #[test]
    fn test_generated_tracking_number_format() {
        let tracking = generate_tracking_number("vcn", 1_700_000_123_456);
        assert_eq!(tracking.len(), 15);
        assert!(tracking.starts_with("VCN"));
        assert!(is_tracking_number(&tracking));
    }

    #[test]
    fn test_short_prefix_is_padded() {
        let tracking = generate_tracking_number("a", 42);
        assert!(tracking.starts_with("AXX"));
        assert!(is_tracking_number(&tracking));
    }

    #[test]
    fn test_is_tracking_number() {
        assert!(is_tracking_number("ABC123456789"));
        assert!(is_tracking_number("ABC123456789012"));
        assert!(!is_tracking_number("ABC12345678"));
        assert!(!is_tracking_number("abc123456789"));
        assert!(!is_tracking_number("ABC1234567890123"));
        assert!(!is_tracking_number("AB1123456789"));
    }
}
