//! Allow-list filtering for caller-supplied strings.
//!
//! Anything that ends up inside a certificate name or an artifact filename
//! goes through [`sanitize`] first. Characters outside `A-Z a-z 0-9`, space
//! and `-` are dropped, never escaped, so path separators, dots, NUL bytes
//! and control characters cannot reach the filesystem or the DER encoder.

use crate::error::{CertForgeError, Result};

/// Returns `true` for characters allowed to survive sanitization.
pub fn is_allowed(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == ' ' || c == '-'
}

/// Drops every character of `input` that is not alphanumeric, space or hyphen.
///
/// Never fails. An input made only of disallowed characters yields an empty
/// string, which callers must treat as invalid.
///
/// ```
/// assert_eq!(certforge::sanitize::sanitize("../../etc"), "etc");
/// assert_eq!(certforge::sanitize::sanitize("Acme Corp."), "Acme Corp");
/// ```
pub fn sanitize(input: &str) -> String {
    input.chars().filter(|c| is_allowed(*c)).collect()
}

/// Sanitizes a named identity field and enforces that the result is usable.
///
/// Surrounding spaces are trimmed after filtering. The result must be
/// non-empty and at most `max_len` characters.
pub fn sanitize_field(field: &str, input: &str, max_len: usize) -> Result<String> {
    let cleaned = sanitize(input);
    let cleaned = cleaned.trim_matches(' ');

    if cleaned.is_empty() {
        return Err(CertForgeError::InvalidInput(format!(
            "{field} is empty after sanitization"
        )));
    }

    let len = cleaned.chars().count();
    if len > max_len {
        return Err(CertForgeError::InvalidInput(format!(
            "{field} is {len} characters long, the maximum is {max_len}"
        )));
    }

    Ok(cleaned.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES: &[&str] = &[
        "",
        "Acme Corp",
        "B12345678",
        "../../etc",
        "..\\..\\windows\\system32",
        "name\0with\u{7}controls\n\t",
        "Ñandú S.L. – Málaga",
        "CN=evil,O=attacker",
        "rm -rf /; echo pwned",
        "   padded   ",
        "日本語",
    ];

    #[test]
    fn output_contains_only_allowed_characters() {
        for sample in SAMPLES {
            let out = sanitize(sample);
            assert!(
                out.chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == ' ' || c == '-'),
                "unexpected character in {out:?}"
            );
        }
    }

    #[test]
    fn sanitize_is_idempotent() {
        for sample in SAMPLES {
            let once = sanitize(sample);
            assert_eq!(sanitize(&once), once);
        }
    }

    #[test]
    fn path_traversal_is_stripped() {
        assert_eq!(sanitize("../../etc"), "etc");
        assert_eq!(sanitize("/var/tmp/x"), "vartmpx");
    }

    #[test]
    fn dn_metacharacters_are_stripped() {
        assert_eq!(sanitize("CN=evil,O=attacker"), "CNevilOattacker");
        assert_eq!(sanitize("a+b;c\"d"), "abcd");
    }

    #[test]
    fn non_ascii_letters_are_dropped() {
        assert_eq!(sanitize("Ñandú"), "and");
    }

    #[test]
    fn all_invalid_input_reduces_to_empty() {
        assert_eq!(sanitize("./\\\0!?"), "");
    }

    #[test]
    fn field_rejects_empty_result() {
        let err = sanitize_field("organization name", "../", 64).unwrap_err();
        assert!(matches!(err, CertForgeError::InvalidInput(_)));
    }

    #[test]
    fn field_rejects_blank_result() {
        assert!(sanitize_field("identifier", "  .  ", 64).is_err());
    }

    #[test]
    fn field_trims_and_bounds() {
        assert_eq!(
            sanitize_field("organization name", "  Acme Corp. ", 64).unwrap(),
            "Acme Corp"
        );
        let long = "a".repeat(65);
        let err = sanitize_field("organization name", &long, 64).unwrap_err();
        assert!(err.to_string().contains("maximum is 64"));
        assert!(sanitize_field("organization name", &long[..64], 64).is_ok());
    }
}
