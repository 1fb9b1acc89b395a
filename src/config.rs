use std::path::PathBuf;

use bon::Builder;

use crate::error::{CertForgeError, Result};

const SECONDS_PER_DAY: i64 = 86_400;

/// Days a certificate stays valid: four years of 365 days.
pub const DEFAULT_VALIDITY_DAYS: i64 = 4 * 365;

/// Serial number used by [`SerialPolicy::Fixed`] when reproducing legacy output.
pub const LEGACY_SERIAL_NUMBER: u64 = 1000;

/// Country code placed in the `C` attribute of every issued name.
pub const DEFAULT_COUNTRY_CODE: &str = "ES";

/// Organizational unit placed in the `OU` attribute of every issued name.
pub const DEFAULT_ORGANIZATIONAL_UNIT: &str = "IT Department";

/// Upper bound on the organization name and identifier, in characters.
///
/// Matches the X.520 upper bound for `commonName` and `serialNumber`, and
/// keeps archive filenames well inside common filesystem limits.
pub const DEFAULT_MAX_FIELD_LENGTH: usize = 64;

/// Number of random octets in a generated serial number.
pub const RANDOM_SERIAL_LENGTH: usize = 16;

/// How the certificate serial number is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SerialPolicy {
    /// A fresh positive 128-bit value drawn from the thread-local CSPRNG.
    #[default]
    Random,
    /// The same serial for every certificate.
    Fixed(u64),
}

impl SerialPolicy {
    /// Produces the big-endian content octets of the next serial number.
    ///
    /// The result is always a positive, minimal-length INTEGER body.
    pub fn next_serial(&self) -> Vec<u8> {
        match self {
            SerialPolicy::Random => {
                let mut bytes: [u8; RANDOM_SERIAL_LENGTH] = rand::random();
                // Positive and full length.
                bytes[0] &= 0x7f;
                if bytes[0] == 0 {
                    bytes[0] = 0x01;
                }
                bytes.to_vec()
            }
            SerialPolicy::Fixed(value) => {
                let raw = value.to_be_bytes();
                let first = raw.iter().position(|b| *b != 0).unwrap_or(raw.len() - 1);
                let mut bytes = raw[first..].to_vec();
                if bytes[0] & 0x80 != 0 {
                    bytes.insert(0, 0);
                }
                bytes
            }
        }
    }
}

/// Settings for an issuance run.
///
/// Every field has a documented default; `IssuanceConfig::default()` gives
/// four-year certificates with random serials, written to the current
/// directory.
///
/// ```
/// use certforge::config::{IssuanceConfig, SerialPolicy};
///
/// let config = IssuanceConfig::builder()
///     .output_dir("/tmp/certs")
///     .serial_policy(SerialPolicy::Fixed(1000))
///     .build();
/// assert_eq!(config.validity_days, 1460);
/// ```
#[derive(Debug, Clone, Builder)]
pub struct IssuanceConfig {
    /// Length of the validity window in days.
    #[builder(default = DEFAULT_VALIDITY_DAYS)]
    pub validity_days: i64,
    #[builder(default)]
    pub serial_policy: SerialPolicy,
    #[builder(into, default = DEFAULT_COUNTRY_CODE.to_string())]
    pub country_code: String,
    #[builder(into, default = DEFAULT_ORGANIZATIONAL_UNIT.to_string())]
    pub organizational_unit: String,
    #[builder(default = DEFAULT_MAX_FIELD_LENGTH)]
    pub max_field_length: usize,
    /// Directory receiving the final archive. Created if missing.
    #[builder(into, default = PathBuf::from("."))]
    pub output_dir: PathBuf,
}

impl Default for IssuanceConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl IssuanceConfig {
    /// The validity window as a [`time::Duration`].
    ///
    /// Fails with `InvalidInput` unless `validity_days` is positive and fits a
    /// `Duration`.
    pub fn validity(&self) -> Result<time::Duration> {
        let days = self.validity_days;
        if days <= 0 {
            return Err(CertForgeError::InvalidInput(format!(
                "validity must be at least one day, got {days}"
            )));
        }
        days
            .checked_mul(SECONDS_PER_DAY)
            .map(time::Duration::seconds)
            .ok_or_else(|| CertForgeError::InvalidInput(format!("{days} days is out of range")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_constants() {
        let config = IssuanceConfig::default();
        assert_eq!(config.validity_days, 1460);
        assert_eq!(config.validity().unwrap(), time::Duration::days(1460));
        assert_eq!(config.serial_policy, SerialPolicy::Random);
        assert_eq!(config.country_code, "ES");
        assert_eq!(config.organizational_unit, "IT Department");
        assert_eq!(config.max_field_length, 64);
        assert_eq!(config.output_dir, PathBuf::from("."));
    }

    #[test]
    fn fixed_serial_is_minimal_big_endian() {
        assert_eq!(SerialPolicy::Fixed(1000).next_serial(), vec![0x03, 0xe8]);
        assert_eq!(SerialPolicy::Fixed(1).next_serial(), vec![0x01]);
        assert_eq!(SerialPolicy::Fixed(0x80).next_serial(), vec![0x00, 0x80]);
    }

    #[test]
    fn random_serials_are_positive_and_distinct() {
        let a = SerialPolicy::Random.next_serial();
        let b = SerialPolicy::Random.next_serial();
        assert_eq!(a.len(), RANDOM_SERIAL_LENGTH);
        assert!(a[0] != 0 && a[0] & 0x80 == 0);
        assert_ne!(a, b);
    }

    #[test]
    fn validity_days_must_be_positive() {
        for days in [0, -30] {
            let config = IssuanceConfig::builder().validity_days(days).build();
            assert!(matches!(
                config.validity(),
                Err(CertForgeError::InvalidInput(_))
            ));
        }
    }

    #[test]
    fn validity_days_overflow_is_an_error() {
        let config = IssuanceConfig::builder().validity_days(i64::MAX).build();
        assert!(matches!(
            config.validity(),
            Err(CertForgeError::InvalidInput(_))
        ));
    }
}
