use bon::Builder;
use const_oid::ObjectIdentifier;
use der::Tag;
use der::asn1::{Any, SetOfVec};
use time::Duration;
use time::OffsetDateTime;
use x509_cert::attr::AttributeTypeAndValue;
use x509_cert::name::{RdnSequence, RelativeDistinguishedName};

use super::extensions::ToAndFromX509Extension;
use crate::error::{CertForgeError, Result};
use crate::key::PublicKey;

/// `C` (2.5.4.6)
pub const COUNTRY_NAME: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.6");
/// `serialNumber` (2.5.4.5), carries the organization identifier.
pub const SERIAL_NUMBER: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.5");
/// `CN` (2.5.4.3)
pub const COMMON_NAME: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.3");
/// `O` (2.5.4.10)
pub const ORGANIZATION_NAME: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.10");
/// `OU` (2.5.4.11)
pub const ORGANIZATIONAL_UNIT_NAME: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.11");

/// Parameters for building an X.509 certificate.
///
/// # Fields
/// * `subject` - The distinguished name of the certificate subject.
/// * `subject_public_key` - The public key of the certificate subject.
/// * `extensions` - Additional X.509 extensions.
#[derive(Clone, Debug, Builder)]
pub struct CertificationRequestInfo {
    pub subject: DistinguishedName,
    pub subject_public_key: PublicKey,
    #[builder(default)]
    pub extensions: Vec<ExtensionParam>,
}

/// Distinguished name of a certificate subject or issuer.
///
/// Attributes are encoded in the order `C`, `serialNumber`, `CN`, `O`, `OU`,
/// each in its own RDN. Absent optional attributes are omitted entirely.
///
/// # Fields
/// * `common_name` - The common name (CN).
/// * `serial_number` - The subject serial number attribute (serialNumber).
/// * `country` - The country (C).
/// * `organization` - The organization (O).
/// * `organization_unit` - The organizational unit (OU).
#[derive(Clone, Debug, Builder, Default, PartialEq, Eq)]
pub struct DistinguishedName {
    pub common_name: String,
    pub serial_number: Option<String>,
    pub country: Option<String>,
    pub organization: Option<String>,
    pub organization_unit: Option<String>,
}

impl DistinguishedName {
    /// Converts the distinguished name to an X.509-compatible format.
    ///
    /// `C` and `serialNumber` are PrintableString as X.520 requires; the
    /// remaining attributes are UTF8String.
    pub fn as_x509_name(&self) -> Result<x509_cert::name::DistinguishedName> {
        let attributes = [
            (COUNTRY_NAME, self.country.as_deref(), Tag::PrintableString),
            (
                SERIAL_NUMBER,
                self.serial_number.as_deref(),
                Tag::PrintableString,
            ),
            (COMMON_NAME, Some(self.common_name.as_str()), Tag::Utf8String),
            (
                ORGANIZATION_NAME,
                self.organization.as_deref(),
                Tag::Utf8String,
            ),
            (
                ORGANIZATIONAL_UNIT_NAME,
                self.organization_unit.as_deref(),
                Tag::Utf8String,
            ),
        ];

        let mut rdns = Vec::new();
        for (oid, value, tag) in attributes {
            let Some(value) = value else { continue };
            let attribute = AttributeTypeAndValue {
                oid,
                value: Any::new(tag, value.as_bytes())?,
            };
            rdns.push(RelativeDistinguishedName(SetOfVec::try_from(vec![
                attribute,
            ])?));
        }
        Ok(RdnSequence(rdns))
    }

    /// Creates a `DistinguishedName` from an X.509-compatible format.
    ///
    /// Unknown attributes are ignored. Values must be valid UTF-8.
    pub fn from_x509_name(x509dn: &x509_cert::name::DistinguishedName) -> Result<Self> {
        let mut name = DistinguishedName::default();

        for rdn in x509dn.0.iter() {
            for attr in rdn.0.iter() {
                let value = std::str::from_utf8(attr.value.value())
                    .map_err(|e| CertForgeError::DecodingError(e.to_string()))?
                    .to_string();
                match attr.oid {
                    COMMON_NAME => name.common_name = value,
                    SERIAL_NUMBER => name.serial_number = Some(value),
                    COUNTRY_NAME => name.country = Some(value),
                    ORGANIZATION_NAME => name.organization = Some(value),
                    ORGANIZATIONAL_UNIT_NAME => name.organization_unit = Some(value),
                    _ => {}
                }
            }
        }

        Ok(name)
    }
}

/// Last year a certificate validity period may end in; GeneralizedTime has
/// four year digits.
pub const MAX_NOT_AFTER_YEAR: i32 = 9999;

/// Certificate validity period.
///
/// This struct represents the `notBefore` and `notAfter` fields in a certificate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Validity {
    pub not_before: OffsetDateTime,
    pub not_after: OffsetDateTime,
}

impl Validity {
    /// Creates a validity period of `duration` starting at the current second.
    ///
    /// Sub-second precision is dropped because X.509 time encodings cannot
    /// carry it; the window length is therefore preserved exactly.
    ///
    /// Fails with `InvalidInput` when `duration` is not positive or the window
    /// would end after [`MAX_NOT_AFTER_YEAR`].
    pub fn starting_now(duration: Duration) -> Result<Self> {
        let now = OffsetDateTime::now_utc();
        Self::starting_at(now - Duration::nanoseconds(i64::from(now.nanosecond())), duration)
    }

    /// Creates a validity period of `duration` starting at `not_before`.
    pub fn starting_at(not_before: OffsetDateTime, duration: Duration) -> Result<Self> {
        if !duration.is_positive() {
            return Err(CertForgeError::InvalidInput(format!(
                "validity period must be positive, got {duration}"
            )));
        }
        let not_after = not_before
            .checked_add(duration)
            .filter(|end| end.year() <= MAX_NOT_AFTER_YEAR)
            .ok_or_else(|| {
                CertForgeError::InvalidInput(format!(
                    "validity period of {} days ends after year {MAX_NOT_AFTER_YEAR}",
                    duration.whole_days()
                ))
            })?;
        Ok(Self {
            not_before,
            not_after,
        })
    }

    /// Creates a validity period starting now for the given number of days.
    pub fn for_days(days: i64) -> Result<Self> {
        let duration = days
            .checked_mul(86_400)
            .map(Duration::seconds)
            .ok_or_else(|| CertForgeError::InvalidInput(format!("{days} days is out of range")))?;
        Self::starting_now(duration)
    }

    pub fn duration(&self) -> Duration {
        self.not_after - self.not_before
    }

    /// Whether `instant` lies in `[not_before, not_after)`.
    pub fn contains(&self, instant: OffsetDateTime) -> bool {
        self.not_before <= instant && instant < self.not_after
    }
}

/// Represents an X.509 extension.
///
/// # Fields
/// * `oid` - The object identifier of the extension.
/// * `critical` - Indicates if the extension is critical.
/// * `value` - The DER-encoded value of the extension.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtensionParam {
    pub oid: ObjectIdentifier,
    pub critical: bool,
    /// DER-encoded extension value
    pub value: Vec<u8>,
}

impl ExtensionParam {
    /// Creates an `ExtensionParam` from a specific extension.
    pub fn from_extension<E: ToAndFromX509Extension>(extension: E, critical: bool) -> Result<Self> {
        Ok(Self {
            oid: E::OID,
            critical,
            value: extension.to_x509_extension_value()?,
        })
    }

    /// Decodes an `ExtensionParam` into a specific extension.
    pub fn to_extension<E: ToAndFromX509Extension>(&self) -> Result<E> {
        E::from_x509_extension_value(&self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn acme() -> DistinguishedName {
        DistinguishedName::builder()
            .common_name("Acme Corp".to_string())
            .serial_number("B12345678".to_string())
            .country("ES".to_string())
            .organization("Acme Corp".to_string())
            .organization_unit("IT Department".to_string())
            .build()
    }

    #[test]
    fn name_survives_x509_encoding() {
        let name = acme();
        let x509 = name.as_x509_name().unwrap();
        assert_eq!(x509.0.len(), 5);
        assert_eq!(DistinguishedName::from_x509_name(&x509).unwrap(), name);
    }

    #[test]
    fn rfc4514_rendering_lists_all_attributes() {
        let rendered = acme().as_x509_name().unwrap().to_string();
        assert!(rendered.contains("=Acme Corp"), "{rendered}");
        assert!(rendered.contains("=IT Department"), "{rendered}");
        assert!(rendered.contains("=B12345678"), "{rendered}");
        assert!(rendered.contains("=ES"), "{rendered}");
    }

    #[test]
    fn absent_attributes_are_omitted() {
        let name = DistinguishedName::builder()
            .common_name("solo".to_string())
            .build();
        assert_eq!(name.as_x509_name().unwrap().0.len(), 1);
    }

    #[test]
    fn validity_window_is_exact() {
        let validity = Validity::for_days(1460).unwrap();
        assert_eq!(validity.duration(), Duration::days(1460));
        assert_eq!(validity.not_before.nanosecond(), 0);
        assert!(validity.contains(validity.not_before));
        assert!(!validity.contains(validity.not_after));
    }

    #[test]
    fn non_positive_windows_are_rejected() {
        for days in [0, -30] {
            let err = Validity::for_days(days).unwrap_err();
            assert!(matches!(err, CertForgeError::InvalidInput(_)), "{days}: {err}");
        }
    }

    #[test]
    fn windows_past_year_9999_are_rejected() {
        let err = Validity::for_days(5_000_000).unwrap_err();
        assert!(matches!(err, CertForgeError::InvalidInput(_)));
        assert!(Validity::for_days(i64::MAX).is_err());
    }

    #[test]
    fn window_may_end_in_year_9999() {
        let start = time::macros::datetime!(9998-01-01 00:00:00 UTC);
        let validity = Validity::starting_at(start, Duration::days(365)).unwrap();
        assert_eq!(validity.not_after.year(), 9999);
        assert!(Validity::starting_at(start, Duration::days(2 * 365)).is_err());
    }
}
