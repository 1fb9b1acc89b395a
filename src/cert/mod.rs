pub mod extensions;
pub mod params;

use der::asn1::AnyRef;
use der::{Decode, Encode};
use params::{CertificationRequestInfo, DistinguishedName, ExtensionParam, Validity};
use sha2::{Digest, Sha256};
use tracing::{info, instrument};
use x509_cert::certificate::CertificateInner;

use crate::config::SerialPolicy;
use crate::error::{CertForgeError, Result};
use crate::identity::Identity;
use crate::issuer::Issuer;
use crate::key::{KeyPair, PublicKey};
use crate::pem_utils::{der_to_pem, pem_to_der};
use crate::tbs_certificate::{TbsCertificate, from_x509_time};

/// PEM label of an X.509 certificate.
pub const CERTIFICATE_PEM_LABEL: &str = "CERTIFICATE";

/// Represents the supported signature algorithms for certificates.
///
/// Both use SHA-256 as the digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureAlgorithm {
    /// SHA-256 with RSA encryption (PKCS#1 v1.5).
    Sha256WithRSA,
    /// SHA-256 with ECDSA.
    Sha256WithECDSA,
}

impl From<SignatureAlgorithm> for x509_cert::spki::AlgorithmIdentifierOwned {
    fn from(value: SignatureAlgorithm) -> Self {
        match value {
            // RFC 4055 §5: parameters MUST be NULL.
            SignatureAlgorithm::Sha256WithRSA => x509_cert::spki::AlgorithmIdentifierOwned {
                oid: const_oid::db::rfc5912::SHA_256_WITH_RSA_ENCRYPTION,
                parameters: Some(AnyRef::NULL.into()),
            },
            // RFC 5758 §3.2: parameters MUST be absent.
            SignatureAlgorithm::Sha256WithECDSA => x509_cert::spki::AlgorithmIdentifierOwned {
                oid: const_oid::db::rfc5912::ECDSA_WITH_SHA_256,
                parameters: None,
            },
        }
    }
}

impl TryFrom<&x509_cert::spki::AlgorithmIdentifierOwned> for SignatureAlgorithm {
    type Error = CertForgeError;

    fn try_from(value: &x509_cert::spki::AlgorithmIdentifierOwned) -> Result<Self> {
        match value.oid {
            const_oid::db::rfc5912::SHA_256_WITH_RSA_ENCRYPTION => {
                Ok(SignatureAlgorithm::Sha256WithRSA)
            }
            const_oid::db::rfc5912::ECDSA_WITH_SHA_256 => Ok(SignatureAlgorithm::Sha256WithECDSA),
            other => Err(CertForgeError::DecodingError(format!(
                "Unsupported signature algorithm {other}"
            ))),
        }
    }
}

/// Formats bytes as colon-separated uppercase hex, e.g. `03:E8`.
pub fn colon_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(":")
}

/// Represents an X.509 certificate.
///
/// This struct provides methods to encode the certificate into DER or PEM
/// formats and read back the fields the issuance report needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    /// The inner representation of the certificate.
    pub inner: CertificateInner,
}

impl Certificate {
    /// Encodes the certificate into DER format.
    pub fn to_der(&self) -> Result<Vec<u8>> {
        self.inner
            .to_der()
            .map_err(|e| CertForgeError::EncodingError(e.to_string()))
    }

    /// Encodes the certificate into PEM format.
    pub fn to_pem(&self) -> Result<String> {
        Ok(der_to_pem(&self.to_der()?, CERTIFICATE_PEM_LABEL))
    }

    pub fn from_der(der: &[u8]) -> Result<Self> {
        Ok(Self {
            inner: CertificateInner::from_der(der)?,
        })
    }

    pub fn from_pem(pem: &str) -> Result<Self> {
        Self::from_der(&pem_to_der(pem, CERTIFICATE_PEM_LABEL)?)
    }

    /// Decodes the TBS portion into its high-level form.
    pub fn tbs(&self) -> Result<TbsCertificate> {
        TbsCertificate::from_tbs_certificate_inner(&self.inner.tbs_certificate)
    }

    pub fn subject(&self) -> Result<DistinguishedName> {
        DistinguishedName::from_x509_name(&self.inner.tbs_certificate.subject)
    }

    pub fn issuer(&self) -> Result<DistinguishedName> {
        DistinguishedName::from_x509_name(&self.inner.tbs_certificate.issuer)
    }

    /// Content octets of the serial number, big-endian.
    pub fn serial_number(&self) -> Vec<u8> {
        self.inner
            .tbs_certificate
            .serial_number
            .as_bytes()
            .to_vec()
    }

    pub fn serial_number_hex(&self) -> String {
        colon_hex(&self.serial_number())
    }

    pub fn validity(&self) -> Validity {
        let validity = &self.inner.tbs_certificate.validity;
        Validity {
            not_before: from_x509_time(&validity.not_before),
            not_after: from_x509_time(&validity.not_after),
        }
    }

    pub fn signature_algorithm(&self) -> Result<SignatureAlgorithm> {
        SignatureAlgorithm::try_from(&self.inner.signature_algorithm)
    }

    /// The public key embedded in the certificate.
    pub fn subject_public_key(&self) -> Result<PublicKey> {
        PublicKey::from_x509spki(&self.inner.tbs_certificate.subject_public_key_info)
    }

    /// DER encoding of the embedded `SubjectPublicKeyInfo`.
    pub fn subject_public_key_der(&self) -> Result<Vec<u8>> {
        self.inner
            .tbs_certificate
            .subject_public_key_info
            .to_der()
            .map_err(|e| CertForgeError::EncodingError(e.to_string()))
    }

    pub fn extensions(&self) -> Vec<ExtensionParam> {
        self.inner
            .tbs_certificate
            .extensions
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|ext| ExtensionParam {
                oid: ext.extn_id,
                critical: ext.critical,
                value: ext.extn_value.as_bytes().to_vec(),
            })
            .collect()
    }

    /// Whether the issuer and subject names are identical.
    pub fn is_self_issued(&self) -> bool {
        self.inner.tbs_certificate.issuer == self.inner.tbs_certificate.subject
    }

    /// Checks the certificate signature against `public_key`.
    pub fn verify_signature(&self, public_key: &PublicKey) -> Result<()> {
        let expected = match public_key {
            PublicKey::Rsa(_) => SignatureAlgorithm::Sha256WithRSA,
            PublicKey::EcdsaP256(_) => SignatureAlgorithm::Sha256WithECDSA,
        };
        if self.signature_algorithm()? != expected {
            return Err(CertForgeError::DecodingError(
                "signature algorithm does not match the key type".to_string(),
            ));
        }
        let tbs_der = self.inner.tbs_certificate.to_der()?;
        public_key.verify(&tbs_der, self.inner.signature.raw_bytes())
    }

    /// Checks the signature with the certificate's own embedded key.
    pub fn verify_self_signature(&self) -> Result<()> {
        self.verify_signature(&self.subject_public_key()?)
    }

    /// SHA-256 digest of the DER encoding, as colon-separated hex.
    pub fn fingerprint_sha256(&self) -> Result<String> {
        Ok(colon_hex(&Sha256::digest(self.to_der()?)))
    }

    /// Creates a new self-signed certificate.
    ///
    /// # Arguments
    /// * `cert_info` - The certification request information.
    /// * `key` - The key pair used to sign the certificate.
    /// * `validity` - The validity window.
    /// * `serial_number` - Content octets of the serial number.
    pub fn new_self_signed(
        cert_info: &CertificationRequestInfo,
        key: &KeyPair,
        validity: Validity,
        serial_number: Vec<u8>,
    ) -> Result<Self> {
        // For self-signed certificates, the issuer is the same as the subject
        let self_issuer = SelfIssuer {
            name: cert_info.subject.clone(),
            key,
        };
        self_issuer.issue(cert_info, validity, serial_number)
    }
}

// Helper struct for self-signed certificates
struct SelfIssuer<'a> {
    name: DistinguishedName,
    key: &'a KeyPair,
}

impl Issuer for SelfIssuer<'_> {
    fn issuer_name(&self) -> DistinguishedName {
        self.name.clone()
    }

    fn signing_key(&self) -> &KeyPair {
        self.key
    }
}

/// Builds the self-signed certificate for `identity`.
///
/// Subject and issuer are both the identity, taken as-is: sanitization has
/// already happened when the [`Identity`] was constructed. The window starts
/// at the current second and lasts exactly `validity_duration`, which must be
/// positive and end no later than year 9999.
#[instrument(
    skip_all,
    fields(
        identifier = %identity.organization_identifier(),
        algorithm = %key_pair.algorithm(),
    )
)]
pub fn build_self_signed_certificate(
    identity: &Identity,
    key_pair: &KeyPair,
    validity_duration: time::Duration,
    serial_policy: &SerialPolicy,
) -> Result<Certificate> {
    let cert_info = CertificationRequestInfo::builder()
        .subject(identity.to_distinguished_name())
        .subject_public_key(key_pair.public_key())
        .build();

    let validity = Validity::starting_now(validity_duration)?;
    let certificate = Certificate::new_self_signed(
        &cert_info,
        key_pair,
        validity,
        serial_policy.next_serial(),
    )?;

    info!(
        serial = %certificate.serial_number_hex(),
        not_after = %certificate.validity().not_after,
        "self-signed certificate built"
    );
    Ok(certificate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cert::extensions::{BasicConstraints, ToAndFromX509Extension};
    use crate::config::IssuanceConfig;
    use crate::key::KeyAlgorithm;

    fn acme() -> Identity {
        Identity::new("B12345678", "Acme Corp", &IssuanceConfig::default()).unwrap()
    }

    fn build(algorithm: KeyAlgorithm) -> (Certificate, KeyPair) {
        let key_pair = KeyPair::generate(algorithm).unwrap();
        let cert = build_self_signed_certificate(
            &acme(),
            &key_pair,
            time::Duration::days(1460),
            &SerialPolicy::Fixed(1000),
        )
        .unwrap();
        (cert, key_pair)
    }

    #[test]
    fn subject_equals_issuer() {
        let (cert, _) = build(KeyAlgorithm::Ec);
        assert!(cert.is_self_issued());
        assert_eq!(cert.subject().unwrap(), cert.issuer().unwrap());
        let subject = cert.subject().unwrap();
        assert_eq!(subject.common_name, "Acme Corp");
        assert_eq!(subject.serial_number.as_deref(), Some("B12345678"));
        assert_eq!(subject.country.as_deref(), Some("ES"));
        assert_eq!(subject.organization.as_deref(), Some("Acme Corp"));
        assert_eq!(subject.organization_unit.as_deref(), Some("IT Department"));
    }

    #[test]
    fn validity_is_exactly_four_years() {
        for algorithm in [KeyAlgorithm::Rsa, KeyAlgorithm::Ec] {
            let (cert, _) = build(algorithm);
            assert_eq!(cert.validity().duration(), time::Duration::days(1460));
        }
    }

    #[test]
    fn signature_algorithm_follows_key() {
        let (rsa, _) = build(KeyAlgorithm::Rsa);
        assert_eq!(
            rsa.signature_algorithm().unwrap(),
            SignatureAlgorithm::Sha256WithRSA
        );
        let (ec, _) = build(KeyAlgorithm::Ec);
        assert_eq!(
            ec.signature_algorithm().unwrap(),
            SignatureAlgorithm::Sha256WithECDSA
        );
    }

    #[test]
    fn self_signature_verifies() {
        for algorithm in [KeyAlgorithm::Rsa, KeyAlgorithm::Ec] {
            let (cert, _) = build(algorithm);
            cert.verify_self_signature().unwrap();
        }
    }

    #[test]
    fn signature_does_not_verify_under_another_key() {
        let (cert, _) = build(KeyAlgorithm::Ec);
        let stranger = KeyPair::generate_ecdsa_p256();
        assert!(cert.verify_signature(&stranger.public_key()).is_err());
    }

    #[test]
    fn fixed_serial_is_embedded() {
        let (cert, _) = build(KeyAlgorithm::Ec);
        assert_eq!(cert.serial_number(), vec![0x03, 0xe8]);
        assert_eq!(cert.serial_number_hex(), "03:E8");
    }

    #[test]
    fn carries_trust_anchor_extensions() {
        let (cert, _) = build(KeyAlgorithm::Ec);
        let extensions = cert.extensions();
        assert_eq!(extensions.len(), 4);
        let bc = extensions
            .iter()
            .find(|ext| ext.oid == BasicConstraints::OID)
            .unwrap();
        assert!(bc.critical);
        assert!(bc.to_extension::<BasicConstraints>().unwrap().is_ca);
    }

    #[test]
    fn pem_round_trip_preserves_certificate() {
        let (cert, _) = build(KeyAlgorithm::Ec);
        let pem = cert.to_pem().unwrap();
        assert!(pem.starts_with("-----BEGIN CERTIFICATE-----\n"));
        assert_eq!(Certificate::from_pem(&pem).unwrap(), cert);
        assert_eq!(cert.fingerprint_sha256().unwrap().len(), 32 * 3 - 1);
    }

    #[test]
    fn tbs_decodes_embedded_key() {
        let (cert, key_pair) = build(KeyAlgorithm::Rsa);
        let tbs = cert.tbs().unwrap();
        assert_eq!(tbs.subject_public_key, key_pair.public_key());
        assert_eq!(tbs.signature_algorithm, SignatureAlgorithm::Sha256WithRSA);
        assert_eq!(tbs.subject, tbs.issuer);
    }
}
