use der::Encode;
use tracing::debug;
use x509_cert::certificate::CertificateInner;

use crate::cert::Certificate;
use crate::cert::extensions::{
    AuthorityKeyIdentifier, BasicConstraints, KeyUsage, SubjectKeyIdentifier, key_identifier,
};
use crate::cert::params::{CertificationRequestInfo, DistinguishedName, ExtensionParam, Validity};
use crate::error::{CertForgeError, Result};
use crate::key::KeyPair;
use crate::tbs_certificate::TbsCertificate;

/// Represents an entity capable of issuing certificates.
///
/// The only issuer this crate ships is the certificate's own subject, see
/// [`Certificate::new_self_signed`].
pub trait Issuer {
    /// Returns the distinguished name of the issuer.
    fn issuer_name(&self) -> DistinguishedName;

    /// Returns the signing key of the issuer.
    fn signing_key(&self) -> &KeyPair;

    /// Issues a certificate for `cert_request`.
    ///
    /// The issued certificate is an X.509 v3 trust anchor: it carries a
    /// critical BasicConstraints (`cA`), a critical KeyUsage, and subject and
    /// authority key identifiers. The TBS body is signed with SHA-256.
    ///
    /// Any failure is reported as [`CertForgeError::CertificateBuildFailure`].
    fn issue(
        &self,
        cert_request: &CertificationRequestInfo,
        validity: Validity,
        serial_number: Vec<u8>,
    ) -> Result<Certificate> {
        issue_with(self, cert_request, validity, serial_number).map_err(|err| match err {
            CertForgeError::CertificateBuildFailure(_) => err,
            other => CertForgeError::CertificateBuildFailure(other.to_string()),
        })
    }
}

fn issue_with<I: Issuer + ?Sized>(
    issuer: &I,
    cert_request: &CertificationRequestInfo,
    validity: Validity,
    serial_number: Vec<u8>,
) -> Result<Certificate> {
    let signing_key = issuer.signing_key();
    let signature_algo = signing_key.signature_algorithm();

    let issuer_spki = signing_key.as_spki()?;
    let subject_spki = cert_request.subject_public_key.to_spki()?;

    let extensions = vec![
        ExtensionParam::from_extension(
            BasicConstraints {
                is_ca: true,
                max_path_length: None,
            },
            true,
        )?,
        ExtensionParam::from_extension(KeyUsage::trust_anchor(), true)?,
        ExtensionParam::from_extension(
            SubjectKeyIdentifier(key_identifier(subject_spki.subject_public_key.raw_bytes())),
            false,
        )?,
        ExtensionParam::from_extension(
            AuthorityKeyIdentifier {
                key_identifier: key_identifier(issuer_spki.subject_public_key.raw_bytes()),
            },
            false,
        )?,
    ];

    let combined_extensions = extensions
        .into_iter()
        .chain(cert_request.extensions.iter().cloned())
        .collect();

    let tbs_cert = TbsCertificate {
        serial_number,
        signature_algorithm: signature_algo,
        issuer: issuer.issuer_name(),
        validity,
        subject: cert_request.subject.clone(),
        subject_public_key: cert_request.subject_public_key.clone(),
        extensions: combined_extensions,
    };

    let tbs_cert_inner = tbs_cert.to_tbs_certificate_inner()?;
    let tbs_der = tbs_cert_inner.to_der()?;
    let signature = signing_key.sign_data(&tbs_der)?;
    debug!(
        tbs_len = tbs_der.len(),
        signature_len = signature.len(),
        algorithm = ?signature_algo,
        "certificate body signed"
    );

    let cert_inner = CertificateInner {
        tbs_certificate: tbs_cert_inner,
        signature_algorithm: signature_algo.into(),
        signature: der::asn1::BitString::from_bytes(&signature)?,
    };

    Ok(Certificate { inner: cert_inner })
}
