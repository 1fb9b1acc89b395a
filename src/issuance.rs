use std::path::PathBuf;

use time::OffsetDateTime;
use tracing::{info, instrument, warn};

use crate::cert::{Certificate, build_self_signed_certificate};
use crate::config::IssuanceConfig;
use crate::error::Result;
use crate::identity::Identity;
use crate::key::{KeyAlgorithm, KeyPair};
use crate::package::package;
use crate::verify::{VerificationReport, verify_binding};

/// What the caller asks for: who the certificate is for and which key type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuanceRequest {
    pub organization_identifier: String,
    pub organization_name: String,
    pub algorithm: KeyAlgorithm,
}

impl IssuanceRequest {
    pub fn new(
        organization_identifier: impl Into<String>,
        organization_name: impl Into<String>,
        algorithm: KeyAlgorithm,
    ) -> Self {
        Self {
            organization_identifier: organization_identifier.into(),
            organization_name: organization_name.into(),
            algorithm,
        }
    }

    /// Builds a request from free-form input, validating the algorithm name.
    ///
    /// Fails with `UnsupportedAlgorithm` for anything but RSA or EC.
    pub fn parse(
        organization_identifier: impl Into<String>,
        organization_name: impl Into<String>,
        algorithm: &str,
    ) -> Result<Self> {
        Ok(Self::new(
            organization_identifier,
            organization_name,
            algorithm.parse()?,
        ))
    }
}

/// Everything one issuance run produced.
///
/// Returned by value; nothing about the run is kept anywhere else.
#[derive(Debug, Clone)]
pub struct IssuanceResult {
    pub archive_path: PathBuf,
    pub identity: Identity,
    pub certificate: Certificate,
    pub key_pair: KeyPair,
    pub public_key_verified: bool,
    pub signature_verified: bool,
}

impl IssuanceResult {
    pub fn verification(&self) -> VerificationReport {
        VerificationReport {
            public_key_verified: self.public_key_verified,
            signature_verified: self.signature_verified,
        }
    }

    /// `true` when both binding checks passed.
    pub fn is_verified(&self) -> bool {
        self.verification().is_trusted()
    }

    /// Instant after which the certificate stops being valid.
    pub fn expires_at(&self) -> OffsetDateTime {
        self.certificate.validity().not_after
    }

    /// Reminder to renew before the certificate expires, shown after every run.
    pub fn renewal_reminder(&self) -> String {
        let expires = self.expires_at();
        format!(
            "Renew the certificate before {} ({} days from now)",
            expires.date(),
            (expires - OffsetDateTime::now_utc()).whole_days()
        )
    }
}

/// Issues, verifies and packages a self-signed certificate.
///
/// The validity period and the identity are validated first, so invalid
/// input creates no files. Verification never blocks packaging: a failed check is logged and
/// reported through [`IssuanceResult::public_key_verified`] and
/// [`IssuanceResult::signature_verified`].
///
/// ```no_run
/// use certforge::config::IssuanceConfig;
/// use certforge::issuance::{IssuanceRequest, issue};
///
/// # fn main() -> certforge::error::Result<()> {
/// let request = IssuanceRequest::parse("B12345678", "Acme Corp", "RSA")?;
/// let result = issue(&request, &IssuanceConfig::default())?;
/// println!("{} (verified: {})", result.archive_path.display(), result.is_verified());
/// # Ok(())
/// # }
/// ```
#[instrument(skip_all, fields(algorithm = %request.algorithm))]
pub fn issue(request: &IssuanceRequest, config: &IssuanceConfig) -> Result<IssuanceResult> {
    let validity = config.validity()?;
    let identity = Identity::new(
        &request.organization_identifier,
        &request.organization_name,
        config,
    )?;
    info!(
        identifier = %identity.organization_identifier(),
        organization = %identity.organization_name(),
        "issuing certificate"
    );

    let key_pair = KeyPair::generate(request.algorithm)?;
    let certificate = build_self_signed_certificate(
        &identity,
        &key_pair,
        validity,
        &config.serial_policy,
    )?;

    let report = verify_binding(&certificate, &key_pair);
    if !report.is_trusted() {
        warn!(?report, "packaging a certificate that failed verification");
    }

    let archive_path = package(&identity, &certificate, &key_pair, &config.output_dir)?;
    info!(
        archive = %archive_path.display(),
        expires = %certificate.validity().not_after.date(),
        "certificate issued"
    );

    Ok(IssuanceResult {
        archive_path,
        identity,
        certificate,
        key_pair,
        public_key_verified: report.public_key_verified,
        signature_verified: report.signature_verified,
    })
}
