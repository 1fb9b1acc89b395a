//! Read-only checks that a certificate and a key pair belong together.
//!
//! Neither check mutates its inputs and neither returns an error: every
//! failure path collapses to `false` so the reporting layer only deals with
//! two booleans.

use tracing::{debug, warn};

use crate::cert::Certificate;
use crate::key::KeyPair;

/// Message signed by [`verify_signature_binding`].
pub const TEST_MESSAGE: &[u8] = b"Test message for signing";

/// Whether the certificate embeds exactly the key pair's public key.
///
/// Both keys are serialized to SubjectPublicKeyInfo DER and compared byte
/// for byte; an algorithm-compatible but different key does not match.
pub fn verify_public_key_binding(cert: &Certificate, key_pair: &KeyPair) -> bool {
    let embedded = match cert.subject_public_key_der() {
        Ok(der) => der,
        Err(err) => {
            debug!(%err, "could not encode the certificate public key");
            return false;
        }
    };
    match key_pair.public_key().to_der() {
        Ok(generated) => generated == embedded,
        Err(err) => {
            debug!(%err, "could not encode the key pair public key");
            false
        }
    }
}

/// Whether a signature made with the private key verifies under the
/// certificate's public key.
///
/// Signs [`TEST_MESSAGE`] with SHA-256. Signing errors, undecodable keys,
/// algorithm mismatches and bad signatures all yield `false`.
pub fn verify_signature_binding(cert: &Certificate, key_pair: &KeyPair) -> bool {
    let signature = match key_pair.sign_data(TEST_MESSAGE) {
        Ok(signature) => signature,
        Err(err) => {
            debug!(%err, "signing the test message failed");
            return false;
        }
    };
    let public_key = match cert.subject_public_key() {
        Ok(public_key) => public_key,
        Err(err) => {
            debug!(%err, "could not decode the certificate public key");
            return false;
        }
    };
    public_key.verify(TEST_MESSAGE, &signature).is_ok()
}

/// Outcome of both binding checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerificationReport {
    pub public_key_verified: bool,
    pub signature_verified: bool,
}

impl VerificationReport {
    /// `true` when the private key, the embedded public key and the
    /// certificate are mutually consistent.
    pub fn is_trusted(&self) -> bool {
        self.public_key_verified && self.signature_verified
    }
}

/// Runs both checks and logs a warning for each one that fails.
pub fn verify_binding(cert: &Certificate, key_pair: &KeyPair) -> VerificationReport {
    let report = VerificationReport {
        public_key_verified: verify_public_key_binding(cert, key_pair),
        signature_verified: verify_signature_binding(cert, key_pair),
    };

    if !report.public_key_verified {
        warn!("certificate public key does not match the generated key pair");
    }
    if !report.signature_verified {
        warn!("signature made with the private key does not verify against the certificate");
    }
    report
}
