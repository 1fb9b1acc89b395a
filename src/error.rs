//! Error types shared by every issuance stage.

use thiserror::Error;

/// Represents errors that can occur while issuing a certificate.
///
/// Every variant is terminal for a single issuance attempt. Nothing is
/// retried internally; the caller decides whether to try again with fresh
/// input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CertForgeError {
    /// An identity field is empty or too long after sanitization.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The requested key algorithm is not RSA or EC.
    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// Randomness or the algorithm backend failed while creating a key pair.
    #[error("Key generation failure: {0}")]
    KeyGenerationFailure(String),

    /// Encoding or signing of the certificate body failed.
    #[error("Certificate build failure: {0}")]
    CertificateBuildFailure(String),

    /// Writing an artifact or assembling the archive failed.
    #[error("Packaging error: {0}")]
    PackagingError(String),

    /// Error during data encoding.
    #[error("Failed to encode data: {0}")]
    EncodingError(String),

    /// Error during data decoding.
    #[error("Failed to decode data: {0}")]
    DecodingError(String),
}

pub type Result<T> = std::result::Result<T, CertForgeError>;

impl From<der::Error> for CertForgeError {
    fn from(err: der::Error) -> Self {
        CertForgeError::DecodingError(err.to_string())
    }
}

impl From<rsa::Error> for CertForgeError {
    fn from(err: rsa::Error) -> Self {
        CertForgeError::KeyGenerationFailure(err.to_string())
    }
}

impl From<pkcs8::Error> for CertForgeError {
    fn from(err: pkcs8::Error) -> Self {
        CertForgeError::EncodingError(err.to_string())
    }
}

impl From<pkcs8::spki::Error> for CertForgeError {
    fn from(err: pkcs8::spki::Error) -> Self {
        CertForgeError::EncodingError(err.to_string())
    }
}

impl From<pem::PemError> for CertForgeError {
    fn from(err: pem::PemError) -> Self {
        CertForgeError::DecodingError(err.to_string())
    }
}

impl From<std::io::Error> for CertForgeError {
    fn from(err: std::io::Error) -> Self {
        CertForgeError::PackagingError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_surface_as_packaging_errors() {
        let err: CertForgeError =
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only").into();
        assert!(matches!(err, CertForgeError::PackagingError(_)));
        assert_eq!(err.to_string(), "Packaging error: read-only");
    }
}
