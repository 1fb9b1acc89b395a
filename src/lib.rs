//! # CertForge - Self-Signed Certificate Issuance
//!
//! CertForge issues a self-signed X.509 certificate for an organization,
//! checks that the certificate and the generated key pair belong together,
//! and packages the key pair, the certificate and a plain-text summary into a
//! single archive. It is built entirely on RustCrypto libraries, with no
//! dependency on ring or OpenSSL (except for testing).
//!
//! ## Supported Key Types
//!
//! - **RSA**: 2048-bit keys, signed with `sha256WithRSAEncryption`
//! - **ECDSA**: P-256 (secp256r1) keys, signed with `ecdsa-with-SHA256`
//!
//! ## Issuance Pipeline
//!
//! 1. **Sanitize**: the organization identifier and name are filtered to
//!    `A-Z a-z 0-9`, space and `-` ([`sanitize`]), then bounded in length
//!    ([`identity::Identity`]).
//! 2. **Generate**: a fresh key pair is drawn from the OS CSPRNG ([`key`]).
//! 3. **Build**: a v3 certificate whose issuer is its own subject is signed
//!    with the new private key ([`cert`]).
//! 4. **Verify**: the embedded public key and a test signature are checked
//!    against the key pair ([`verify`]). Failures are reported, not fatal.
//! 5. **Package**: private key, public key, certificate and summary are
//!    bundled into `<organization>_<identifier>.tar`; the intermediate files
//!    are always removed ([`package`]).
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use certforge::config::IssuanceConfig;
//! use certforge::issuance::{IssuanceRequest, issue};
//!
//! # fn main() -> Result<(), certforge::error::CertForgeError> {
//! let request = IssuanceRequest::parse("B12345678", "Acme Corp", "EC")?;
//! let config = IssuanceConfig::builder().output_dir("certs").build();
//!
//! let result = issue(&request, &config)?;
//! if !result.is_verified() {
//!     eprintln!("warning: key binding could not be verified");
//! }
//! println!("archive: {}", result.archive_path.display());
//! println!("expires: {}", result.expires_at().date());
//! # Ok(())
//! # }
//! ```
//!
//! ### Building a Certificate Without Packaging
//!
//! ```rust
//! use certforge::{
//!     cert::build_self_signed_certificate,
//!     config::{IssuanceConfig, SerialPolicy},
//!     identity::Identity,
//!     key::{KeyAlgorithm, KeyPair},
//!     verify::verify_binding,
//! };
//!
//! # fn main() -> Result<(), certforge::error::CertForgeError> {
//! let config = IssuanceConfig::default();
//! let identity = Identity::new("B12345678", "Acme Corp", &config)?;
//! let key_pair = KeyPair::generate(KeyAlgorithm::Ec)?;
//!
//! let certificate = build_self_signed_certificate(
//!     &identity,
//!     &key_pair,
//!     config.validity()?,
//!     &SerialPolicy::Random,
//! )?;
//!
//! assert!(verify_binding(&certificate, &key_pair).is_trusted());
//! println!("{}", certificate.to_pem()?);
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Every failure is a [`error::CertForgeError`] variant and is terminal for
//! the run:
//!
//! ```rust
//! use certforge::{error::CertForgeError, issuance::IssuanceRequest};
//!
//! match IssuanceRequest::parse("B12345678", "Acme Corp", "DSA") {
//!     Ok(_) => unreachable!(),
//!     Err(CertForgeError::UnsupportedAlgorithm(name)) => println!("no support for {name}"),
//!     Err(e) => println!("Other error: {}", e),
//! }
//! ```
//!
//! ## Logging
//!
//! The crate emits [`tracing`] events and spans; install any subscriber to
//! see them.
//!
//! ## Module Organization
//!
//! - [`sanitize`]: Allow-list filtering of caller input
//! - [`identity`]: The validated certificate subject
//! - [`key`]: Key generation, encoding, signing and verification
//! - [`cert`]: Certificate construction, encoding and inspection
//! - [`issuer`]: Signing of the to-be-signed body
//! - [`verify`]: Key/certificate binding checks
//! - [`package`]: Artifact serialization and archiving
//! - [`issuance`]: The end-to-end pipeline
//! - [`config`]: Named defaults for every constant
//! - [`error`]: Error types
//! - [`tbs_certificate`]: Low-level certificate structure manipulation

pub mod cert;
pub mod config;
pub mod error;
pub mod identity;
pub mod issuance;
pub mod issuer;
pub mod key;
pub mod package;
pub mod pem_utils;
pub mod sanitize;
pub mod tbs_certificate;
pub mod verify;

pub use error::{CertForgeError, Result};
pub use issuance::{IssuanceRequest, IssuanceResult, issue};
pub use key::KeyAlgorithm;
