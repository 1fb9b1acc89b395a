//! Serializes issuance artifacts and bundles them into one tar archive.
//!
//! The four member files are staged in a run-scoped temporary directory
//! inside the output directory, so concurrent runs never share intermediate
//! paths. The directory is removed on every exit path: explicitly once the
//! archive is bundled, by `Drop` when anything fails before that. The archive itself is
//! assembled in a temporary file next to its final location and moved into
//! place without overwriting an existing archive.

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info, instrument};

use crate::cert::Certificate;
use crate::error::{CertForgeError, Result};
use crate::identity::Identity;
use crate::key::KeyPair;

/// Extension of produced archives.
pub const ARCHIVE_EXTENSION: &str = "tar";

/// How many suffixed names are tried before giving up on a free archive name.
const MAX_NAME_ATTEMPTS: usize = 1000;

/// Names of the four archive members for one organization identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactNames {
    pub private_key: String,
    pub public_key: String,
    pub certificate: String,
    pub summary: String,
}

impl ArtifactNames {
    pub fn for_identifier(identifier: &str) -> Self {
        Self {
            private_key: format!("private_key_{identifier}.pem"),
            public_key: format!("public_key_{identifier}.pem"),
            certificate: format!("certificate_{identifier}.crt"),
            summary: format!("{identifier}-crt.txt"),
        }
    }

    /// Member names in archive order.
    pub fn all(&self) -> [&str; 4] {
        [
            &self.private_key,
            &self.public_key,
            &self.certificate,
            &self.summary,
        ]
    }
}

/// Base name of the archive, without extension: `<organization>_<identifier>`.
pub fn archive_stem(identity: &Identity) -> String {
    format!(
        "{}_{}",
        identity.organization_name(),
        identity.organization_identifier()
    )
}

/// File name of the `attempt`-th candidate for the archive.
///
/// The first candidate is `<stem>.tar`, later ones `<stem>-<attempt>.tar`.
fn candidate_name(stem: &str, attempt: usize) -> String {
    if attempt == 0 {
        format!("{stem}.{ARCHIVE_EXTENSION}")
    } else {
        format!("{stem}-{attempt}.{ARCHIVE_EXTENSION}")
    }
}

/// Plain-text issuance summary, ending with the full certificate PEM.
pub fn render_summary(
    identity: &Identity,
    certificate: &Certificate,
    key_pair: &KeyPair,
) -> Result<String> {
    let validity = certificate.validity();
    Ok(format!(
        "Organization name: {name}\n\
         Organization identifier: {identifier}\n\
         Country: {country}\n\
         Organizational unit: {unit}\n\
         Key algorithm: {algorithm}\n\
         Serial number: {serial}\n\
         Issue date: {issued}\n\
         Expiry date: {expires}\n\
         SHA-256 fingerprint: {fingerprint}\n\
         Full certificate:\n\
         {pem}",
        name = identity.organization_name(),
        identifier = identity.organization_identifier(),
        country = identity.country_code(),
        unit = identity.organizational_unit(),
        algorithm = key_pair.algorithm(),
        serial = certificate.serial_number_hex(),
        issued = validity.not_before.date(),
        expires = validity.not_after.date(),
        fingerprint = certificate.fingerprint_sha256()?,
        pem = certificate.to_pem()?,
    ))
}

/// Writes the artifacts for `identity` and bundles them into an archive in
/// `output_dir`, returning the archive path.
///
/// No intermediate file survives the call, whether it succeeds or fails.
/// Every failure is reported as [`CertForgeError::PackagingError`].
#[instrument(
    skip_all,
    fields(identifier = %identity.organization_identifier(), output_dir = %output_dir.display())
)]
pub fn package(
    identity: &Identity,
    certificate: &Certificate,
    key_pair: &KeyPair,
    output_dir: &Path,
) -> Result<PathBuf> {
    package_into(identity, certificate, key_pair, output_dir).map_err(|err| match err {
        CertForgeError::PackagingError(_) => err,
        other => CertForgeError::PackagingError(other.to_string()),
    })
}

fn package_into(
    identity: &Identity,
    certificate: &Certificate,
    key_pair: &KeyPair,
    output_dir: &Path,
) -> Result<PathBuf> {
    let names = ArtifactNames::for_identifier(identity.organization_identifier());
    let members = [
        (&names.private_key, key_pair.private_key_pem()?),
        (&names.public_key, key_pair.public_key_pem()?),
        (&names.certificate, certificate.to_pem()?),
        (&names.summary, render_summary(identity, certificate, key_pair)?),
    ];

    fs::create_dir_all(output_dir)?;
    let staging = tempfile::Builder::new()
        .prefix(".certforge-")
        .tempdir_in(output_dir)?;

    let mut staged = Vec::with_capacity(members.len());
    for (name, body) in &members {
        let path = staging.path().join(name);
        fs::write(&path, body.as_bytes())?;
        debug!(member = %name, bytes = body.len(), "artifact staged");
        staged.push((path, name.as_str()));
    }
    restrict_permissions(&staged[0].0)?;

    let pending = bundle(&staged, output_dir)?;
    staging.close()?;
    let archive_path = persist_unique(pending, output_dir, &archive_stem(identity))?;

    info!(archive = %archive_path.display(), "artifacts packaged");
    Ok(archive_path)
}

/// Owner-only permissions for the staged private key, so the archive entry
/// records them too.
#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}

fn bundle(staged: &[(PathBuf, &str)], output_dir: &Path) -> Result<NamedTempFile> {
    let mut pending = tempfile::Builder::new()
        .prefix(".certforge-")
        .suffix(".partial")
        .tempfile_in(output_dir)?;

    let mut builder = tar::Builder::new(pending.as_file_mut());
    for (path, name) in staged {
        builder.append_path_with_name(path, name)?;
    }
    builder.into_inner()?.sync_all()?;
    Ok(pending)
}

fn persist_unique(mut pending: NamedTempFile, output_dir: &Path, stem: &str) -> Result<PathBuf> {
    for attempt in 0..MAX_NAME_ATTEMPTS {
        let candidate = output_dir.join(candidate_name(stem, attempt));
        match pending.persist_noclobber(&candidate) {
            Ok(_) => return Ok(candidate),
            Err(err) if err.error.kind() == io::ErrorKind::AlreadyExists => {
                debug!(candidate = %candidate.display(), "archive name taken");
                pending = err.file;
            }
            Err(err) => return Err(err.error.into()),
        }
    }
    Err(CertForgeError::PackagingError(format!(
        "no free archive name for {stem} after {MAX_NAME_ATTEMPTS} attempts"
    )))
}

/// Lists the member names of an archive produced by [`package`].
pub fn read_archive_members(path: &Path) -> Result<Vec<String>> {
    let mut archive = tar::Archive::new(File::open(path)?);
    let mut names = Vec::new();
    for entry in archive.entries()? {
        let entry = entry?;
        names.push(entry.path()?.to_string_lossy().into_owned());
    }
    Ok(names)
}

/// Reads one member of an archive produced by [`package`].
pub fn read_archive_member(path: &Path, member: &str) -> Result<Vec<u8>> {
    let mut archive = tar::Archive::new(File::open(path)?);
    for entry in archive.entries()? {
        let mut entry = entry?;
        if entry.path()? == Path::new(member) {
            let mut contents = Vec::new();
            entry.read_to_end(&mut contents)?;
            return Ok(contents);
        }
    }
    Err(CertForgeError::PackagingError(format!(
        "{member} not found in {}",
        path.display()
    )))
}
