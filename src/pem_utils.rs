use crate::error::{CertForgeError, Result};

/// Convert DER‑encoded data into a PEM‑encoded string with the provided label.
///
/// Lines are wrapped at 64 columns and terminated with `\n`.
pub fn der_to_pem(der: &[u8], label: &str) -> String {
    let pem = pem::Pem::new(label, der);
    pem::encode_config(
        &pem,
        pem::EncodeConfig::new().set_line_ending(pem::LineEnding::LF),
    )
}

/// Convert a PEM‑encoded string to DER‑encoded bytes, checking the label.
pub fn pem_to_der(pem_str: &str, expected_label: &str) -> Result<Vec<u8>> {
    let pem = pem::parse(pem_str)?;
    if pem.tag() != expected_label {
        return Err(CertForgeError::DecodingError(format!(
            "expected a {expected_label} block, found {}",
            pem.tag()
        )));
    }
    Ok(pem.contents().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_is_checked() {
        let encoded = der_to_pem(&[0x30, 0x00], "PUBLIC KEY");
        assert_eq!(pem_to_der(&encoded, "PUBLIC KEY").unwrap(), vec![0x30, 0x00]);
        assert!(matches!(
            pem_to_der(&encoded, "CERTIFICATE"),
            Err(CertForgeError::DecodingError(_))
        ));
    }

    #[test]
    fn uses_unix_line_endings() {
        let encoded = der_to_pem(&[0u8; 100], "CERTIFICATE");
        assert!(!encoded.contains('\r'));
        assert!(encoded.ends_with("-----END CERTIFICATE-----\n"));
    }
}
