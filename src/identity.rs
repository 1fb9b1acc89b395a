use crate::cert::params::DistinguishedName;
use crate::config::IssuanceConfig;
use crate::error::Result;
use crate::sanitize::sanitize_field;

/// The organization a certificate is issued to.
///
/// Only constructible through [`Identity::new`], so every string field has
/// passed the sanitizer before it can reach a certificate name or a filename.
/// The fields are read-only from outside this module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    country_code: String,
    organization_identifier: String,
    common_name: String,
    organization_name: String,
    organizational_unit: String,
}

impl Identity {
    /// Sanitizes and validates the caller's fields.
    ///
    /// The configured country code and organizational unit are sanitized as
    /// well. Fails with `InvalidInput` when any field is empty after
    /// sanitization or longer than `config.max_field_length`.
    pub fn new(
        organization_identifier: &str,
        organization_name: &str,
        config: &IssuanceConfig,
    ) -> Result<Self> {
        let max = config.max_field_length;
        let organization_identifier =
            sanitize_field("organization identifier", organization_identifier, max)?;
        let organization_name = sanitize_field("organization name", organization_name, max)?;

        Ok(Self {
            country_code: sanitize_field("country code", &config.country_code, max)?,
            organization_identifier,
            common_name: organization_name.clone(),
            organization_name,
            organizational_unit: sanitize_field(
                "organizational unit",
                &config.organizational_unit,
                max,
            )?,
        })
    }

    pub fn country_code(&self) -> &str {
        &self.country_code
    }

    /// Tax or registry identifier, e.g. a Spanish CIF. Ends up in the
    /// subject `serialNumber` attribute and in every artifact filename.
    pub fn organization_identifier(&self) -> &str {
        &self.organization_identifier
    }

    pub fn common_name(&self) -> &str {
        &self.common_name
    }

    pub fn organization_name(&self) -> &str {
        &self.organization_name
    }

    pub fn organizational_unit(&self) -> &str {
        &self.organizational_unit
    }

    pub fn to_distinguished_name(&self) -> DistinguishedName {
        DistinguishedName::builder()
            .common_name(self.common_name.clone())
            .serial_number(self.organization_identifier.clone())
            .country(self.country_code.clone())
            .organization(self.organization_name.clone())
            .organization_unit(self.organizational_unit.clone())
            .build()
    }
}
