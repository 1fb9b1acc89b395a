#![allow(dead_code)]

use std::path::Path;

use certforge::config::{IssuanceConfig, SerialPolicy};
use certforge::issuance::{IssuanceRequest, IssuanceResult, issue};
use certforge::key::KeyAlgorithm;
use certforge::package::read_archive_member;

pub const IDENTIFIER: &str = "B12345678";
pub const ORGANIZATION: &str = "Acme Corp";

pub fn config_in(dir: &Path) -> IssuanceConfig {
    IssuanceConfig::builder().output_dir(dir).build()
}

pub fn legacy_config_in(dir: &Path) -> IssuanceConfig {
    IssuanceConfig::builder()
        .output_dir(dir)
        .serial_policy(SerialPolicy::Fixed(1000))
        .build()
}

pub fn issue_acme(dir: &Path, algorithm: KeyAlgorithm) -> IssuanceResult {
    let request = IssuanceRequest::new(IDENTIFIER, ORGANIZATION, algorithm);
    issue(&request, &legacy_config_in(dir)).expect("issuance failed")
}

pub fn member_text(result: &IssuanceResult, member: &str) -> String {
    let bytes = read_archive_member(&result.archive_path, member).expect("member missing");
    String::from_utf8(bytes).expect("member is not UTF-8")
}

pub fn dir_entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .expect("read_dir failed")
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
