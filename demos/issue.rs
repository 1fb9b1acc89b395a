use std::path::PathBuf;
use std::process::ExitCode;

use certforge::config::{IssuanceConfig, LEGACY_SERIAL_NUMBER, SerialPolicy};
use certforge::issuance::{IssuanceRequest, issue};
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Issue a self-signed certificate and package it with its key pair.
#[derive(Parser, Debug)]
#[command(name = "issue", version)]
struct Args {
    /// Organization identifier, e.g. B12345678
    identifier: String,

    /// Organization name, e.g. "Acme Corp"
    name: String,

    /// Key algorithm: RSA or EC
    #[arg(short, long, default_value = "RSA")]
    algorithm: String,

    /// Directory the archive is written to
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Validity period in days, at least 1
    #[arg(long, default_value_t = certforge::config::DEFAULT_VALIDITY_DAYS)]
    days: i64,

    /// Use the fixed legacy serial number instead of a random one
    #[arg(long)]
    legacy_serial: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let request = match IssuanceRequest::parse(&args.identifier, &args.name, &args.algorithm) {
        Ok(request) => request,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let serial_policy = if args.legacy_serial {
        SerialPolicy::Fixed(LEGACY_SERIAL_NUMBER)
    } else {
        SerialPolicy::Random
    };
    let config = IssuanceConfig::builder()
        .output_dir(args.output_dir)
        .validity_days(args.days)
        .serial_policy(serial_policy)
        .build();

    let result = match issue(&request, &config) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    println!("Archive: {}", result.archive_path.display());
    println!(
        "Public key matches certificate: {}",
        if result.public_key_verified { "yes" } else { "NO" }
    );
    println!(
        "Signature verifies: {}",
        if result.signature_verified { "yes" } else { "NO" }
    );

    println!("Expires: {}", result.expires_at().date());
    println!("Reminder: {}", result.renewal_reminder());

    if result.is_verified() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
