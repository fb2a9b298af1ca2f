// Copyright 2021 Contributors to the ASiC Tools project.
// SPDX-License-Identifier: MIT

//! Verifies a container and prints what it signs.

use crate::error::Result;
use asic::signature::SignatureVerifier;
use asic::{AsicReader, ReaderConfig, UnreferencedPolicy};
use log::info;
use structopt::StructOpt;

/// Models the options required by the verify command.
#[derive(Debug, StructOpt)]
pub struct Verify {
    /// The container to verify.
    #[structopt(short = "c", long = "container")]
    container: String,

    /// PEM certificate used to check the signatures. Without it only the digests are checked.
    #[structopt(long = "cert")]
    cert: Option<String>,

    /// Accept containers whose `mimetype` entry is missing or misplaced.
    #[structopt(long = "lenient")]
    lenient: bool,

    /// Accept payload files that no signed manifest refers to.
    #[structopt(long = "allow-unreferenced")]
    allow_unreferenced: bool,
}

impl Verify {
    /// Verifies the container and writes the resulting manifest to the console as JSON.
    pub fn run(&self) -> Result<()> {
        let policy = if self.allow_unreferenced {
            UnreferencedPolicy::Tolerate
        } else {
            UnreferencedPolicy::Reject
        };
        let config = ReaderConfig::default()
            .strict(!self.lenient)
            .unreferenced(policy);

        let mut reader = AsicReader::open_path(&self.container, config)?;
        if let Some(cert) = &self.cert {
            reader = reader.with_signature_verifier(signature_verifier(cert)?);
        }
        let manifest = reader.verify_all()?;

        println!("{}", serde_json::to_string_pretty(&manifest)?);
        info!(
            "{} verified: {} files, {} signatures",
            self.container,
            manifest.files.len(),
            manifest.signers.len()
        );
        Ok(())
    }
}

#[cfg(feature = "sign")]
fn signature_verifier(cert_path: &str) -> Result<Box<dyn SignatureVerifier>> {
    let cert_pem = std::fs::read(cert_path)?;
    let verifier = asic::signature::local::RsaCertificateVerifier::from_pem(&cert_pem)?;
    Ok(Box::new(verifier))
}

#[cfg(not(feature = "sign"))]
fn signature_verifier(_cert_path: &str) -> Result<Box<dyn SignatureVerifier>> {
    Err(crate::error::ToolErrorKind::NotSupported.into())
}
