// Copyright 2021 Contributors to the ASiC Tools project.
// SPDX-License-Identifier: MIT

//! Creates a signed container from a set of files on disk.

use crate::common::{SIGNING_CERT_ENV, SIGNING_KEY_ENV};
use crate::error::Result;
use crate::util::get_config_from_command_or_env;
use asic::signature::local::RsaSigningKey;
use asic::{AsicWriter, MessageDigestAlgorithm, WriterConfig};
use log::info;
use structopt::StructOpt;

/// Models the options required by the create command.
#[derive(Debug, StructOpt)]
pub struct Create {
    /// The output file, which will contain the signed container once the process completes.
    #[structopt(short = "o", long = "out-file")]
    output_file: String,

    /// Name of one of the input files to designate as the root file of the container.
    #[structopt(long = "root-file")]
    root_file: Option<String>,

    /// Also write an OASIS file manifest (META-INF/manifest.xml).
    #[structopt(long = "oasis")]
    oasis: bool,

    /// Digest algorithm for the signed manifest: sha256, sha384 or sha512.
    #[structopt(long = "digest", default_value = "sha256")]
    digest: MessageDigestAlgorithm,

    /// Path to the PKCS#8 PEM signing key. Falls back to the ASIC_SIGNING_KEY environment variable.
    #[structopt(long = "key")]
    key: Option<String>,

    /// Path to the PEM certificate of the signing key. Falls back to the ASIC_SIGNING_CERT environment
    /// variable.
    #[structopt(long = "cert")]
    cert: Option<String>,

    /// The files to put in the container. Each is stored under its own file name.
    #[structopt(required = true)]
    files: Vec<String>,
}

impl Create {
    /// Builds and signs the container from the given inputs.
    pub fn run(&self) -> Result<()> {
        let key_path = get_config_from_command_or_env(&self.key, SIGNING_KEY_ENV, "signing key")?;
        let cert_path =
            get_config_from_command_or_env(&self.cert, SIGNING_CERT_ENV, "signing certificate")?;
        let signing_key = RsaSigningKey::from_files(&key_path, &cert_path)?;

        let config = WriterConfig::default()
            .digest_algorithm(self.digest)
            .oasis_manifest(self.oasis);
        let mut writer = AsicWriter::create_path(&self.output_file, config)?;
        for file in &self.files {
            writer.add_file(file)?;
        }
        if let Some(root_file) = &self.root_file {
            writer.set_root_file(root_file)?;
        }
        writer.sign(&signing_key)?;

        info!(
            "Created {} with {} files",
            self.output_file,
            self.files.len()
        );
        Ok(())
    }
}
