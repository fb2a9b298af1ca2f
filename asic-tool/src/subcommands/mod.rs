// Copyright 2021 Contributors to the ASiC Tools project.
// SPDX-License-Identifier: MIT

//! Individual commands supported by asic-tool.

#[cfg(feature = "sign")]
mod create;

mod combine;
mod extract;
mod verify;

use crate::error::Result;

#[cfg(feature = "sign")]
use crate::subcommands::create::Create;

use crate::subcommands::combine::Combine;
use crate::subcommands::extract::Extract;
use crate::subcommands::verify::Verify;

use structopt::StructOpt;

/// Command-line interface to asic-tool operations.
#[derive(Debug, StructOpt)]
pub enum Subcommand {
    /// Creates a signed ASiC-E container from a set of files, using a PKCS#8 signing key and the
    /// matching X.509 certificate.
    #[cfg(feature = "sign")]
    Create(Create),

    /// Verifies every digest (and optionally every signature) in a container, and writes a JSON summary
    /// of the signed content to the console.
    Verify(Verify),

    /// Extracts the files of a container into a directory, verifying them on the way.
    Extract(Extract),

    /// Combines several signed containers into one, keeping every signature.
    Combine(Combine),
}

impl Subcommand {
    /// Runs the command.
    pub fn run(&self) -> Result<()> {
        match &self {
            #[cfg(feature = "sign")]
            Subcommand::Create(cmd) => cmd.run(),
            Subcommand::Verify(cmd) => cmd.run(),
            Subcommand::Extract(cmd) => cmd.run(),
            Subcommand::Combine(cmd) => cmd.run(),
        }
    }
}
