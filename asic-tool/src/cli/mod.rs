// Copyright 2021 Contributors to the ASiC Tools project.
// SPDX-License-Identifier: MIT

//! Base CLI implementation.

use crate::common::{PROJECT_AUTHOR, PROJECT_DESC, PROJECT_NAME, PROJECT_VERSION};
use crate::subcommands::Subcommand;
use structopt::StructOpt;

/// Struct representing the command-line interface of asic-tool
#[derive(Debug, StructOpt)]
#[structopt(name=PROJECT_NAME, about=PROJECT_DESC, author=PROJECT_AUTHOR, version=PROJECT_VERSION)]
pub struct AsicToolApp {
    /// The subcommand -- e.g., create or verify
    #[structopt(subcommand)]
    pub subcommand: Subcommand,
}

#[cfg(test)]
mod tests {
    use super::AsicToolApp;
    use crate::subcommands::Subcommand;
    use structopt::StructOpt;

    #[test]
    fn test_parse_verify() {
        let app = AsicToolApp::from_iter_safe(&[
            "asic-tool",
            "verify",
            "-c",
            "bundle.asice",
            "--lenient",
            "--allow-unreferenced",
        ])
        .unwrap();
        match app.subcommand {
            Subcommand::Verify(_) => {}
            _ => panic!("Expected the verify command."),
        }
    }

    #[test]
    fn test_parse_combine_requires_inputs() {
        assert!(AsicToolApp::from_iter_safe(&["asic-tool", "combine", "-o", "out.asice"]).is_err());
        assert!(AsicToolApp::from_iter_safe(&[
            "asic-tool",
            "combine",
            "-o",
            "out.asice",
            "first.asice",
            "second.asice"
        ])
        .is_ok());
    }

    #[cfg(feature = "sign")]
    #[test]
    fn test_parse_create_digest() {
        assert!(AsicToolApp::from_iter_safe(&[
            "asic-tool",
            "create",
            "-o",
            "out.asice",
            "--digest",
            "sha512",
            "content1.txt"
        ])
        .is_ok());
        assert!(AsicToolApp::from_iter_safe(&[
            "asic-tool",
            "create",
            "-o",
            "out.asice",
            "--digest",
            "md5",
            "content1.txt"
        ])
        .is_err());
    }
}
