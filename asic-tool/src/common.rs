// Copyright 2021 Contributors to the ASiC Tools project.
// SPDX-License-Identifier: MIT

//! Constants shared across the tool.

pub const PROJECT_NAME: &str = env!("CARGO_PKG_NAME");
pub const PROJECT_DESC: &str = env!("CARGO_PKG_DESCRIPTION");
pub const PROJECT_AUTHOR: &str = env!("CARGO_PKG_AUTHORS");
pub const PROJECT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable naming the PKCS#8 PEM signing key, when `--key` is not given.
pub const SIGNING_KEY_ENV: &str = "ASIC_SIGNING_KEY";

/// Environment variable naming the PEM signing certificate, when `--cert` is not given.
pub const SIGNING_CERT_ENV: &str = "ASIC_SIGNING_CERT";
