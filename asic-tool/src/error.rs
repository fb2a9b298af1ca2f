// Copyright 2021 Contributors to the ASiC Tools project.
// SPDX-License-Identifier: MIT

//! Error definitions/handling.

use thiserror::Error;

/// Errors in asic-tool
#[derive(Error, Debug)]
pub enum Error {
    /// Error emanating from standard I/O.
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    /// Errors coming from container processing, due to a container being unreadable, inconsistent or
    /// failing verification.
    #[error(transparent)]
    ContainerError(#[from] asic::error::Error),

    /// Errors relating to signing keys and certificates.
    #[error(transparent)]
    SignatureError(#[from] asic::signature::error::SignatureError),

    /// Errors relating to JSON processing.
    #[error(transparent)]
    JsonError(#[from] serde_json::Error),

    /// Error emanating from the asic-tool itself.
    #[error(transparent)]
    ToolError(#[from] ToolErrorKind),
}

/// Errors originating in the asic-tool itself.
#[derive(Error, Debug)]
pub enum ToolErrorKind {
    /// Operation not supported by this build of the asic-tool, such as signing when the `sign` feature
    /// is disabled.
    #[error("Operation not supported by the asic-tool")]
    NotSupported,

    /// There is some missing configuration for a command, such as a required environment variable or
    /// configuration file/option.
    #[error("Missing configuration")]
    MissingConfiguration,

    /// A container entry name would be written outside the extraction directory.
    #[error("Refusing to extract unsafe entry name `{0}`")]
    UnsafeEntryName(String),
}

/// A Result type with the Err variant set as a ToolError
pub type Result<T> = std::result::Result<T, Error>;
