// Copyright 2021 Contributors to the ASiC Tools project.
// SPDX-License-Identifier: MIT

//! This module provides the error definitions for errors that can occur while building, reading, verifying
//! and combining ASiC containers.
//!
//! The errors raised by this crate itself fall into three groups, each with its own kind enum:
//!
//! - [StructuralErrorKind]: the container or one of its manifests is malformed. The session is aborted.
//! - [ConsistencyErrorKind]: two trusted statements contradict each other, such as two root files.
//! - [VerificationErrorKind]: the content of the container does not match what its manifests declare.
//!
//! Errors from collaborators (I/O, ZIP, XML, signature providers, MIME detection) are carried through
//! unchanged so that the original condition stays distinguishable at the boundary.

use thiserror::Error;

/// Top-level error type for the asic crate.
#[derive(Error, Debug)]
pub enum Error {
    /// An error that has been re-badged from the `std::io` subsystem. This includes failures of the
    /// underlying source or sink, and CRC failures reported while an entry is being read.
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    /// Error coming from the zip crate, which can happen when the archive itself is malformed.
    #[error(transparent)]
    ZipError(#[from] zip::result::ZipError),

    /// Error coming from the quick-xml crate, which happens when a manifest document is improperly formed.
    #[error(transparent)]
    XmlError(#[from] quick_xml::DeError),

    /// A digest value in a manifest is not valid base64.
    #[error(transparent)]
    Base64Error(#[from] base64::DecodeError),

    /// Errors raised by a signature provider or signature verifier.
    #[error(transparent)]
    SignatureError(#[from] crate::signature::error::SignatureError),

    /// Errors raised while determining the MIME type of a file.
    #[error(transparent)]
    MimeError(#[from] MimeErrorKind),

    /// The container or one of its manifests is malformed.
    #[error(transparent)]
    StructuralError(#[from] StructuralErrorKind),

    /// Two statements about the container contradict each other.
    #[error(transparent)]
    ConsistencyError(#[from] ConsistencyErrorKind),

    /// The content of the container does not match its manifests.
    #[error(transparent)]
    VerificationError(#[from] VerificationErrorKind),
}

/// Malformations of the container or of the manifests within it.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum StructuralErrorKind {
    #[error("The container does not begin with a `mimetype` entry.")]
    MimetypeMissing,

    #[error("The `mimetype` entry must be the first entry of the container.")]
    MimetypeNotFirst,

    #[error("The container has more than one `mimetype` entry.")]
    MimetypeDuplicate,

    #[error("The `mimetype` entry must be stored without compression.")]
    MimetypeCompressed,

    #[error("The entry name `{0}` is reserved and cannot be used for content.")]
    ReservedEntryName(String),

    #[error("The container already has an entry named `{0}`.")]
    DuplicateEntry(String),

    #[error("No entry is open for writing.")]
    NoOpenEntry,

    #[error("Digest of {actual} bytes does not fit the {algorithm} algorithm.")]
    InvalidDigestLength { algorithm: String, actual: usize },

    #[error("Unsupported digest algorithm `{0}`.")]
    UnsupportedDigestAlgorithm(String),

    #[error("The reading session was aborted by an earlier error.")]
    SessionAborted,
}

/// Contradictions between trusted statements about the container.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConsistencyErrorKind {
    #[error("Multiple root files are not allowed (`{existing}` and `{duplicate}`).")]
    MultipleRootFiles { existing: String, duplicate: String },

    #[error("Conflicting digests are declared for `{0}`.")]
    ConflictingExpectation(String),

    #[error("The root file `{0}` is not listed in the manifest.")]
    RootFileNotInManifest(String),

    #[error("The OASIS manifest already lists `{0}`.")]
    DuplicateOasisEntry(String),
}

/// Failed verification outcomes. The container must not be trusted when one of these is reported.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum VerificationErrorKind {
    #[error("The digest of `{0}` does not match the signed manifest.")]
    DigestMismatch(String),

    #[error("`{0}` is not covered by any signed manifest.")]
    Unreferenced(String),

    #[error("`{0}` is listed in a signed manifest but is not present in the container.")]
    MissingFile(String),

    #[error("The signature `{0}` referenced by a manifest is not present in the container.")]
    MissingSignature(String),
}

/// Errors raised by MIME type detection.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum MimeErrorKind {
    #[error("Unable to determine MIME type of {0}")]
    Undetermined(String),

    #[error("`{0}` is not a valid MIME type.")]
    Invalid(String),
}
