// Copyright 2021 Contributors to the ASiC Tools project.
// SPDX-License-Identifier: MIT

//! The asic crate contains the functionality required to build, read, verify and combine files that adopt
//! the ASiC-E (Associated Signature Container, extended form) format.
//!
//! An ASiC-E container is a ZIP archive. Its first entry is a stored `mimetype` entry, followed by any number
//! of payload files, and then the signature material under `META-INF/`: one or more signed manifests
//! (`META-INF/asicmanifest*.xml`) which list a digest for every payload file, the detached signatures over
//! those manifests (`META-INF/signature*.p7s`), and optionally an OASIS file manifest (`META-INF/manifest.xml`).

pub mod combine;
pub mod config;
pub mod digest;
pub mod entry;
pub mod error;
pub mod manifest;
pub mod mime;
pub mod model;
pub mod reader;
pub mod signature;
pub mod stream;
pub mod writer;

pub use combine::combine;
pub use config::{ReaderConfig, UnreferencedPolicy, WriterConfig};
pub use digest::MessageDigestAlgorithm;
pub use entry::EntryKind;
pub use model::{AsicManifest, DataObject, Hash, MimeType, Signer};
pub use reader::{AsicFile, AsicReader};
pub use writer::AsicWriter;

/// Convenient result alias for this crate.
pub type Result<T> = std::result::Result<T, error::Error>;
