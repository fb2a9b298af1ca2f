// Copyright 2021 Contributors to the ASiC Tools project.
// SPDX-License-Identifier: MIT

//! Manifests carried under `META-INF/`: the CAdES signed manifest, which binds payload digests to a
//! signature, and the OASIS file manifest, which only lists files and their media types.
//!
//! The [ManifestVerifier] is the consistency engine on top of the signed manifests.

pub mod cades;
pub mod oasis;
pub mod verifier;

pub use cades::{ManifestEntry, SignatureReference, SignedManifest};
pub use oasis::{FileEntry, OasisManifest};
pub use verifier::ManifestVerifier;
