// Copyright 2021 Contributors to the ASiC Tools project.
// SPDX-License-Identifier: MIT

//! Session configuration for writers and readers.

use crate::digest::MessageDigestAlgorithm;

/// What a reader does with a payload entry that no signed manifest covers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnreferencedPolicy {
    /// Fail the session with [crate::error::VerificationErrorKind::Unreferenced].
    Reject,
    /// Log the entry and list it in [crate::model::AsicManifest::unreferenced].
    Tolerate,
}

impl Default for UnreferencedPolicy {
    fn default() -> Self {
        UnreferencedPolicy::Reject
    }
}

/// Options for [crate::writer::AsicWriter].
#[derive(Clone, Debug, Default)]
pub struct WriterConfig {
    /// Algorithm used for the payload digests recorded in the signed manifest.
    pub digest_algorithm: MessageDigestAlgorithm,

    /// Whether to also write an OASIS file manifest (`META-INF/manifest.xml`).
    pub oasis_manifest: bool,
}

impl WriterConfig {
    pub fn digest_algorithm(mut self, algorithm: MessageDigestAlgorithm) -> Self {
        self.digest_algorithm = algorithm;
        self
    }

    pub fn oasis_manifest(mut self, enabled: bool) -> Self {
        self.oasis_manifest = enabled;
        self
    }
}

/// Options for [crate::reader::AsicReader].
#[derive(Clone, Debug)]
pub struct ReaderConfig {
    /// Require the container to open with a valid `mimetype` entry.
    pub strict: bool,

    /// Policy for payloads not covered by any signed manifest.
    pub unreferenced: UnreferencedPolicy,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        ReaderConfig {
            strict: true,
            unreferenced: UnreferencedPolicy::default(),
        }
    }
}

impl ReaderConfig {
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn unreferenced(mut self, policy: UnreferencedPolicy) -> Self {
        self.unreferenced = policy;
        self
    }
}
