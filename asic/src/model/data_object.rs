// Copyright 2021 Contributors to the ASiC Tools project.
// SPDX-License-Identifier: MIT

use super::{Hash, MimeType, Signer};
use crate::digest::MessageDigestAlgorithm;
use serde::Serialize;

/// The role an entry plays within a container.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DataObjectType {
    Data,
    Metadata,
    Manifest,
    DetachedSignature,
}

/// One logical entry of a container together with its expected digest and the signers that vouch
/// for it.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct DataObject {
    #[serde(rename = "type")]
    object_type: DataObjectType,
    filename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    mime_type: Option<MimeType>,
    hash: Hash,
    signers: Vec<Signer>,
}

impl DataObject {
    pub fn new(object_type: DataObjectType, filename: &str, hash: Hash) -> DataObject {
        DataObject {
            object_type,
            filename: filename.to_owned(),
            mime_type: None,
            hash,
            signers: Vec::new(),
        }
    }

    pub fn object_type(&self) -> DataObjectType {
        self.object_type
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn mime_type(&self) -> Option<&MimeType> {
        self.mime_type.as_ref()
    }

    pub fn set_mime_type(&mut self, mime_type: MimeType) {
        self.mime_type = Some(mime_type);
    }

    pub fn hash(&self) -> &Hash {
        &self.hash
    }

    pub fn signers(&self) -> &[Signer] {
        &self.signers
    }

    pub(crate) fn signers_mut(&mut self) -> &mut Vec<Signer> {
        &mut self.signers
    }

    /// Verifies a freshly computed digest. On a match the signer is recorded and `true` is returned;
    /// on a mismatch nothing changes and `false` is returned.
    pub fn verify(&mut self, signer: Signer, algorithm: MessageDigestAlgorithm, digest: &[u8]) -> bool {
        if self.hash.verify(algorithm, digest) {
            if !self.signers.contains(&signer) {
                self.signers.push(signer);
            }
            return true;
        }
        false
    }
}
