// Copyright 2021 Contributors to the ASiC Tools project.
// SPDX-License-Identifier: MIT

//! The data model shared by the reading, writing and verification sessions. Every value in this module
//! is scoped to a single session and is never shared between sessions.

mod data_object;
mod hash;
mod mime_type;

pub use data_object::{DataObject, DataObjectType};
pub use hash::Hash;
pub use mime_type::{MimeType, MIMETYPE_ASICE};

use serde::Serialize;

/// The identity attached to a data object once its digest has been verified against a signed manifest.
///
/// `signature` is the name of the signature entry covering the declaring manifest. `subject` is filled in
/// when a signature verifier has checked that signature and reported the certificate subject.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Signer {
    pub signature: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
}

impl Signer {
    pub fn new(signature: &str) -> Signer {
        Signer {
            signature: signature.to_owned(),
            subject: None,
        }
    }
}

/// Aggregate view of what a verification session established about a container.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct AsicManifest {
    /// Every path declared by a signed manifest, in path order.
    pub files: Vec<DataObject>,

    /// The distinct signers seen across all manifests.
    pub signers: Vec<Signer>,

    /// The designated primary document, if any manifest declared one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_file: Option<String>,

    /// Declared paths whose content did not match the declared digest.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failed: Vec<String>,

    /// Payload entries that no manifest covers, in stored order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unreferenced: Vec<String>,
}
