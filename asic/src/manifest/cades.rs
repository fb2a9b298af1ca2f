// Copyright 2021 Contributors to the ASiC Tools project.
// SPDX-License-Identifier: MIT

//! The CAdES signed manifest (`META-INF/asicmanifest.xml`), in the ETSI ASiCManifest vocabulary.
//!
//! A signed manifest lists a digest for every payload file of the container, names the detached signature
//! that covers the manifest itself, and may single out one entry as the root file.

use super::verifier::ManifestVerifier;
use crate::digest::MessageDigestAlgorithm;
use crate::error::ConsistencyErrorKind;
use crate::model::{MimeType, Signer};
use crate::Result;
use log::debug;
use serde::{Deserialize, Serialize};

const ASIC_NAMESPACE: &str = "http://uri.etsi.org/02918/v1.2.1#";
const DSIG_NAMESPACE: &str = "http://www.w3.org/2000/09/xmldsig#";

pub(crate) const XML_DECLARATION: &str =
    "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>";

/// The detached signature covering a manifest.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignatureReference {
    pub uri: String,
    pub mime_type: String,
}

/// One payload file declared by a signed manifest.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ManifestEntry {
    pub path: String,
    pub mime_type: Option<String>,
    pub algorithm: MessageDigestAlgorithm,
    pub digest: Vec<u8>,
    pub root_file: bool,
}

/// The semantic content of a CAdES signed manifest.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SignedManifest {
    signature: Option<SignatureReference>,
    entries: Vec<ManifestEntry>,
}

impl SignedManifest {
    pub fn new() -> SignedManifest {
        SignedManifest::default()
    }

    pub fn signature(&self) -> Option<&SignatureReference> {
        self.signature.as_ref()
    }

    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    /// The path designated as root file, if any.
    pub fn root_file(&self) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.root_file)
            .map(|e| e.path.as_str())
    }

    pub fn add(&mut self, entry: ManifestEntry) {
        self.entries.push(entry);
    }

    pub fn add_file(
        &mut self,
        path: &str,
        mime_type: &MimeType,
        algorithm: MessageDigestAlgorithm,
        digest: Vec<u8>,
    ) {
        self.add(ManifestEntry {
            path: path.to_owned(),
            mime_type: Some(mime_type.as_str().to_owned()),
            algorithm,
            digest,
            root_file: false,
        });
    }

    /// Marks `path` as the root file. The path must already be listed, and a manifest has at most one
    /// root file.
    pub fn set_root_file(&mut self, path: &str) -> Result<()> {
        if let Some(existing) = self.root_file() {
            return Err(ConsistencyErrorKind::MultipleRootFiles {
                existing: existing.to_owned(),
                duplicate: path.to_owned(),
            }
            .into());
        }
        match self.entries.iter_mut().find(|e| e.path == path) {
            Some(entry) => {
                entry.root_file = true;
                Ok(())
            }
            None => Err(ConsistencyErrorKind::RootFileNotInManifest(path.to_owned()).into()),
        }
    }

    pub fn set_signature(&mut self, uri: &str, mime_type: &str) {
        self.signature = Some(SignatureReference {
            uri: uri.to_owned(),
            mime_type: mime_type.to_owned(),
        });
    }

    /// Serializes the manifest as an XML document.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let document = AsicManifestXml::from(self);
        let body = quick_xml::se::to_string(&document)?;
        let mut bytes = Vec::with_capacity(XML_DECLARATION.len() + body.len());
        bytes.extend_from_slice(XML_DECLARATION.as_bytes());
        bytes.extend_from_slice(body.as_bytes());
        Ok(bytes)
    }

    /// Parses a manifest from its XML document.
    pub fn from_bytes(bytes: &[u8]) -> Result<SignedManifest> {
        let document: AsicManifestXml = quick_xml::de::from_reader(bytes)?;

        let mut entries = Vec::with_capacity(document.data_objects.len());
        for reference in document.data_objects {
            entries.push(ManifestEntry {
                algorithm: MessageDigestAlgorithm::from_uri(&reference.digest_method.algorithm)?,
                digest: base64::decode(reference.digest_value.trim())?,
                root_file: reference.root_file.unwrap_or(false),
                mime_type: reference.mime_type,
                path: reference.uri,
            });
        }

        Ok(SignedManifest {
            signature: document.signature.map(|s| SignatureReference {
                uri: s.uri,
                mime_type: s.mime_type,
            }),
            entries,
        })
    }

    /// Parses a manifest and feeds every entry it declares into `verifier`.
    ///
    /// The signer of the manifest is identified by the signature it references. Root file uniqueness is
    /// enforced across all manifests fed into the same verifier.
    pub fn extract_and_verify(
        bytes: &[u8],
        verifier: &mut ManifestVerifier,
    ) -> Result<SignedManifest> {
        let manifest = SignedManifest::from_bytes(bytes)?;
        let signer = Signer::new(manifest.signature.as_ref().map_or("", |s| s.uri.as_str()));

        for entry in &manifest.entries {
            verifier.register_expectation(&entry.path, entry.algorithm, &entry.digest, entry.root_file)?;
            let mime_type = match &entry.mime_type {
                Some(mime_type) => Some(MimeType::for_str(mime_type)?),
                None => None,
            };
            verifier.declare(&entry.path, mime_type, &signer);
        }
        debug!(
            "Manifest signed by `{}` declares {} entries",
            signer.signature,
            manifest.entries.len()
        );
        Ok(manifest)
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename = "asic:ASiCManifest")]
struct AsicManifestXml {
    #[serde(rename = "@xmlns:asic", default)]
    xmlns_asic: String,
    #[serde(rename = "@xmlns:ns2", default)]
    xmlns_dsig: String,
    #[serde(
        rename = "asic:SigReference",
        alias = "SigReference",
        skip_serializing_if = "Option::is_none"
    )]
    signature: Option<SigReferenceXml>,
    #[serde(
        rename = "asic:DataObjectReference",
        alias = "DataObjectReference",
        default
    )]
    data_objects: Vec<DataObjectReferenceXml>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SigReferenceXml {
    #[serde(rename = "@URI")]
    uri: String,
    #[serde(rename = "@MimeType")]
    mime_type: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct DataObjectReferenceXml {
    #[serde(rename = "@URI")]
    uri: String,
    #[serde(rename = "@MimeType", default, skip_serializing_if = "Option::is_none")]
    mime_type: Option<String>,
    #[serde(rename = "@Rootfile", default, skip_serializing_if = "Option::is_none")]
    root_file: Option<bool>,
    #[serde(rename = "ns2:DigestMethod", alias = "DigestMethod")]
    digest_method: DigestMethodXml,
    #[serde(rename = "ns2:DigestValue", alias = "DigestValue")]
    digest_value: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct DigestMethodXml {
    #[serde(rename = "@Algorithm")]
    algorithm: String,
}

impl From<&SignedManifest> for AsicManifestXml {
    fn from(manifest: &SignedManifest) -> Self {
        AsicManifestXml {
            xmlns_asic: ASIC_NAMESPACE.to_owned(),
            xmlns_dsig: DSIG_NAMESPACE.to_owned(),
            signature: manifest.signature.as_ref().map(|s| SigReferenceXml {
                uri: s.uri.clone(),
                mime_type: s.mime_type.clone(),
            }),
            data_objects: manifest
                .entries
                .iter()
                .map(|e| DataObjectReferenceXml {
                    uri: e.path.clone(),
                    mime_type: e.mime_type.clone(),
                    root_file: if e.root_file { Some(true) } else { None },
                    digest_method: DigestMethodXml {
                        algorithm: e.algorithm.uri().to_owned(),
                    },
                    digest_value: base64::encode(&e.digest),
                })
                .collect(),
        }
    }
}
