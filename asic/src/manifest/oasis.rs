// Copyright 2021 Contributors to the ASiC Tools project.
// SPDX-License-Identifier: MIT

//! The OASIS OpenDocument file manifest (`META-INF/manifest.xml`). It lists every file of the container
//! with its media type, preceded by a self-entry `/` that carries the container MIME type.

use super::cades::XML_DECLARATION;
use crate::error::ConsistencyErrorKind;
use crate::model::MimeType;
use crate::Result;
use serde::{Deserialize, Serialize};

const MANIFEST_NAMESPACE: &str = "urn:oasis:names:tc:opendocument:xmlns:manifest:1.0";

/// Full path of the self-entry describing the container itself.
pub const ROOT_PATH: &str = "/";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileEntry {
    pub full_path: String,
    pub media_type: String,
}

/// An ordered list of file entries, unique by full path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OasisManifest {
    entries: Vec<FileEntry>,
}

impl OasisManifest {
    /// Creates a manifest holding only the self-entry for a container of type `mime_type`.
    pub fn new(mime_type: &MimeType) -> OasisManifest {
        OasisManifest {
            entries: vec![FileEntry {
                full_path: ROOT_PATH.to_owned(),
                media_type: mime_type.as_str().to_owned(),
            }],
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<OasisManifest> {
        let document: OasisManifestXml = quick_xml::de::from_reader(bytes)?;
        let mut manifest = OasisManifest {
            entries: Vec::with_capacity(document.entries.len()),
        };
        for entry in document.entries {
            manifest.push(entry.full_path, entry.media_type)?;
        }
        Ok(manifest)
    }

    pub fn add(&mut self, full_path: &str, mime_type: &MimeType) -> Result<()> {
        self.push(full_path.to_owned(), mime_type.as_str().to_owned())
    }

    /// Appends every entry of `other` except its self-entry. Fails on the first path already present.
    pub fn append(&mut self, other: &OasisManifest) -> Result<()> {
        for entry in other.entries.iter().filter(|e| e.full_path != ROOT_PATH) {
            self.push(entry.full_path.clone(), entry.media_type.clone())?;
        }
        Ok(())
    }

    /// Number of entries, the self-entry included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[FileEntry] {
        &self.entries
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let document = OasisManifestXml {
            xmlns_manifest: MANIFEST_NAMESPACE.to_owned(),
            entries: self
                .entries
                .iter()
                .map(|e| FileEntryXml {
                    full_path: e.full_path.clone(),
                    media_type: e.media_type.clone(),
                })
                .collect(),
        };
        let body = quick_xml::se::to_string(&document)?;
        let mut bytes = Vec::with_capacity(XML_DECLARATION.len() + body.len());
        bytes.extend_from_slice(XML_DECLARATION.as_bytes());
        bytes.extend_from_slice(body.as_bytes());
        Ok(bytes)
    }

    fn push(&mut self, full_path: String, media_type: String) -> Result<()> {
        if self.entries.iter().any(|e| e.full_path == full_path) {
            return Err(ConsistencyErrorKind::DuplicateOasisEntry(full_path).into());
        }
        self.entries.push(FileEntry {
            full_path,
            media_type,
        });
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename = "manifest:manifest")]
struct OasisManifestXml {
    #[serde(rename = "@xmlns:manifest", default)]
    xmlns_manifest: String,
    #[serde(rename = "manifest:file-entry", alias = "file-entry", default)]
    entries: Vec<FileEntryXml>,
}

#[derive(Debug, Serialize, Deserialize)]
struct FileEntryXml {
    #[serde(rename = "@manifest:full-path", alias = "@full-path")]
    full_path: String,
    #[serde(rename = "@manifest:media-type", alias = "@media-type")]
    media_type: String,
}

#[cfg(test)]
mod tests {
    use super::OasisManifest;
    use crate::error::{ConsistencyErrorKind, Error};
    use crate::model::MimeType;

    fn text() -> MimeType {
        MimeType::for_str("text/plain").unwrap()
    }

    #[test]
    fn test_new_holds_self_entry() {
        let manifest = OasisManifest::new(&MimeType::asice());
        assert_eq!(manifest.len(), 1);
        assert_eq!(manifest.entries()[0].full_path, "/");
        assert_eq!(
            manifest.entries()[0].media_type,
            "application/vnd.etsi.asic-e+zip"
        );
    }

    #[test]
    fn test_xml_round_trip() {
        let mut manifest = OasisManifest::new(&MimeType::asice());
        manifest.add("content1.txt", &text()).unwrap();
        manifest.add("content2.txt", &text()).unwrap();

        let bytes = manifest.to_bytes().unwrap();
        let xml = String::from_utf8(bytes.clone()).unwrap();
        assert!(xml.contains("<manifest:manifest"));
        assert!(xml.contains("manifest:full-path=\"content1.txt\""));

        assert_eq!(OasisManifest::from_bytes(&bytes).unwrap(), manifest);
    }

    #[test]
    fn test_parse_foreign_manifest() {
        let xml = br#"<?xml version="1.0" encoding="UTF-8"?>
<manifest:manifest xmlns:manifest="urn:oasis:names:tc:opendocument:xmlns:manifest:1.0">
  <manifest:file-entry manifest:full-path="/" manifest:media-type="application/vnd.etsi.asic-e+zip"/>
  <manifest:file-entry manifest:full-path="bilde.png" manifest:media-type="image/png"/>
</manifest:manifest>"#;
        let manifest = OasisManifest::from_bytes(xml).unwrap();
        assert_eq!(manifest.len(), 2);
        assert_eq!(manifest.entries()[1].full_path, "bilde.png");
    }

    #[test]
    fn test_duplicate_path_rejected() {
        let mut manifest = OasisManifest::new(&MimeType::asice());
        manifest.add("content1.txt", &text()).unwrap();
        match manifest.add("content1.txt", &text()).unwrap_err() {
            Error::ConsistencyError(kind) => assert_eq!(
                ConsistencyErrorKind::DuplicateOasisEntry(String::from("content1.txt")),
                kind
            ),
            _ => panic!("Unexpected error type."),
        }
    }

    #[test]
    fn test_append_skips_self_entry() {
        let mut first = OasisManifest::new(&MimeType::asice());
        first.add("a.txt", &text()).unwrap();
        let mut second = OasisManifest::new(&MimeType::asice());
        second.add("b.txt", &text()).unwrap();

        first.append(&second).unwrap();
        assert_eq!(first.len(), 3);
        assert!(first.append(&second).is_err());
    }
}
