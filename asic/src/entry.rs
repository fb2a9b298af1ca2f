// Copyright 2021 Contributors to the ASiC Tools project.
// SPDX-License-Identifier: MIT

//! Classification of container entries by name. Reading, verification and combining all dispatch on
//! [classify], so the naming rules live in this one place.

use crate::model::DataObjectType;

/// Name of the entry that must open every strict ASiC container.
pub const MIMETYPE: &str = "mimetype";

/// Namespace for all signature and manifest material.
pub const META_INF: &str = "META-INF/";

/// Name of the OASIS OpenDocument file manifest.
pub const OASIS_MANIFEST: &str = "META-INF/manifest.xml";

/// MIME type recorded for CAdES detached signature entries.
pub const CADES_SIGNATURE_MIME: &str = "application/x-pkcs7-signature";

/// The role of an entry, derived from its name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryKind {
    /// The `mimetype` entry.
    Mimetype,
    /// A CAdES signed manifest, `META-INF/asicmanifest*.xml`.
    CadesManifest,
    /// A CAdES detached signature, `META-INF/signature*.p7s`.
    CadesSignature,
    /// A XAdES signature bundle, `META-INF/signatures*.xml`.
    XadesSignatures,
    /// The OASIS file manifest, `META-INF/manifest.xml`.
    OasisManifest,
    /// Any other entry under `META-INF/`.
    Metadata,
    /// A directory entry (name ending in `/`) outside `META-INF/`.
    Directory,
    /// A content file.
    Payload,
}

impl EntryKind {
    pub fn data_object_type(&self) -> DataObjectType {
        match self {
            EntryKind::CadesManifest | EntryKind::OasisManifest => DataObjectType::Manifest,
            EntryKind::CadesSignature | EntryKind::XadesSignatures => {
                DataObjectType::DetachedSignature
            }
            EntryKind::Mimetype | EntryKind::Metadata | EntryKind::Directory => {
                DataObjectType::Metadata
            }
            EntryKind::Payload => DataObjectType::Data,
        }
    }
}

/// Classifies an entry by its name.
pub fn classify(name: &str) -> EntryKind {
    if name == MIMETYPE {
        return EntryKind::Mimetype;
    }
    if !is_metadata(name) {
        return if name.ends_with('/') {
            EntryKind::Directory
        } else {
            EntryKind::Payload
        };
    }

    let lower = name.to_ascii_lowercase();
    if lower == OASIS_MANIFEST.to_ascii_lowercase() {
        EntryKind::OasisManifest
    } else if matches_numbered(&lower, "meta-inf/asicmanifest", ".xml") {
        EntryKind::CadesManifest
    } else if matches_numbered(&lower, "meta-inf/signatures", ".xml") {
        EntryKind::XadesSignatures
    } else if matches_numbered(&lower, "meta-inf/signature", ".p7s") {
        EntryKind::CadesSignature
    } else {
        EntryKind::Metadata
    }
}

/// Whether the entry lives in the `META-INF/` namespace (case-insensitive).
pub fn is_metadata(name: &str) -> bool {
    name.get(..META_INF.len())
        .map_or(false, |prefix| prefix.eq_ignore_ascii_case(META_INF))
}

/// Name of the `n`th CAdES manifest. The first manifest keeps the unnumbered name.
pub fn cades_manifest_name(n: usize) -> String {
    numbered("META-INF/asicmanifest", n, ".xml")
}

/// Name of the `n`th XAdES signature bundle. The first bundle keeps the unnumbered name.
pub fn xades_signatures_name(n: usize) -> String {
    numbered("META-INF/signatures", n, ".xml")
}

fn numbered(prefix: &str, n: usize, suffix: &str) -> String {
    if n <= 1 {
        format!("{}{}", prefix, suffix)
    } else {
        format!("{}{}{}", prefix, n, suffix)
    }
}

// `prefix` and `suffix` are lowercase, `name` has already been lowercased.
fn matches_numbered(name: &str, prefix: &str, suffix: &str) -> bool {
    name.len() >= prefix.len() + suffix.len()
        && name.starts_with(prefix)
        && name.ends_with(suffix)
        && !name[prefix.len()..name.len() - suffix.len()].contains('/')
}

#[cfg(test)]
mod tests {
    use super::{cades_manifest_name, classify, xades_signatures_name, EntryKind};

    #[test]
    fn test_classify_signature_material() {
        assert_eq!(classify("META-INF/asicmanifest.xml"), EntryKind::CadesManifest);
        assert_eq!(classify("META-INF/asicmanifest2.xml"), EntryKind::CadesManifest);
        assert_eq!(classify("meta-inf/ASiCManifest-1.XML"), EntryKind::CadesManifest);
        assert_eq!(classify("META-INF/signature.p7s"), EntryKind::CadesSignature);
        assert_eq!(
            classify("META-INF/signature-1f2e3d4c.p7s"),
            EntryKind::CadesSignature
        );
        assert_eq!(classify("META-INF/signatures.xml"), EntryKind::XadesSignatures);
        assert_eq!(classify("META-INF/signatures3.xml"), EntryKind::XadesSignatures);
        assert_eq!(classify("META-INF/manifest.xml"), EntryKind::OasisManifest);
        assert_eq!(classify("Meta-Inf/Manifest.xml"), EntryKind::OasisManifest);
    }

    #[test]
    fn test_classify_other_entries() {
        assert_eq!(classify("mimetype"), EntryKind::Mimetype);
        assert_eq!(classify("META-INF/container.xml"), EntryKind::Metadata);
        assert_eq!(classify("META-INF/sub/asicmanifest.xml"), EntryKind::Metadata);
        assert_eq!(classify("content1.txt"), EntryKind::Payload);
        assert_eq!(classify("docs/asicmanifest.xml"), EntryKind::Payload);
        assert_eq!(classify("docs/"), EntryKind::Directory);
        assert_eq!(classify("MIMETYPE"), EntryKind::Payload);
    }

    #[test]
    fn test_numbered_names() {
        assert_eq!(cades_manifest_name(1), "META-INF/asicmanifest.xml");
        assert_eq!(cades_manifest_name(2), "META-INF/asicmanifest2.xml");
        assert_eq!(xades_signatures_name(1), "META-INF/signatures.xml");
        assert_eq!(xades_signatures_name(3), "META-INF/signatures3.xml");
    }
}
