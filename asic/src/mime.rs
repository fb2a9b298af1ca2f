// Copyright 2021 Contributors to the ASiC Tools project.
// SPDX-License-Identifier: MIT

//! MIME type detection for files added to a container, and container type inference from file names.
//!
//! Detection is a collaborator of the container core: the core only asks a [MimeDetector] for a type and
//! treats a failure as fatal for the caller. [ExtensionMimeDetector] is a small extension-based default.

use crate::error::MimeErrorKind;
use crate::model::MimeType;
use crate::Result;
use log::debug;
use std::path::Path;

/// Determines the MIME type of a file from its name.
pub trait MimeDetector {
    /// Returns the MIME type for `filename`, or [MimeErrorKind::Undetermined] when no rule applies.
    fn detect(&self, filename: &str) -> Result<MimeType>;
}

/// Maps well-known file extensions to MIME types.
#[derive(Clone, Copy, Debug, Default)]
pub struct ExtensionMimeDetector;

const EXTENSIONS: &[(&str, &str)] = &[
    ("txt", "text/plain"),
    ("text", "text/plain"),
    ("csv", "text/csv"),
    ("htm", "text/html"),
    ("html", "text/html"),
    ("xml", "application/xml"),
    ("json", "application/json"),
    ("pdf", "application/pdf"),
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("svg", "image/svg+xml"),
    ("zip", "application/zip"),
    ("asice", "application/vnd.etsi.asic-e+zip"),
    ("sce", "application/vnd.etsi.asic-e+zip"),
    ("p7s", "application/x-pkcs7-signature"),
    ("odt", "application/vnd.oasis.opendocument.text"),
    ("ods", "application/vnd.oasis.opendocument.spreadsheet"),
    ("doc", "application/msword"),
    (
        "docx",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    ),
    ("xls", "application/vnd.ms-excel"),
    (
        "xlsx",
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    ),
    ("bin", "application/octet-stream"),
];

impl MimeDetector for ExtensionMimeDetector {
    fn detect(&self, filename: &str) -> Result<MimeType> {
        let extension = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        let found = extension.and_then(|extension| {
            EXTENSIONS
                .iter()
                .find(|(known, _)| *known == extension)
                .map(|(_, mime)| *mime)
        });

        match found {
            Some(mime) => {
                debug!("Detected MIME type {} for {}", mime, filename);
                MimeType::for_str(mime)
            }
            None => Err(MimeErrorKind::Undetermined(filename.to_owned()).into()),
        }
    }
}

/// Infers the container type from a container file name. Only `.asice` and `.sce` (in any case) are
/// recognised, both mapping to the ASiC-E type.
pub fn container_mime_for(filename: &str) -> Option<MimeType> {
    let lower = filename.to_ascii_lowercase();
    let stem_len = if lower.ends_with(".asice") {
        lower.len() - ".asice".len()
    } else if lower.ends_with(".sce") {
        lower.len() - ".sce".len()
    } else {
        return None;
    };
    if stem_len == 0 {
        return None;
    }
    Some(MimeType::asice())
}

#[cfg(test)]
mod tests {
    use super::{container_mime_for, ExtensionMimeDetector, MimeDetector};
    use crate::error::{Error, MimeErrorKind};
    use crate::model::MimeType;
    use crate::Result;

    fn detect_mime(filename: &str) -> Result<MimeType> {
        ExtensionMimeDetector.detect(filename)
    }

    #[test]
    fn test_detect_known_extensions() {
        assert_eq!(detect_mime("content1.txt").unwrap().as_str(), "text/plain");
        assert_eq!(detect_mime("dir/Report.PDF").unwrap().as_str(), "application/pdf");
    }

    #[test]
    fn test_detect_unknown_extension() {
        match detect_mime("archive.unknownext").unwrap_err() {
            Error::MimeError(kind) => assert_eq!(
                MimeErrorKind::Undetermined(String::from("archive.unknownext")),
                kind
            ),
            _ => panic!("Unexpected error type."),
        }
        assert!(detect_mime("no-extension").is_err());
    }

    #[test]
    fn test_container_extensions() {
        assert_eq!(container_mime_for("bundle.asice"), Some(MimeType::asice()));
        assert_eq!(container_mime_for("bundle.SCE"), Some(MimeType::asice()));
        assert_eq!(container_mime_for("bundle.AsIcE"), Some(MimeType::asice()));
        assert_eq!(container_mime_for(".asice"), None);
        assert_eq!(container_mime_for("bundle.zip"), None);
    }
}
