// Copyright 2021 Contributors to the ASiC Tools project.
// SPDX-License-Identifier: MIT

use crate::error::MimeErrorKind;
use crate::Result;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// The MIME type declared by ASiC-E containers in their `mimetype` entry.
pub const MIMETYPE_ASICE: &str = "application/vnd.etsi.asic-e+zip";

/// A validated `type/subtype` MIME type string.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct MimeType(String);

impl MimeType {
    pub fn for_str(value: &str) -> Result<MimeType> {
        let mut parts = value.splitn(2, '/');
        let valid = match (parts.next(), parts.next()) {
            (Some(kind), Some(subtype)) => {
                !kind.is_empty()
                    && !subtype.is_empty()
                    && !value.contains(|c: char| c.is_whitespace() || c.is_control())
            }
            _ => false,
        };
        if valid {
            Ok(MimeType(value.to_owned()))
        } else {
            Err(MimeErrorKind::Invalid(value.to_owned()).into())
        }
    }

    /// The ASiC-E container type.
    pub fn asice() -> MimeType {
        MimeType(String::from(MIMETYPE_ASICE))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for MimeType {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self> {
        MimeType::for_str(s)
    }
}

impl fmt::Display for MimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::MimeType;

    #[test]
    fn test_valid_mime_types() {
        assert_eq!(MimeType::for_str("text/plain").unwrap().as_str(), "text/plain");
        assert_eq!(
            MimeType::asice().as_str(),
            "application/vnd.etsi.asic-e+zip"
        );
    }

    #[test]
    fn test_invalid_mime_types() {
        assert!(MimeType::for_str("text").is_err());
        assert!(MimeType::for_str("/plain").is_err());
        assert!(MimeType::for_str("text/").is_err());
        assert!(MimeType::for_str("text/plain\n").is_err());
    }
}
