// Copyright 2021 Contributors to the ASiC Tools project.
// SPDX-License-Identifier: MIT

//! Digest algorithms used by signed manifests, identified in the manifest by their XML-DSig URI.

use crate::error::StructuralErrorKind;
use crate::Result;
use serde::Serialize;
use sha2::{Digest, Sha256, Sha384, Sha512};
use std::fmt;
use std::io::{self, Read};
use std::str::FromStr;

/// The digest algorithms supported for payload digests.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MessageDigestAlgorithm {
    Sha256,
    Sha384,
    Sha512,
}

impl MessageDigestAlgorithm {
    /// Every supported algorithm.
    pub const ALL: [MessageDigestAlgorithm; 3] = [
        MessageDigestAlgorithm::Sha256,
        MessageDigestAlgorithm::Sha384,
        MessageDigestAlgorithm::Sha512,
    ];

    /// The URI naming this algorithm in a manifest's `DigestMethod` element.
    pub fn uri(&self) -> &'static str {
        match self {
            MessageDigestAlgorithm::Sha256 => "http://www.w3.org/2001/04/xmlenc#sha256",
            MessageDigestAlgorithm::Sha384 => "http://www.w3.org/2001/04/xmldsig-more#sha384",
            MessageDigestAlgorithm::Sha512 => "http://www.w3.org/2001/04/xmlenc#sha512",
        }
    }

    /// Resolves the algorithm named by a `DigestMethod` URI.
    pub fn from_uri(uri: &str) -> Result<MessageDigestAlgorithm> {
        MessageDigestAlgorithm::ALL
            .iter()
            .find(|algorithm| algorithm.uri() == uri)
            .copied()
            .ok_or_else(|| StructuralErrorKind::UnsupportedDigestAlgorithm(uri.to_owned()).into())
    }

    /// Length in bytes of a digest produced by this algorithm.
    pub fn output_len(&self) -> usize {
        match self {
            MessageDigestAlgorithm::Sha256 => 32,
            MessageDigestAlgorithm::Sha384 => 48,
            MessageDigestAlgorithm::Sha512 => 64,
        }
    }

    /// Computes the digest of the given bytes in one call.
    pub fn digest(&self, data: &[u8]) -> Vec<u8> {
        let mut hasher = self.hasher();
        hasher.update(data);
        hasher.finalize()
    }

    /// Creates an incremental hasher for this algorithm.
    pub fn hasher(&self) -> Hasher {
        match self {
            MessageDigestAlgorithm::Sha256 => Hasher::Sha256(Sha256::new()),
            MessageDigestAlgorithm::Sha384 => Hasher::Sha384(Sha384::new()),
            MessageDigestAlgorithm::Sha512 => Hasher::Sha512(Sha512::new()),
        }
    }
}

impl Default for MessageDigestAlgorithm {
    fn default() -> Self {
        MessageDigestAlgorithm::Sha256
    }
}

impl fmt::Display for MessageDigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MessageDigestAlgorithm::Sha256 => "sha256",
            MessageDigestAlgorithm::Sha384 => "sha384",
            MessageDigestAlgorithm::Sha512 => "sha512",
        };
        f.write_str(name)
    }
}

impl FromStr for MessageDigestAlgorithm {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().replace('-', "").as_str() {
            "sha256" => Ok(MessageDigestAlgorithm::Sha256),
            "sha384" => Ok(MessageDigestAlgorithm::Sha384),
            "sha512" => Ok(MessageDigestAlgorithm::Sha512),
            _ => Err(StructuralErrorKind::UnsupportedDigestAlgorithm(s.to_owned()).into()),
        }
    }
}

/// Incremental digest state for one [MessageDigestAlgorithm].
#[derive(Clone)]
pub enum Hasher {
    Sha256(Sha256),
    Sha384(Sha384),
    Sha512(Sha512),
}

impl Hasher {
    pub fn algorithm(&self) -> MessageDigestAlgorithm {
        match self {
            Hasher::Sha256(_) => MessageDigestAlgorithm::Sha256,
            Hasher::Sha384(_) => MessageDigestAlgorithm::Sha384,
            Hasher::Sha512(_) => MessageDigestAlgorithm::Sha512,
        }
    }

    pub fn update(&mut self, data: &[u8]) {
        match self {
            Hasher::Sha256(h) => h.update(data),
            Hasher::Sha384(h) => h.update(data),
            Hasher::Sha512(h) => h.update(data),
        }
    }

    pub fn finalize(self) -> Vec<u8> {
        match self {
            Hasher::Sha256(h) => h.finalize().to_vec(),
            Hasher::Sha384(h) => h.finalize().to_vec(),
            Hasher::Sha512(h) => h.finalize().to_vec(),
        }
    }
}

/// A reader adapter that hashes every byte passing through it.
pub struct HashingReader<R> {
    inner: R,
    hasher: Hasher,
}

impl<R: Read> HashingReader<R> {
    pub fn new(inner: R, algorithm: MessageDigestAlgorithm) -> HashingReader<R> {
        HashingReader {
            inner,
            hasher: algorithm.hasher(),
        }
    }

    /// Consumes the adapter and returns the digest of everything read so far.
    pub fn finalize(self) -> Vec<u8> {
        self.hasher.finalize()
    }
}

impl<R: Read> Read for HashingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.hasher.update(&buf[..n]);
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::{HashingReader, MessageDigestAlgorithm};
    use std::io::Read;

    #[test]
    fn test_uri_round_trip() {
        for algorithm in &MessageDigestAlgorithm::ALL {
            assert_eq!(
                MessageDigestAlgorithm::from_uri(algorithm.uri()).unwrap(),
                *algorithm
            );
            assert_eq!(algorithm.digest(b"abc").len(), algorithm.output_len());
        }
    }

    #[test]
    fn test_unknown_uri() {
        assert!(MessageDigestAlgorithm::from_uri("http://www.w3.org/2000/09/xmldsig#sha1").is_err());
    }

    #[test]
    fn test_known_sha256_vector() {
        let digest = MessageDigestAlgorithm::Sha256.digest(b"abc");
        assert_eq!(
            digest[..4],
            [0xba, 0x78, 0x16, 0xbf],
            "SHA-256(\"abc\") starts with ba7816bf"
        );
    }

    #[test]
    fn test_hashing_reader_matches_one_shot() {
        let data = b"Is this a dagger I see before me?".to_vec();
        let mut reader = HashingReader::new(data.as_slice(), MessageDigestAlgorithm::Sha512);
        let mut copy = Vec::new();
        reader.read_to_end(&mut copy).unwrap();
        assert_eq!(copy, data);
        assert_eq!(reader.finalize(), MessageDigestAlgorithm::Sha512.digest(&data));
    }

    #[test]
    fn test_from_str() {
        assert_eq!(
            "SHA-384".parse::<MessageDigestAlgorithm>().unwrap(),
            MessageDigestAlgorithm::Sha384
        );
        assert!("md5".parse::<MessageDigestAlgorithm>().is_err());
    }
}
