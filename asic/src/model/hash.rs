// Copyright 2021 Contributors to the ASiC Tools project.
// SPDX-License-Identifier: MIT

use crate::digest::MessageDigestAlgorithm;
use crate::error::StructuralErrorKind;
use crate::Result;
use serde::Serialize;
use subtle::ConstantTimeEq;

/// An expected digest for one container entry, together with the algorithm that produced it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Hash {
    algorithm: MessageDigestAlgorithm,
    #[serde(serialize_with = "serialize_base64")]
    expected: Vec<u8>,
}

impl Hash {
    /// Creates a hash record. The expected digest must have exactly the length produced by `algorithm`.
    pub fn new(algorithm: MessageDigestAlgorithm, expected: Vec<u8>) -> Result<Hash> {
        if expected.len() != algorithm.output_len() {
            return Err(StructuralErrorKind::InvalidDigestLength {
                algorithm: algorithm.to_string(),
                actual: expected.len(),
            }
            .into());
        }
        Ok(Hash {
            algorithm,
            expected,
        })
    }

    pub fn algorithm(&self) -> MessageDigestAlgorithm {
        self.algorithm
    }

    pub fn expected(&self) -> &[u8] {
        &self.expected
    }

    /// Checks a freshly computed digest against the expected one.
    ///
    /// The comparison of the digest bytes runs in constant time.
    pub fn verify(&self, algorithm: MessageDigestAlgorithm, digest: &[u8]) -> bool {
        algorithm == self.algorithm && bool::from(self.expected.as_slice().ct_eq(digest))
    }
}

fn serialize_base64<S: serde::Serializer>(bytes: &[u8], serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&base64::encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::Hash;
    use crate::digest::MessageDigestAlgorithm;
    use crate::error::{Error, StructuralErrorKind};

    #[test]
    fn test_verify_matching_digest() {
        let digest = MessageDigestAlgorithm::Sha256.digest(b"Come, let me clutch thee!");
        let hash = Hash::new(MessageDigestAlgorithm::Sha256, digest.clone()).unwrap();
        assert!(hash.verify(MessageDigestAlgorithm::Sha256, &digest));
    }

    #[test]
    fn test_verify_rejects_other_digest() {
        let digest = MessageDigestAlgorithm::Sha256.digest(b"Come, let me clutch thee!");
        let other = MessageDigestAlgorithm::Sha256.digest(b"I have thee not");
        let hash = Hash::new(MessageDigestAlgorithm::Sha256, digest).unwrap();
        assert!(!hash.verify(MessageDigestAlgorithm::Sha256, &other));
        assert!(!hash.verify(MessageDigestAlgorithm::Sha256, &[]));
    }

    #[test]
    fn test_verify_rejects_other_algorithm() {
        let digest = MessageDigestAlgorithm::Sha256.digest(b"x");
        let hash = Hash::new(MessageDigestAlgorithm::Sha256, digest.clone()).unwrap();
        assert!(!hash.verify(MessageDigestAlgorithm::Sha512, &digest));
    }

    #[test]
    fn test_wrong_length_rejected() {
        let err = Hash::new(MessageDigestAlgorithm::Sha384, vec![0u8; 32]).unwrap_err();
        match err {
            Error::StructuralError(kind) => assert_eq!(
                StructuralErrorKind::InvalidDigestLength {
                    algorithm: String::from("sha384"),
                    actual: 32
                },
                kind
            ),
            _ => panic!("Unexpected error type."),
        }
        assert!(Hash::new(MessageDigestAlgorithm::Sha256, Vec::new()).is_err());
    }
}
