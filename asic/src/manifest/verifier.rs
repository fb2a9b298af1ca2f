// Copyright 2021 Contributors to the ASiC Tools project.
// SPDX-License-Identifier: MIT

//! The manifest verifier accumulates the digests declared by signed manifests and checks payload entries
//! against them as they stream by.
//!
//! A verifier belongs to exactly one session. It owns the invariants that make verification meaningful:
//!
//! - Each path has at most one expected digest. A second manifest may declare the same path again only
//!   with the same digest (co-signing); a differing declaration is a consistency error.
//! - At most one root file is declared across every manifest fed into the verifier.
//! - A path is only ever reported as verified when a declared digest matched the computed one.

use crate::digest::MessageDigestAlgorithm;
use crate::entry::classify;
use crate::error::{ConsistencyErrorKind, VerificationErrorKind};
use crate::model::{AsicManifest, DataObject, Hash, MimeType, Signer};
use crate::Result;
use log::debug;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Default)]
pub struct ManifestVerifier {
    objects: BTreeMap<String, DataObject>,
    declared: BTreeMap<String, Vec<Signer>>,
    root_file: Option<String>,
    verified: BTreeSet<String>,
}

impl ManifestVerifier {
    pub fn new() -> ManifestVerifier {
        ManifestVerifier::default()
    }

    /// Records the digest a manifest declares for `path`, and whether the path is the root file.
    pub fn register_expectation(
        &mut self,
        path: &str,
        algorithm: MessageDigestAlgorithm,
        digest: &[u8],
        is_root_file: bool,
    ) -> Result<()> {
        let hash = Hash::new(algorithm, digest.to_vec())?;

        match self.objects.get(path) {
            Some(existing) if existing.hash() != &hash => {
                return Err(ConsistencyErrorKind::ConflictingExpectation(path.to_owned()).into());
            }
            Some(_) => debug!("{} declared again with the same digest", path),
            None => {
                self.objects.insert(
                    path.to_owned(),
                    DataObject::new(classify(path).data_object_type(), path, hash),
                );
            }
        }

        if is_root_file {
            self.set_root_file(path)?;
        }
        Ok(())
    }

    /// Designates the root file. This can only happen once per verifier.
    pub fn set_root_file(&mut self, path: &str) -> Result<()> {
        if let Some(existing) = &self.root_file {
            return Err(ConsistencyErrorKind::MultipleRootFiles {
                existing: existing.clone(),
                duplicate: path.to_owned(),
            }
            .into());
        }
        self.root_file = Some(path.to_owned());
        Ok(())
    }

    /// Records that the manifest signed by `signer` vouches for `path`.
    pub fn declare(&mut self, path: &str, mime_type: Option<MimeType>, signer: &Signer) {
        if let (Some(object), Some(mime_type)) = (self.objects.get_mut(path), mime_type) {
            if object.mime_type().is_none() {
                object.set_mime_type(mime_type);
            }
        }
        let signers = self.declared.entry(path.to_owned()).or_default();
        if !signers.contains(signer) {
            signers.push(signer.clone());
        }
    }

    /// Whether some manifest declared a digest for `path`.
    pub fn covers(&self, path: &str) -> bool {
        self.objects.contains_key(path)
    }

    /// The algorithm of the digest declared for `path`, if any.
    pub fn expected_algorithm(&self, path: &str) -> Option<MessageDigestAlgorithm> {
        self.objects.get(path).map(|o| o.hash().algorithm())
    }

    pub fn root_file(&self) -> Option<&str> {
        self.root_file.as_deref()
    }

    /// Verifies a computed digest for `path` on behalf of `signer`.
    ///
    /// Returns `Ok(false)` on a digest mismatch. A path no manifest declared is reported as
    /// [VerificationErrorKind::Unreferenced]; whether that is acceptable is for the caller to decide.
    pub fn verify(
        &mut self,
        path: &str,
        signer: &Signer,
        algorithm: MessageDigestAlgorithm,
        digest: &[u8],
    ) -> Result<bool> {
        let object = self
            .objects
            .get_mut(path)
            .ok_or_else(|| VerificationErrorKind::Unreferenced(path.to_owned()))?;

        let verified = object.verify(signer.clone(), algorithm, digest);
        if verified {
            self.verified.insert(path.to_owned());
        }
        Ok(verified)
    }

    /// Verifies a computed digest for `path` on behalf of every signer whose manifest declared it.
    pub fn verify_payload(
        &mut self,
        path: &str,
        algorithm: MessageDigestAlgorithm,
        digest: &[u8],
    ) -> Result<bool> {
        let signers = self.declared.get(path).cloned().unwrap_or_default();
        if signers.is_empty() {
            let object = self
                .objects
                .get(path)
                .ok_or_else(|| VerificationErrorKind::Unreferenced(path.to_owned()))?;
            let verified = object.hash().verify(algorithm, digest);
            if verified {
                self.verified.insert(path.to_owned());
            }
            return Ok(verified);
        }

        let mut verified = true;
        for signer in &signers {
            verified &= self.verify(path, signer, algorithm, digest)?;
        }
        if !verified {
            self.verified.remove(path);
        }
        Ok(verified)
    }

    /// Attaches a certificate subject to every signer identified by the signature entry `reference`.
    pub fn resolve_signer(&mut self, reference: &str, subject: &str) {
        let resolve = |signer: &mut Signer| {
            if signer.signature == reference {
                signer.subject = Some(subject.to_owned());
            }
        };
        self.declared
            .values_mut()
            .flat_map(|signers| signers.iter_mut())
            .for_each(resolve);
        self.objects
            .values_mut()
            .flat_map(|object| object.signers_mut().iter_mut())
            .for_each(resolve);
    }

    /// Paths declared by some manifest that have not (yet) been verified.
    pub fn missing(&self) -> Vec<&str> {
        self.objects
            .keys()
            .filter(|path| !self.verified.contains(*path))
            .map(|path| path.as_str())
            .collect()
    }

    /// The aggregate view of everything this verifier has established.
    pub fn asic_manifest(&self) -> AsicManifest {
        let mut signers: Vec<Signer> = Vec::new();
        for signer in self.declared.values().flatten() {
            if !signers.contains(signer) {
                signers.push(signer.clone());
            }
        }
        AsicManifest {
            files: self.objects.values().cloned().collect(),
            signers,
            root_file: self.root_file.clone(),
            failed: Vec::new(),
            unreferenced: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ManifestVerifier;
    use crate::digest::MessageDigestAlgorithm;
    use crate::error::{ConsistencyErrorKind, Error, VerificationErrorKind};
    use crate::model::Signer;

    const SHA256: MessageDigestAlgorithm = MessageDigestAlgorithm::Sha256;

    fn digest(data: &str) -> Vec<u8> {
        SHA256.digest(data.as_bytes())
    }

    #[test]
    fn test_conflicting_expectation_rejected() {
        let mut verifier = ManifestVerifier::new();
        verifier
            .register_expectation("a.txt", SHA256, &digest("a"), false)
            .unwrap();
        verifier
            .register_expectation("a.txt", SHA256, &digest("a"), false)
            .unwrap();

        let err = verifier
            .register_expectation("a.txt", SHA256, &digest("b"), false)
            .unwrap_err();
        match err {
            Error::ConsistencyError(kind) => assert_eq!(
                ConsistencyErrorKind::ConflictingExpectation(String::from("a.txt")),
                kind
            ),
            _ => panic!("Unexpected error type."),
        }
    }

    #[test]
    fn test_second_root_file_rejected() {
        let mut verifier = ManifestVerifier::new();
        verifier
            .register_expectation("a.txt", SHA256, &digest("a"), true)
            .unwrap();
        let err = verifier
            .register_expectation("b.txt", SHA256, &digest("b"), true)
            .unwrap_err();
        match err {
            Error::ConsistencyError(ConsistencyErrorKind::MultipleRootFiles { existing, duplicate }) => {
                assert_eq!(existing, "a.txt");
                assert_eq!(duplicate, "b.txt");
            }
            _ => panic!("Unexpected error type."),
        }
        assert_eq!(verifier.root_file(), Some("a.txt"));

        // Declaring the same root file twice is still two declarations.
        assert!(verifier.set_root_file("a.txt").is_err());
    }

    #[test]
    fn test_verify_match_and_mismatch() {
        let signer = Signer::new("META-INF/signature.p7s");
        let mut verifier = ManifestVerifier::new();
        verifier
            .register_expectation("a.txt", SHA256, &digest("a"), false)
            .unwrap();
        verifier
            .register_expectation("b.txt", SHA256, &digest("b"), false)
            .unwrap();
        verifier.declare("a.txt", None, &signer);
        verifier.declare("b.txt", None, &signer);

        assert!(!verifier.verify_payload("a.txt", SHA256, &digest("tampered")).unwrap());
        assert!(verifier.verify_payload("b.txt", SHA256, &digest("b")).unwrap());
        assert_eq!(verifier.missing(), vec!["a.txt"]);

        let manifest = verifier.asic_manifest();
        let b = manifest.files.iter().find(|f| f.filename() == "b.txt").unwrap();
        assert_eq!(b.signers(), &[signer.clone()]);
        let a = manifest.files.iter().find(|f| f.filename() == "a.txt").unwrap();
        assert!(a.signers().is_empty());
    }

    #[test]
    fn test_unreferenced_path() {
        let mut verifier = ManifestVerifier::new();
        let err = verifier
            .verify("extra.txt", &Signer::new("x"), SHA256, &digest("x"))
            .unwrap_err();
        match err {
            Error::VerificationError(kind) => assert_eq!(
                VerificationErrorKind::Unreferenced(String::from("extra.txt")),
                kind
            ),
            _ => panic!("Unexpected error type."),
        }
        assert!(!verifier.covers("extra.txt"));
    }

    #[test]
    fn test_co_signed_path_collects_both_signers() {
        let first = Signer::new("META-INF/signature-1.p7s");
        let second = Signer::new("META-INF/signature-2.p7s");
        let mut verifier = ManifestVerifier::new();
        for signer in &[&first, &second] {
            verifier
                .register_expectation("a.txt", SHA256, &digest("a"), false)
                .unwrap();
            verifier.declare("a.txt", None, signer);
        }

        assert!(verifier.verify_payload("a.txt", SHA256, &digest("a")).unwrap());
        verifier.resolve_signer("META-INF/signature-2.p7s", "CN=demo.uk");

        let manifest = verifier.asic_manifest();
        assert_eq!(manifest.signers.len(), 2);
        let signers = manifest.files[0].signers();
        assert_eq!(signers.len(), 2);
        assert_eq!(signers[0].subject, None);
        assert_eq!(signers[1].subject.as_deref(), Some("CN=demo.uk"));
        assert!(verifier.missing().is_empty());
    }
}
