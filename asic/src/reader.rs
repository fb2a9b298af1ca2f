// Copyright 2021 Contributors to the ASiC Tools project.
// SPDX-License-Identifier: MIT

//! Reading and verifying containers.
//!
//! An [AsicReader] hands out the entries of a container one at a time, in stored order. Verification runs
//! alongside: payload content is hashed as it streams past, signed manifests are parsed and registered
//! with a [ManifestVerifier] as soon as they are reached, and every payload digest is checked against its
//! declaration, either immediately or once the covering manifest turns up later in the container.
//!
//! The container is only known to be consistent when [AsicReader::next_file] has returned `None`. Any
//! failure, including one detected while an [AsicFile] was being dropped, is returned from the following
//! call to [AsicReader::next_file], after which the session is aborted.

use crate::config::{ReaderConfig, UnreferencedPolicy};
use crate::digest::{Hasher, MessageDigestAlgorithm};
use crate::entry::EntryKind;
use crate::error::{Error, StructuralErrorKind, VerificationErrorKind};
use crate::manifest::{ManifestVerifier, SignedManifest};
use crate::model::{AsicManifest, MimeType};
use crate::signature::SignatureVerifier;
use crate::stream::{AsicInputStream, ContainerEntry};
use crate::Result;
use log::{debug, info, warn};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufReader, Cursor, Read, Write};
use std::path::{Component, Path, PathBuf};

/// A container being read and verified.
pub struct AsicReader<R: Read> {
    stream: AsicInputStream<R>,
    session: Session,
    poisoned: bool,
}

impl<R: Read> AsicReader<R> {
    /// Opens a container with the default (strict) configuration.
    pub fn open(source: R) -> Result<AsicReader<R>> {
        AsicReader::with_config(source, ReaderConfig::default())
    }

    pub fn with_config(source: R, config: ReaderConfig) -> Result<AsicReader<R>> {
        let stream = AsicInputStream::with_mode(source, config.strict)?;
        Ok(AsicReader {
            stream,
            session: Session::new(config),
            poisoned: false,
        })
    }

    /// Checks the signature over every manifest with `verifier` once the container has been read.
    pub fn with_signature_verifier(mut self, verifier: Box<dyn SignatureVerifier>) -> AsicReader<R> {
        self.session.signature_verifier = Some(verifier);
        self
    }

    /// The container type declared by the `mimetype` entry.
    pub fn mime_type(&self) -> Option<&MimeType> {
        self.stream.mime_type()
    }

    /// Returns the next entry of the container, or `None` once the container has been read and verified.
    ///
    /// The returned file must be dropped before the next one is requested.
    pub fn next_file(&mut self) -> Result<Option<AsicFile<'_>>> {
        if self.poisoned {
            return Err(StructuralErrorKind::SessionAborted.into());
        }
        match advance(&mut self.stream, &mut self.session) {
            Ok(file) => Ok(file),
            Err(e) => {
                self.poisoned = true;
                Err(e)
            }
        }
    }

    /// Reads the rest of the container without keeping any content, and returns the verification result.
    pub fn verify_all(mut self) -> Result<AsicManifest> {
        while let Some(file) = self.next_file()? {
            debug!("Skipping over {}", file.name());
        }
        Ok(self.asic_manifest())
    }

    /// What the session has established so far. This is only final once the container has been read.
    pub fn asic_manifest(&self) -> AsicManifest {
        let mut manifest = self.session.verifier.asic_manifest();
        manifest.failed = self.session.failed.clone();
        manifest.unreferenced = self.session.unreferenced.clone();
        manifest
    }
}

impl AsicReader<BufReader<File>> {
    /// Opens the container file at `path` with the given configuration.
    pub fn open_path<P: AsRef<Path>>(path: P, config: ReaderConfig) -> Result<AsicReader<BufReader<File>>> {
        AsicReader::with_config(BufReader::new(File::open(path)?), config)
    }
}

fn advance<'a, R: Read>(
    stream: &'a mut AsicInputStream<R>,
    session: &'a mut Session,
) -> Result<Option<AsicFile<'a>>> {
    if let Some(failure) = session.failure.take() {
        return Err(failure);
    }
    if session.finished {
        return Ok(None);
    }

    let mut entry = match stream.next_entry()? {
        Some(entry) => entry,
        None => {
            session.finish()?;
            return Ok(None);
        }
    };

    let name = entry.name().to_owned();
    let kind = entry.kind();
    match kind {
        EntryKind::CadesManifest => {
            let content = entry.read_all()?;
            let manifest = SignedManifest::extract_and_verify(&content, &mut session.verifier)?;
            session.manifests.push(ReadManifest {
                name: name.clone(),
                signature: manifest.signature().map(|s| s.uri.clone()),
                content: content.clone(),
            });
            session.check_declared(&manifest)?;
            Ok(Some(AsicFile::buffered(name, kind, content, session)))
        }
        EntryKind::CadesSignature => {
            let content = entry.read_all()?;
            session.signatures.insert(name.clone(), content.clone());
            Ok(Some(AsicFile::buffered(name, kind, content, session)))
        }
        EntryKind::Payload => {
            // Until a manifest declares the payload its algorithm is unknown, so every one is computed.
            let hashers = match session.verifier.expected_algorithm(&name) {
                Some(algorithm) => vec![algorithm.hasher()],
                None => MessageDigestAlgorithm::ALL.iter().map(|a| a.hasher()).collect(),
            };
            Ok(Some(AsicFile {
                name,
                kind,
                content: FileContent::Entry(entry),
                hashers,
                session,
            }))
        }
        _ => Ok(Some(AsicFile {
            name,
            kind,
            content: FileContent::Entry(entry),
            hashers: Vec::new(),
            session,
        })),
    }
}

struct ReadManifest {
    name: String,
    signature: Option<String>,
    content: Vec<u8>,
}

type Digests = Vec<(MessageDigestAlgorithm, Vec<u8>)>;

// Verification state of one reading session.
struct Session {
    config: ReaderConfig,
    verifier: ManifestVerifier,
    signature_verifier: Option<Box<dyn SignatureVerifier>>,
    manifests: Vec<ReadManifest>,
    signatures: BTreeMap<String, Vec<u8>>,
    // Computed digests of every payload read so far, in stored order.
    payloads: Vec<(String, Digests)>,
    failed: Vec<String>,
    unreferenced: Vec<String>,
    failure: Option<Error>,
    finished: bool,
}

impl Session {
    fn new(config: ReaderConfig) -> Session {
        Session {
            config,
            verifier: ManifestVerifier::new(),
            signature_verifier: None,
            manifests: Vec::new(),
            signatures: BTreeMap::new(),
            payloads: Vec::new(),
            failed: Vec::new(),
            unreferenced: Vec::new(),
            failure: None,
            finished: false,
        }
    }

    // Payloads are verified right away when a manifest already covers them. Their digests are kept for
    // manifests further down the container that declare them again.
    fn record_payload(&mut self, name: &str, digests: Digests) -> Result<()> {
        if self.verifier.covers(name) {
            check_payload(&mut self.verifier, &mut self.failed, name, &digests)?;
        } else {
            debug!("{} is not covered yet", name);
        }
        self.payloads.push((name.to_owned(), digests));
        Ok(())
    }

    // Checks every payload already read against the signers of a newly parsed manifest.
    fn check_declared(&mut self, manifest: &SignedManifest) -> Result<()> {
        for (name, digests) in &self.payloads {
            if manifest.entries().iter().any(|e| &e.path == name) {
                check_payload(&mut self.verifier, &mut self.failed, name, digests)?;
            }
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.finished = true;

        if let Some(signature_verifier) = &self.signature_verifier {
            let mut subjects = Vec::with_capacity(self.manifests.len());
            for manifest in &self.manifests {
                let reference = manifest
                    .signature
                    .as_ref()
                    .ok_or_else(|| VerificationErrorKind::MissingSignature(manifest.name.clone()))?;
                let signature = self
                    .signatures
                    .get(reference)
                    .ok_or_else(|| VerificationErrorKind::MissingSignature(reference.clone()))?;
                let subject = signature_verifier.verify(&manifest.content, signature)?;
                debug!("{} is signed by {}", manifest.name, subject);
                subjects.push((reference.clone(), subject));
            }
            for (reference, subject) in subjects {
                self.verifier.resolve_signer(&reference, &subject);
            }
        }

        for (name, _) in &self.payloads {
            if !self.verifier.covers(name) && !self.unreferenced.contains(name) {
                self.unreferenced.push(name.clone());
            }
        }

        if let Some(failed) = self.failed.first() {
            return Err(VerificationErrorKind::DigestMismatch(failed.clone()).into());
        }

        if let Some(unreferenced) = self.unreferenced.first() {
            if self.config.unreferenced == UnreferencedPolicy::Reject {
                return Err(VerificationErrorKind::Unreferenced(unreferenced.clone()).into());
            }
            for name in &self.unreferenced {
                warn!("{} is not covered by any signed manifest", name);
            }
        }

        if let Some(missing) = self.verifier.missing().first() {
            return Err(VerificationErrorKind::MissingFile((*missing).to_owned()).into());
        }

        info!(
            "Verified container: {} manifests, {} unreferenced files",
            self.manifests.len(),
            self.unreferenced.len()
        );
        Ok(())
    }
}

// Verifies the digest of `name` for every signer declaring it. A mismatch is recorded in `failed` rather
// than returned, so that every other path is still verified.
fn check_payload(
    verifier: &mut ManifestVerifier,
    failed: &mut Vec<String>,
    name: &str,
    digests: &[(MessageDigestAlgorithm, Vec<u8>)],
) -> Result<()> {
    let expected = verifier.expected_algorithm(name);
    let verified = match digests.iter().find(|(a, _)| Some(*a) == expected) {
        Some((algorithm, digest)) => verifier.verify_payload(name, *algorithm, digest)?,
        None => false,
    };
    if verified {
        debug!("Verified {}", name);
    } else if !failed.iter().any(|f| f == name) {
        warn!("The digest of {} does not match its manifest", name);
        failed.push(name.to_owned());
    }
    Ok(())
}

enum FileContent<'a> {
    Entry(ContainerEntry<'a>),
    Buffered(Cursor<Vec<u8>>),
}

/// One entry of a container being read.
///
/// Payload content is hashed as it is read. Whatever is left unread is consumed when the file is dropped,
/// so that the digest always covers the whole entry.
pub struct AsicFile<'a> {
    name: String,
    kind: EntryKind,
    content: FileContent<'a>,
    hashers: Vec<Hasher>,
    session: &'a mut Session,
}

impl<'a> AsicFile<'a> {
    fn buffered(name: String, kind: EntryKind, content: Vec<u8>, session: &'a mut Session) -> AsicFile<'a> {
        AsicFile {
            name,
            kind,
            content: FileContent::Buffered(Cursor::new(content)),
            hashers: Vec::new(),
            session,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    /// The entry name as a relative path, or `None` when the name would escape the directory it is
    /// extracted into.
    pub fn enclosed_name(&self) -> Option<PathBuf> {
        let path = Path::new(&self.name);
        let enclosed = path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if enclosed && !self.name.contains('\0') {
            Some(path.to_path_buf())
        } else {
            None
        }
    }

    /// Copies the remaining content into `writer`.
    pub fn write_to<W: Write + ?Sized>(&mut self, writer: &mut W) -> Result<u64> {
        Ok(io::copy(self, writer)?)
    }

    /// Writes the remaining content to the file at `path`, creating parent directories as needed.
    pub fn write_to_path<P: AsRef<Path>>(&mut self, path: P) -> Result<u64> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = File::create(path)?;
        let size = self.write_to(&mut file)?;
        file.flush()?;
        Ok(size)
    }
}

impl<'a> Read for AsicFile<'a> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = match &mut self.content {
            FileContent::Entry(entry) => entry.read(buf)?,
            FileContent::Buffered(cursor) => cursor.read(buf)?,
        };
        for hasher in &mut self.hashers {
            hasher.update(&buf[..n]);
        }
        Ok(n)
    }
}

impl<'a> Drop for AsicFile<'a> {
    fn drop(&mut self) {
        if self.hashers.is_empty() {
            return;
        }
        if let Err(e) = io::copy(self, &mut io::sink()) {
            self.session.failure.get_or_insert(e.into());
            return;
        }
        let digests = std::mem::take(&mut self.hashers)
            .into_iter()
            .map(|hasher| (hasher.algorithm(), hasher.finalize()))
            .collect();
        if let Err(e) = self.session.record_payload(&self.name, digests) {
            self.session.failure.get_or_insert(e);
        }
    }
}
