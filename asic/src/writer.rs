// Copyright 2021 Contributors to the ASiC Tools project.
// SPDX-License-Identifier: MIT

//! Building and signing new containers.
//!
//! An [AsicWriter] streams each payload file into the container while computing its digest, and keeps the
//! signed manifest in memory. Signing writes the manifest, the detached signature over the exact manifest
//! bytes and, when configured, the OASIS file manifest, and then closes the archive.
//!
//! The archive is staged in memory, since the ZIP writer needs to seek back over entry headers. The sink
//! only receives bytes once [AsicWriter::sign] has completed, so it can be any sequential writer, and a
//! writer dropped or failed before that point leaves the sink untouched.

use crate::config::WriterConfig;
use crate::digest::HashingReader;
use crate::entry::{cades_manifest_name, is_metadata, CADES_SIGNATURE_MIME, MIMETYPE, OASIS_MANIFEST};
use crate::error::StructuralErrorKind;
use crate::manifest::{OasisManifest, SignedManifest};
use crate::mime::{ExtensionMimeDetector, MimeDetector};
use crate::model::MimeType;
use crate::signature::SignatureProvider;
use crate::stream::AsicOutputStream;
use crate::Result;
use log::{debug, info, warn};
use std::fs::File;
use std::io::{self, Cursor, Read, Write};
use std::path::Path;
use uuid::Uuid;

/// A container under construction, written to `W` once signed.
pub struct AsicWriter<W: Write> {
    sink: W,
    stream: AsicOutputStream<Cursor<Vec<u8>>>,
    config: WriterConfig,
    manifest: SignedManifest,
    oasis: OasisManifest,
    detector: Box<dyn MimeDetector>,
}

impl<W: Write> AsicWriter<W> {
    /// Starts a container with the default configuration.
    pub fn new(sink: W) -> Result<AsicWriter<W>> {
        AsicWriter::with_config(sink, WriterConfig::default())
    }

    pub fn with_config(sink: W, config: WriterConfig) -> Result<AsicWriter<W>> {
        let mime_type = MimeType::asice();
        Ok(AsicWriter {
            sink,
            stream: AsicOutputStream::create(Cursor::new(Vec::new()), &mime_type)?,
            config,
            manifest: SignedManifest::new(),
            oasis: OasisManifest::new(&mime_type),
            detector: Box::new(ExtensionMimeDetector),
        })
    }

    /// Replaces the MIME detector used by [AsicWriter::add_file].
    pub fn with_detector(mut self, detector: Box<dyn MimeDetector>) -> AsicWriter<W> {
        self.detector = detector;
        self
    }

    /// Adds a payload file read from `reader`, stored as `name`.
    pub fn add<R: Read>(&mut self, reader: R, name: &str, mime_type: &MimeType) -> Result<()> {
        if name == MIMETYPE || is_metadata(name) {
            return Err(StructuralErrorKind::ReservedEntryName(name.to_owned()).into());
        }

        self.stream.put_entry(name)?;
        let mut hashing = HashingReader::new(reader, self.config.digest_algorithm);
        let size = io::copy(&mut hashing, &mut self.stream)?;
        self.stream.close_entry();

        let digest = hashing.finalize();
        self.manifest
            .add_file(name, mime_type, self.config.digest_algorithm, digest);
        if self.config.oasis_manifest {
            self.oasis.add(name, mime_type)?;
        }
        debug!("Added {} ({}, {} bytes)", name, mime_type, size);
        Ok(())
    }

    /// Adds a file from disk under its own file name, with the MIME type reported by the detector.
    pub fn add_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("{} has no usable file name", path.display()),
                )
            })?
            .to_owned();
        let mime_type = self.detector.detect(&name)?;
        self.add_file_as(path, &name, &mime_type)
    }

    /// Adds a file from disk under the given entry name and MIME type.
    pub fn add_file_as<P: AsRef<Path>>(&mut self, path: P, name: &str, mime_type: &MimeType) -> Result<()> {
        let file = File::open(path)?;
        self.add(file, name, mime_type)
    }

    /// Designates an already added file as the root file of the container.
    pub fn set_root_file(&mut self, name: &str) -> Result<()> {
        self.manifest.set_root_file(name)
    }

    /// Number of payload files added so far.
    pub fn files_written(&self) -> usize {
        self.stream.files_written()
    }

    /// Signs the manifest, writes the signature material and closes the container, then copies the
    /// finished archive to the sink and returns it.
    pub fn sign<P: SignatureProvider + ?Sized>(mut self, provider: &P) -> Result<W> {
        let signature_name = format!("META-INF/signature-{}.p7s", Uuid::new_v4());
        self.manifest
            .set_signature(&signature_name, CADES_SIGNATURE_MIME);

        let manifest_bytes = self.manifest.to_bytes()?;
        self.stream
            .write_entry(&cades_manifest_name(1), &manifest_bytes)?;

        let signature = provider.sign(&manifest_bytes)?;
        self.stream.write_entry(&signature_name, &signature)?;

        if self.config.oasis_manifest {
            self.stream
                .write_entry(OASIS_MANIFEST, &self.oasis.to_bytes()?)?;
        }

        info!(
            "Signed container with {} files ({})",
            self.stream.files_written(),
            signature_name
        );
        let staged = self.stream.finish()?.into_inner();
        self.sink.write_all(&staged)?;
        self.sink.flush()?;
        Ok(self.sink)
    }
}

impl AsicWriter<File> {
    /// Creates the container file at `path`, replacing any existing file.
    pub fn create_path<P: AsRef<Path>>(path: P, config: WriterConfig) -> Result<AsicWriter<File>> {
        let path = path.as_ref();
        let recognised = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(crate::mime::container_mime_for)
            .is_some();
        if !recognised {
            warn!(
                "{} does not have an .asice or .sce extension",
                path.display()
            );
        }
        AsicWriter::with_config(File::create(path)?, config)
    }
}

#[cfg(test)]
mod tests {
    use super::AsicWriter;
    use crate::config::WriterConfig;
    use crate::error::{Error, StructuralErrorKind};
    use crate::manifest::{OasisManifest, SignedManifest};
    use crate::model::MimeType;
    use crate::signature::{self, SignatureProvider};
    use crate::stream::AsicInputStream;
    use std::io::Cursor;

    struct FixedSignature;

    impl SignatureProvider for FixedSignature {
        fn sign(&self, _data: &[u8]) -> signature::Result<Vec<u8>> {
            Ok(b"fixed signature".to_vec())
        }

        fn certificate_chain(&self) -> Vec<Vec<u8>> {
            Vec::new()
        }
    }

    fn text() -> MimeType {
        MimeType::for_str("text/plain").unwrap()
    }

    #[test]
    fn test_reserved_names_rejected() {
        let mut writer = AsicWriter::new(Cursor::new(Vec::new())).unwrap();
        for name in &["mimetype", "META-INF/asicmanifest.xml", "meta-inf/extra.txt"] {
            match writer.add(&b"x"[..], name, &text()).unwrap_err() {
                Error::StructuralError(StructuralErrorKind::ReservedEntryName(rejected)) => {
                    assert_eq!(&rejected, name)
                }
                _ => panic!("Unexpected error type."),
            }
        }
        assert_eq!(writer.files_written(), 0);
    }

    #[test]
    fn test_signed_layout() {
        let config = WriterConfig::default().oasis_manifest(true);
        let mut writer = AsicWriter::with_config(Cursor::new(Vec::new()), config).unwrap();
        writer.add(&b"Lorem ipsum"[..], "content1.txt", &text()).unwrap();
        writer.add(&b"Fusce"[..], "content2.txt", &text()).unwrap();
        writer.set_root_file("content2.txt").unwrap();
        let bytes = writer.sign(&FixedSignature).unwrap().into_inner();

        let mut stream = AsicInputStream::new(bytes.as_slice()).unwrap();
        let mut names = Vec::new();
        let mut manifest = None;
        let mut oasis = None;
        while let Some(mut entry) = stream.next_entry().unwrap() {
            names.push(entry.name().to_owned());
            if entry.name() == "META-INF/asicmanifest.xml" {
                manifest = Some(SignedManifest::from_bytes(&entry.read_all().unwrap()).unwrap());
            } else if entry.name() == "META-INF/manifest.xml" {
                oasis = Some(OasisManifest::from_bytes(&entry.read_all().unwrap()).unwrap());
            }
        }

        assert_eq!(names.len(), 5);
        assert_eq!(names[..3], ["content1.txt", "content2.txt", "META-INF/asicmanifest.xml"]);
        assert!(names[3].starts_with("META-INF/signature-") && names[3].ends_with(".p7s"));
        assert_eq!(names[4], "META-INF/manifest.xml");

        let manifest = manifest.unwrap();
        assert_eq!(manifest.entries().len(), 2);
        assert_eq!(manifest.root_file(), Some("content2.txt"));
        assert_eq!(manifest.signature().unwrap().uri, names[3]);
        assert_eq!(oasis.unwrap().len(), 3);
    }

    struct FailingSignature;

    impl SignatureProvider for FailingSignature {
        fn sign(&self, _data: &[u8]) -> signature::Result<Vec<u8>> {
            Err(signature::error::SignatureError::MissingCertificate)
        }

        fn certificate_chain(&self) -> Vec<Vec<u8>> {
            Vec::new()
        }
    }

    #[test]
    fn test_failed_signing_leaves_sink_empty() {
        let mut sink = Vec::new();
        let mut writer = AsicWriter::new(&mut sink).unwrap();
        writer.add(&b"Lorem ipsum"[..], "content1.txt", &text()).unwrap();
        assert!(writer.sign(&FailingSignature).is_err());
        assert!(sink.is_empty());

        let mut writer = AsicWriter::new(&mut sink).unwrap();
        writer.add(&b"Lorem ipsum"[..], "content1.txt", &text()).unwrap();
        drop(writer);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_root_file_must_be_added() {
        let mut writer = AsicWriter::new(Cursor::new(Vec::new())).unwrap();
        assert!(writer.set_root_file("content1.txt").is_err());
    }
}
