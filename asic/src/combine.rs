// Copyright 2021 Contributors to the ASiC Tools project.
// SPDX-License-Identifier: MIT

//! Merging several signed containers into one.
//!
//! The signature material of every source is kept side by side: signed manifests and XAdES signature
//! bundles are renumbered with one shared counter so that their names never collide, and everything else is
//! copied verbatim. The OASIS file manifests of the sources are merged into a single one, which is only
//! written when it still lists exactly the files of the combined container.

use crate::entry::{cades_manifest_name, xades_signatures_name, EntryKind, OASIS_MANIFEST};
use crate::manifest::{ManifestVerifier, OasisManifest, SignedManifest};
use crate::model::MimeType;
use crate::stream::{AsicInputStream, AsicOutputStream};
use crate::Result;
use log::{debug, info, warn};
use std::io::{self, Cursor, Read, Write};

/// Writes a container into `target` that holds the entries of every container in `sources`, and returns
/// the target once the archive is complete.
///
/// Sources are read leniently. Two sources that each designate a root file are a consistency error, as
/// are entry names that occur in more than one source.
///
/// The combined archive is assembled in memory and only copied to `target` once every source has been
/// merged, so a failed combination leaves nothing in `target`.
pub fn combine<W, R, I>(mut target: W, sources: I) -> Result<W>
where
    W: Write,
    R: Read,
    I: IntoIterator<Item = R>,
{
    let mime_type = MimeType::asice();
    let mut output = AsicOutputStream::create(Cursor::new(Vec::new()), &mime_type)?;
    let mut verifier = ManifestVerifier::new();
    let mut oasis = Some(OasisManifest::new(&mime_type));
    let mut signatures = 0;

    for (index, source) in sources.into_iter().enumerate() {
        let mut input = AsicInputStream::with_mode(source, false)?;
        debug!("Combining source {}", index + 1);

        while let Some(mut entry) = input.next_entry()? {
            match entry.kind() {
                EntryKind::CadesManifest => {
                    let content = entry.read_all()?;
                    SignedManifest::extract_and_verify(&content, &mut verifier)?;
                    signatures += 1;
                    output.write_entry(&cades_manifest_name(signatures), &content)?;
                }
                EntryKind::XadesSignatures => {
                    signatures += 1;
                    output.put_entry(&xades_signatures_name(signatures))?;
                    io::copy(&mut entry, &mut output)?;
                    output.close_entry();
                }
                EntryKind::OasisManifest => {
                    let content = entry.read_all()?;
                    if let Some(merged) = &mut oasis {
                        let appended =
                            OasisManifest::from_bytes(&content).and_then(|m| merged.append(&m));
                        if let Err(e) = appended {
                            warn!("The combined OASIS manifest is dropped: {}", e);
                            oasis = None;
                        }
                    }
                }
                _ => {
                    output.put_entry(entry.name())?;
                    io::copy(&mut entry, &mut output)?;
                    output.close_entry();
                }
            }
        }
    }

    let files = output.files_written();
    match oasis {
        Some(merged) if merged.len() == files + 1 => {
            output.write_entry(OASIS_MANIFEST, &merged.to_bytes()?)?;
        }
        Some(merged) => info!(
            "The OASIS manifests list {} of {} files, no combined manifest is written",
            merged.len() - 1,
            files
        ),
        None => {}
    }

    info!(
        "Combined {} files and {} signatures",
        files, signatures
    );
    let staged = output.finish()?.into_inner();
    target.write_all(&staged)?;
    target.flush()?;
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::combine;
    use crate::digest::MessageDigestAlgorithm;
    use crate::entry::EntryKind;
    use crate::manifest::SignedManifest;
    use crate::model::MimeType;
    use crate::stream::{AsicInputStream, AsicOutputStream};
    use std::io::Cursor;

    fn source(payload: &str, manifest_name: &str) -> Vec<u8> {
        let mut manifest = SignedManifest::new();
        manifest.add_file(
            payload,
            &MimeType::for_str("text/plain").unwrap(),
            MessageDigestAlgorithm::Sha256,
            MessageDigestAlgorithm::Sha256.digest(payload.as_bytes()),
        );

        let mut stream = AsicOutputStream::create(Cursor::new(Vec::new()), &MimeType::asice()).unwrap();
        stream.write_entry(payload, payload.as_bytes()).unwrap();
        stream
            .write_entry(manifest_name, &manifest.to_bytes().unwrap())
            .unwrap();
        stream.write_entry("META-INF/signatures.xml", b"<xades/>").unwrap();
        stream.finish().unwrap().into_inner()
    }

    #[test]
    fn test_shared_signature_counter() {
        let first = source("a.txt", "META-INF/asicmanifest.xml");
        let second = source("b.txt", "META-INF/asicmanifest.xml");
        let combined = combine(
            Cursor::new(Vec::new()),
            vec![first.as_slice(), second.as_slice()],
        )
        .unwrap()
        .into_inner();

        let mut stream = AsicInputStream::new(combined.as_slice()).unwrap();
        let mut names = Vec::new();
        while let Some(entry) = stream.next_entry().unwrap() {
            if entry.kind() != EntryKind::Payload {
                names.push(entry.name().to_owned());
            }
        }
        assert_eq!(
            names,
            vec![
                "META-INF/asicmanifest.xml",
                "META-INF/signatures2.xml",
                "META-INF/asicmanifest3.xml",
                "META-INF/signatures4.xml"
            ]
        );
    }
}
