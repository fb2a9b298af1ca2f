// Copyright 2021 Contributors to the ASiC Tools project.
// SPDX-License-Identifier: MIT

use crate::entry::{classify, EntryKind, MIMETYPE};
use crate::error::StructuralErrorKind;
use crate::model::MimeType;
use crate::Result;
use log::{debug, warn};
use std::io::{self, Chain, Cursor, Read};
use zip::read::{read_zipfile_from_stream, ZipFile};
use zip::CompressionMethod;

// Signature of the end of central directory record.
const EMPTY_ARCHIVE_SIGNATURE: &[u8] = b"PK\x05\x06";

/// Reads the entries of a container in stored order, straight from a forward-only source.
///
/// Only the local headers are used, so the source does not have to be seekable. Entries written with a
/// trailing data descriptor cannot be read this way and are reported as ZIP errors.
pub struct AsicInputStream<R: Read> {
    source: Chain<Cursor<Vec<u8>>, R>,
    mime_type: Option<MimeType>,
    pushed_back: Option<(String, Vec<u8>)>,
    finished: bool,
}

impl<R: Read> AsicInputStream<R> {
    /// Opens a stream that requires the container to begin with a valid `mimetype` entry.
    pub fn new(source: R) -> Result<AsicInputStream<R>> {
        AsicInputStream::with_mode(source, true)
    }

    /// Opens a stream. In lenient mode a container without a leading `mimetype` entry is accepted.
    pub fn with_mode(mut source: R, strict: bool) -> Result<AsicInputStream<R>> {
        let mut mime_type = None;
        let mut pushed_back = None;
        let mut finished = false;

        // An archive without entries starts straight with the end of central directory record, which the
        // streaming ZIP reader does not accept as a first header.
        let mut signature = Vec::with_capacity(EMPTY_ARCHIVE_SIGNATURE.len());
        source
            .by_ref()
            .take(EMPTY_ARCHIVE_SIGNATURE.len() as u64)
            .read_to_end(&mut signature)?;
        let empty = signature == EMPTY_ARCHIVE_SIGNATURE;
        let mut source = Cursor::new(signature).chain(source);

        if empty {
            if strict {
                return Err(StructuralErrorKind::MimetypeMissing.into());
            }
            debug!("Container has no entries");
            return Ok(AsicInputStream {
                source,
                mime_type,
                pushed_back,
                finished: true,
            });
        }

        match read_zipfile_from_stream(&mut source)? {
            Some(mut first) if first.name() == MIMETYPE => {
                mime_type = Some(read_mimetype(&mut first)?);
            }
            Some(mut first) => {
                if strict {
                    return Err(StructuralErrorKind::MimetypeMissing.into());
                }
                warn!("Container does not begin with a mimetype entry");
                let name = first.name().to_owned();
                let mut content = Vec::new();
                first.read_to_end(&mut content)?;
                pushed_back = Some((name, content));
            }
            None => {
                if strict {
                    return Err(StructuralErrorKind::MimetypeMissing.into());
                }
                finished = true;
            }
        }

        Ok(AsicInputStream {
            source,
            mime_type,
            pushed_back,
            finished,
        })
    }

    /// The container type declared by the `mimetype` entry, if there was one.
    pub fn mime_type(&self) -> Option<&MimeType> {
        self.mime_type.as_ref()
    }

    /// Returns the next entry, or `None` once the central directory is reached.
    ///
    /// The entry borrows the stream: it must be dropped before the next one can be requested. Any
    /// content left unread is skipped at that point.
    pub fn next_entry(&mut self) -> Result<Option<ContainerEntry<'_>>> {
        if let Some((name, content)) = self.pushed_back.take() {
            return Ok(Some(ContainerEntry {
                kind: classify(&name),
                name,
                content: EntryContent::Buffered(Cursor::new(content)),
            }));
        }
        if self.finished {
            return Ok(None);
        }

        match read_zipfile_from_stream(&mut self.source)? {
            Some(file) => {
                let name = file.name().to_owned();
                if name == MIMETYPE {
                    return Err(StructuralErrorKind::MimetypeNotFirst.into());
                }
                debug!("Reading entry {}", name);
                Ok(Some(ContainerEntry {
                    kind: classify(&name),
                    name,
                    content: EntryContent::Stream(file),
                }))
            }
            None => {
                self.finished = true;
                Ok(None)
            }
        }
    }
}

fn read_mimetype(file: &mut ZipFile<'_>) -> Result<MimeType> {
    if file.compression() != CompressionMethod::Stored {
        return Err(StructuralErrorKind::MimetypeCompressed.into());
    }
    let mut content = String::new();
    file.read_to_string(&mut content)?;
    let mime_type = MimeType::for_str(&content)?;
    debug!("Container mimetype is {}", mime_type);
    Ok(mime_type)
}

enum EntryContent<'a> {
    Stream(ZipFile<'a>),
    Buffered(Cursor<Vec<u8>>),
}

/// One entry of a container being read. Reading yields the uncompressed content.
pub struct ContainerEntry<'a> {
    name: String,
    kind: EntryKind,
    content: EntryContent<'a>,
}

impl<'a> ContainerEntry<'a> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    /// Reads the remaining content of the entry into memory.
    pub fn read_all(&mut self) -> Result<Vec<u8>> {
        let mut content = Vec::new();
        self.read_to_end(&mut content)?;
        Ok(content)
    }
}

impl<'a> Read for ContainerEntry<'a> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match &mut self.content {
            EntryContent::Stream(file) => file.read(buf),
            EntryContent::Buffered(cursor) => cursor.read(buf),
        }
    }
}
