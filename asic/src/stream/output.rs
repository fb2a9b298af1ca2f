// Copyright 2021 Contributors to the ASiC Tools project.
// SPDX-License-Identifier: MIT

use crate::entry::{is_metadata, MIMETYPE};
use crate::error::StructuralErrorKind;
use crate::model::MimeType;
use crate::Result;
use log::debug;
use std::collections::BTreeSet;
use std::io::{self, Seek, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Writes the entries of a container in order, enforcing the ASiC layout rules: a single stored
/// `mimetype` entry first, then uniquely named deflated entries.
pub struct AsicOutputStream<W: Write + Seek> {
    zip: ZipWriter<W>,
    mimetype_written: bool,
    open_entry: Option<String>,
    names: BTreeSet<String>,
    files_written: usize,
}

impl<W: Write + Seek> AsicOutputStream<W> {
    pub fn new(sink: W) -> AsicOutputStream<W> {
        AsicOutputStream {
            zip: ZipWriter::new(sink),
            mimetype_written: false,
            open_entry: None,
            names: BTreeSet::new(),
            files_written: 0,
        }
    }

    /// Creates a stream and writes the `mimetype` entry straight away.
    pub fn create(sink: W, mime_type: &MimeType) -> Result<AsicOutputStream<W>> {
        let mut stream = AsicOutputStream::new(sink);
        stream.write_mimetype(mime_type)?;
        Ok(stream)
    }

    /// Writes the `mimetype` entry: uncompressed, containing the bare MIME string.
    pub fn write_mimetype(&mut self, mime_type: &MimeType) -> Result<()> {
        if self.mimetype_written {
            return Err(StructuralErrorKind::MimetypeDuplicate.into());
        }
        if !self.names.is_empty() {
            return Err(StructuralErrorKind::MimetypeNotFirst.into());
        }

        let options = FileOptions::default().compression_method(CompressionMethod::Stored);
        self.zip.start_file(MIMETYPE, options)?;
        self.zip.write_all(mime_type.as_str().as_bytes())?;
        self.mimetype_written = true;
        self.names.insert(MIMETYPE.to_owned());
        debug!("Wrote mimetype {}", mime_type);
        Ok(())
    }

    /// Opens a new entry for writing. Any entry still open is closed first.
    pub fn put_entry(&mut self, name: &str) -> Result<()> {
        if name == MIMETYPE {
            return Err(StructuralErrorKind::ReservedEntryName(name.to_owned()).into());
        }
        if !self.mimetype_written {
            return Err(StructuralErrorKind::MimetypeNotFirst.into());
        }
        if self.names.contains(name) {
            return Err(StructuralErrorKind::DuplicateEntry(name.to_owned()).into());
        }

        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
        self.zip.start_file(name, options)?;
        self.names.insert(name.to_owned());
        if !is_metadata(name) && !name.ends_with('/') {
            self.files_written += 1;
        }
        self.open_entry = Some(name.to_owned());
        debug!("Opened entry {}", name);
        Ok(())
    }

    /// Closes the open entry. Further writes fail until another entry is opened.
    pub fn close_entry(&mut self) {
        self.open_entry = None;
    }

    /// Appends `content` to the open entry.
    pub fn write_content(&mut self, content: &[u8]) -> Result<()> {
        if self.open_entry.is_none() {
            return Err(StructuralErrorKind::NoOpenEntry.into());
        }
        self.zip.write_all(content)?;
        Ok(())
    }

    /// Writes a complete entry in one call.
    pub fn write_entry(&mut self, name: &str, content: &[u8]) -> Result<()> {
        self.put_entry(name)?;
        self.write_content(content)?;
        self.close_entry();
        Ok(())
    }

    /// Number of file entries written outside `META-INF/`.
    pub fn files_written(&self) -> usize {
        self.files_written
    }

    /// Writes the central directory and hands back the sink.
    pub fn finish(mut self) -> Result<W> {
        self.open_entry = None;
        Ok(self.zip.finish()?)
    }
}

impl<W: Write + Seek> Write for AsicOutputStream<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.open_entry.is_none() {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                StructuralErrorKind::NoOpenEntry,
            ));
        }
        self.zip.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.zip.flush()
    }
}
