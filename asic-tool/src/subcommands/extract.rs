// Copyright 2021 Contributors to the ASiC Tools project.
// SPDX-License-Identifier: MIT

//! Extracts the files of a container into a directory.

use crate::error::{Result, ToolErrorKind};
use asic::{AsicReader, EntryKind, ReaderConfig};
use log::{debug, info};
use std::path::PathBuf;
use structopt::StructOpt;

/// Models the options required by the extract command.
#[derive(Debug, StructOpt)]
pub struct Extract {
    /// The container to extract.
    #[structopt(short = "c", long = "container")]
    container: String,

    /// The directory to extract into. Created if it does not exist.
    #[structopt(short = "d", long = "directory", default_value = ".")]
    directory: String,

    /// Also extract the signature material under META-INF.
    #[structopt(long = "all")]
    all: bool,
}

impl Extract {
    /// Extracts the files, failing if any of them does not match the signed manifests.
    pub fn run(&self) -> Result<()> {
        let target = PathBuf::from(&self.directory);
        let mut reader = AsicReader::open_path(&self.container, ReaderConfig::default())?;
        let mut extracted = 0;

        while let Some(mut file) = reader.next_file()? {
            if file.kind() != EntryKind::Payload && !self.all {
                continue;
            }
            let relative = file
                .enclosed_name()
                .ok_or_else(|| ToolErrorKind::UnsafeEntryName(file.name().to_owned()))?;
            let size = file.write_to_path(target.join(relative))?;
            debug!("Extracted {} ({} bytes)", file.name(), size);
            extracted += 1;
        }

        info!("Extracted {} files into {}", extracted, self.directory);
        Ok(())
    }
}
