// Copyright 2021 Contributors to the ASiC Tools project.
// SPDX-License-Identifier: MIT

//! Combines signed containers into one.

use crate::error::Result;
use log::info;
use std::fs::File;
use std::io::BufReader;
use structopt::StructOpt;

/// Models the options required by the combine command.
#[derive(Debug, StructOpt)]
pub struct Combine {
    /// The output file, which will contain the combined container once the process completes.
    #[structopt(short = "o", long = "out-file")]
    output_file: String,

    /// The containers to combine, in order.
    #[structopt(required = true)]
    inputs: Vec<String>,
}

impl Combine {
    /// Writes the combined container.
    pub fn run(&self) -> Result<()> {
        let sources = self
            .inputs
            .iter()
            .map(|input| File::open(input).map(BufReader::new))
            .collect::<std::io::Result<Vec<_>>>()?;

        let combined = asic::combine::combine(Vec::new(), sources)?;
        std::fs::write(&self.output_file, combined)?;

        info!(
            "Combined {} containers into {}",
            self.inputs.len(),
            self.output_file
        );
        Ok(())
    }
}
