// Copyright 2021 Contributors to the ASiC Tools project.
// SPDX-License-Identifier: MIT

//! Ordered entry streams over the ZIP layer. The writer and reader sessions, as well as the combiner, only
//! ever see containers through these two types.

mod input;
mod output;

pub use input::{AsicInputStream, ContainerEntry};
pub use output::AsicOutputStream;
