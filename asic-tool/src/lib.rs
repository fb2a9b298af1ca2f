// Copyright 2021 Contributors to the ASiC Tools project.
// SPDX-License-Identifier: MIT

//! asic-tool: a tool for creating, verifying, extracting and combining ASiC-E containers.

pub mod cli;
pub mod common;
pub mod error;
pub mod subcommands;
pub mod util;
