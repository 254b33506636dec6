// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Host-side page CRC calculator for osshs-flash.
//!
//! Usage:
//!   osshs-pagecrc pages firmware.bin
//!   osshs-pagecrc pages firmware.bin --origin 0x08004000 --variant iso-hdlc
//!   osshs-pagecrc variants

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let args = cli::Cli::parse();
    cli::run(args)
}
