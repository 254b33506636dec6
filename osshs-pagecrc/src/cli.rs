// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Command-line interface definitions.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use crc::{Algorithm, CRC_32_BZIP2, CRC_32_ISO_HDLC, CRC_32_JAMCRC, CRC_32_MPEG_2};
use osshs_flash::FlashRegion;

use crate::commands;

/// Command-line arguments.
#[derive(Parser)]
#[command(name = "osshs-pagecrc")]
#[command(about = "Per-page CRC calculator matching the osshs-flash CRC engine")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Print the CRC of every flash page an image occupies
    Pages {
        /// Firmware binary file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Flash address the image is written to
        #[arg(long, default_value = "0x08000000", value_parser = parse_u32)]
        origin: u32,

        /// Erase page size in bytes
        #[arg(long, default_value_t = FlashRegion::STM32F103XB.page_size(), value_parser = parse_u32)]
        page_size: u32,

        /// Size of the flash region in bytes
        #[arg(long, default_value_t = FlashRegion::STM32F103XB.total_size(), value_parser = parse_u32)]
        total_size: u32,

        /// CRC variant configured in the driver
        #[arg(short, long, value_enum, default_value_t = Variant::Mpeg2)]
        variant: Variant,
    },

    /// List the supported CRC variants
    Variants,
}

/// CRC-32 variants the peripheral can compute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Variant {
    /// Native peripheral output, no reflection or final XOR
    Mpeg2,
    /// Ethernet/zlib CRC-32
    IsoHdlc,
    /// Final XOR only
    Bzip2,
    /// Reflected, no final XOR
    Jamcrc,
}

impl Variant {
    pub const ALL: [Variant; 4] = [
        Variant::Mpeg2,
        Variant::IsoHdlc,
        Variant::Bzip2,
        Variant::Jamcrc,
    ];

    pub fn algorithm(self) -> &'static Algorithm<u32> {
        match self {
            Variant::Mpeg2 => &CRC_32_MPEG_2,
            Variant::IsoHdlc => &CRC_32_ISO_HDLC,
            Variant::Bzip2 => &CRC_32_BZIP2,
            Variant::Jamcrc => &CRC_32_JAMCRC,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Variant::Mpeg2 => "mpeg2",
            Variant::IsoHdlc => "iso-hdlc",
            Variant::Bzip2 => "bzip2",
            Variant::Jamcrc => "jamcrc",
        }
    }
}

/// Parse a decimal or `0x` prefixed hexadecimal number.
fn parse_u32(s: &str) -> Result<u32, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(&hex.replace('_', ""), 16),
        None => s.replace('_', "").parse(),
    };
    parsed.map_err(|e| format!("invalid number '{}': {}", s, e))
}

/// Execute the parsed CLI command.
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Pages {
            file,
            origin,
            page_size,
            total_size,
            variant,
        } => commands::pages(&file, origin, page_size, total_size, variant),
        Commands::Variants => commands::variants(),
    }
}
