// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Command implementations.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use crc::Algorithm;
use osshs_flash::{software_crc, FlashRegion};

use crate::cli::Variant;

/// Value of an erased flash byte.
const ERASED: u8 = 0xFF;

/// CRC of one flash page.
#[derive(Debug, PartialEq, Eq)]
pub struct PageCrc {
    pub index: u32,
    pub address: u32,
    pub crc: u32,
}

/// Print the CRC of every page covered by a firmware image.
pub fn pages(
    file: &Path,
    origin: u32,
    page_size: u32,
    total_size: u32,
    variant: Variant,
) -> Result<()> {
    let region = FlashRegion::checked(origin, page_size, total_size).with_context(|| {
        format!(
            "Invalid flash region: origin 0x{:08x}, page size {}, total size {}",
            origin, page_size, total_size
        )
    })?;
    let image = fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;

    let crcs = page_crcs(&region, &image, variant.algorithm())?;

    println!(
        "Image:   {} ({} bytes, {} pages)",
        file.display(),
        image.len(),
        crcs.len()
    );
    println!("Variant: {}", variant.name());
    println!();
    println!("{:>5}  {:>10}  {:>10}", "page", "address", "crc");
    for page in &crcs {
        println!(
            "{:>5}  0x{:08x}  0x{:08x}",
            page.index, page.address, page.crc
        );
    }

    Ok(())
}

/// List the supported variants with their catalogue check values.
pub fn variants() -> Result<()> {
    println!("{:<10}  {:>6}  {:>6}  {:>10}  {:>10}", "name", "refin", "refout", "xorout", "check");
    for variant in Variant::ALL {
        let algorithm = variant.algorithm();
        println!(
            "{:<10}  {:>6}  {:>6}  0x{:08x}  0x{:08x}",
            variant.name(),
            algorithm.refin,
            algorithm.refout,
            algorithm.xorout,
            algorithm.check
        );
    }

    Ok(())
}

/// Compute the CRC of each page `image` occupies when written at the start
/// of `region`. A short final page is padded with erased bytes.
pub fn page_crcs(
    region: &FlashRegion,
    image: &[u8],
    algorithm: &'static Algorithm<u32>,
) -> Result<Vec<PageCrc>> {
    if image.is_empty() {
        bail!("Image is empty");
    }
    if image.len() as u64 > region.total_size() as u64 {
        bail!(
            "Image is {} bytes, region holds only {} bytes",
            image.len(),
            region.total_size()
        );
    }

    let page_size = region.page_size() as usize;
    let mut page = vec![ERASED; page_size];

    image
        .chunks(page_size)
        .zip(0u32..)
        .map(|(chunk, index)| -> Result<PageCrc> {
            let address = region
                .page_address(index)
                .with_context(|| format!("Page {} is outside the region", index))?;
            page[..chunk.len()].copy_from_slice(chunk);
            page[chunk.len()..].fill(ERASED);
            Ok(PageCrc {
                index,
                address,
                crc: software_crc(algorithm, &page),
            })
        })
        .collect()
}
