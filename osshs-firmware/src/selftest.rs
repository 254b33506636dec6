// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Flash self-test on the last page of the region.
//!
//! The test page is wiped; `memory.x` keeps the image out of it.

use osshs_flash::{software_crc, Bus, Error, Flash, FlashRegion};

const PAGE_SIZE: usize = FlashRegion::STM32F103XB.page_size() as usize;
const PATTERN: u8 = 0xAA;
const PROBE: u16 = 0x5AA5;

#[derive(defmt::Format)]
pub enum Failure {
    Driver(Error),
    NoTestPage,
    Pattern { offset: usize, found: u8 },
    Crc { expected: u32, found: u32 },
    HalfWord { found: u16 },
    LockIgnored,
}

impl From<Error> for Failure {
    fn from(e: Error) -> Self {
        Failure::Driver(e)
    }
}

pub fn run<B: Bus>(flash: &mut Flash<B>) -> Result<(), Failure> {
    let region = *flash.region();
    let page = region
        .page_address(region.page_count() - 1)
        .ok_or(Failure::NoTestPage)?;
    let mut buffer = [0u8; PAGE_SIZE];

    defmt::println!("Initializing flash controller");
    flash.initialize()?;

    defmt::println!("Erasing page 0x{=u32:08x}", page);
    flash.erase_page(page)?;

    defmt::println!("Writing pattern 0x{=u8:02x}", PATTERN);
    flash.write_page(page, &[PATTERN; PAGE_SIZE])?;

    flash.read_page(page, &mut buffer)?;
    if let Some((offset, &found)) = buffer.iter().enumerate().find(|&(_, &b)| b != PATTERN) {
        return Err(Failure::Pattern { offset, found });
    }
    defmt::println!("Read back OK");

    let found = flash.calculate_page_crc(page)?;
    let expected = software_crc(flash.config().crc, &buffer);
    defmt::println!("Page CRC 0x{=u32:08x}", found);
    if found != expected {
        return Err(Failure::Crc { expected, found });
    }

    flash.erase_page(page)?;
    flash.write_half_word(page, PROBE)?;
    let found = flash.read_half_word(page)?;
    if found != PROBE {
        return Err(Failure::HalfWord { found });
    }
    defmt::println!("Half-word 0x{=u16:04x} OK", found);

    // Leave the page erased
    flash.erase_page(page)?;

    flash.lock();
    if !flash.is_locked() || flash.erase_page(page) != Err(Error::Locked) {
        return Err(Failure::LockIgnored);
    }
    defmt::println!("Controller locked");

    Ok(())
}
