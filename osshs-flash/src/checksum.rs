// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Page checksums on the CRC calculation unit.
//!
//! The unit shifts each 32-bit data register write in MSB first, starting
//! from `0xFFFF_FFFF`, with the fixed polynomial `0x04C11DB7`. Byte streams
//! are presented to it so the result matches the byte-wise definition of the
//! configured algorithm:
//! - no input reflection: bytes `b0 b1 b2 b3` are fed as `b0b1b2b3`
//!   (each little-endian half-word byte swapped, halves exchanged)
//! - input reflection: the little-endian word is bit reversed, so bit 0 of
//!   `b0` enters first
//!
//! Output reflection and the final XOR are applied in software.

use crc::{Algorithm, Crc};

use crate::config::crc_supported;
use crate::error::{Error, Result};
use crate::flash::Flash;
use crate::mmio::Bus;
use crate::regs::{CRC_CR, CRC_CR_RESET, CRC_DR, RCC_AHBENR, RCC_AHBENR_CRCEN};

impl<B: Bus> Flash<B> {
    /// Compute the configured CRC-32 over the page at `address`.
    ///
    /// Fails with [`Error::UnsupportedCrc`] or [`Error::CrcDisabled`] before
    /// touching the unit when it cannot produce the configured checksum.
    /// Leaves the CRC unit reset for the next user.
    pub fn calculate_page_crc(&mut self, address: u32) -> Result<u32> {
        let page = self.check_page(address, "Calculating flash page CRC")?;
        let algorithm = self.config.crc;

        if !crc_supported(algorithm) {
            error!("Calculating flash page CRC failed. CRC algorithm not supported by the peripheral.");
            return Err(Error::UnsupportedCrc);
        }
        if self.bus.read_u32(RCC_AHBENR) & RCC_AHBENR_CRCEN == 0 {
            error!(
                "Calculating flash page CRC failed. CRC unit clock disabled (address = 0x{:08x}).",
                address
            );
            return Err(Error::CrcDisabled);
        }
        let end = address + self.config.region.page_size();

        self.bus.set_bits_u32(CRC_CR, CRC_CR_RESET);

        for word_address in (address..end).step_by(4) {
            let low = self.bus.read_u16(word_address);
            let high = self.bus.read_u16(word_address + 2);

            let value = if algorithm.refin {
                reflect_word(u32::from(low) | (u32::from(high) << 16))
            } else {
                u32::from(high.swap_bytes()) | (u32::from(low.swap_bytes()) << 16)
            };

            self.bus.write_u32(CRC_DR, value);
        }

        let mut crc = self.bus.read_u32(CRC_DR);
        if algorithm.refout {
            crc = reflect_word(crc);
        }
        crc ^= algorithm.xorout;

        self.bus.set_bits_u32(CRC_CR, CRC_CR_RESET);

        debug!(
            "Calculating flash page CRC succeeded (address = 0x{:08x}, page = {}, crc = 0x{:08x}).",
            address,
            page,
            crc
        );
        Ok(crc)
    }
}

/// Reverse the bit order of a 32-bit word.
pub const fn reflect_word(value: u32) -> u32 {
    let value = ((value >> 1) & 0x5555_5555) | ((value << 1) & 0xAAAA_AAAA);
    let value = ((value >> 2) & 0x3333_3333) | ((value << 2) & 0xCCCC_CCCC);
    let value = ((value >> 4) & 0x0F0F_0F0F) | ((value << 4) & 0xF0F0_F0F0);
    let value = ((value >> 8) & 0x00FF_00FF) | ((value << 8) & 0xFF00_FF00);
    (value >> 16) | (value << 16)
}

/// Byte-wise software CRC of `data`, matching what
/// [`Flash::calculate_page_crc`] reports for a page holding the same bytes.
pub fn software_crc(algorithm: &'static Algorithm<u32>, data: &[u8]) -> u32 {
    Crc::<u32>::new(algorithm).checksum(data)
}
