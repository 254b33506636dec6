// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Flash controller driver: lock state, half-word I/O and page I/O.
//!
//! Every destructive operation is verified by reading the affected cells
//! back. The sequences follow RM0008 section 3:
//!   program: wait !BSY, set PG, write half-word, wait !BSY, clear PG
//!   erase:   wait !BSY, set PER, write AR, set STRT, wait !BSY, clear PER
//!
//! The driver keeps no state besides its configuration; lock state is read
//! from `FLASH_CR` every time it matters. Callers must serialize access.

use crate::config::{crc_supported, FlashConfig};
use crate::error::{Error, Result};
use crate::mmio::Bus;
use crate::region::FlashRegion;
use crate::regs::{
    FLASH_AR, FLASH_CR, FLASH_CR_LOCK, FLASH_CR_PER, FLASH_CR_PG, FLASH_CR_STRT, FLASH_KEYR,
    FLASH_SR, FLASH_SR_BSY, RCC_AHBENR, RCC_AHBENR_CRCEN,
};

/// Value of an erased half-word.
pub const ERASED_HALF_WORD: u16 = 0xFFFF;

pub struct Flash<B> {
    pub(crate) bus: B,
    pub(crate) config: FlashConfig,
}

impl<B: Bus> Flash<B> {
    pub fn new(bus: B, config: FlashConfig) -> Self {
        Self { bus, config }
    }

    pub fn config(&self) -> &FlashConfig {
        &self.config
    }

    pub fn region(&self) -> &FlashRegion {
        &self.config.region
    }

    /// Page index of `address` within the configured region.
    pub fn page_index(&self, address: u32) -> Option<u32> {
        self.config.region.page_index(address)
    }

    /// Give the bus back.
    pub fn release(self) -> B {
        self.bus
    }

    /// Enable the CRC unit clock and unlock the controller if needed.
    pub fn initialize(&mut self) -> Result<()> {
        if !crc_supported(self.config.crc) {
            error!("Initializing flash failed. CRC algorithm not supported by the peripheral.");
            return Err(Error::UnsupportedCrc);
        }

        self.bus.set_bits_u32(RCC_AHBENR, RCC_AHBENR_CRCEN);

        if self.is_locked() {
            if let Err(e) = self.unlock() {
                error!("Initializing flash failed. Could not unlock flash.");
                return Err(e);
            }
        }

        info!("Initializing flash succeeded.");
        Ok(())
    }

    /// Disable the CRC unit clock. Lock state is left as is.
    pub fn deinitialize(&mut self) {
        self.bus.clear_bits_u32(RCC_AHBENR, RCC_AHBENR_CRCEN);

        info!("Deinitializing flash succeeded.");
    }

    // --- Lock state ---

    pub fn is_locked(&mut self) -> bool {
        self.bus.read_u32(FLASH_CR) & FLASH_CR_LOCK != 0
    }

    /// Write the key sequence and check that LOCK cleared.
    ///
    /// A key write while unlocked locks the controller until reset, so an
    /// unlocked controller is left untouched.
    pub fn unlock(&mut self) -> Result<()> {
        if !self.is_locked() {
            debug!("Unlocking flash skipped. Flash already unlocked.");
            return Ok(());
        }

        // Exactly two writes, nothing in between.
        self.bus.write_u32(FLASH_KEYR, self.config.keys.key1);
        self.bus.write_u32(FLASH_KEYR, self.config.keys.key2);

        if self.is_locked() {
            error!("Unlocking flash failed.");
            return Err(Error::UnlockFailed);
        }

        info!("Unlocking flash succeeded.");
        Ok(())
    }

    pub fn lock(&mut self) {
        self.bus.set_bits_u32(FLASH_CR, FLASH_CR_LOCK);

        info!("Locking flash succeeded.");
    }

    // --- Word I/O ---

    pub fn read_half_word(&mut self, address: u32) -> Result<u16> {
        if !FlashRegion::is_half_word_aligned(address) {
            error!(
                "Reading half word from flash failed. Address not half word aligned (address = 0x{:08x}).",
                address
            );
            return Err(Error::Misaligned { address });
        }
        if !self.config.region.contains(address) {
            error!(
                "Reading half word from flash failed. Address out of range (address = 0x{:08x}).",
                address
            );
            return Err(Error::OutOfRange { address });
        }

        let value = self.bus.read_u16(address);

        debug!(
            "Reading half word from flash succeeded (address = 0x{:08x}, value = 0x{:04x}).",
            address,
            value
        );
        Ok(value)
    }

    /// Program one half-word and read it back.
    ///
    /// The cell must be erased unless `value` is `0x0000`; the read-back
    /// catches a refused program either way.
    pub fn write_half_word(&mut self, address: u32, value: u16) -> Result<()> {
        if !FlashRegion::is_half_word_aligned(address) {
            error!(
                "Writing half word to flash failed. Address not half word aligned (address = 0x{:08x}, value = 0x{:04x}).",
                address,
                value
            );
            return Err(Error::Misaligned { address });
        }
        if !self.config.region.contains(address) {
            error!(
                "Writing half word to flash failed. Address out of range (address = 0x{:08x}, value = 0x{:04x}).",
                address,
                value
            );
            return Err(Error::OutOfRange { address });
        }
        self.ensure_unlocked()?;

        self.wait_not_busy()?;
        self.bus.set_bits_u32(FLASH_CR, FLASH_CR_PG);
        self.bus.write_u16(address, value);
        let done = self.wait_not_busy();
        self.bus.clear_bits_u32(FLASH_CR, FLASH_CR_PG);
        done?;

        let found = self.bus.read_u16(address);
        if found != value {
            error!(
                "Writing half word to flash failed (address = 0x{:08x}, value = 0x{:04x}, found = 0x{:04x}).",
                address,
                value,
                found
            );
            return Err(Error::VerifyFailed {
                address,
                expected: value,
                found,
            });
        }

        debug!(
            "Writing half word to flash succeeded (address = 0x{:08x}, value = 0x{:04x}).",
            address,
            value
        );
        Ok(())
    }

    // --- Page I/O ---

    /// Erase the page at `address` and check every cell reads `0xFFFF`.
    pub fn erase_page(&mut self, address: u32) -> Result<()> {
        let page = self.check_page(address, "Erasing flash page")?;
        self.ensure_unlocked()?;

        self.wait_not_busy()?;
        self.bus.set_bits_u32(FLASH_CR, FLASH_CR_PER);
        self.bus.write_u32(FLASH_AR, address);
        self.bus.set_bits_u32(FLASH_CR, FLASH_CR_STRT);
        let done = self.wait_not_busy();
        self.bus.clear_bits_u32(FLASH_CR, FLASH_CR_PER);
        done?;

        let end = address + self.config.region.page_size();
        for cell in (address..end).step_by(2) {
            let found = self.bus.read_u16(cell);
            if found != ERASED_HALF_WORD {
                error!(
                    "Erasing flash page failed (address = 0x{:08x}, page = {}, cell = 0x{:08x}, found = 0x{:04x}).",
                    address,
                    page,
                    cell,
                    found
                );
                return Err(Error::EraseFailed {
                    address: cell,
                    found,
                });
            }
        }

        debug!(
            "Erasing flash page succeeded (address = 0x{:08x}, page = {}).",
            address,
            page
        );
        Ok(())
    }

    /// Copy the page at `address` into `buffer`, low byte of each cell first.
    pub fn read_page(&mut self, address: u32, buffer: &mut [u8]) -> Result<()> {
        let page = self.check_page(address, "Reading flash page")?;
        self.check_buffer(buffer.len(), "Reading flash page")?;

        for (bytes, cell) in buffer.chunks_exact_mut(2).zip((address..).step_by(2)) {
            let value = self.bus.read_u16(cell);
            bytes.copy_from_slice(&value.to_le_bytes());
        }

        debug!(
            "Reading flash page succeeded (address = 0x{:08x}, page = {}).",
            address,
            page
        );
        Ok(())
    }

    /// Erase the page at `address`, then program `buffer` into it.
    ///
    /// Stops at the first cell whose read-back differs from the buffer and
    /// returns [`Error::VerifyFailed`] for it; the rest of the page is left
    /// erased. PG is cleared on every exit path.
    pub fn write_page(&mut self, address: u32, buffer: &[u8]) -> Result<()> {
        let page = self.check_page(address, "Writing flash page")?;
        self.check_buffer(buffer.len(), "Writing flash page")?;

        if let Err(e) = self.erase_page(address) {
            error!(
                "Writing flash page failed. Page was not erased (address = 0x{:08x}, page = {}).",
                address,
                page
            );
            return Err(e);
        }

        self.bus.set_bits_u32(FLASH_CR, FLASH_CR_PG);
        let programmed = self.program_cells(address, buffer);
        self.bus.clear_bits_u32(FLASH_CR, FLASH_CR_PG);

        if let Err(e) = programmed {
            error!(
                "Writing flash page failed (address = 0x{:08x}, page = {}).",
                address,
                page
            );
            return Err(e);
        }

        debug!(
            "Writing flash page succeeded (address = 0x{:08x}, page = {}).",
            address,
            page
        );
        Ok(())
    }

    // --- Internal helpers ---

    /// Program and verify every cell of an erased page. PG must be set.
    fn program_cells(&mut self, address: u32, buffer: &[u8]) -> Result<()> {
        self.wait_not_busy()?;

        for (bytes, cell) in buffer.chunks_exact(2).zip((address..).step_by(2)) {
            let value = u16::from_le_bytes([bytes[0], bytes[1]]);

            self.bus.write_u16(cell, value);
            self.wait_not_busy()?;

            let found = self.bus.read_u16(cell);
            if found != value {
                error!(
                    "Writing flash page failed. Value could not be written (address = 0x{:08x}, value = 0x{:04x}, found = 0x{:04x}).",
                    cell,
                    value,
                    found
                );
                return Err(Error::VerifyFailed {
                    address: cell,
                    expected: value,
                    found,
                });
            }
        }

        Ok(())
    }

    /// Validate a page address and return its page index.
    pub(crate) fn check_page(&self, address: u32, operation: &'static str) -> Result<u32> {
        let region = &self.config.region;

        if !region.is_page_aligned(address) {
            error!(
                "{} failed. Address not page aligned (address = 0x{:08x}).",
                operation,
                address
            );
            return Err(Error::Misaligned { address });
        }

        match region.page_index(address) {
            Some(page) => Ok(page),
            None => {
                error!(
                    "{} failed. Address out of range (address = 0x{:08x}).",
                    operation,
                    address
                );
                Err(Error::OutOfRange { address })
            }
        }
    }

    fn check_buffer(&self, len: usize, operation: &'static str) -> Result<()> {
        let expected = self.config.region.page_size() as usize;
        if len != expected {
            error!(
                "{} failed. Buffer is {} bytes, page is {} bytes.",
                operation,
                len,
                expected
            );
            return Err(Error::BufferSize {
                expected,
                actual: len,
            });
        }
        Ok(())
    }

    fn ensure_unlocked(&mut self) -> Result<()> {
        if self.is_locked() {
            error!("Flash operation refused. Flash is locked.");
            return Err(Error::Locked);
        }
        Ok(())
    }

    /// Spin until BSY clears, or until the configured poll limit runs out.
    fn wait_not_busy(&mut self) -> Result<()> {
        let mut polls: u32 = 0;

        while self.bus.read_u32(FLASH_SR) & FLASH_SR_BSY != 0 {
            if let Some(limit) = self.config.busy_poll_limit {
                if polls >= limit {
                    error!("Waiting for flash failed. Still busy after {} polls.", polls);
                    return Err(Error::Timeout);
                }
            }
            polls = polls.saturating_add(1);
            core::hint::spin_loop();
        }

        Ok(())
    }
}
