// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Flash region geometry: origin, page size, total size.

/// Immutable description of the flash bank the driver operates on.
///
/// Invariants: `page_size` is a power of two of at least 4 bytes,
/// `total_size` is a non-zero multiple of it, `origin` is page aligned and
/// the region does not wrap the 32-bit address space.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FlashRegion {
    origin: u32,
    page_size: u32,
    total_size: u32,
}

impl FlashRegion {
    /// STM32F103x8/xB medium density: 128 pages of 1 KiB.
    pub const STM32F103XB: Self = Self::new(0x0800_0000, 1024, 128 * 1024);

    /// Build a region, returning `None` if the invariants do not hold.
    pub const fn checked(origin: u32, page_size: u32, total_size: u32) -> Option<Self> {
        // Pages hold whole 32-bit CRC words.
        if page_size < 4 || !page_size.is_power_of_two() {
            return None;
        }
        if total_size == 0 || total_size % page_size != 0 {
            return None;
        }
        if origin % page_size != 0 || origin.checked_add(total_size).is_none() {
            return None;
        }
        Some(Self {
            origin,
            page_size,
            total_size,
        })
    }

    /// # Panics
    /// If the invariants do not hold. In a `const` this fails the build.
    pub const fn new(origin: u32, page_size: u32, total_size: u32) -> Self {
        match Self::checked(origin, page_size, total_size) {
            Some(region) => region,
            None => panic!("invalid flash region"),
        }
    }

    pub const fn origin(&self) -> u32 {
        self.origin
    }

    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    pub const fn total_size(&self) -> u32 {
        self.total_size
    }

    /// First address past the region.
    pub const fn end(&self) -> u32 {
        self.origin + self.total_size
    }

    pub const fn page_count(&self) -> u32 {
        self.total_size / self.page_size
    }

    pub const fn contains(&self, address: u32) -> bool {
        address >= self.origin && address < self.end()
    }

    pub const fn is_half_word_aligned(address: u32) -> bool {
        address & 0b1 == 0
    }

    pub const fn is_page_aligned(&self, address: u32) -> bool {
        address % self.page_size == 0
    }

    /// Index of the page starting at or containing `address`.
    pub const fn page_index(&self, address: u32) -> Option<u32> {
        if self.contains(address) {
            Some((address - self.origin) / self.page_size)
        } else {
            None
        }
    }

    /// Start address of page `index`.
    pub const fn page_address(&self, index: u32) -> Option<u32> {
        if index < self.page_count() {
            Some(self.origin + index * self.page_size)
        } else {
            None
        }
    }
}
