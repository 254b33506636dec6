// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Driver configuration: region geometry, unlock keys, CRC variant and busy
//! wait policy. Everything here is meant to be a `const`, so one checksum
//! definition holds across the whole system.

use crc::{Algorithm, CRC_32_MPEG_2};

use crate::region::FlashRegion;
use crate::regs::{CRC_INIT, CRC_POLY};

/// Key sequence written to `FLASH_KEYR` to unlock the controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnlockKeys {
    pub key1: u32,
    pub key2: u32,
}

impl UnlockKeys {
    pub const STM32F1: Self = Self {
        key1: 0x4567_0123,
        key2: 0xCDEF_89AB,
    };
}

#[derive(Clone, Copy, Debug)]
pub struct FlashConfig {
    pub region: FlashRegion,
    pub keys: UnlockKeys,
    /// CRC variant. `refin`, `refout` and `xorout` are applied around the
    /// peripheral; `width`, `poly` and `init` must match it.
    pub crc: &'static Algorithm<u32>,
    /// Maximum number of busy status polls per wait. `None` waits forever.
    pub busy_poll_limit: Option<u32>,
}

impl FlashConfig {
    pub const STM32F103XB: Self = Self {
        region: FlashRegion::STM32F103XB,
        keys: UnlockKeys::STM32F1,
        crc: &CRC_32_MPEG_2,
        busy_poll_limit: None,
    };

    pub const fn with_region(self, region: FlashRegion) -> Self {
        Self { region, ..self }
    }

    pub const fn with_crc(self, crc: &'static Algorithm<u32>) -> Self {
        Self { crc, ..self }
    }

    pub const fn with_busy_poll_limit(self, limit: u32) -> Self {
        Self {
            busy_poll_limit: Some(limit),
            ..self
        }
    }
}

/// Whether the CRC unit can compute `algorithm`.
///
/// The unit has a fixed 32-bit polynomial and reset value; only input
/// reflection, output reflection and the final XOR can be varied around it.
pub const fn crc_supported(algorithm: &Algorithm<u32>) -> bool {
    algorithm.width == 32 && algorithm.poly == CRC_POLY && algorithm.init == CRC_INIT
}
