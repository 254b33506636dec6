// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! STM32F1 register map used by the driver (RM0008).

// --- RCC ---

pub const RCC_BASE: u32 = 0x4002_1000;
pub const RCC_AHBENR: u32 = RCC_BASE + 0x14;
pub const RCC_AHBENR_CRCEN: u32 = 1 << 6;

// --- FLASH interface ---

pub const FLASH_R_BASE: u32 = 0x4002_2000;
pub const FLASH_KEYR: u32 = FLASH_R_BASE + 0x04;
pub const FLASH_SR: u32 = FLASH_R_BASE + 0x0C;
pub const FLASH_CR: u32 = FLASH_R_BASE + 0x10;
pub const FLASH_AR: u32 = FLASH_R_BASE + 0x14;

pub const FLASH_SR_BSY: u32 = 1 << 0;

pub const FLASH_CR_PG: u32 = 1 << 0; // program
pub const FLASH_CR_PER: u32 = 1 << 1; // page erase
pub const FLASH_CR_STRT: u32 = 1 << 6; // start erase
pub const FLASH_CR_LOCK: u32 = 1 << 7;

// --- CRC calculation unit ---

pub const CRC_BASE: u32 = 0x4002_3000;
pub const CRC_DR: u32 = CRC_BASE;
pub const CRC_CR: u32 = CRC_BASE + 0x08;
pub const CRC_CR_RESET: u32 = 1 << 0;

/// Polynomial hard-wired into the CRC unit.
pub const CRC_POLY: u32 = 0x04C1_1DB7;
/// Value of `CRC_DR` after `CRC_CR_RESET`.
pub const CRC_INIT: u32 = 0xFFFF_FFFF;
