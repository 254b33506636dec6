// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! On-chip flash driver for STM32F1 parts.
//!
//! Provides verified primitives over the flash controller and the CRC unit:
//! - Lock state: unlock / lock the controller
//! - Word I/O: read and program single half-words
//! - Page I/O: erase, read and rewrite whole pages, every destructive step
//!   checked against the cells it touched
//! - CRC engine: hardware CRC-32 over a page with configurable reflection
//!   and final XOR
//!
//! All register traffic goes through the [`Bus`] trait, so the driver runs
//! unchanged against real silicon ([`Volatile`]) or a host-side model.
//!
//! This crate supports both `no_std` (embedded) and `std` (host) environments:
//! - Default: `no_std` mode for embedded targets
//! - `std` feature: Enables `std` support for host tools
//! - `defmt` / `log` features: Route driver logging to either backend

#![cfg_attr(not(feature = "std"), no_std)]

// Must come first so the logging macros are visible to every module.
#[macro_use]
mod fmt;

pub mod checksum;
pub mod config;
pub mod error;
pub mod flash;
pub mod mmio;
pub mod region;
pub mod regs;

// Re-export commonly used types
pub use checksum::{reflect_word, software_crc};
pub use config::{crc_supported, FlashConfig, UnlockKeys};
pub use error::{Error, Result};
pub use flash::Flash;
pub use mmio::{Bus, Volatile};
pub use region::FlashRegion;
