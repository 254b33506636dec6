// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Driver error type.
//!
//! Precondition violations are reported before any register is touched;
//! verification failures are reported after the hardware operation finished.

use core::fmt;

/// Result type for driver operations
pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    // Precondition errors
    /// Address is not half-word aligned (word ops) or page aligned (page ops)
    Misaligned { address: u32 },
    /// Address lies outside the configured flash region
    OutOfRange { address: u32 },
    /// Page buffer length differs from the page size
    BufferSize { expected: usize, actual: usize },
    /// Controller is locked; destructive operations are refused
    Locked,
    /// Configured CRC algorithm cannot be computed by the peripheral
    UnsupportedCrc,
    /// CRC unit clock is gated; `initialize` has not run
    CrcDisabled,

    // Hardware verification errors
    /// LOCK still set after writing the key sequence
    UnlockFailed,
    /// A cell did not read back as erased after a page erase
    EraseFailed { address: u32, found: u16 },
    /// A programmed cell did not read back the written value
    VerifyFailed {
        address: u32,
        expected: u16,
        found: u16,
    },
    /// BSY did not clear within the configured poll limit
    Timeout,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Misaligned { address } => write!(f, "address 0x{:08X} is misaligned", address),
            Self::OutOfRange { address } => {
                write!(f, "address 0x{:08X} is outside the flash region", address)
            }
            Self::BufferSize { expected, actual } => write!(
                f,
                "page buffer is {} bytes, expected {} bytes",
                actual, expected
            ),
            Self::Locked => write!(f, "flash controller is locked"),
            Self::UnsupportedCrc => write!(f, "CRC algorithm not supported by the peripheral"),
            Self::CrcDisabled => write!(f, "CRC unit clock is disabled"),
            Self::UnlockFailed => write!(f, "flash controller did not unlock"),
            Self::EraseFailed { address, found } => write!(
                f,
                "erase verify failed at 0x{:08X}: expected 0xFFFF, found 0x{:04X}",
                address, found
            ),
            Self::VerifyFailed {
                address,
                expected,
                found,
            } => write!(
                f,
                "program verify failed at 0x{:08X}: expected 0x{:04X}, found 0x{:04X}",
                address, expected, found
            ),
            Self::Timeout => write!(f, "flash controller stayed busy"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}
