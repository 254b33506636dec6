// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Memory-mapped I/O capability.
//!
//! The driver never dereferences raw addresses itself; every register and
//! flash cell access goes through a [`Bus`]. On target this is [`Volatile`],
//! on the host a model of the peripherals can stand in.

/// Fixed-width access to the physical address space.
///
/// Methods take `&mut self` because reads of status registers may have side
/// effects in the implementation (a model advancing its clock, for example).
pub trait Bus {
    fn read_u16(&mut self, address: u32) -> u16;
    fn write_u16(&mut self, address: u32, value: u16);
    fn read_u32(&mut self, address: u32) -> u32;
    fn write_u32(&mut self, address: u32, value: u32);

    /// Read-modify-write of a 32-bit register.
    fn modify_u32(&mut self, address: u32, f: impl FnOnce(u32) -> u32) {
        let value = self.read_u32(address);
        self.write_u32(address, f(value));
    }

    fn set_bits_u32(&mut self, address: u32, mask: u32) {
        self.modify_u32(address, |v| v | mask);
    }

    fn clear_bits_u32(&mut self, address: u32, mask: u32) {
        self.modify_u32(address, |v| v & !mask);
    }
}

/// Direct volatile access to the MCU address space.
pub struct Volatile {
    _0: (),
}

impl Volatile {
    /// # Safety
    /// Caller must ensure exclusive access to the RCC CRC enable bit, the
    /// FLASH interface, the CRC unit and the flash cells the driver is
    /// given, and that no code executes from a page while it is erased or
    /// programmed.
    pub unsafe fn new() -> Self {
        Self { _0: () }
    }
}

impl Bus for Volatile {
    fn read_u16(&mut self, address: u32) -> u16 {
        unsafe { (address as *const u16).read_volatile() }
    }

    fn write_u16(&mut self, address: u32, value: u16) {
        unsafe { (address as *mut u16).write_volatile(value) }
    }

    fn read_u32(&mut self, address: u32) -> u32 {
        unsafe { (address as *const u32).read_volatile() }
    }

    fn write_u32(&mut self, address: u32, value: u32) {
        unsafe { (address as *mut u32).write_volatile(value) }
    }
}
