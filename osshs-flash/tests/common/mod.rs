// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Host-side model of the STM32F1 flash interface and CRC unit.
//!
//! Behaviour modelled after RM0008:
//! - LOCK / KEYR sequence, including lock-out on a wrong or extra key write
//! - CR writes ignored while locked, except that LOCK stays set
//! - PG: half-word writes program erased cells only (or write 0x0000),
//!   otherwise PGERR and no change
//! - PER + STRT: erase the page containing AR
//! - BSY stays set for a configurable number of SR reads after a command
//! - CRC unit shifts each DR write in MSB first; RESET loads 0xFFFFFFFF;
//!   the unit ignores writes and reads 0 while its clock is gated
//!
//! Any access outside the modelled addresses panics.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use osshs_flash::regs::*;
use osshs_flash::{Bus, FlashConfig, FlashRegion};

const FLASH_SR_PGERR: u32 = 1 << 2;
const FLASH_SR_WRPRTERR: u32 = 1 << 4;
const FLASH_SR_EOP: u32 = 1 << 5;

pub const REGION: FlashRegion = FlashRegion::STM32F103XB;
pub const PAGE_SIZE: usize = REGION.page_size() as usize;

/// Config used by most tests: bounded waits so a model bug cannot hang.
pub fn config() -> FlashConfig {
    FlashConfig::STM32F103XB.with_busy_poll_limit(1_000)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum KeyState {
    Idle,
    FirstKey,
    LockedOut,
}

#[derive(Debug)]
struct State {
    region: FlashRegion,
    memory: Vec<u8>,

    locked: bool,
    key_state: KeyState,
    cr: u32,
    ar: u32,
    sr_flags: u32,
    busy_remaining: u32,
    busy_latency: u32,
    stuck_busy: bool,

    rcc_ahbenr: u32,
    crc_dr: u32,

    erase_failures: HashSet<u32>,
    program_failures: HashSet<u32>,

    accesses: usize,
    key_writes: Vec<u32>,
    erases: Vec<u32>,
    crc_writes: usize,
}

/// Cloneable handle; clones share the same simulated hardware.
#[derive(Clone, Debug)]
pub struct SimBus {
    state: Rc<RefCell<State>>,
}

impl SimBus {
    /// Reset state: flash erased and locked, CRC clock gated.
    pub fn new() -> Self {
        let region = REGION;
        Self {
            state: Rc::new(RefCell::new(State {
                region,
                memory: vec![0xFF; region.total_size() as usize],
                locked: true,
                key_state: KeyState::Idle,
                cr: 0,
                ar: 0,
                sr_flags: 0,
                busy_remaining: 0,
                busy_latency: 3,
                stuck_busy: false,
                rcc_ahbenr: 0x14, // SRAM and FLITF clocks on at reset
                crc_dr: CRC_INIT,
                erase_failures: HashSet::new(),
                program_failures: HashSet::new(),
                accesses: 0,
                key_writes: Vec::new(),
                erases: Vec::new(),
                crc_writes: 0,
            })),
        }
    }

    // --- Test setup ---

    pub fn unlocked() -> Self {
        let sim = Self::new();
        sim.state.borrow_mut().locked = false;
        sim
    }

    pub fn set_busy_latency(&self, polls: u32) {
        self.state.borrow_mut().busy_latency = polls;
    }

    pub fn set_stuck_busy(&self, stuck: bool) {
        self.state.borrow_mut().stuck_busy = stuck;
    }

    /// Cell at `address` keeps its content through erases.
    pub fn fail_erase_at(&self, address: u32) {
        self.state.borrow_mut().erase_failures.insert(address);
    }

    /// Cell at `address` ignores programming.
    pub fn fail_program_at(&self, address: u32) {
        self.state.borrow_mut().program_failures.insert(address);
    }

    /// Store bytes directly, bypassing the controller.
    pub fn load(&self, address: u32, data: &[u8]) {
        let mut s = self.state.borrow_mut();
        let offset = s.offset(address);
        s.memory[offset..offset + data.len()].copy_from_slice(data);
    }

    // --- Inspection ---

    pub fn contents(&self, address: u32, len: usize) -> Vec<u8> {
        let s = self.state.borrow();
        let offset = s.offset(address);
        s.memory[offset..offset + len].to_vec()
    }

    pub fn accesses(&self) -> usize {
        self.state.borrow().accesses
    }

    pub fn key_writes(&self) -> Vec<u32> {
        self.state.borrow().key_writes.clone()
    }

    pub fn erases(&self) -> Vec<u32> {
        self.state.borrow().erases.clone()
    }

    pub fn crc_writes(&self) -> usize {
        self.state.borrow().crc_writes
    }

    pub fn crc_register(&self) -> u32 {
        self.state.borrow().crc_dr
    }

    pub fn rcc_ahbenr(&self) -> u32 {
        self.state.borrow().rcc_ahbenr
    }

    pub fn crc_clock_enabled(&self) -> bool {
        self.state.borrow().rcc_ahbenr & RCC_AHBENR_CRCEN != 0
    }

    pub fn is_locked_out(&self) -> bool {
        self.state.borrow().key_state == KeyState::LockedOut
    }

    pub fn control(&self) -> u32 {
        self.state.borrow().read_cr()
    }

    pub fn program_error(&self) -> bool {
        self.state.borrow().sr_flags & FLASH_SR_PGERR != 0
    }
}

impl Default for SimBus {
    fn default() -> Self {
        Self::new()
    }
}

impl State {
    fn offset(&self, address: u32) -> usize {
        assert!(
            self.region.contains(address),
            "access outside flash at 0x{:08x}",
            address
        );
        (address - self.region.origin()) as usize
    }

    fn cell(&self, address: u32) -> u16 {
        let offset = self.offset(address);
        u16::from_le_bytes([self.memory[offset], self.memory[offset + 1]])
    }

    fn set_cell(&mut self, address: u32, value: u16) {
        let offset = self.offset(address);
        self.memory[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
    }

    fn read_cr(&self) -> u32 {
        if self.locked {
            self.cr | FLASH_CR_LOCK
        } else {
            self.cr & !FLASH_CR_LOCK
        }
    }

    fn start_busy(&mut self) {
        self.busy_remaining = self.busy_latency;
    }

    fn write_keyr(&mut self, key: u32) {
        self.key_writes.push(key);
        self.key_state = match (self.locked, self.key_state, key) {
            (_, KeyState::LockedOut, _) => KeyState::LockedOut,
            (true, KeyState::Idle, 0x4567_0123) => KeyState::FirstKey,
            (true, KeyState::FirstKey, 0xCDEF_89AB) => {
                self.locked = false;
                KeyState::Idle
            }
            _ => {
                self.locked = true;
                KeyState::LockedOut
            }
        };
    }

    fn write_cr(&mut self, value: u32) {
        if self.locked {
            return;
        }
        if value & FLASH_CR_LOCK != 0 {
            self.locked = true;
            self.key_state = match self.key_state {
                KeyState::LockedOut => KeyState::LockedOut,
                _ => KeyState::Idle,
            };
        }
        self.cr = value & !(FLASH_CR_LOCK | FLASH_CR_STRT);

        if value & FLASH_CR_STRT != 0 && value & FLASH_CR_PER != 0 {
            self.erase(self.ar);
        }
    }

    fn erase(&mut self, address: u32) {
        let page_size = self.region.page_size();
        let start = address - (address - self.region.origin()) % page_size;
        self.erases.push(start);
        for cell in (start..start + page_size).step_by(2) {
            if !self.erase_failures.contains(&cell) {
                self.set_cell(cell, 0xFFFF);
            }
        }
        self.sr_flags |= FLASH_SR_EOP;
        self.start_busy();
    }

    fn program(&mut self, address: u32, value: u16) {
        if self.locked || self.cr & FLASH_CR_PG == 0 {
            self.sr_flags |= FLASH_SR_WRPRTERR;
            return;
        }
        let current = self.cell(address);
        if current != 0xFFFF && value != 0x0000 {
            self.sr_flags |= FLASH_SR_PGERR;
        } else if !self.program_failures.contains(&address) {
            self.set_cell(address, value);
        }
        self.sr_flags |= FLASH_SR_EOP;
        self.start_busy();
    }

    fn read_sr(&mut self) -> u32 {
        if self.stuck_busy {
            return self.sr_flags | FLASH_SR_BSY;
        }
        if self.busy_remaining > 0 {
            self.busy_remaining -= 1;
            return self.sr_flags | FLASH_SR_BSY;
        }
        self.sr_flags
    }

    fn crc_enabled(&self) -> bool {
        self.rcc_ahbenr & RCC_AHBENR_CRCEN != 0
    }

    fn crc_feed(&mut self, word: u32) {
        self.crc_writes += 1;
        let mut crc = self.crc_dr ^ word;
        for _ in 0..32 {
            crc = if crc & 0x8000_0000 != 0 {
                (crc << 1) ^ CRC_POLY
            } else {
                crc << 1
            };
        }
        self.crc_dr = crc;
    }
}

impl Bus for SimBus {
    fn read_u16(&mut self, address: u32) -> u16 {
        let mut s = self.state.borrow_mut();
        s.accesses += 1;
        s.cell(address)
    }

    fn write_u16(&mut self, address: u32, value: u16) {
        let mut s = self.state.borrow_mut();
        s.accesses += 1;
        s.program(address, value);
    }

    fn read_u32(&mut self, address: u32) -> u32 {
        let mut s = self.state.borrow_mut();
        s.accesses += 1;
        match address {
            RCC_AHBENR => s.rcc_ahbenr,
            FLASH_SR => s.read_sr(),
            FLASH_CR => s.read_cr(),
            FLASH_AR => s.ar,
            CRC_DR if s.crc_enabled() => s.crc_dr,
            CRC_DR => 0,
            CRC_CR => 0,
            _ => panic!("unmodelled 32-bit read at 0x{:08x}", address),
        }
    }

    fn write_u32(&mut self, address: u32, value: u32) {
        let mut s = self.state.borrow_mut();
        s.accesses += 1;
        match address {
            RCC_AHBENR => s.rcc_ahbenr = value,
            FLASH_KEYR => s.write_keyr(value),
            FLASH_SR => s.sr_flags &= !(value & (FLASH_SR_EOP | FLASH_SR_PGERR | FLASH_SR_WRPRTERR)),
            FLASH_CR => s.write_cr(value),
            FLASH_AR => {
                if !s.locked {
                    s.ar = value;
                }
            }
            CRC_DR => {
                if s.crc_enabled() {
                    s.crc_feed(value);
                }
            }
            CRC_CR => {
                if s.crc_enabled() && value & CRC_CR_RESET != 0 {
                    s.crc_dr = CRC_INIT;
                }
            }
            _ => panic!("unmodelled 32-bit write at 0x{:08x}", address),
        }
    }
}
