// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Flash driver self-test firmware for STM32F103.
//!
//! Runs once after reset, then reports the result on the status LED:
//! a slow blink when every check passed, a fast blink otherwise.

#![no_std]
#![no_main]

mod board;
mod selftest;

use defmt_rtt as _;
use panic_probe as _;

defmt::timestamp!("{=u64:us}", { 0 });

use cortex_m_rt::entry;
use osshs_flash::{Flash, FlashConfig, Volatile};

const CONFIG: FlashConfig = FlashConfig::STM32F103XB.with_busy_poll_limit(1_000_000);

#[entry]
fn main() -> ! {
    defmt::println!("Self-test init");

    let mut board = board::init();
    board.blink(3, 200);

    // The flash and CRC registers are not owned by the HAL
    let bus = unsafe { Volatile::new() };
    let mut flash = Flash::new(bus, CONFIG);

    let period_ms = match selftest::run(&mut flash) {
        Ok(()) => {
            defmt::println!("Self-test passed");
            500
        }
        Err(e) => {
            defmt::println!("Self-test failed: {}", e);
            100
        }
    };
    flash.deinitialize();

    loop {
        board.blink(1, period_ms);
    }
}
