// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Board bring-up for a Blue Pill style STM32F103 board.

use stm32f1xx_hal as hal;
use stm32f1xx_hal::prelude::*;

/// On-board LED, wired active low.
pub type LedPin = hal::gpio::Pin<'C', 13, hal::gpio::Output<hal::gpio::PushPull>>;

pub struct Board {
    pub led: LedPin,
    /// Core clock, used to turn milliseconds into busy-wait cycles.
    pub sysclk_hz: u32,
}

pub fn init() -> Board {
    let dp = unsafe { hal::pac::Peripherals::steal() };

    // HSI at 8 MHz keeps flash at zero wait states
    let mut flash = dp.FLASH.constrain();
    let rcc = dp.RCC.constrain();
    let clocks = rcc.cfgr.freeze(&mut flash.acr);

    let mut gpioc = dp.GPIOC.split();
    let mut led = gpioc.pc13.into_push_pull_output(&mut gpioc.crh);
    led.set_high();

    Board {
        led,
        sysclk_hz: clocks.sysclk().raw(),
    }
}

impl Board {
    pub fn delay_ms(&self, ms: u32) {
        cortex_m::asm::delay(self.sysclk_hz / 1_000 * ms);
    }

    pub fn blink(&mut self, count: u32, period_ms: u32) {
        for _ in 0..count {
            self.led.set_low();
            self.delay_ms(period_ms);
            self.led.set_high();
            self.delay_ms(period_ms);
        }
    }
}
