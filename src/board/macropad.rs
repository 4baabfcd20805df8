//! Definitions for the macropad.
//!
//! The per key RGB LEDs hang off an IS31FL3743 on I2C1, with its shutdown
//! line on GP29.

use embedded_hal::blocking::i2c::Write;
use inputmodule_keys::layout::{Layout, MACROPAD};
use inputmodule_keys::leds::{LedDriver, LED_COUNT};

pub static LAYOUT: &Layout = &MACROPAD;
pub const PID: u16 = 0x0013;
pub const PRODUCT: &str = "Macropad";

/// Default address of the LED controller.
pub const LED_ADDRESS: u8 = 0x20;

// Registers.  Writes to the page select register have to be unlocked first.
const REG_UNLOCK: u8 = 0xfe;
const REG_PAGE: u8 = 0xfd;
const UNLOCK: u8 = 0xc5;

const PAGE_PWM: u8 = 0;
const PAGE_SCALING: u8 = 1;
const PAGE_FUNCTION: u8 = 2;

// On the function page.
const REG_CONFIG: u8 = 0x00;
const REG_CURRENT: u8 = 0x01;
const REG_RESET: u8 = 0x2f;
const RESET: u8 = 0xae;

/// Normal operation, all 11 switch lines.  Clearing it shuts the outputs
/// down but keeps the PWM values.
const CONFIG_RUN: u8 = 0x01;

/// The IS31FL3743 matrix LED controller.
pub struct Is31fl3743<I> {
    i2c: I,
    address: u8,
    page: Option<u8>,
}

impl<I: Write> Is31fl3743<I> {
    pub fn new(i2c: I, address: u8) -> Self {
        Is31fl3743 { i2c, address, page: None }
    }

    /// Reset the controller and bring it up at full scaling and current.
    pub fn init(&mut self) -> Result<(), I::Error> {
        self.write(PAGE_FUNCTION, REG_RESET, RESET)?;
        // Reset also forgets the page.
        self.page = None;
        for index in 0..LED_COUNT as u8 {
            self.write(PAGE_SCALING, index + 1, 0xff)?;
        }
        self.write(PAGE_FUNCTION, REG_CURRENT, 0xff)?;
        self.write(PAGE_FUNCTION, REG_CONFIG, CONFIG_RUN)
    }

    fn select(&mut self, page: u8) -> Result<(), I::Error> {
        if self.page != Some(page) {
            self.i2c.write(self.address, &[REG_UNLOCK, UNLOCK])?;
            self.i2c.write(self.address, &[REG_PAGE, page])?;
            self.page = Some(page);
        }
        Ok(())
    }

    fn write(&mut self, page: u8, reg: u8, value: u8) -> Result<(), I::Error> {
        self.select(page)?;
        self.i2c.write(self.address, &[reg, value])
    }
}

impl<I: Write> LedDriver for Is31fl3743<I>
where
    I::Error: core::fmt::Debug,
{
    type Error = I::Error;

    fn set_intensity(&mut self, index: u8, value: u8) -> Result<(), I::Error> {
        // PWM registers start at 1.
        self.write(PAGE_PWM, index + 1, value)
    }

    fn set_enabled(&mut self, enabled: bool) -> Result<(), I::Error> {
        self.write(PAGE_FUNCTION, REG_CONFIG, if enabled { CONFIG_RUN } else { 0 })
    }
}
