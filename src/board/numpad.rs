//! Definitions for the numpad.
//!
//! The numpad has one white backlight for all keys, on a PWM output.

use core::convert::Infallible;

use embedded_hal::PwmPin;
use inputmodule_keys::layout::{Layout, NUMPAD};
use inputmodule_keys::leds::LedDriver;

use crate::hal::pwm::{FreeRunning, Pwm4, Slice};

pub static LAYOUT: &Layout = &NUMPAD;
pub const PID: u16 = 0x0014;
pub const PRODUCT: &str = "Numpad";

/// PWM wrap value.  At a 125MHz system clock this gives 5kHz.
pub const PWM_TOP: u16 = 24_999;

/// The backlight, on GP25 (PWM slice 4, channel B).
pub struct PwmBacklight {
    slice: Slice<Pwm4, FreeRunning>,
    /// Duty when on, out of `u16::MAX`.
    duty: u16,
}

impl PwmBacklight {
    pub fn new(mut slice: Slice<Pwm4, FreeRunning>, duty: u16) -> Self {
        slice.set_top(PWM_TOP);
        slice.channel_b.set_duty(0);
        slice.enable();
        PwmBacklight { slice, duty }
    }
}

impl LedDriver for PwmBacklight {
    type Error = Infallible;

    /// There are no individually addressable LEDs.
    fn set_intensity(&mut self, _index: u8, _value: u8) -> Result<(), Infallible> {
        Ok(())
    }

    fn set_enabled(&mut self, enabled: bool) -> Result<(), Infallible> {
        let duty = if enabled {
            (self.duty as u32 * PWM_TOP as u32 / u16::MAX as u32) as u16
        } else {
            0
        };
        self.slice.channel_b.set_duty(duty);
        Ok(())
    }
}
