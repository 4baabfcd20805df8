//! Control of the key LEDs.
//!
//! The macropad has an RGB LED under every key, driven by a matrix LED
//! controller with a linear buffer of PWM values.  Each key's LED takes three
//! consecutive entries, one per colour.  Every accepted keypress clears the
//! buffer and lights the pressed key in the next colour.

use core::fmt::Debug;

use crate::layout::{Layout, NCELLS};
use crate::log::warn;
use crate::Position;

/// Entries in the LED controller buffer: 18 current sources by 11 switches.
pub const LED_COUNT: usize = 18 * 11;

const OFF: u8 = 0x00;
const FULL: u8 = 0xFF;

/// An LED controller.
pub trait LedDriver {
    type Error: Debug;

    fn set_intensity(&mut self, index: u8, value: u8) -> Result<(), Self::Error>;

    /// Turn the whole backlight on or off, without losing the buffer.
    fn set_enabled(&mut self, enabled: bool) -> Result<(), Self::Error>;
}

/// First LED buffer entry for each matrix cell of the macropad, indexed
/// `row * COLS + col`.
#[rustfmt::skip]
pub static MACROPAD_LEDS: [Option<u8>; NCELLS] = [
    Some(4),  Some(22), Some(58), Some(25), Some(1),  Some(19), Some(55), Some(61),
    Some(7),  Some(16), Some(34), Some(70), Some(64), Some(46), Some(13), Some(67),
    Some(10), Some(40), Some(37), None,     Some(49), Some(31), Some(28), Some(43),
    None,     None,     None,     None,     Some(52), None,     None,     None,
];

/// Which of the three channels of a key LED to light next.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Color {
    Blue = 0,
    Green = 1,
    Red = 2,
}

impl Color {
    pub fn next(self) -> Color {
        match self {
            Color::Blue => Color::Green,
            Color::Green => Color::Red,
            Color::Red => Color::Blue,
        }
    }

    pub fn offset(self) -> u8 {
        self as u8
    }
}

/// Flashes the LED of each key as it is pressed.
pub struct KeyFlash {
    color: Color,
}

impl KeyFlash {
    pub fn new() -> Self {
        KeyFlash { color: Color::Blue }
    }

    pub fn color(&self) -> Color {
        self.color
    }

    /// Light up the key at `pos`, and nothing else.  Returns the buffer entry
    /// that was lit.
    ///
    /// The colour only moves on when something was lit.
    pub fn flash<L: LedDriver>(&mut self, layout: &Layout, pos: Position, leds: &mut L) -> Option<u8> {
        clear(leds);

        let index = layout.led_index(pos)? + self.color.offset();
        if leds.set_intensity(index, FULL).is_err() {
            warn!("LED write failed at {}", index);
        }
        self.color = self.color.next();
        Some(index)
    }
}

impl Default for KeyFlash {
    fn default() -> Self {
        Self::new()
    }
}

/// Turn every LED in the buffer off.  Entries that fail to clear don't stop
/// the rest from being cleared.
pub fn clear<L: LedDriver>(leds: &mut L) {
    let mut failed = 0usize;
    for index in 0..LED_COUNT {
        if leds.set_intensity(index as u8, OFF).is_err() {
            failed += 1;
        }
    }
    if failed > 0 {
        warn!("LED clear failed for {} entries", failed);
    }
}
