//! Key scanning core for the macropad and numpad input modules.
//!
//! Everything in here is independent of the board: the matrix is read through
//! [`matrix::AnalogRows`] and [`matrix::ColumnDriver`], LEDs are driven through
//! [`leds::LedDriver`] and keys go to the host through
//! [`keypad::HostKeyboard`].  The firmware supplies implementations of these
//! for the RP2040, and the tests supply simulated ones.

#![cfg_attr(not(test), no_std)]

pub use usbd_human_interface_device::page::Keyboard;

pub mod config;
pub mod debounce;
pub mod keypad;
pub mod layout;
pub mod leds;
pub mod matrix;
pub mod power;

pub use config::Config;
pub use keypad::{Hardware, HostKeyboard, Keypad, Outcome};
pub use layout::{Layout, LogicalKey};

cfg_if::cfg_if! {
    if #[cfg(feature = "defmt")] {
        mod log {
            pub use defmt::{debug, info, trace, warn};
        }
    } else {
        mod log {
            pub use log::{debug, info, trace, warn};
        }
    }
}

/// A physical location in the key matrix.
///
/// Columns are the driven KSO lines, rows are the analog lines read back
/// through the multiplexer.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Position {
    pub col: u8,
    pub row: u8,
}

impl Position {
    pub const fn new(col: u8, row: u8) -> Self {
        Position { col, row }
    }
}
