//! Key layouts
//!
//! Translating a matrix position into a keycode happens in two steps.  The
//! wiring table turns the physical (column, row) into a logical (x, y) key,
//! with x counting across and y counting down the face of the module.  The
//! keymap then gives the keycode for that logical key.  Both modules share the
//! same wiring, and only differ in their keymaps and backlight.
//!
//! Tables are flat arrays, indexed by `row * COLS + col` for the wiring, and
//! by `y * WIDTH + x` for the keymap.

use usbd_human_interface_device::page::Keyboard;

use crate::leds::MACROPAD_LEDS;
use crate::matrix::{COLS, ROWS};
use crate::Position;

/// Logical keys across the face of a module.
pub const WIDTH: usize = 4;
/// Logical keys down the face of a module.
pub const HEIGHT: usize = 6;
/// Number of keys on a module.
pub const NKEYS: usize = WIDTH * HEIGHT;

/// Number of cells in the physical matrix.
pub const NCELLS: usize = COLS * ROWS;

/// A key, identified by where it is on the module rather than how it is wired.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LogicalKey {
    pub x: u8,
    pub y: u8,
}

impl LogicalKey {
    pub const fn new(x: u8, y: u8) -> Self {
        LogicalKey { x, y }
    }

    fn index(&self) -> usize {
        self.y as usize * WIDTH + self.x as usize
    }
}

/// Shorthand for the wiring table.
const fn k(x: u8, y: u8) -> Option<LogicalKey> {
    Some(LogicalKey::new(x, y))
}

/// Matrix cells with no switch.
const NC: Option<LogicalKey> = None;

#[rustfmt::skip]
pub static WIRING: [Option<LogicalKey>; NCELLS] = [
    k(0, 1), k(0, 2), k(0, 3), k(0, 4), k(1, 1), k(1, 2), k(1, 3), k(1, 4),
    k(0, 5), k(2, 1), k(2, 2), k(2, 3), k(2, 4), k(2, 5), k(3, 1), k(3, 3),
    k(3, 5), k(0, 0), k(1, 0), NC,      k(3, 0), k(3, 2), k(3, 4), k(1, 5),
    NC,      NC,      NC,      NC,      k(2, 0), NC,      NC,      NC,
];

/// The macropad sends the letters A through X, in reading order.
#[rustfmt::skip]
pub static MACROPAD_KEYMAP: [Option<Keyboard>; NKEYS] = [
    Some(Keyboard::A), Some(Keyboard::B), Some(Keyboard::C), Some(Keyboard::D),
    Some(Keyboard::E), Some(Keyboard::F), Some(Keyboard::G), Some(Keyboard::H),
    Some(Keyboard::I), Some(Keyboard::J), Some(Keyboard::K), Some(Keyboard::L),
    Some(Keyboard::M), Some(Keyboard::N), Some(Keyboard::O), Some(Keyboard::P),
    Some(Keyboard::Q), Some(Keyboard::R), Some(Keyboard::S), Some(Keyboard::T),
    Some(Keyboard::U), Some(Keyboard::V), Some(Keyboard::W), Some(Keyboard::X),
];

/// The numpad.  The top row has a calculator key, which has no keyboard page
/// usage, so it sends nothing.
///
/// The 8, 9, 5, 6, slash and minus keys send the main block codes, which is
/// what the shipped modules do.
#[rustfmt::skip]
pub static NUMPAD_KEYMAP: [Option<Keyboard>; NKEYS] = [
    Some(Keyboard::Escape),
    None,
    Some(Keyboard::Equal),
    Some(Keyboard::DeleteBackspace),

    Some(Keyboard::KeypadNumLockAndClear),
    Some(Keyboard::ForwardSlash),
    Some(Keyboard::KeypadMultiply),
    Some(Keyboard::KeypadSubtract),

    Some(Keyboard::Keypad7),
    Some(Keyboard::Keyboard8),
    Some(Keyboard::Keyboard9),
    Some(Keyboard::Minus),

    Some(Keyboard::Keypad4),
    Some(Keyboard::Keyboard5),
    Some(Keyboard::Keyboard6),
    Some(Keyboard::KeypadAdd),

    Some(Keyboard::Keypad1),
    Some(Keyboard::Keypad2),
    Some(Keyboard::Keypad3),
    Some(Keyboard::KeypadAdd),

    Some(Keyboard::Keypad0),
    Some(Keyboard::Keypad0),
    Some(Keyboard::KeypadEnter),
    Some(Keyboard::ReturnEnter),
];

/// Everything needed to decode and light up a particular module.
pub struct Layout {
    pub name: &'static str,
    wiring: &'static [Option<LogicalKey>; NCELLS],
    keymap: &'static [Option<Keyboard>; NKEYS],
    /// Per key LEDs, if this module has them.
    leds: Option<&'static [Option<u8>; NCELLS]>,
}

pub static MACROPAD: Layout = Layout {
    name: "macropad",
    wiring: &WIRING,
    keymap: &MACROPAD_KEYMAP,
    leds: Some(&MACROPAD_LEDS),
};

pub static NUMPAD: Layout = Layout {
    name: "numpad",
    wiring: &WIRING,
    keymap: &NUMPAD_KEYMAP,
    leds: None,
};

fn cell(pos: Position) -> Option<usize> {
    if (pos.col as usize) < COLS && (pos.row as usize) < ROWS {
        Some(pos.row as usize * COLS + pos.col as usize)
    } else {
        None
    }
}

impl Layout {
    /// Which logical key is at this position, if any.
    pub fn logical(&self, pos: Position) -> Option<LogicalKey> {
        self.wiring[cell(pos)?]
    }

    /// The keycode of a logical key.
    pub fn keycode(&self, key: LogicalKey) -> Option<Keyboard> {
        if (key.x as usize) < WIDTH && (key.y as usize) < HEIGHT {
            self.keymap[key.index()]
        } else {
            None
        }
    }

    /// Decode a matrix position into the keycode to send.
    pub fn resolve(&self, pos: Position) -> Option<Keyboard> {
        self.keycode(self.logical(pos)?)
    }

    /// Does this module have per key LEDs?
    pub fn has_key_leds(&self) -> bool {
        self.leds.is_some()
    }

    /// The first of the three LED channels of the key at this position.
    pub fn led_index(&self, pos: Position) -> Option<u8> {
        self.leds?[cell(pos)?]
    }
}
