//! The scan loop.
//!
//! [`Keypad`] owns all of the hardware and all of the state.  The firmware
//! calls [`Keypad::tick`] once per scan period.  Each tick samples the host
//! sleep signal, scans the matrix, debounces the result, and for an accepted
//! key that has a keycode, types it and flashes its LED.

use core::fmt::Debug;

use embedded_hal::digital::v2::InputPin;
use usbd_human_interface_device::page::Keyboard;

use crate::debounce::Debouncer;
use crate::layout::Layout;
use crate::leds::{KeyFlash, LedDriver};
use crate::log::{info, warn};
use crate::matrix::{AnalogRows, ColumnDriver, Matrix};
use crate::power::PowerGate;
use crate::{Config, Position};

/// Where keycodes go.
pub trait HostKeyboard {
    type Error: Debug;

    fn press(&mut self, key: Keyboard) -> Result<(), Self::Error>;
    fn release_all(&mut self) -> Result<(), Self::Error>;
}

/// Every piece of hardware the scan loop touches.  Built once at startup and
/// handed to [`Keypad::new`].
pub struct Hardware<C, R, L, K, S> {
    /// The KSO column lines.
    pub cols: C,
    /// The multiplexed analog row lines.
    pub rows: R,
    /// The backlight.
    pub leds: L,
    /// The host keyboard interface.
    pub keyboard: K,
    /// SLEEP#, low while the host is asleep.
    pub sleep: S,
}

/// What happened during a tick.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Outcome {
    /// Nothing is pressed.
    Idle,
    /// A key is held, but the debouncer filtered it out.
    Rejected(Position),
    /// A key was accepted, but it has no keycode.
    Unmapped(Position),
    /// A keycode was sent to the host.
    Emitted(Keyboard),
}

pub struct Keypad<C, R, L, K, S> {
    hw: Hardware<C, R, L, K, S>,
    layout: &'static Layout,
    matrix: Matrix,
    debouncer: Debouncer,
    flash: KeyFlash,
    power: PowerGate,
}

impl<C, R, L, K, S> Keypad<C, R, L, K, S>
where
    C: ColumnDriver,
    R: AnalogRows,
    L: LedDriver,
    K: HostKeyboard,
    S: InputPin,
{
    pub fn new(hw: Hardware<C, R, L, K, S>, layout: &'static Layout, config: Config) -> Self {
        info!("Keypad: {}", layout.name);
        Keypad {
            hw,
            layout,
            matrix: Matrix::new(config),
            debouncer: Debouncer::new(config.repeat_after),
            flash: KeyFlash::new(),
            power: PowerGate::new(),
        }
    }

    /// Run one scan period.
    pub fn tick(&mut self) -> Outcome {
        self.update_power();

        let raw = match self.matrix.scan(&mut self.hw.cols, &mut self.hw.rows) {
            Ok(raw) => raw,
            Err(_) => {
                warn!("Matrix scan failed");
                None
            }
        };

        let accepted = self.debouncer.filter(raw);
        let pos = match raw {
            None => return Outcome::Idle,
            Some(pos) if !accepted => return Outcome::Rejected(pos),
            Some(pos) => pos,
        };

        let code = match self.layout.resolve(pos) {
            Some(code) => code,
            None => return Outcome::Unmapped(pos),
        };
        info!("Pressed {:?} ({}, {})", code, pos.col, pos.row);

        if self.layout.has_key_leds() {
            self.flash.flash(self.layout, pos, &mut self.hw.leds);
        }
        self.emit(code);
        Outcome::Emitted(code)
    }

    fn update_power(&mut self) {
        let signal = match self.hw.sleep.is_high() {
            Ok(signal) => signal,
            Err(_) => {
                warn!("SLEEP# read failed");
                self.power.is_awake().unwrap_or(true)
            }
        };
        let enable = self.power.tick(signal);
        if self.hw.leds.set_enabled(enable).is_err() {
            warn!("Backlight enable failed");
        }
    }

    /// Tap a key.  Failures are dropped, the next accepted scan will try again.
    fn emit(&mut self, code: Keyboard) {
        if self.hw.keyboard.press(code).is_err() {
            warn!("Key press dropped");
        }
        if self.hw.keyboard.release_all().is_err() {
            warn!("Key release dropped");
        }
    }

    pub fn layout(&self) -> &'static Layout {
        self.layout
    }

    pub fn hardware(&self) -> &Hardware<C, R, L, K, S> {
        &self.hw
    }

    pub fn hardware_mut(&mut self) -> &mut Hardware<C, R, L, K, S> {
        &mut self.hw
    }
}
