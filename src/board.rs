//! Board-specific definitions
//!
//! Both modules share the same MCU wiring for the key matrix.  They differ in
//! their backlight, their keymap and how they identify themselves on USB.

use core::convert::Infallible;

use embedded_hal::adc::{Channel, OneShot};
use embedded_hal::digital::v2::OutputPin;
use inputmodule_keys::matrix::{AnalogRows, Mux};

use crate::hal::Adc;

#[cfg(all(feature = "macropad", feature = "numpad"))]
compile_error!("Select exactly one of the `macropad` and `numpad` features");
#[cfg(not(any(feature = "macropad", feature = "numpad")))]
compile_error!("Select one of the `macropad` and `numpad` features");

#[cfg(feature = "macropad")]
mod macropad;
#[cfg(feature = "numpad")]
mod numpad;

#[cfg(feature = "macropad")]
pub use macropad::*;
#[cfg(feature = "numpad")]
pub use numpad::*;

/// USB vendor ID.
pub const VID: u16 = 0x32ac;

/// KSO0 through KSO7.  Driven high, which is inactive.
macro_rules! col_pins {
    ($pins:expr) => {
        [
            $pins.gpio8.into_push_pull_output_in_state(PinState::High).into_dyn_pin(),
            $pins.gpio9.into_push_pull_output_in_state(PinState::High).into_dyn_pin(),
            $pins.gpio10.into_push_pull_output_in_state(PinState::High).into_dyn_pin(),
            $pins.gpio11.into_push_pull_output_in_state(PinState::High).into_dyn_pin(),
            $pins.gpio12.into_push_pull_output_in_state(PinState::High).into_dyn_pin(),
            $pins.gpio13.into_push_pull_output_in_state(PinState::High).into_dyn_pin(),
            $pins.gpio14.into_push_pull_output_in_state(PinState::High).into_dyn_pin(),
            $pins.gpio15.into_push_pull_output_in_state(PinState::High).into_dyn_pin(),
        ]
    };
}
pub(crate) use col_pins;

/// MUX_A, MUX_B and MUX_C.
macro_rules! mux_pins {
    ($pins:expr) => {
        inputmodule_keys::matrix::Mux::new(
            $pins.gpio1.into_push_pull_output_in_state(PinState::Low).into_dyn_pin(),
            $pins.gpio2.into_push_pull_output_in_state(PinState::Low).into_dyn_pin(),
            $pins.gpio3.into_push_pull_output_in_state(PinState::Low).into_dyn_pin(),
        )
    };
}
pub(crate) use mux_pins;

/// The row lines, through the multiplexer, into the ADC on GP28.
pub struct RowSense<P, M> {
    mux: Mux<M>,
    adc: Adc,
    pin: P,
}

impl<P, M> RowSense<P, M>
where
    P: Channel<Adc, ID = u8>,
    M: OutputPin<Error = Infallible>,
{
    pub fn new(mux: Mux<M>, adc: Adc, pin: P) -> Self {
        RowSense { mux, adc, pin }
    }
}

impl<P, M> AnalogRows for RowSense<P, M>
where
    P: Channel<Adc, ID = u8>,
    M: OutputPin<Error = Infallible>,
{
    type Error = ();

    fn select_row(&mut self, row: u8) -> Result<(), ()> {
        self.mux.select_row(row).map_err(|_| ())
    }

    fn read_raw(&mut self) -> Result<u16, ()> {
        let sample: u16 = nb::block!(self.adc.read(&mut self.pin)).map_err(|_| ())?;
        // The ADC is 12 bits; the thresholds are in terms of a 16-bit sample.
        Ok(sample << 4)
    }
}
