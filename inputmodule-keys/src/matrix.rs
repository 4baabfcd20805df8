//! Keyboard matrix handling.
//!
//! The input modules do not read their rows digitally.  Each KSO column line
//! is driven low in turn, and the row lines are routed through an analog
//! multiplexer to a single ADC input.  A closed switch pulls its row below the
//! press threshold.
//!
//! Only one key is reported per pass: the scan stops looking at the rows of a
//! column as soon as it finds a pressed one, and the first column with a press
//! wins.

use core::fmt::Debug;

use embedded_hal::digital::v2::{OutputPin, PinState};

use crate::log::{debug, trace};
use crate::{Config, Position};

/// Columns on both modules.
pub const COLS: usize = 8;
/// Rows on both modules.
pub const ROWS: usize = 4;

/// Something that can route a row to the ADC and sample it.
pub trait AnalogRows {
    type Error: Debug;

    fn select_row(&mut self, row: u8) -> Result<(), Self::Error>;

    /// Read the selected row, scaled to a full 16-bit range.
    fn read_raw(&mut self) -> Result<u16, Self::Error>;
}

/// Something that can drive the column lines.
pub trait ColumnDriver {
    type Error: Debug;

    /// Drive a column.  Active columns are driven low.
    fn set_column(&mut self, col: u8, active: bool) -> Result<(), Self::Error>;
}

impl<P: OutputPin, const N: usize> ColumnDriver for [P; N]
where
    P::Error: Debug,
{
    type Error = P::Error;

    fn set_column(&mut self, col: u8, active: bool) -> Result<(), Self::Error> {
        match self.get_mut(col as usize) {
            Some(pin) if active => pin.set_low(),
            Some(pin) => pin.set_high(),
            None => Ok(()),
        }
    }
}

/// Which multiplexer channel a given row is wired to.
///
/// The first three rows are not wired in order.
pub const fn mux_channel(row: u8) -> u8 {
    match row {
        0 => 2,
        1 => 0,
        2 => 1,
        r => r,
    }
}

/// The three select lines of the analog multiplexer.
pub struct Mux<P> {
    a: P,
    b: P,
    c: P,
}

impl<P: OutputPin> Mux<P> {
    pub fn new(a: P, b: P, c: P) -> Self {
        Mux { a, b, c }
    }

    /// Route the given row to the multiplexer output.
    pub fn select_row(&mut self, row: u8) -> Result<(), P::Error> {
        let channel = mux_channel(row);
        self.a.set_state(PinState::from(channel & 0x01 != 0))?;
        self.b.set_state(PinState::from(channel & 0x02 != 0))?;
        self.c.set_state(PinState::from(channel & 0x04 != 0))?;
        Ok(())
    }
}

/// Failure partway through a scan.
#[derive(Debug)]
pub enum ScanError<C, R> {
    Column(C),
    Row(R),
}

/// The matrix scanner.
pub struct Matrix {
    cols: u8,
    rows: u8,
    config: Config,
}

impl Matrix {
    pub fn new(config: Config) -> Self {
        Matrix {
            cols: COLS as u8,
            rows: ROWS as u8,
            config,
        }
    }

    /// Scan the whole matrix once.
    ///
    /// Every column is visited, even after a press has been found, so the pin
    /// activity of a pass does not depend on what is pressed.
    pub fn scan<C, R>(
        &self,
        cols: &mut C,
        rows: &mut R,
    ) -> Result<Option<Position>, ScanError<C::Error, R::Error>>
    where
        C: ColumnDriver,
        R: AnalogRows,
    {
        let mut found = None;

        for col in 0..self.cols {
            cols.set_column(col, false).map_err(ScanError::Column)?;
        }

        for col in 0..self.cols {
            // The column is released again even if reading its rows failed.
            let pressed = cols
                .set_column(col, true)
                .map_err(ScanError::Column)
                .and_then(|()| self.scan_column(col, rows).map_err(ScanError::Row));
            let released = cols.set_column(col, false).map_err(ScanError::Column);

            if let Some(row) = pressed? {
                debug!("Pressed {}:{}", col, row);
                if found.is_none() {
                    found = Some(Position::new(col, row));
                }
            }
            released?;
        }

        Ok(found)
    }

    /// Read the rows of the active column, stopping at the first pressed one.
    fn scan_column<R: AnalogRows>(&self, col: u8, rows: &mut R) -> Result<Option<u8>, R::Error> {
        for row in 0..self.rows {
            rows.select_row(row)?;
            let sample = rows.read_raw()?;
            trace!("{}:{}: {}V", col, row, self.config.to_voltage(sample));

            if self.config.is_pressed(sample) {
                return Ok(Some(row));
            }
        }
        Ok(None)
    }
}
