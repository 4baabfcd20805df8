//! Tunables for scanning and feedback.
//!
//! These are compile time values.  Boards start from [`Config::DEFAULT`] and
//! override what differs.

/// Scanning and backlight parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    /// ADC reference voltage, in volts.
    pub vref: f32,
    /// Full scale of a raw sample, as delivered by [`crate::matrix::AnalogRows`].
    pub full_scale: f32,
    /// A row reading below this voltage is a pressed key.  The switch pulls the
    /// line down.
    pub threshold: f32,
    /// A held key fires again once it has been seen more than this many times
    /// in a row.
    pub repeat_after: u8,
    /// Period between scans.
    pub scan_interval_ms: u32,
    /// Backlight duty cycle while the host is awake, out of `u16::MAX`.
    pub backlight_duty: u16,
}

impl Config {
    pub const DEFAULT: Config = Config {
        vref: 3.3,
        full_scale: 65536.0,
        threshold: 2.9,
        repeat_after: 10,
        scan_interval_ms: 10,
        backlight_duty: u16::MAX / 2,
    };

    pub const fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    pub const fn with_repeat_after(mut self, repeat_after: u8) -> Self {
        self.repeat_after = repeat_after;
        self
    }

    pub const fn with_scan_interval_ms(mut self, ms: u32) -> Self {
        self.scan_interval_ms = ms;
        self
    }

    pub const fn with_backlight_duty(mut self, duty: u16) -> Self {
        self.backlight_duty = duty;
        self
    }

    /// Convert a raw sample to volts.
    pub fn to_voltage(&self, sample: u16) -> f32 {
        (sample as f32 * self.vref) / self.full_scale
    }

    /// Does this raw sample indicate a closed switch?
    pub fn is_pressed(&self, sample: u16) -> bool {
        self.to_voltage(sample) < self.threshold
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn voltage_conversion() {
        let config = Config::DEFAULT;
        assert_eq!(config.to_voltage(0), 0.0);
        assert!((config.to_voltage(32768) - 1.65).abs() < 1e-4);
    }

    #[test]
    fn threshold() {
        let config = Config::DEFAULT;
        // 2.9V is just above 57592.
        assert!(config.is_pressed(0));
        assert!(config.is_pressed(57000));
        assert!(!config.is_pressed(58000));
        assert!(!config.is_pressed(u16::MAX));

        let lower = config.with_threshold(1.0);
        assert!(!lower.is_pressed(57000));
        assert!(lower.is_pressed(10000));
    }

    #[test]
    fn builders() {
        const TUNED: Config = Config::DEFAULT
            .with_repeat_after(20)
            .with_scan_interval_ms(5)
            .with_backlight_duty(u16::MAX);

        assert_eq!(TUNED.repeat_after, 20);
        assert_eq!(TUNED.scan_interval_ms, 5);
        assert_eq!(TUNED.backlight_duty, u16::MAX);
        assert_eq!(TUNED.threshold, Config::DEFAULT.threshold);
        assert_eq!(Config::default(), Config::DEFAULT);
    }
}
