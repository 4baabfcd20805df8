//! Host power state.
//!
//! The host drives SLEEP# low while it is suspended.  The backlight follows
//! it.  Keys are still scanned and sent while the host sleeps, so a keypress
//! can wake it.

use crate::log::info;

pub struct PowerGate {
    /// Last state seen, for logging changes.
    awake: Option<bool>,
}

impl PowerGate {
    pub fn new() -> Self {
        PowerGate { awake: None }
    }

    /// Sample the sleep signal.  Returns whether the backlight should be on.
    pub fn tick(&mut self, sleep_signal: bool) -> bool {
        if self.awake != Some(sleep_signal) {
            if sleep_signal {
                info!("Host awake, backlight on");
            } else {
                info!("Host asleep, backlight off");
            }
            self.awake = Some(sleep_signal);
        }
        sleep_signal
    }

    pub fn is_awake(&self) -> Option<bool> {
        self.awake
    }
}

impl Default for PowerGate {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn follows_signal() {
        let mut gate = PowerGate::new();
        assert_eq!(gate.is_awake(), None);
        assert!(gate.tick(true));
        assert!(gate.tick(true));
        assert!(!gate.tick(false));
        assert_eq!(gate.is_awake(), Some(false));
        assert!(gate.tick(true));
    }
}
