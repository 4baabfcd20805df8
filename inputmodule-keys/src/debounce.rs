//! Debouncing of matrix scans.
//!
//! The scanner only ever reports a single position, so there is a single
//! debouncer for the whole matrix rather than one per key.  A new position
//! fires immediately.  A position that stays put fires again once it has been
//! seen more than `repeat_after` times in a row, which gives auto-repeat while
//! a key is held.

use crate::Position;

#[derive(Clone, Debug)]
pub struct Debouncer {
    /// What the previous scan returned.
    previous: Option<Position>,
    /// How many scans in a row have matched `previous` since the last
    /// acceptance.
    repeat: u8,
    repeat_after: u8,
}

impl Debouncer {
    pub fn new(repeat_after: u8) -> Debouncer {
        Debouncer {
            previous: None,
            repeat: 0,
            repeat_after,
        }
    }

    /// Feed one scan result.  Returns true if it should be acted upon.
    pub fn filter(&mut self, raw: Option<Position>) -> bool {
        let accepted = match raw {
            None => {
                self.repeat = 0;
                false
            }
            Some(pos) => {
                let same = self.previous == Some(pos);
                if same {
                    self.repeat = self.repeat.saturating_add(1);
                }
                // The count can't be zero for a repeated position, as it was
                // just incremented.  A new position always fires.
                !same || self.repeat > self.repeat_after || self.repeat == 0
            }
        };

        if accepted {
            self.repeat = 0;
        }
        self.previous = raw;
        accepted
    }

    pub fn previous(&self) -> Option<Position> {
        self.previous
    }

    pub fn repeat_count(&self) -> u8 {
        self.repeat
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const A: Position = Position::new(1, 1);
    const B: Position = Position::new(2, 0);

    #[test]
    fn held_key_repeats() {
        let mut deb = Debouncer::new(10);
        let fired: Vec<usize> = (1..=15).filter(|_| deb.filter(Some(A))).collect();
        assert_eq!(fired, [1, 12]);

        let mut deb = Debouncer::new(10);
        let fired: Vec<usize> = (1..=30).filter(|_| deb.filter(Some(A))).collect();
        assert_eq!(fired, [1, 12, 23]);
    }

    #[test]
    fn release_retriggers() {
        let mut deb = Debouncer::new(10);
        assert!(deb.filter(Some(B)));
        assert!(!deb.filter(None));
        assert!(deb.filter(Some(B)));
    }

    #[test]
    fn change_fires_immediately() {
        let mut deb = Debouncer::new(10);
        assert!(deb.filter(Some(A)));
        assert!(!deb.filter(Some(A)));
        assert!(deb.filter(Some(B)));
        assert!(deb.filter(Some(A)));
        assert_eq!(deb.repeat_count(), 0);
        assert_eq!(deb.previous(), Some(A));
    }

    #[test]
    fn none_resets_count() {
        let mut deb = Debouncer::new(10);
        deb.filter(Some(A));
        deb.filter(Some(A));
        deb.filter(Some(A));
        assert_eq!(deb.repeat_count(), 2);
        deb.filter(None);
        assert_eq!(deb.repeat_count(), 0);
        assert_eq!(deb.previous(), None);
    }

    fn position() -> impl Strategy<Value = Option<Position>> {
        prop_oneof![
            Just(None::<Position>),
            (0u8..3, 0u8..2).prop_map(|(col, row)| Some(Position::new(col, row))),
        ]
    }

    proptest! {
        #[test]
        fn none_never_fires(count in 1usize..200) {
            let mut deb = Debouncer::new(10);
            for _ in 0..count {
                prop_assert!(!deb.filter(None));
            }
        }

        #[test]
        fn fires_on_change_and_at_most_once_per_eleven(
            seq in proptest::collection::vec(position(), 1..300)
        ) {
            let mut deb = Debouncer::new(10);
            let mut prev = None;
            // Identical reads since the last firing.
            let mut quiet = 0usize;
            for raw in seq {
                let fired = deb.filter(raw);
                match raw {
                    None => prop_assert!(!fired),
                    Some(_) if raw != prev => {
                        prop_assert!(fired);
                        quiet = 0;
                    }
                    Some(_) => {
                        quiet += 1;
                        if fired {
                            prop_assert!(quiet >= 11);
                            quiet = 0;
                        }
                    }
                }
                prev = raw;
            }
        }
    }
}
