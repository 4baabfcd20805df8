//! Tests for the scan loop
//!
//! These run the keypad against a simulated module: a matrix whose rows read
//! low for the pressed switch under the driven column, an LED buffer, a host
//! that records what it is sent, and a SLEEP# line.

use std::{cell::RefCell, convert::Infallible, rc::Rc};

use embedded_hal::digital::v2::InputPin;
use inputmodule_keys::{
    layout::{MACROPAD, NUMPAD},
    leds::{LedDriver, LED_COUNT},
    matrix::{AnalogRows, ColumnDriver},
    Config, Hardware, HostKeyboard, Keyboard, Keypad, Layout, Outcome, Position,
};

/// What the host sees.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum HostEvent {
    Press(Keyboard),
    ReleaseAll,
}

#[derive(Default)]
struct Sim {
    // Matrix.
    pressed: Option<Position>,
    active: Option<u8>,
    row: u8,
    adc_broken: bool,

    // LEDs.
    pwm: Vec<u8>,
    enabled: Vec<bool>,
    intensity_writes: usize,

    // Host.
    events: Vec<HostEvent>,
    host_broken: bool,

    // SLEEP#
    awake: bool,
}

type Shared = Rc<RefCell<Sim>>;

struct Cols(Shared);
struct Rows(Shared);
struct Leds(Shared);
struct Host(Shared);
struct Sleep(Shared);

impl ColumnDriver for Cols {
    type Error = Infallible;

    fn set_column(&mut self, col: u8, active: bool) -> Result<(), Infallible> {
        let mut sim = self.0.borrow_mut();
        if active {
            assert_eq!(sim.active, None, "two columns driven at once");
            sim.active = Some(col);
        } else if sim.active == Some(col) {
            sim.active = None;
        }
        Ok(())
    }
}

impl AnalogRows for Rows {
    type Error = &'static str;

    fn select_row(&mut self, row: u8) -> Result<(), &'static str> {
        self.0.borrow_mut().row = row;
        Ok(())
    }

    fn read_raw(&mut self) -> Result<u16, &'static str> {
        let sim = self.0.borrow();
        if sim.adc_broken {
            return Err("adc");
        }
        let here = sim.active.map(|col| Position::new(col, sim.row));
        if here.is_some() && here == sim.pressed {
            Ok(0x0800)
        } else {
            Ok(0xFFF0)
        }
    }
}

impl LedDriver for Leds {
    type Error = Infallible;

    fn set_intensity(&mut self, index: u8, value: u8) -> Result<(), Infallible> {
        let mut sim = self.0.borrow_mut();
        sim.pwm[index as usize] = value;
        sim.intensity_writes += 1;
        Ok(())
    }

    fn set_enabled(&mut self, enabled: bool) -> Result<(), Infallible> {
        self.0.borrow_mut().enabled.push(enabled);
        Ok(())
    }
}

impl HostKeyboard for Host {
    type Error = ();

    fn press(&mut self, key: Keyboard) -> Result<(), ()> {
        let mut sim = self.0.borrow_mut();
        if sim.host_broken {
            return Err(());
        }
        sim.events.push(HostEvent::Press(key));
        Ok(())
    }

    fn release_all(&mut self) -> Result<(), ()> {
        let mut sim = self.0.borrow_mut();
        if sim.host_broken {
            return Err(());
        }
        sim.events.push(HostEvent::ReleaseAll);
        Ok(())
    }
}

impl InputPin for Sleep {
    type Error = Infallible;

    fn is_high(&self) -> Result<bool, Infallible> {
        Ok(self.0.borrow().awake)
    }

    fn is_low(&self) -> Result<bool, Infallible> {
        Ok(!self.0.borrow().awake)
    }
}

type SimKeypad = Keypad<Cols, Rows, Leds, Host, Sleep>;

fn setup(layout: &'static Layout) -> (SimKeypad, Shared) {
    setup_with(layout, Config::DEFAULT)
}

fn setup_with(layout: &'static Layout, config: Config) -> (SimKeypad, Shared) {
    let _ = env_logger::builder().is_test(true).try_init();

    let sim = Rc::new(RefCell::new(Sim {
        pwm: vec![0; LED_COUNT],
        awake: true,
        ..Default::default()
    }));
    let hw = Hardware {
        cols: Cols(sim.clone()),
        rows: Rows(sim.clone()),
        leds: Leds(sim.clone()),
        keyboard: Host(sim.clone()),
        sleep: Sleep(sim.clone()),
    };
    (Keypad::new(hw, layout, config), sim)
}

fn press(sim: &Shared, pos: Option<Position>) {
    sim.borrow_mut().pressed = pos;
}

fn emitted(outcomes: &[Outcome]) -> Vec<usize> {
    outcomes
        .iter()
        .enumerate()
        .filter(|(_, o)| matches!(o, Outcome::Emitted(_)))
        .map(|(i, _)| i + 1)
        .collect()
}

fn lit(sim: &Shared) -> Vec<usize> {
    let sim = sim.borrow();
    (0..LED_COUNT).filter(|&i| sim.pwm[i] != 0).collect()
}

#[test]
fn held_key_repeats() {
    let (mut keypad, sim) = setup(&MACROPAD);
    press(&sim, Some(Position::new(1, 1)));

    let outcomes: Vec<_> = (0..15).map(|_| keypad.tick()).collect();
    assert_eq!(emitted(&outcomes), [1, 12]);
    assert_eq!(outcomes[1], Outcome::Rejected(Position::new(1, 1)));

    // Column 1, row 1 is logical (2, 1), which is G.
    assert_eq!(
        sim.borrow().events,
        [
            HostEvent::Press(Keyboard::G),
            HostEvent::ReleaseAll,
            HostEvent::Press(Keyboard::G),
            HostEvent::ReleaseAll,
        ]
    );
}

#[test]
fn shorter_repeat() {
    let config = Config::DEFAULT.with_repeat_after(3);
    let (mut keypad, sim) = setup_with(&MACROPAD, config);
    assert_eq!(keypad.layout().name, "macropad");
    press(&sim, Some(Position::new(1, 1)));

    let outcomes: Vec<_> = (0..9).map(|_| keypad.tick()).collect();
    assert_eq!(emitted(&outcomes), [1, 5, 9]);
    assert_eq!(keypad.hardware().keyboard.0.borrow().events.len(), 6);
}

#[test]
fn release_retriggers() {
    let (mut keypad, sim) = setup(&MACROPAD);

    let steps = [Some(Position::new(2, 0)), None, Some(Position::new(2, 0))];
    let outcomes: Vec<_> = steps
        .iter()
        .map(|step| {
            press(&sim, *step);
            keypad.tick()
        })
        .collect();

    assert_eq!(
        outcomes,
        [
            Outcome::Emitted(Keyboard::M),
            Outcome::Idle,
            Outcome::Emitted(Keyboard::M),
        ]
    );
}

#[test]
fn sleeping_host_keeps_backlight_off() {
    let (mut keypad, sim) = setup(&MACROPAD);
    sim.borrow_mut().awake = false;

    for pos in [Position::new(0, 0), Position::new(4, 3), Position::new(7, 1)] {
        press(&sim, Some(pos));
        assert!(matches!(keypad.tick(), Outcome::Emitted(_)));
        press(&sim, None);
        assert_eq!(keypad.tick(), Outcome::Idle);
    }

    let sim = sim.borrow();
    assert_eq!(sim.enabled.len(), 6);
    assert!(sim.enabled.iter().all(|e| !e));
    assert_eq!(sim.events.len(), 6);
}

#[test]
fn backlight_follows_host() {
    let (mut keypad, sim) = setup(&NUMPAD);

    keypad.tick();
    sim.borrow_mut().awake = false;
    keypad.tick();
    keypad.tick();
    sim.borrow_mut().awake = true;
    keypad.tick();

    assert_eq!(sim.borrow().enabled, [true, false, false, true]);
}

#[test]
fn macropad_flashes_pressed_key() {
    let (mut keypad, sim) = setup(&MACROPAD);

    // Column 0, row 0 has its LEDs at 4, 5 and 6.
    let steps: [(Option<Position>, &[usize]); 6] = [
        (Some(Position::new(0, 0)), &[4]),
        (None, &[4]),
        (Some(Position::new(0, 0)), &[5]),
        // Column 4, row 3 is at 52.  The colour carries on from the last key.
        (Some(Position::new(4, 3)), &[54]),
        (Some(Position::new(0, 0)), &[4]),
        (Some(Position::new(0, 0)), &[4]),
    ];
    for (pos, expect) in steps {
        press(&sim, pos);
        keypad.tick();
        assert_eq!(lit(&sim), expect, "after {:?}", pos);
    }
}

#[test]
fn numpad_calculator_sends_nothing() {
    let (mut keypad, sim) = setup(&NUMPAD);

    // Logical (1, 0) is column 2, row 2.
    press(&sim, Some(Position::new(2, 2)));
    assert_eq!(keypad.tick(), Outcome::Unmapped(Position::new(2, 2)));
    assert_eq!(keypad.tick(), Outcome::Rejected(Position::new(2, 2)));
    assert!(sim.borrow().events.is_empty());

    press(&sim, Some(Position::new(1, 2)));
    assert_eq!(keypad.tick(), Outcome::Emitted(Keyboard::Escape));
}

#[test]
fn numpad_leaves_led_buffer_alone() {
    let (mut keypad, sim) = setup(&NUMPAD);

    press(&sim, Some(Position::new(0, 2)));
    assert_eq!(keypad.tick(), Outcome::Emitted(Keyboard::ReturnEnter));
    assert_eq!(sim.borrow().intensity_writes, 0);
}

#[test]
fn broken_adc_reads_as_idle() {
    let (mut keypad, sim) = setup(&MACROPAD);
    press(&sim, Some(Position::new(0, 0)));
    sim.borrow_mut().adc_broken = true;

    assert_eq!(keypad.tick(), Outcome::Idle);
    assert_eq!(sim.borrow().active, None);
    assert_eq!(keypad.tick(), Outcome::Idle);

    sim.borrow_mut().adc_broken = false;
    assert_eq!(keypad.tick(), Outcome::Emitted(Keyboard::E));
}

#[test]
fn host_errors_are_dropped() {
    let (mut keypad, sim) = setup(&MACROPAD);
    sim.borrow_mut().host_broken = true;

    press(&sim, Some(Position::new(0, 0)));
    assert_eq!(keypad.tick(), Outcome::Emitted(Keyboard::E));
    assert!(sim.borrow().events.is_empty());
    // The LED still flashes.
    assert_eq!(lit(&sim), [4]);

    sim.borrow_mut().host_broken = false;
    press(&sim, None);
    keypad.tick();
    press(&sim, Some(Position::new(0, 0)));
    keypad.tick();
    assert_eq!(
        sim.borrow().events,
        [HostEvent::Press(Keyboard::E), HostEvent::ReleaseAll]
    );
}

#[test]
fn every_key_types_its_letter() {
    let (mut keypad, sim) = setup(&MACROPAD);

    let mut typed = Vec::new();
    for row in 0..4 {
        for col in 0..8 {
            press(&sim, Some(Position::new(col, row)));
            if let Outcome::Emitted(code) = keypad.tick() {
                typed.push(code as u8);
            }
        }
    }
    typed.sort();
    let expect: Vec<u8> = (Keyboard::A as u8..=Keyboard::X as u8).collect();
    assert_eq!(typed, expect);
}
