//! Firmware for the macropad and numpad input modules.
//!
//! Scans the key matrix every 10ms, types the keys over USB HID, and runs the
//! backlight.  Which module is built for is chosen with the `macropad` and
//! `numpad` features.
#![no_std]
#![no_main]

use defmt::*;
use defmt_rtt as _;
use embedded_hal::digital::v2::{OutputPin, PinState};
use panic_probe as _;
use usb_device::class_prelude::UsbBusAllocator;

use rp2040_hal as hal;

use hal::{
    clocks::{init_clocks_and_plls, Clock},
    pac,
    sio::Sio,
    watchdog::Watchdog,
    Timer,
};

use inputmodule_keys::{Config, Hardware, Keypad};

mod board;
mod usb;

#[link_section = ".boot2"]
#[used]
pub static BOOT2: [u8; 256] = rp2040_boot2::BOOT_LOADER_GENERIC_03H;

/// External high-speed crystal on the module is 12Mhz.
const XOSC_CRYSTAL_FREQ: u32 = 12_000_000;

#[hal::entry]
fn main() -> ! {
    let mut pac = pac::Peripherals::take().unwrap();
    let mut watchdog = Watchdog::new(pac.WATCHDOG);
    let sio = Sio::new(pac.SIO);

    info!("Program start");
    let clocks = init_clocks_and_plls(
        XOSC_CRYSTAL_FREQ,
        pac.XOSC,
        pac.CLOCKS,
        pac.PLL_SYS,
        pac.PLL_USB,
        &mut pac.RESETS,
        &mut watchdog,
    )
    .ok()
    .unwrap();

    let pins = hal::gpio::Pins::new(
        pac.IO_BANK0,
        pac.PADS_BANK0,
        sio.gpio_bank0,
        &mut pac.RESETS,
    );

    let config = Config::DEFAULT;
    let timer = Timer::new(pac.TIMER, &mut pac.RESETS, &clocks);

    // GP6 and GP7 are wired to rows 5 and 6, which these modules don't use.
    // Leave them floating so they don't interfere.
    let _unused = (pins.gpio6.into_floating_input(), pins.gpio7.into_floating_input());

    // The multiplexer is enabled by pulling MUX_ENABLE low.
    let _mux_enable = pins.gpio4.into_push_pull_output_in_state(PinState::Low);
    let mux = board::mux_pins!(pins);
    let cols = board::col_pins!(pins);
    let adc = hal::Adc::new(pac.ADC, &mut pac.RESETS);
    let adc_pin = hal::adc::AdcPin::new(pins.gpio28.into_floating_input());
    let rows = board::RowSense::new(mux, adc, adc_pin);

    // SLEEP#, low when the host is asleep.
    let sleep = pins.gpio0.into_floating_input();

    #[cfg(feature = "macropad")]
    let leds = {
        use fugit::RateExtU32;
        use hal::gpio::{FunctionI2C, Pin, PullUp};

        // Take the LED controller out of shutdown.
        let mut sdb = pins.gpio29.into_push_pull_output();
        sdb.set_high().unwrap();

        let sda: Pin<_, FunctionI2C, PullUp> = pins.gpio26.reconfigure();
        let scl: Pin<_, FunctionI2C, PullUp> = pins.gpio27.reconfigure();
        let i2c = hal::I2C::i2c1(
            pac.I2C1,
            sda,
            scl,
            400.kHz(),
            &mut pac.RESETS,
            &clocks.system_clock,
        );
        let mut leds = board::Is31fl3743::new(i2c, board::LED_ADDRESS);
        if leds.init().is_err() {
            warn!("LED controller not responding");
        }
        leds
    };

    #[cfg(feature = "numpad")]
    let leds = {
        let mut slices = hal::pwm::Slices::new(pac.PWM, &mut pac.RESETS);
        slices.pwm4.channel_b.output_to(pins.gpio25);
        board::PwmBacklight::new(slices.pwm4, config.backlight_duty)
    };

    let usb_bus = UsbBusAllocator::new(hal::usb::UsbBus::new(
        pac.USBCTRL_REGS,
        pac.USBCTRL_DPRAM,
        clocks.usb_clock,
        true,
        &mut pac.RESETS,
    ));
    let keyboard = usb::UsbHandler::new(&usb_bus);

    let hw = Hardware {
        cols,
        rows,
        leds,
        keyboard,
        sleep,
    };
    let mut keypad = Keypad::new(hw, board::LAYOUT, config);

    // Signal the host that we are up.
    let mut boot_done = pins.gpio5.into_push_pull_output();
    boot_done.set_low().unwrap();
    info!("Boot done, {}Hz", clocks.system_clock.freq().to_Hz());

    let scan_us = u64::from(config.scan_interval_ms) * 1_000;
    let mut next_1ms = timer.get_counter().ticks() + 1_000;
    let mut next_10us = timer.get_counter().ticks() + 10;
    let mut next_scan = timer.get_counter().ticks() + scan_us;
    loop {
        let now = timer.get_counter().ticks();

        // Rapid poll first.
        if now > next_10us {
            keypad.hardware_mut().keyboard.poll();
            next_10us = now + 10;
        }

        // Slow poll next.
        if now > next_1ms {
            keypad.hardware_mut().keyboard.tick();
            next_1ms = now + 1_000;
        }

        if now > next_scan {
            keypad.tick();
            next_scan = now + scan_us;
        }
    }
}
