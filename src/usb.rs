// Usb HID management.

use arraydeque::ArrayDeque;
use defmt::{info, warn};
use frunk::{HCons, HNil};
use inputmodule_keys::HostKeyboard;
use usb_device::{
    class_prelude::{UsbBus, UsbBusAllocator},
    prelude::{UsbDevice, UsbDeviceBuilder, UsbDeviceState, UsbVidPid},
};
use usbd_human_interface_device::{
    device::keyboard::{NKROBootKeyboard, NKROBootKeyboardConfig},
    page::Keyboard,
    usb_class::{UsbHidClass, UsbHidClassBuilder},
    UsbHidError,
};

use crate::board;

// Type of the device list, which is internal to usbd_human_interface_device.
type InterfaceList<'a, Bus> = HCons<NKROBootKeyboard<'a, Bus>, HNil>;

/// A report waiting to go to the host.
#[derive(Clone, Copy)]
enum Report {
    Press(Keyboard),
    Release,
}

/// The queue of reports is full.
#[derive(Debug)]
pub struct QueueFull;

pub struct UsbHandler<'a, Bus: UsbBus> {
    dev: UsbDevice<'a, Bus>,
    hid: UsbHidClass<'a, Bus, InterfaceList<'a, Bus>>,
    state: Option<UsbDeviceState>,
    keys: ArrayDeque<Report, 128>,
}

impl<'a, Bus: UsbBus> UsbHandler<'a, Bus> {
    pub fn new(usb_bus: &'a UsbBusAllocator<Bus>) -> Self {
        let keyboard = UsbHidClassBuilder::new()
            .add_device(NKROBootKeyboardConfig::default())
            .build(usb_bus);
        let usb_dev = UsbDeviceBuilder::new(usb_bus, UsbVidPid(board::VID, board::PID))
            .manufacturer("Framework Computer Inc")
            .product(board::PRODUCT)
            .serial_number("development")
            .device_class(0)
            .max_power(500)
            .build();
        UsbHandler {
            hid: keyboard,
            dev: usb_dev,
            state: None,
            keys: ArrayDeque::new(),
        }
    }

    fn enqueue(&mut self, report: Report) -> Result<(), QueueFull> {
        if self.keys.push_back(report).is_err() {
            info!("Key event queue full.");
            return Err(QueueFull);
        }
        Ok(())
    }

    /// Perform a 1khz tick operation.
    pub fn tick(&mut self) {
        match self.hid.device().tick() {
            Ok(()) => (),
            Err(UsbHidError::WouldBlock) => (),
            Err(_) => info!("tick error"),
        }

        // If we have keys to queue up, try to do that here.
        if let Some(report) = self.keys.front() {
            let status = match *report {
                Report::Press(k) => self.hid.device().write_report([k]),
                Report::Release => self.hid.device().write_report([Keyboard::NoEventIndicated]),
            };
            match status {
                Ok(()) => {
                    // Successful queue, so remove.
                    let _ = self.keys.pop_front();
                }
                Err(UsbHidError::WouldBlock) => (),
                Err(UsbHidError::Duplicate) => {
                    warn!("Duplicate key seen");
                    let _ = self.keys.pop_front();
                }
                Err(UsbHidError::UsbError(_)) => warn!("USB error"),
                Err(UsbHidError::SerializationError) => warn!("SerializationError"),
            }
        }
    }

    /// Perform a periodic poll.  Ideally, this would be interrupt driven, but
    /// calling sufficiently fast should also work.
    pub fn poll(&mut self) {
        if self.dev.poll(&mut [&mut self.hid]) {
            match self.hid.device().read_report() {
                Ok(l) => info!("Report: {}", l.num_lock),
                _ => (),
            }
        }

        // Check for state changes.
        let new_state = self.dev.state();
        if self.state != Some(new_state) {
            match new_state {
                UsbDeviceState::Addressed => info!("State: Addressed"),
                UsbDeviceState::Configured => info!("State: Configured"),
                UsbDeviceState::Default => info!("State: Default"),
                UsbDeviceState::Suspend => info!("State: Suspend"),
            }
            self.state = Some(new_state);
        }
    }
}

impl<'a, Bus: UsbBus> HostKeyboard for UsbHandler<'a, Bus> {
    type Error = QueueFull;

    fn press(&mut self, key: Keyboard) -> Result<(), QueueFull> {
        self.enqueue(Report::Press(key))
    }

    fn release_all(&mut self) -> Result<(), QueueFull> {
        self.enqueue(Report::Release)
    }
}
