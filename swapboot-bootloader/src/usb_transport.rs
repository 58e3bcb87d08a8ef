// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! USB DFU transport: RP2040 USB bus + `usbd-dfu` class.
//!
//! The USB interrupt is never enabled. The session supervisor calls
//! `service_once()`, which runs the same poll the interrupt handler would.

use crate::dfu::DfuFlash;
use crate::peripherals::{self, UsbPeripherals};
use rp2040_hal as hal;
use rp2040_hal::usb::UsbBus;
use swapboot_common::session::{ProtocolEndpoints, Transport};
use usb_device::class_prelude::UsbBusAllocator;
use usb_device::prelude::*;
use usbd_dfu::DFUClass;

const USB_VID: u16 = 0x2E8A;
const USB_PID: u16 = 0x000B;

pub struct DfuTransport {
    usb: Option<UsbPeripherals>,
    mem: Option<DfuFlash>,
    dfu: Option<DFUClass<UsbBus, DfuFlash>>,
    usb_dev: Option<UsbDevice<'static, UsbBus>>,
}

impl DfuTransport {
    pub fn new(usb: UsbPeripherals, mem: DfuFlash) -> Self {
        Self {
            usb: Some(usb),
            mem: Some(mem),
            dfu: None,
            usb_dev: None,
        }
    }
}

impl Transport for DfuTransport {
    /// Bring up the USB controller and allocate the bus.
    fn open(&mut self) {
        let Some(mut usb) = self.usb.take() else {
            return;
        };

        let usb_bus = UsbBusAllocator::new(hal::usb::UsbBus::new(
            usb.regs,
            usb.dpram,
            usb.clock,
            true,
            &mut usb.resets,
        ));
        peripherals::store_usb_bus(usb_bus);
    }

    /// Build the device descriptor and attach to the host.
    fn start(&mut self) {
        if self.usb_dev.is_some() {
            return;
        }

        let usb_dev = UsbDeviceBuilder::new(peripherals::usb_bus_ref(), UsbVidPid(USB_VID, USB_PID))
            .strings(&[StringDescriptors::default()
                .manufacturer("ADNT")
                .product("Swapboot DFU")
                .serial_number("0001")])
            .unwrap()
            .build();
        self.usb_dev = Some(usb_dev);
    }

    fn service_once(&mut self) {
        if let (Some(usb_dev), Some(dfu)) = (self.usb_dev.as_mut(), self.dfu.as_mut()) {
            usb_dev.poll(&mut [dfu]);
        }
    }
}

impl ProtocolEndpoints for DfuTransport {
    /// Allocate the DFU interface on the bus.
    fn init_endpoints(&mut self) {
        if let Some(mem) = self.mem.take() {
            self.dfu = Some(DFUClass::new(peripherals::usb_bus_ref(), mem));
        }
    }
}
