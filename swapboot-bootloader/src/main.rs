// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Swapboot: dual-bank USB DFU bootloader for RP2040.
//!
//! On every reset the entry gate decides between an update session and a
//! normal boot. A session writes the inactive bank over USB DFU and always
//! ends with the active-bank selector flipped and a system reset.

#![no_std]
#![no_main]

mod boot;
mod control;
mod dfu;
mod flash;
mod peripherals;
mod update;
mod usb_transport;

use defmt_rtt as _;
use panic_probe as _;

defmt::timestamp!("{=u64:us}", { 0 });

use cortex_m_rt::entry;

#[unsafe(link_section = ".boot2")]
#[used]
pub static BOOT2: [u8; 256] = rp2040_boot2::BOOT_LOADER_GENERIC_03H;

#[entry]
fn main() -> ! {
    defmt::println!("Bootloader init");

    let mut p = peripherals::init();

    swapboot_common::blink(&mut p.led_pin, &mut p.timer, 3, 200);
    flash::init();

    let mut control = unsafe { control::BoardControl::take() };

    let enter_signal = p.enter_signal();
    let enter = swapboot_common::evaluate_entry(enter_signal, &mut control);
    defmt::println!("Entry gate: enter_signal={}, update={}", enter_signal, enter);

    if enter {
        update::enter_update_mode(&mut p, &mut control, update::CONFIG);
    }

    boot::run_normal_boot(&mut p, &mut control);
}
