// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Update path: open the write window, probe the flash, run one DFU
//! session, then swap banks and reset.

use crate::control::BoardControl;
use crate::dfu::DfuFlash;
use crate::flash::FlashProbe;
use crate::peripherals::Peripherals;
use crate::usb_transport::DfuTransport;
use embedded_hal::digital::{InputPin, OutputPin};
use swapboot_common::hw::{BankSelector, UpdateAccess};
use swapboot_common::window::ImageWindow;
use swapboot_common::{
    probe_region_size, swap, BootContext, CompletionSignal, SessionConfig, UpdateSession,
};

/// Raised by the DFU backend on manifestation.
static COMPLETION: CompletionSignal = CompletionSignal::new();

#[cfg(not(feature = "swap-on-completion"))]
pub const CONFIG: SessionConfig = SessionConfig::DEFAULT;
#[cfg(feature = "swap-on-completion")]
pub const CONFIG: SessionConfig =
    SessionConfig::DEFAULT.with_swap_policy(swapboot_common::SwapPolicy::CompletedOnly);

/// Enter update mode with `config`. Never returns; the session always ends in a reset.
pub fn enter_update_mode(
    p: &mut Peripherals,
    control: &mut BoardControl,
    config: SessionConfig,
) -> ! {
    defmt::println!("Update mode requested");

    swapboot_common::blink(&mut p.led_pin, &mut p.timer, 10, 50);

    control.enable_update_access();
    let region_size = probe_region_size(&mut FlashProbe, config.min_probe_unit);
    defmt::println!("Readable flash region: {}KB", region_size / 1024);

    let target = control.active_bank().toggled();
    let window = ImageWindow::for_bank(target, region_size);
    defmt::println!(
        "Session target: bank {} ({}KB writable)",
        target.label(),
        window.len() / 1024
    );

    let Some(usb) = p.usb.take() else {
        defmt::println!("USB peripherals already taken");
        swap::trap();
    };

    let ctx = BootContext::new(region_size, &COMPLETION);
    let transport = DfuTransport::new(usb, DfuFlash::new(window, &COMPLETION));
    let exit_pin = &mut p.exit_pin;
    // A failed pin read counts as held so a glitch cannot end the session
    let hold = || exit_pin.is_high().unwrap_or(true);

    let mut session = UpdateSession::new(ctx, transport, hold);
    session.start();
    defmt::println!("USB DFU started, entering session loop");
    p.led_pin.set_high().ok();

    let exit = session.run();
    defmt::println!("Session ended: {}", exit);
    p.led_pin.set_low().ok();

    defmt::println!(
        "Policy {}: swap={}, resetting",
        config.swap_policy,
        config.swap_policy.should_swap(exit)
    );
    swap::finalize_and_reset(control, config.swap_policy, exit)
}
