// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Application-side helpers: inspect the boot configuration and ask the
//! bootloader for an update session on the next reset.
//!
//! The bootloader does not use this module. It exists for firmware images
//! running from a bank, which link `swapboot-common` with the `embedded`
//! feature.

use crate::entry::ResetCause;
use crate::layout::{Bank, BootData, BOOT_DATA_ADDR, RESET_CAUSE_LATCH_ADDR};

/// Read BootData from flash.
pub fn read_boot_data() -> BootData {
    unsafe { BootData::read_from(BOOT_DATA_ADDR) }
}

/// Bank the application is currently running from.
pub fn active_bank() -> Bank {
    let bd = read_boot_data();
    if bd.is_valid() {
        bd.active_bank()
    } else {
        Bank::A
    }
}

/// Reboot into an update session.
///
/// Latches the software reset cause in retained RAM and triggers a system
/// reset. The bootloader's entry gate sees the abnormal reset and stays in
/// update mode without the enter signal being held.
pub fn request_update_session() -> ! {
    unsafe {
        (RESET_CAUSE_LATCH_ADDR as *mut u32).write_volatile(ResetCause::SOFTWARE.to_latch_word());
    }

    // Small delay to ensure write completes
    cortex_m::asm::delay(100_000);

    cortex_m::peripheral::SCB::sys_reset();
}

/// Reboot normally.
pub fn reboot() -> ! {
    cortex_m::peripheral::SCB::sys_reset();
}
