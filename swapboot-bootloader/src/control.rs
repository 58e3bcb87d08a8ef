// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Board implementation of the boot-control contracts.
//!
//! - Reset-cause latch: a retained RAM word outside the bootloader's memory map.
//! - Active-bank selector: `BootData::active_bank` in its own flash sector.
//! - Update access: the firmware-bank write gate in `flash`.
//! - Reset: `SCB::sys_reset`.

use crate::flash;
use swapboot_common::entry::ResetCause;
use swapboot_common::hw::{BankSelector, ResetLatch, SystemReset, UpdateAccess};
use swapboot_common::layout::{Bank, RESET_CAUSE_LATCH_ADDR};

pub struct BoardControl {
    _private: (),
}

impl BoardControl {
    /// # Safety
    /// Only one instance may exist; it owns the latch word and BootData.
    /// `flash::init()` must have been called first.
    pub unsafe fn take() -> Self {
        Self { _private: () }
    }

    fn read_latch() -> u32 {
        unsafe { (RESET_CAUSE_LATCH_ADDR as *const u32).read_volatile() }
    }

    fn write_latch(word: u32) {
        unsafe {
            (RESET_CAUSE_LATCH_ADDR as *mut u32).write_volatile(word);
        }
    }
}

impl ResetLatch for BoardControl {
    fn reset_cause(&self) -> ResetCause {
        ResetCause::from_latch_word(Self::read_latch())
    }

    fn clear_reset_cause(&mut self, causes: ResetCause) {
        let remaining = self.reset_cause().difference(causes);
        Self::write_latch(remaining.to_latch_word());
    }
}

impl BankSelector for BoardControl {
    fn active_bank(&self) -> Bank {
        flash::read_boot_data().active_bank()
    }

    fn toggle_active_bank(&mut self) {
        let bd = flash::read_boot_data().with_toggled_bank();
        unsafe {
            flash::write_boot_data(&bd);
        }
    }
}

impl UpdateAccess for BoardControl {
    fn enable_update_access(&mut self) {
        flash::set_image_writes(true);
    }

    fn disable_update_access(&mut self) {
        flash::set_image_writes(false);
    }
}

impl SystemReset for BoardControl {
    fn request_system_reset(&mut self) {
        // Let RTT drain the last log lines
        cortex_m::asm::delay(1_000_000);
        cortex_m::peripheral::SCB::sys_reset();
    }
}
