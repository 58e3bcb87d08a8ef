// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Normal boot decision - pure logic without hardware dependencies.
//!
//! Operates on validation results computed by the bootloader (CRC and
//! vector-table checks) rather than reading flash directly.

use crate::layout::{Bank, BootData};

/// Validation results for a bank (computed externally).
#[derive(Clone, Copy, Debug, Default)]
pub struct BankValidation {
    /// Image CRC matches the recorded metadata.
    pub crc_valid: bool,
    /// Vector table points into firmware RAM.
    pub vector_valid: bool,
}

/// What the bootloader does when the entry gate falls through.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Handoff {
    /// Copy the bank to RAM and jump to it.
    Jump { bank: Bank, flash_addr: u32 },
    /// Nothing bootable in the active bank; run an update session instead.
    EnterUpdate,
}

/// Whether `bank` needs a CRC check (metadata was recorded for it).
pub fn has_metadata(bd: &BootData, bank: Bank) -> bool {
    bd.is_valid() && bd.image_metadata(bank).0 != 0
}

/// Decide how to leave the bootloader on a normal boot.
///
/// The active bank is never swapped here; only the bank-swap controller
/// mutates the selector. A bank with recorded metadata must pass its CRC.
/// A bank without metadata (e.g. flashed over SWD) only needs a sane
/// vector table.
pub fn decide_handoff(bd: &BootData, validation: BankValidation) -> Handoff {
    let bank = bd.active_bank();

    let bootable = if has_metadata(bd, bank) {
        validation.crc_valid && validation.vector_valid
    } else {
        validation.vector_valid
    };

    if bootable {
        Handoff::Jump {
            bank,
            flash_addr: bank.addr(),
        }
    } else {
        Handoff::EnterUpdate
    }
}
