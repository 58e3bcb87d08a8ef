// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Narrow contracts for the hardware collaborators.
//!
//! The board crate implements these on top of registers and ROM routines;
//! tests implement them with recording stubs.

use crate::entry::ResetCause;
use crate::layout::Bank;

/// Single-word read primitive used by the capacity probe.
pub trait WordReader {
    /// Read one word at `offset`. `None` means the address is outside the
    /// implemented region.
    fn read_word(&mut self, offset: u32) -> Option<u32>;
}

impl<F: FnMut(u32) -> Option<u32>> WordReader for F {
    fn read_word(&mut self, offset: u32) -> Option<u32> {
        self(offset)
    }
}

/// Exit-hold input sampled on every supervisor iteration.
pub trait HoldSignal {
    /// `true` while the session should keep running.
    fn is_held(&mut self) -> bool;
}

impl<F: FnMut() -> bool> HoldSignal for F {
    fn is_held(&mut self) -> bool {
        self()
    }
}

/// Persistent latch recording why the previous cycle ended.
pub trait ResetLatch {
    fn reset_cause(&self) -> ResetCause;
    fn clear_reset_cause(&mut self, causes: ResetCause);
}

/// Persistent selector choosing the bank that runs after the next reset.
pub trait BankSelector {
    fn active_bank(&self) -> Bank;
    fn toggle_active_bank(&mut self);
}

/// Privileged access window used while a session writes the inactive bank.
pub trait UpdateAccess {
    fn enable_update_access(&mut self);
    fn disable_update_access(&mut self);
}

/// Full system reset.
pub trait SystemReset {
    /// Request a reset. A working implementation never returns; callers treat
    /// a return as a failed reset.
    fn request_system_reset(&mut self);
}

/// Everything the bank-swap and reset controller drives.
pub trait BootControl: ResetLatch + BankSelector + UpdateAccess + SystemReset {}

impl<T: ResetLatch + BankSelector + UpdateAccess + SystemReset> BootControl for T {}
