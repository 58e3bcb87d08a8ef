// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Bank-swap and reset controller.
//!
//! Runs once per session, after the supervisor has exited. The order of the
//! steps matters: the latch is cleared and the update window closed before the
//! selector is flipped, and the selector is flipped immediately before reset.

use crate::entry::ResetCause;
use crate::hw::BootControl;
use crate::layout::Bank;
use crate::session::ExitReason;

/// Whether a finished session flips the active bank.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SwapPolicy {
    /// Swap after every session, however it ended.
    Always,
    /// Swap only when the protocol layer reported completion.
    CompletedOnly,
}

impl SwapPolicy {
    pub fn should_swap(self, exit: ExitReason) -> bool {
        match self {
            SwapPolicy::Always => true,
            SwapPolicy::CompletedOnly => exit == ExitReason::Completed,
        }
    }
}

/// What the controller did to the selector.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SwapOutcome {
    Swapped { to: Bank },
    Kept { bank: Bank },
}

/// Steps 1-3 of the exit path: clear the latch, close the update window,
/// flip the selector (subject to `policy`).
pub fn prepare_reset<C: BootControl + ?Sized>(
    control: &mut C,
    policy: SwapPolicy,
    exit: ExitReason,
) -> SwapOutcome {
    control.clear_reset_cause(ResetCause::POWER_ON | ResetCause::SOFTWARE);
    control.disable_update_access();

    if policy.should_swap(exit) {
        control.toggle_active_bank();
        SwapOutcome::Swapped {
            to: control.active_bank(),
        }
    } else {
        SwapOutcome::Kept {
            bank: control.active_bank(),
        }
    }
}

/// Finish the session and reset. Never returns.
pub fn finalize_and_reset<C: BootControl + ?Sized>(
    control: &mut C,
    policy: SwapPolicy,
    exit: ExitReason,
) -> ! {
    prepare_reset(control, policy, exit);
    control.request_system_reset();
    trap()
}

/// Halt in place. Used when a committed reset did not take effect.
pub fn trap() -> ! {
    loop {
        core::hint::spin_loop();
    }
}
