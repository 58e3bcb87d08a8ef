// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Entry gate: decide between an update session and normal boot.

use bitflags::bitflags;

use crate::hw::ResetLatch;

bitflags! {
    /// Causes recorded in the reset-cause latch.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct ResetCause: u32 {
        /// Cold start; latch contents were not preserved.
        const POWER_ON = 1 << 0;
        /// The previous cycle ended with a software/system reset request.
        const SOFTWARE = 1 << 1;
    }
}

/// Tag stored in the upper bits of the latch word so random RAM contents
/// after a power cycle are not mistaken for a latched cause.
pub const LATCH_TAG: u32 = 0x0FDA_7E00;
const LATCH_TAG_MASK: u32 = 0xFFFF_FF00;

impl ResetCause {
    /// Whether the previous cycle ended abnormally, i.e. via a software reset.
    pub fn is_abnormal(self) -> bool {
        self.contains(ResetCause::SOFTWARE)
    }

    /// Encode as a latch word.
    pub fn to_latch_word(self) -> u32 {
        LATCH_TAG | (self.bits() & !LATCH_TAG_MASK)
    }

    /// Decode a latch word. An untagged word means the RAM was not retained,
    /// which only happens on a power-on reset.
    pub fn from_latch_word(word: u32) -> Self {
        if word & LATCH_TAG_MASK == LATCH_TAG {
            ResetCause::from_bits_truncate(word)
        } else {
            ResetCause::POWER_ON
        }
    }
}

/// Enter update mode if the enter signal is asserted or the last reset was abnormal.
pub fn should_enter_update_mode(enter_signal: bool, reset_was_abnormal: bool) -> bool {
    enter_signal || reset_was_abnormal
}

/// Read and consume the reset-cause latch, then apply the entry rule.
///
/// The latch is cleared whatever the outcome so a stale cause cannot force a
/// second entry on the following boot.
pub fn evaluate_entry<L: ResetLatch + ?Sized>(enter_signal: bool, latch: &mut L) -> bool {
    let cause = latch.reset_cause();
    latch.clear_reset_cause(ResetCause::POWER_ON | ResetCause::SOFTWARE);
    should_enter_update_mode(enter_signal, cause.is_abnormal())
}
