// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Compile-time session configuration.

use crate::layout::FLASH_SECTOR_SIZE;
use crate::swap::SwapPolicy;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionConfig {
    /// Starting size of the capacity probe (smallest readable granule).
    pub min_probe_unit: u32,
    /// Whether a finished session flips the active bank.
    pub swap_policy: SwapPolicy,
}

impl SessionConfig {
    pub const DEFAULT: Self = Self {
        min_probe_unit: FLASH_SECTOR_SIZE,
        swap_policy: SwapPolicy::Always,
    };

    pub const fn with_swap_policy(self, swap_policy: SwapPolicy) -> Self {
        Self {
            swap_policy,
            ..self
        }
    }

    /// Config for a session entered because the active bank is not bootable.
    ///
    /// Only a completed transfer flips the selector. A session that ends on
    /// hold release leaves BootData untouched, so a board with two empty
    /// banks cannot rewrite the BootData sector on every reset.
    pub const fn for_fallback(self) -> Self {
        self.with_swap_policy(SwapPolicy::CompletedOnly)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
