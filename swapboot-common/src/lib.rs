// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Core logic for the swapboot dual-bank DFU bootloader.
//!
//! This crate supports both `no_std` (embedded) and `std` (host) environments:
//! - Default: `no_std` mode for embedded targets
//! - `std` feature: Enables `std` support for host tests
//! - `embedded` feature: Enables application-side helpers (cortex-m)
//! - `defmt` feature: Derives `defmt::Format` on the public enums
//!
//! Everything that decides something (entry gate, capacity probe, session
//! supervisor, bank swap, boot handoff) lives here behind small hardware
//! traits so it can be exercised on the host with injected stubs.

#![cfg_attr(not(feature = "std"), no_std)]

pub mod config;
pub mod entry;
pub mod handoff;
pub mod hw;
pub mod layout;
pub mod probe;
pub mod session;
pub mod signal;
pub mod swap;
pub mod window;

// Application-side helpers (requires embedded feature)
#[cfg(feature = "embedded")]
pub mod app;

// Re-export commonly used types
pub use config::SessionConfig;
pub use entry::{evaluate_entry, should_enter_update_mode, ResetCause};
pub use layout::{Bank, BootData};
pub use layout::{BOOT_DATA_ADDR, BOOT_DATA_MAGIC, FLASH_BASE, FW_A_ADDR, FW_B_ADDR};
pub use layout::{FLASH_PAGE_SIZE, FLASH_SECTOR_SIZE, FW_BANK_SIZE, RESET_CAUSE_LATCH_ADDR};
pub use probe::probe_region_size;
pub use session::{BootContext, ExitReason, SessionState, UpdateSession};
pub use signal::CompletionSignal;
pub use swap::{finalize_and_reset, prepare_reset, SwapOutcome, SwapPolicy};

#[cfg(feature = "embedded")]
use embedded_hal::delay::DelayNs;
#[cfg(feature = "embedded")]
use embedded_hal::digital::OutputPin;

/// Blink an LED a specified number of times.
#[cfg(feature = "embedded")]
pub fn blink(led: &mut impl OutputPin, timer: &mut impl DelayNs, count: u32, period_ms: u32) {
    for _ in 0..count {
        led.set_high().ok();
        timer.delay_ms(period_ms);
        led.set_low().ok();
        timer.delay_ms(period_ms);
    }
}
