// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Address window the update session exposes over the target bank.
//!
//! DFU addresses start at 0 and map onto the bank being written. The window is
//! clipped to the probed region size so a transfer can never reach flash the
//! device does not implement.

use crate::layout::{Bank, FLASH_PAGE_SIZE, FLASH_SECTOR_SIZE, FW_BANK_SIZE};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageWindow {
    bank: Bank,
    len: u32,
}

impl ImageWindow {
    /// Window over `bank`, limited to `region_size` bytes of readable flash.
    pub fn for_bank(bank: Bank, region_size: u32) -> Self {
        let available = region_size.saturating_sub(bank.offset());
        Self {
            bank,
            len: available.min(FW_BANK_SIZE),
        }
    }

    pub fn bank(&self) -> Bank {
        self.bank
    }

    /// Usable bytes. Zero when the bank lies beyond the probed region.
    pub fn len(&self) -> u32 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Flash-relative offset for `length` bytes at window `address`.
    pub fn flash_offset(&self, address: u32, length: u32) -> Option<u32> {
        let end = address.checked_add(length)?;
        if end > self.len {
            return None;
        }
        Some(self.bank.offset() + address)
    }

    /// Flash-relative offset of the sector containing window `address`.
    pub fn sector_offset(&self, address: u32) -> Option<u32> {
        let start = address - address % FLASH_SECTOR_SIZE;
        self.flash_offset(start, FLASH_SECTOR_SIZE)
    }

    /// Flash-relative offset of a page-aligned program at window `address`.
    /// `length` is rounded up to whole pages.
    pub fn page_offset(&self, address: u32, length: u32) -> Option<u32> {
        if address % FLASH_PAGE_SIZE != 0 {
            return None;
        }
        self.flash_offset(address, padded_len(length))
    }
}

/// Round `length` up to a whole number of flash pages.
pub fn padded_len(length: u32) -> u32 {
    length.div_ceil(FLASH_PAGE_SIZE) * FLASH_PAGE_SIZE
}
