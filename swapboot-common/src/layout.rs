// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Flash layout, bank identifiers and the persistent boot configuration record.
//!
//! This module provides types that work in both `no_std` (embedded) and `std` (host) environments.

// --- Flash layout constants ---

pub const FLASH_BASE: u32 = 0x1000_0000;
pub const FW_A_ADDR: u32 = 0x1001_0000;
pub const FW_B_ADDR: u32 = 0x100D_0000;
pub const BOOT_DATA_ADDR: u32 = 0x1019_0000;

pub const FW_BANK_SIZE: u32 = 768 * 1024; // 768KB per bank

/// Size of the XIP window; QSPI addresses past it are not mapped at all.
pub const XIP_WINDOW_SIZE: u32 = 16 * 1024 * 1024;

/// Second-stage boot block at the start of flash.
pub const BOOT2_SIZE: u32 = 256;

/// RAM word that survives a system reset and holds the reset-cause latch.
pub const RESET_CAUSE_LATCH_ADDR: u32 = 0x2003_BFF0;

pub const FLASH_SECTOR_SIZE: u32 = 4096;
pub const FLASH_PAGE_SIZE: u32 = 256;

pub const BOOT_DATA_MAGIC: u32 = 0xB007_DA7A;

// --- Banks ---

/// One of the two firmware banks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Bank {
    A,
    B,
}

impl Bank {
    /// Decode a persisted selector byte. Anything other than 0 selects bank B.
    pub fn from_selector(selector: u8) -> Self {
        if selector == 0 {
            Bank::A
        } else {
            Bank::B
        }
    }

    pub fn selector(self) -> u8 {
        match self {
            Bank::A => 0,
            Bank::B => 1,
        }
    }

    /// The other bank.
    pub fn toggled(self) -> Self {
        match self {
            Bank::A => Bank::B,
            Bank::B => Bank::A,
        }
    }

    /// Absolute XIP address of the bank.
    pub fn addr(self) -> u32 {
        match self {
            Bank::A => FW_A_ADDR,
            Bank::B => FW_B_ADDR,
        }
    }

    /// Flash-relative offset of the bank.
    pub fn offset(self) -> u32 {
        self.addr() - FLASH_BASE
    }

    pub fn label(self) -> &'static str {
        match self {
            Bank::A => "A",
            Bank::B => "B",
        }
    }
}

// --- BootData (repr(C), 24 bytes) ---

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BootData {
    pub magic: u32,       // 0xB007DA7A
    pub active_bank: u8,  // 0 = A, 1 = B
    pub _reserved0: [u8; 3],
    pub size_a: u32, // size of image in bank A (0 = no metadata)
    pub size_b: u32, // size of image in bank B
    pub crc_a: u32,  // CRC32 of bank A image
    pub crc_b: u32,  // CRC32 of bank B image
}

// Compile-time size check
const _: () = assert!(core::mem::size_of::<BootData>() == 24);

impl BootData {
    pub fn default_new() -> Self {
        Self {
            magic: BOOT_DATA_MAGIC,
            active_bank: 0,
            _reserved0: [0; 3],
            size_a: 0,
            size_b: 0,
            crc_a: 0,
            crc_b: 0,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.magic == BOOT_DATA_MAGIC
    }

    pub fn active_bank(&self) -> Bank {
        Bank::from_selector(self.active_bank)
    }

    /// Copy of this record with the active-bank selector flipped.
    pub fn with_toggled_bank(&self) -> Self {
        Self {
            active_bank: self.active_bank().toggled().selector(),
            ..*self
        }
    }

    /// Image size and CRC recorded for a bank.
    pub fn image_metadata(&self, bank: Bank) -> (u32, u32) {
        match bank {
            Bank::A => (self.size_a, self.crc_a),
            Bank::B => (self.size_b, self.crc_b),
        }
    }

    /// Copy of this record with new image metadata for `bank`.
    pub fn with_image_metadata(&self, bank: Bank, size: u32, crc: u32) -> Self {
        let mut bd = *self;
        match bank {
            Bank::A => {
                bd.size_a = size;
                bd.crc_a = crc;
            }
            Bank::B => {
                bd.size_b = size;
                bd.crc_b = crc;
            }
        }
        bd
    }

    /// Read BootData from a raw address via volatile reads.
    ///
    /// # Safety
    /// `addr` must point to a readable, properly aligned memory region of at least 24 bytes.
    pub unsafe fn read_from(addr: u32) -> Self {
        let ptr = addr as *const Self;
        core::ptr::read_volatile(ptr)
    }

    pub fn as_bytes(&self) -> &[u8] {
        unsafe {
            core::slice::from_raw_parts(
                self as *const Self as *const u8,
                core::mem::size_of::<Self>(),
            )
        }
    }
}
