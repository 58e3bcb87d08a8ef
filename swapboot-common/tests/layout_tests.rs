// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Unit tests for banks, BootData and the flash layout.

use swapboot_common::layout::XIP_WINDOW_SIZE;
use swapboot_common::{
    Bank, BootData, SessionConfig, SwapPolicy, BOOT_DATA_ADDR, BOOT_DATA_MAGIC, FLASH_BASE,
    FLASH_SECTOR_SIZE, FW_A_ADDR, FW_BANK_SIZE, FW_B_ADDR,
};

// =============================================================================
// Layout
// =============================================================================

#[test]
fn test_banks_do_not_overlap() {
    assert_eq!(FW_A_ADDR + FW_BANK_SIZE, FW_B_ADDR);
    assert_eq!(FW_B_ADDR + FW_BANK_SIZE, BOOT_DATA_ADDR);
}

#[test]
fn test_layout_sector_aligned() {
    for addr in [FW_A_ADDR, FW_B_ADDR, BOOT_DATA_ADDR] {
        assert_eq!((addr - FLASH_BASE) % FLASH_SECTOR_SIZE, 0);
    }
    assert_eq!(FW_BANK_SIZE % FLASH_SECTOR_SIZE, 0);
}

#[test]
fn test_layout_fits_xip_window() {
    assert!(BOOT_DATA_ADDR + FLASH_SECTOR_SIZE - FLASH_BASE <= XIP_WINDOW_SIZE);
}

// =============================================================================
// Bank tests
// =============================================================================

#[test]
fn test_bank_from_selector() {
    assert_eq!(Bank::from_selector(0), Bank::A);
    assert_eq!(Bank::from_selector(1), Bank::B);
    assert_eq!(Bank::from_selector(0xFF), Bank::B);
}

#[test]
fn test_bank_toggle_round_trip() {
    assert_eq!(Bank::A.toggled(), Bank::B);
    assert_eq!(Bank::B.toggled(), Bank::A);
    assert_eq!(Bank::A.toggled().toggled(), Bank::A);
}

#[test]
fn test_bank_offsets() {
    assert_eq!(Bank::A.offset(), 0x1_0000);
    assert_eq!(Bank::B.offset(), 0xD_0000);
}

// =============================================================================
// BootData tests
// =============================================================================

#[test]
fn test_boot_data_size() {
    assert_eq!(core::mem::size_of::<BootData>(), 24);
    assert_eq!(BootData::default_new().as_bytes().len(), 24);
}

#[test]
fn test_boot_data_default() {
    let bd = BootData::default_new();
    assert!(bd.is_valid());
    assert_eq!(bd.magic, BOOT_DATA_MAGIC);
    assert_eq!(bd.active_bank(), Bank::A);
}

#[test]
fn test_erased_boot_data_invalid() {
    let bd = BootData {
        magic: 0xFFFF_FFFF,
        ..BootData::default_new()
    };
    assert!(!bd.is_valid());
}

#[test]
fn test_toggled_bank_keeps_metadata() {
    let bd = BootData::default_new().with_image_metadata(Bank::A, 100, 0xAA);
    let toggled = bd.with_toggled_bank();
    assert_eq!(toggled.active_bank(), Bank::B);
    assert_eq!(toggled.image_metadata(Bank::A), (100, 0xAA));
    assert_eq!(toggled.with_toggled_bank(), bd);
}

#[test]
fn test_image_metadata_per_bank() {
    let bd = BootData::default_new()
        .with_image_metadata(Bank::A, 1024, 0xAAAA_AAAA)
        .with_image_metadata(Bank::B, 2048, 0xBBBB_BBBB);
    assert_eq!(bd.image_metadata(Bank::A), (1024, 0xAAAA_AAAA));
    assert_eq!(bd.image_metadata(Bank::B), (2048, 0xBBBB_BBBB));
}

#[test]
fn test_boot_data_bytes_layout() {
    let bd = BootData {
        active_bank: 1,
        ..BootData::default_new()
    };
    let bytes = bd.as_bytes();
    assert_eq!(&bytes[0..4], &BOOT_DATA_MAGIC.to_ne_bytes());
    assert_eq!(bytes[4], 1);
}

// =============================================================================
// SessionConfig tests
// =============================================================================

#[test]
fn test_default_config() {
    let cfg = SessionConfig::default();
    assert_eq!(cfg, SessionConfig::DEFAULT);
    assert_eq!(cfg.min_probe_unit, FLASH_SECTOR_SIZE);
    assert_eq!(cfg.swap_policy, SwapPolicy::Always);
}

#[test]
fn test_config_with_swap_policy() {
    let cfg = SessionConfig::DEFAULT.with_swap_policy(SwapPolicy::CompletedOnly);
    assert_eq!(cfg.swap_policy, SwapPolicy::CompletedOnly);
    assert_eq!(cfg.min_probe_unit, FLASH_SECTOR_SIZE);
}
