// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Unit tests for the normal boot handoff decision.

use swapboot_common::handoff::{decide_handoff, has_metadata, BankValidation, Handoff};
use swapboot_common::{Bank, BootData, FW_A_ADDR, FW_B_ADDR};

fn boot_data(bank: Bank) -> BootData {
    BootData {
        active_bank: bank.selector(),
        ..BootData::default_new()
    }
}

fn validation(crc_valid: bool, vector_valid: bool) -> BankValidation {
    BankValidation {
        crc_valid,
        vector_valid,
    }
}

// =============================================================================
// has_metadata tests
// =============================================================================

#[test]
fn test_no_metadata_on_fresh_record() {
    let bd = BootData::default_new();
    assert!(!has_metadata(&bd, Bank::A));
    assert!(!has_metadata(&bd, Bank::B));
}

#[test]
fn test_metadata_per_bank() {
    let bd = BootData::default_new().with_image_metadata(Bank::B, 4096, 0x1234_5678);
    assert!(!has_metadata(&bd, Bank::A));
    assert!(has_metadata(&bd, Bank::B));
}

#[test]
fn test_invalid_record_has_no_metadata() {
    let mut bd = BootData::default_new().with_image_metadata(Bank::A, 4096, 1);
    bd.magic = 0xFFFF_FFFF;
    assert!(!has_metadata(&bd, Bank::A));
}

// =============================================================================
// decide_handoff tests
// =============================================================================

#[test]
fn test_jump_to_active_bank() {
    assert_eq!(
        decide_handoff(&boot_data(Bank::A), validation(false, true)),
        Handoff::Jump {
            bank: Bank::A,
            flash_addr: FW_A_ADDR
        }
    );
    assert_eq!(
        decide_handoff(&boot_data(Bank::B), validation(false, true)),
        Handoff::Jump {
            bank: Bank::B,
            flash_addr: FW_B_ADDR
        }
    );
}

#[test]
fn test_bad_vector_table_enters_update() {
    let bd = boot_data(Bank::A);
    assert_eq!(decide_handoff(&bd, validation(true, false)), Handoff::EnterUpdate);
}

#[test]
fn test_metadata_requires_crc() {
    let bd = boot_data(Bank::B).with_image_metadata(Bank::B, 8192, 0xCAFE_F00D);
    assert_eq!(decide_handoff(&bd, validation(false, true)), Handoff::EnterUpdate);
    assert_eq!(
        decide_handoff(&bd, validation(true, true)),
        Handoff::Jump {
            bank: Bank::B,
            flash_addr: FW_B_ADDR
        }
    );
}

#[test]
fn test_other_bank_metadata_ignored() {
    let bd = boot_data(Bank::A).with_image_metadata(Bank::B, 8192, 0xCAFE_F00D);
    assert!(matches!(
        decide_handoff(&bd, validation(false, true)),
        Handoff::Jump { bank: Bank::A, .. }
    ));
}

#[test]
fn test_handoff_never_switches_bank() {
    // Active bank broken, other bank fine: still no fallback
    let bd = boot_data(Bank::A).with_image_metadata(Bank::B, 8192, 1);
    assert_eq!(decide_handoff(&bd, validation(false, false)), Handoff::EnterUpdate);
}
