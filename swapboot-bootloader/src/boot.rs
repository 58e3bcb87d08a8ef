// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Normal boot: validate the active bank, copy it to RAM and jump.

use crate::control::BoardControl;
use crate::flash;
use swapboot_common::handoff::{decide_handoff, has_metadata, BankValidation, Handoff};
use swapboot_common::layout::{Bank, BootData};

unsafe extern "C" {
    static __fw_ram_base: u32;
    static __fw_copy_size: u32;
    static __fw_ram_start: u32;
    static __fw_ram_end: u32;
}

macro_rules! linker_addr {
    ($sym:ident) => {
        unsafe { &$sym as *const u32 as u32 }
    };
}

pub struct MemoryLayout {
    pub ram_base: u32,
    pub copy_size: u32,
}

impl MemoryLayout {
    pub fn from_linker() -> Self {
        Self {
            ram_base: linker_addr!(__fw_ram_base),
            copy_size: linker_addr!(__fw_copy_size),
        }
    }
}

struct VectorTable {
    initial_sp: u32,
    reset_vector: u32,
}

impl VectorTable {
    unsafe fn read_from(addr: u32) -> Self {
        Self {
            initial_sp: (addr as *const u32).read_volatile(),
            reset_vector: (addr as *const u32).offset(1).read_volatile(),
        }
    }

    fn is_valid_for_ram_execution(&self) -> bool {
        is_in_ram(self.initial_sp) && is_in_ram(self.reset_vector)
    }
}

fn is_in_ram(addr: u32) -> bool {
    let start = linker_addr!(__fw_ram_start);
    let end = linker_addr!(__fw_ram_end);
    (start..=end).contains(&addr)
}

/// Run the CRC and vector-table checks for a bank.
fn validate_bank(bd: &BootData, bank: Bank) -> BankValidation {
    let vt = unsafe { VectorTable::read_from(bank.addr()) };
    let vector_valid = vt.is_valid_for_ram_execution();

    let crc_valid = if has_metadata(bd, bank) {
        let (size, crc) = bd.image_metadata(bank);
        let actual_crc = flash::compute_crc32(bank.addr(), size);
        if actual_crc != crc {
            defmt::println!(
                "CRC mismatch in bank {}: expected 0x{:08x}, got 0x{:08x}",
                bank.label(),
                crc,
                actual_crc
            );
        }
        actual_crc == crc
    } else {
        false
    };

    BankValidation {
        crc_valid,
        vector_valid,
    }
}

/// # Safety
/// Caller must ensure `flash_addr` holds a validated image and `layout` is valid.
pub unsafe fn load_and_jump(flash_addr: u32, layout: &MemoryLayout) -> ! {
    copy_firmware_to_ram(flash_addr, layout);

    // Reset peripherals before jumping so firmware SDK can reinitialize cleanly
    prepare_for_firmware_handoff();

    relocate_vector_table(layout.ram_base);

    let vt = VectorTable::read_from(layout.ram_base);
    jump_to_firmware(vt.initial_sp, vt.reset_vector);
}

/// Prepare the system for firmware handoff.
/// Clocks are left configured - SDK's runtime_init_clocks handles this
/// by switching away from PLLs before reconfiguring them.
unsafe fn prepare_for_firmware_handoff() {
    cortex_m::interrupt::disable();

    // Clear all pending interrupts in NVIC
    const NVIC_ICPR: *mut u32 = 0xE000_E280 as *mut u32;
    NVIC_ICPR.write_volatile(0xFFFF_FFFF);

    // Disable all NVIC interrupts
    const NVIC_ICER: *mut u32 = 0xE000_E180 as *mut u32;
    NVIC_ICER.write_volatile(0xFFFF_FFFF);
}

unsafe fn copy_firmware_to_ram(flash_addr: u32, layout: &MemoryLayout) {
    core::ptr::copy_nonoverlapping(
        flash_addr as *const u32,
        layout.ram_base as *mut u32,
        layout.copy_size as usize / 4,
    );
}

unsafe fn relocate_vector_table(ram_base: u32) {
    cortex_m::interrupt::disable();

    const SCB_VTOR: *mut u32 = 0xE000_ED08 as *mut u32;
    SCB_VTOR.write_volatile(ram_base);

    cortex_m::asm::dsb();
    cortex_m::asm::isb();
}

unsafe fn jump_to_firmware(initial_sp: u32, reset_vector: u32) -> ! {
    core::arch::asm!(
        "msr msp, {sp}",
        "cpsie i",  // Re-enable interrupts before jumping (SDK expects PRIMASK=0)
        "bx {reset}",
        sp = in(reg) initial_sp,
        reset = in(reg) reset_vector,
        options(noreturn)
    );
}

/// Blink slowly until the exit-hold input is asserted.
/// A session started with the hold released would end and reset at once.
fn wait_for_exit_hold(p: &mut crate::peripherals::Peripherals) {
    use embedded_hal::digital::InputPin;

    while p.exit_pin.is_low().unwrap_or(false) {
        swapboot_common::blink(&mut p.led_pin, &mut p.timer, 1, 500);
    }
}

/// Run the normal boot sequence.
/// If the active bank holds nothing bootable, enters update mode.
pub fn run_normal_boot(p: &mut crate::peripherals::Peripherals, control: &mut BoardControl) -> ! {
    use embedded_hal::delay::DelayNs;

    defmt::println!("Normal boot path");

    let layout = MemoryLayout::from_linker();
    let bd = flash::read_boot_data();

    defmt::println!(
        "BOOT_DATA: bank={}, size_a={}, size_b={}, valid={}",
        bd.active_bank().label(),
        bd.size_a,
        bd.size_b,
        bd.is_valid()
    );

    let validation = validate_bank(&bd, bd.active_bank());
    match decide_handoff(&bd, validation) {
        Handoff::Jump { bank, flash_addr } => {
            defmt::println!(
                "Loading bank {} from 0x{:08x} to 0x{:08x} ({}KB)",
                bank.label(),
                flash_addr,
                layout.ram_base,
                layout.copy_size / 1024
            );
            defmt::println!("Jumping to firmware...");
            p.timer.delay_ms(10u32);

            unsafe { load_and_jump(flash_addr, &layout) }
        }
        Handoff::EnterUpdate => {
            defmt::println!("No bootable firmware in active bank");
            wait_for_exit_hold(p);
            defmt::println!("Exit hold asserted, entering update mode");
            crate::update::enter_update_mode(p, control, crate::update::CONFIG.for_fallback())
        }
    }
}
