// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! DFU memory backend: the inactive bank, exposed as a window starting at 0.
//!
//! Erase works on 4KB sectors, program on 256-byte pages (short blocks are
//! padded with 0xFF). Manifestation records the image metadata and raises the
//! completion signal that ends the update session.

use crate::flash::{self, FlashError};
use swapboot_common::layout::{FLASH_BASE, FLASH_SECTOR_SIZE};
use swapboot_common::signal::CompletionSignal;
use swapboot_common::window::{padded_len, ImageWindow};
use usbd_dfu::{DFUManifestationError, DFUMemError, DFUMemIO};

const TRANSFER_LEN: usize = 256;

pub struct DfuFlash {
    window: ImageWindow,
    completion: &'static CompletionSignal,
    write_buf: [u8; TRANSFER_LEN],
    write_len: usize,
    read_buf: [u8; TRANSFER_LEN],
    /// End of the highest block programmed so far.
    high_water: u32,
}

impl DfuFlash {
    pub fn new(window: ImageWindow, completion: &'static CompletionSignal) -> Self {
        Self {
            window,
            completion,
            write_buf: [0xFF; TRANSFER_LEN],
            write_len: 0,
            read_buf: [0; TRANSFER_LEN],
            high_water: 0,
        }
    }
}

fn mem_error(err: FlashError, on_write: DFUMemError) -> DFUMemError {
    defmt::println!("DFU flash error: {}", err);
    match err {
        FlashError::Locked => on_write,
        FlashError::OutOfRange | FlashError::Misaligned => DFUMemError::Address,
    }
}

impl DFUMemIO for DfuFlash {
    // Fixed map of one full bank. When the probed flash is smaller, the
    // window is clipped and accesses past it fail with `DFUMemError::Address`.
    const MEM_INFO_STRING: &'static str = "@Bank/0x00000000/192*004Kg";
    const INITIAL_ADDRESS_POINTER: u32 = 0x0;
    const PROGRAM_TIME_MS: u32 = 2;
    const ERASE_TIME_MS: u32 = 50;
    const FULL_ERASE_TIME_MS: u32 = 192 * 50;
    const TRANSFER_SIZE: u16 = TRANSFER_LEN as u16;

    fn read(&mut self, address: u32, length: usize) -> Result<&[u8], DFUMemError> {
        let length = length.min(TRANSFER_LEN);
        let offset = self
            .window
            .flash_offset(address, length as u32)
            .ok_or(DFUMemError::Address)?;
        flash::flash_read(FLASH_BASE + offset, &mut self.read_buf[..length]);
        Ok(&self.read_buf[..length])
    }

    fn erase(&mut self, address: u32) -> Result<(), DFUMemError> {
        let offset = self
            .window
            .sector_offset(address)
            .ok_or(DFUMemError::Address)?;
        flash::erase_image(offset, FLASH_SECTOR_SIZE)
            .map_err(|e| mem_error(e, DFUMemError::Erase))
    }

    fn erase_all(&mut self) -> Result<(), DFUMemError> {
        if self.window.is_empty() {
            return Err(DFUMemError::Address);
        }
        let offset = self.window.bank().offset();
        flash::erase_image(offset, self.window.len())
            .map_err(|e| mem_error(e, DFUMemError::Erase))?;
        self.high_water = 0;
        Ok(())
    }

    fn store_write_buffer(&mut self, src: &[u8]) -> Result<(), ()> {
        if src.len() > TRANSFER_LEN {
            return Err(());
        }
        self.write_buf[..src.len()].copy_from_slice(src);
        self.write_buf[src.len()..].fill(0xFF);
        self.write_len = src.len();
        Ok(())
    }

    fn program(&mut self, address: u32, length: usize) -> Result<(), DFUMemError> {
        let length = length.min(self.write_len);
        if length == 0 {
            return Ok(());
        }
        let offset = self
            .window
            .page_offset(address, length as u32)
            .ok_or(DFUMemError::Address)?;
        let padded = padded_len(length as u32) as usize;

        flash::program_image(offset, &self.write_buf[..padded])
            .map_err(|e| mem_error(e, DFUMemError::Write))?;

        self.high_water = self.high_water.max(address + length as u32);
        Ok(())
    }

    fn manifestation(&mut self) -> Result<(), DFUManifestationError> {
        if self.high_water > 0 {
            let bank = self.window.bank();
            let crc = flash::compute_crc32(bank.addr(), self.high_water);
            flash::record_image(bank, self.high_water, crc);
            defmt::println!(
                "Image in bank {}: {} bytes, CRC 0x{:08x}",
                bank.label(),
                self.high_water,
                crc
            );
        }

        self.completion.raise();
        Ok(())
    }
}
