//!
//! Routes global addresses to main memory, to the pixel plane of the framebuffer, or to the swap
//! port right after it. The layout is
//!
//! | Range                                   | Device                        |
//! |-----------------------------------------|-------------------------------|
//! | `[0, memory_size)`                      | [Memory]                      |
//! | `[memory_size, memory_size + 4·W·H)`    | [FrameBuffer] pixels          |
//! | `[memory_size + 4·W·H, ... + 4)`        | swap port                     |
//!
//! A store of any width to the swap port swaps the framebuffer, and a load from it reads how many
//! swaps happened so far. Anything else, including accesses that straddle two devices, fails.
//!

use super::memory::Memory;
use crate::error::MemoryError;
use crate::framebuffer::FrameBuffer;
use byteorder::{ByteOrder, LittleEndian};
use std::sync::Arc;

pub const SWAP_PORT_SIZE: usize = 4;

/// Where an access lands, with the address translated to a local offset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    Memory(usize),
    Pixels(usize),
    SwapPort(usize),
}

#[derive(Debug)]
pub struct Bus {
    pub memory: Memory,
    pub frame_buffer: Arc<FrameBuffer>,
}

impl Bus {
    pub fn new(memory: Memory, frame_buffer: Arc<FrameBuffer>) -> Self {
        Self {
            memory,
            frame_buffer,
        }
    }

    /// First address of the pixel plane
    pub fn pixels_start(&self) -> usize {
        self.memory.len()
    }

    /// Address of the swap port
    pub fn swap_port(&self) -> usize {
        self.pixels_start() + self.frame_buffer.pixel_plane_size()
    }

    /// One past the last valid address
    pub fn end(&self) -> usize {
        self.swap_port() + SWAP_PORT_SIZE
    }

    fn route(&self, address: u32, len: usize) -> Result<Route, MemoryError> {
        let start = address as usize;
        let end = start.checked_add(len).ok_or(MemoryError::OutOfBounds { address, len })?;

        let devices = [
            (0, self.pixels_start()),
            (self.pixels_start(), self.swap_port()),
            (self.swap_port(), self.end()),
        ];

        let index = devices
            .iter()
            .position(|(base, limit)| (*base..*limit).contains(&start))
            .ok_or(MemoryError::OutOfBounds { address, len })?;
        let (base, limit) = devices[index];

        if end > limit {
            return Err(if end > self.end() {
                MemoryError::OutOfBounds { address, len }
            } else {
                MemoryError::Straddle { address, len }
            });
        }

        let offset = start - base;
        Ok(match index {
            0 => Route::Memory(offset),
            1 => Route::Pixels(offset),
            _ => Route::SwapPort(offset),
        })
    }

    /// Reads `buf.len()` bytes starting at `address`
    pub fn read(&self, address: u32, buf: &mut [u8]) -> Result<(), MemoryError> {
        match self.route(address, buf.len())? {
            Route::Memory(offset) => self.memory.read(offset, buf),
            Route::Pixels(offset) => self.frame_buffer.load(offset, buf),
            Route::SwapPort(offset) => {
                let mut port = [0; SWAP_PORT_SIZE];
                LittleEndian::write_u32(&mut port, self.frame_buffer.swaps() as u32);
                buf.copy_from_slice(&port[offset..offset + buf.len()]);
                Ok(())
            }
        }
    }

    /// Writes all of `data` starting at `address`
    pub fn write(&mut self, address: u32, data: &[u8]) -> Result<(), MemoryError> {
        match self.route(address, data.len())? {
            Route::Memory(offset) => self.memory.write(offset, data),
            Route::Pixels(offset) => self.frame_buffer.store(offset, data),
            Route::SwapPort(_) => {
                self.frame_buffer.swap();
                Ok(())
            }
        }
    }

    pub fn read_words(&self, address: u32, count: usize) -> Result<Vec<u32>, MemoryError> {
        let mut bytes = vec![0; count * 4];
        self.read(address, &mut bytes)?;
        Ok(bytes.chunks_exact(4).map(LittleEndian::read_u32).collect())
    }

    pub fn write_words(&mut self, address: u32, words: &[u32]) -> Result<(), MemoryError> {
        let mut bytes = vec![0; words.len() * 4];
        LittleEndian::write_u32_into(words, &mut bytes);
        self.write(address, &bytes)
    }

    /// Instructions can only come from main memory
    pub fn fetch(&self, pc: u32) -> Result<u32, MemoryError> {
        match self.route(pc, 4) {
            Ok(Route::Memory(offset)) => self.memory.get_word(offset),
            _ => Err(MemoryError::Fetch(pc)),
        }
    }

    pub fn load_byte(&self, address: u32) -> Result<u8, MemoryError> {
        let mut buf = [0; 1];
        self.read(address, &mut buf)?;
        Ok(buf[0])
    }

    pub fn load_half(&self, address: u32) -> Result<u16, MemoryError> {
        let mut buf = [0; 2];
        self.read(address, &mut buf)?;
        Ok(LittleEndian::read_u16(&buf))
    }

    pub fn load_word(&self, address: u32) -> Result<u32, MemoryError> {
        let mut buf = [0; 4];
        self.read(address, &mut buf)?;
        Ok(LittleEndian::read_u32(&buf))
    }

    pub fn store_byte(&mut self, address: u32, x: u8) -> Result<(), MemoryError> {
        self.write(address, &[x])
    }

    pub fn store_half(&mut self, address: u32, x: u16) -> Result<(), MemoryError> {
        let mut buf = [0; 2];
        LittleEndian::write_u16(&mut buf, x);
        self.write(address, &buf)
    }

    pub fn store_word(&mut self, address: u32, x: u32) -> Result<(), MemoryError> {
        let mut buf = [0; 4];
        LittleEndian::write_u32(&mut buf, x);
        self.write(address, &buf)
    }
}
