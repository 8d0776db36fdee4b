use owo_colors::OwoColorize;
use std::io;
use thiserror::Error;

/// Errors raised by the Word Store, the Pixel Surface and the Bus that routes between them.
/// None of them are ever applied partially: the bounds are checked before anything is written.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MemoryError {
    #[error("Address {:#010x} (+{len} bytes) is outside the address space", .address.bright_yellow())]
    OutOfBounds { address: u32, len: usize },

    #[error("Access at {:#010x} (+{len} bytes) straddles two devices", .address.bright_yellow())]
    Straddle { address: u32, len: usize },

    #[error("Cannot fetch an instruction from {:#010x}, it's not in main memory", .0.bright_yellow())]
    Fetch(u32),

    #[error("Offset {offset} + {len} exceeds the buffer capacity of {capacity}")]
    Capacity {
        offset: usize,
        len: usize,
        capacity: usize,
    },

    #[error("Invalid range {begin}..{end} for a buffer of capacity {capacity}")]
    InvalidRange {
        begin: usize,
        end: usize,
        capacity: usize,
    },
}

/// Errors that can happen while reading a program and placing it in memory
#[derive(Debug, Error)]
pub enum LoadError {
    /// Not the loader's fault, some std::io went wrong
    #[error("I/O Error: {0}")]
    IO(#[from] io::Error),

    #[error("Line {line}: '{}' is not a binary or hex word", .text.bright_yellow())]
    InvalidWord { line: usize, text: String },

    #[error("Binary programs must be a whole number of words, but the file has {0} bytes")]
    TrailingBytes(usize),

    #[error("The program has {words} words, but main memory only holds {capacity}")]
    TooLarge { words: usize, capacity: usize },

    #[error("{0}")]
    Memory(#[from] MemoryError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse framerv.toml: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("No file specified")]
    NoFile,

    #[error("`{}` must be greater than zero", .0.bright_yellow())]
    Zero(&'static str),

    #[error(
        "{memory_size} bytes of memory and a {width}x{height} framebuffer don't fit in a 32-bit address space"
    )]
    AddressSpace {
        memory_size: usize,
        width: usize,
        height: usize,
    },
}
