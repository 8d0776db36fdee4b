//!
//! Settings come from the command line, falling back to a `framerv.toml` in the working
//! directory, falling back to the defaults below.
//!

use crate::error::ConfigError;
use crate::framebuffer::{DEFAULT_HEIGHT, DEFAULT_WIDTH, FLOATS_PER_VERTEX};
use crate::loader::Format;
use crate::simulator::bus::SWAP_PORT_SIZE;
use crate::simulator::memory::DEFAULT_SIZE;
use clap::Parser;
use serde::Deserialize;
use std::path::Path;

pub const CONFIG_FILE: &str = "framerv.toml";
pub const DEFAULT_SCALE: usize = 1;
pub const DEFAULT_FPS: u32 = 60;

/// Addresses are 32 bits wide
const ADDRESS_SPACE: u64 = 1 << 32;

/// One past the swap port, or `None` if main memory, the pixel plane and the swap port don't all
/// fit in the address space. Also checks that both framebuffer buffers can be sized in a `usize`.
pub fn address_space_end(memory_size: usize, width: usize, height: usize) -> Option<u64> {
    let pixels = width.checked_mul(height)?;
    pixels.checked_mul(4 * (1 + FLOATS_PER_VERTEX))?;

    let end = (pixels as u64)
        .checked_mul(4)?
        .checked_add(memory_size as u64)?
        .checked_add(SWAP_PORT_SIZE as u64)?;
    (end <= ADDRESS_SPACE).then_some(end)
}

#[derive(Parser, Deserialize, Debug, Default, PartialEq)]
#[command(author, version, about)]
#[clap(disable_help_flag = true)]
#[serde(default, deny_unknown_fields)]
pub struct OptionalConfig {
    #[clap(long, action = clap::ArgAction::HelpLong)]
    #[serde(skip)]
    help: Option<bool>,

    /// Runs without a window
    #[arg(long)]
    pub no_video: bool,

    /// The width of the framebuffer, in pixels. Defaults to 512
    #[arg(short, long)]
    pub width: Option<usize>,

    /// The height of the framebuffer, in pixels. Defaults to 512
    #[arg(short, long)]
    pub height: Option<usize>,

    /// Size of main memory, in bytes. Defaults to 4096
    #[arg(short, long)]
    pub memory_size: Option<usize>,

    /// Each pixel is scaled by this factor. Defaults to 1
    #[arg(short, long)]
    pub scale: Option<usize>,

    /// How the program file is encoded. Defaults to auto
    #[arg(short, long, value_enum)]
    pub format: Option<Format>,

    /// Frames per second of the render loop when running without a window. Defaults to 60
    #[arg(long)]
    pub fps: Option<u32>,

    /// Prints the disassembled program before running it
    #[arg(long)]
    pub print_instructions: bool,

    /// Prints the registers after execution
    #[arg(long)]
    pub print_state: bool,

    /// The program to execute
    pub file: Option<String>,
}

impl OptionalConfig {
    pub fn get_args() -> Self {
        Self::parse()
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Reads `path` if it exists. A missing file is the same as an empty one.
    pub fn get_toml(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(text) => Self::from_toml(&text),
            Err(_) => Ok(Self::default()),
        }
    }

    /// Fields set in `self` take precedence over the ones in `rhs`
    pub fn merge(self, rhs: Self) -> Self {
        Self {
            help: self.help.or(rhs.help),
            no_video: self.no_video || rhs.no_video,
            width: self.width.or(rhs.width),
            height: self.height.or(rhs.height),
            memory_size: self.memory_size.or(rhs.memory_size),
            scale: self.scale.or(rhs.scale),
            format: self.format.or(rhs.format),
            fps: self.fps.or(rhs.fps),
            print_instructions: self.print_instructions || rhs.print_instructions,
            print_state: self.print_state || rhs.print_state,
            file: self.file.or(rhs.file),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub no_video: bool,
    pub width: usize,
    pub height: usize,
    pub memory_size: usize,
    pub scale: usize,
    pub format: Format,
    pub fps: u32,
    pub print_instructions: bool,
    pub print_state: bool,
    pub file: String,
}

impl TryFrom<OptionalConfig> for Config {
    type Error = ConfigError;

    fn try_from(config: OptionalConfig) -> Result<Self, Self::Error> {
        let config = Self {
            no_video: config.no_video,
            width: config.width.unwrap_or(DEFAULT_WIDTH),
            height: config.height.unwrap_or(DEFAULT_HEIGHT),
            memory_size: config.memory_size.unwrap_or(DEFAULT_SIZE),
            scale: config.scale.unwrap_or(DEFAULT_SCALE),
            format: config.format.unwrap_or_default(),
            fps: config.fps.unwrap_or(DEFAULT_FPS),
            print_instructions: config.print_instructions,
            print_state: config.print_state,
            file: config.file.ok_or(ConfigError::NoFile)?,
        };

        for (name, value) in [
            ("width", config.width),
            ("height", config.height),
            ("scale", config.scale),
        ] {
            if value == 0 {
                return Err(ConfigError::Zero(name));
            }
        }

        if address_space_end(config.memory_size, config.width, config.height).is_none() {
            return Err(ConfigError::AddressSpace {
                memory_size: config.memory_size,
                width: config.width,
                height: config.height,
            });
        }

        Ok(config)
    }
}

impl Config {
    /// Command line arguments merged over `framerv.toml`
    pub fn get() -> Result<Self, ConfigError> {
        OptionalConfig::get_args()
            .merge(OptionalConfig::get_toml(CONFIG_FILE)?)
            .try_into()
    }
}
