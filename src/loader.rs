//!
//! Reads program files into instruction words and places them in memory through the [Bus].
//!
//! Text programs have one word per line, either as 32 binary digits or as `0x`-prefixed hex.
//! Blank lines and anything after a `#` are ignored. Binary programs are a sequence of
//! little-endian words.
//!

use crate::error::LoadError;
use crate::simulator::bus::Bus;
use byteorder::{ByteOrder, LittleEndian};
use serde::Deserialize;
use std::io::{self, BufRead};
use std::path::Path;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// Text if every line parses as a word, binary otherwise
    #[default]
    Auto,
    Text,
    Binary,
}

/// Lines of a reader, with invalid UTF-8 replaced instead of failing
pub struct Utf8LossyLines<R: BufRead> {
    reader: R,
    buf: Vec<u8>,
}

impl<R: BufRead> Iterator for Utf8LossyLines<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => None,
            Ok(_) => {
                let line = self.buf.strip_suffix(b"\n").unwrap_or(&self.buf[..]);
                let line = line.strip_suffix(b"\r").unwrap_or(line);
                Some(Ok(String::from_utf8_lossy(line).into_owned()))
            }
            Err(e) => Some(Err(e)),
        }
    }
}

pub trait Utf8LossyLinesExt: BufRead + Sized {
    fn utf8_lossy_lines(self) -> Utf8LossyLines<Self>;
}

impl<R: BufRead> Utf8LossyLinesExt for R {
    fn utf8_lossy_lines(self) -> Utf8LossyLines<R> {
        Utf8LossyLines {
            reader: self,
            buf: Vec::new(),
        }
    }
}

/// Parses the `number`-th line. Returns `None` for blank lines and comments.
fn parse_line(number: usize, line: &str) -> Option<Result<u32, LoadError>> {
    let text = line.split('#').next().unwrap_or_default().trim();
    if text.is_empty() {
        return None;
    }

    let digits = text.replace('_', "");
    let word = if let Some(hex) = digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).ok()
    } else if digits.len() == 32 {
        u32::from_str_radix(&digits, 2).ok()
    } else {
        None
    };

    Some(word.ok_or_else(|| LoadError::InvalidWord {
        line: number,
        text: text.to_string(),
    }))
}

pub fn parse_text<R: BufRead>(reader: R) -> Result<Vec<u32>, LoadError> {
    let mut words = Vec::new();
    for (i, line) in reader.utf8_lossy_lines().enumerate() {
        if let Some(word) = parse_line(i + 1, &line?) {
            words.push(word?);
        }
    }
    Ok(words)
}

pub fn parse_binary(bytes: &[u8]) -> Result<Vec<u32>, LoadError> {
    if bytes.len() % 4 != 0 {
        return Err(LoadError::TrailingBytes(bytes.len() % 4));
    }

    let mut words = vec![0; bytes.len() / 4];
    LittleEndian::read_u32_into(bytes, &mut words);
    Ok(words)
}

pub fn parse(bytes: &[u8], format: Format) -> Result<Vec<u32>, LoadError> {
    match format {
        Format::Text => parse_text(bytes),
        Format::Binary => parse_binary(bytes),
        Format::Auto => {
            let text = std::str::from_utf8(bytes).ok().and_then(|_| parse_text(bytes).ok());
            match text {
                Some(words) if !words.is_empty() || bytes.is_empty() => Ok(words),
                _ => parse_binary(bytes),
            }
        }
    }
}

/// Writes `words` to the start of main memory
pub fn load_words(bus: &mut Bus, words: &[u32]) -> Result<(), LoadError> {
    let capacity = bus.memory.len() / 4;
    if words.len() > capacity {
        return Err(LoadError::TooLarge {
            words: words.len(),
            capacity,
        });
    }

    bus.write_words(0, words)?;
    tracing::info!(words = words.len(), "program loaded");
    Ok(())
}

/// Reads the program at `path` and loads it. Returns the words that were loaded.
pub fn load_file(bus: &mut Bus, path: impl AsRef<Path>, format: Format) -> Result<Vec<u32>, LoadError> {
    let bytes = std::fs::read(path)?;
    let words = parse(&bytes, format)?;
    load_words(bus, &words)?;
    Ok(words)
}
