//! # Device Image Module
//!
//! This is a container for device image modules.  A device image module
//! moves 256-word OS/8 blocks to and from the host file that holds the
//! device image, one module per physical encoding.  The file system layer
//! is independent of the encoding; it only sees decoded blocks.
//!
//! Device images are represented by the `DiskImage` trait.  Block I/O is
//! positional and unbuffered: every write goes straight to the host file at
//! the block's byte offset.  Reads that decode a word with any of the upper
//! four bits set report the block as corrupted, and writes enforce the same
//! check on the in-memory words before packing.

pub mod dsk;
pub mod dectape;
pub mod rk05;

use std::str::FromStr;
use std::fmt;
use crate::{STDRESULT,DYNERR};

/// Words in one OS/8 block.
pub const BLOCK_WORDS: usize = 256;
/// A decoded OS/8 block: 256 twelve-bit words held in the low bits of `u16`.
pub type Block = [u16;BLOCK_WORDS];
/// Any of these bits set in a word means the image (or the caller) is damaged.
pub const JUNK_BITS: u16 = 0o170000;

/// Enumerates image errors.  The `Display` trait will print the long message.
#[derive(thiserror::Error,Debug)]
pub enum Error {
    #[error("unknown image format")]
    UnknownFormat,
    #[error("block {0} appears to be corrupted")]
    CorruptBlock(usize),
    #[error("buffer for block {0} appears to be corrupted, write aborted")]
    CorruptBuffer(usize),
    #[error("block {0} is beyond the end of the device")]
    BlockRange(usize),
    #[error("image length does not match the format")]
    ImageSizeMismatch,
    #[error("image is in use by another process")]
    Locked
}

/// The three physical encodings of an OS/8 device image.
#[derive(PartialEq,Eq,Clone,Copy,Debug)]
pub enum ImageFormat {
    /// two little-endian bytes per word, 512 byte blocks (simh disk image)
    Dsk,
    /// 129-word media blocks of which OS/8 uses 128, two media blocks per OS/8 block
    Dectape,
    /// three bytes pack two words big-endian, 384 byte blocks, two platters per file
    Rk05
}

/// Which of the two RK05 platters holds the file system.
#[derive(PartialEq,Eq,Clone,Copy,Debug)]
pub enum Rk05Side {
    A,
    B
}

impl FromStr for ImageFormat {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self,Self::Err> {
        match s {
            "dsk" => Ok(Self::Dsk),
            "tu56" | "dt8" => Ok(Self::Dectape),
            "rk05" => Ok(Self::Rk05),
            _ => Err(Error::UnknownFormat)
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self,f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dsk => write!(f,"dsk"),
            Self::Dectape => write!(f,"dectape"),
            Self::Rk05 => write!(f,"rk05")
        }
    }
}

/// The interface between a host file holding a device image and the
/// file system layer.  Block numbers are relative to the file system
/// (an RK05 side-B image adds its platter offset internally).
pub trait DiskImage {
    fn what_am_i(&self) -> ImageFormat;
    /// Total OS/8 blocks the device presents, including block 0 and the directory.
    fn total_blocks(&self) -> usize;
    fn read_block(&self,block: usize) -> Result<Block,DYNERR>;
    fn write_block(&mut self,block: usize,data: &Block) -> STDRESULT;
}

/// Scan a block about to be written for words that are not 12 bits.
pub fn verify_words(block: usize,data: &Block) -> STDRESULT {
    for word in data {
        if word & JUNK_BITS != 0 {
            return Err(Box::new(Error::CorruptBuffer(block)));
        }
    }
    Ok(())
}
