//! # Support for plain disk images (DSK)
//!
//! Simh-style disk images hold each 12-bit word in two little-endian bytes,
//! so an OS/8 block is a flat 512 byte record.  DECtapes that were imaged
//! with 128-word blocks are byte-identical to this format and are handled
//! here after the open-time length check re-types them.

use std::fs::File;
use std::os::unix::fs::FileExt;
use crate::img;
use crate::img::{Block,DiskImage,ImageFormat,BLOCK_WORDS,JUNK_BITS};
use crate::{STDRESULT,DYNERR};

pub const BLOCK_BYTES: usize = 512;
/// host bytes in a full image, 737 OS/8 blocks
pub const IMAGE_LEN: u64 = 377344;
pub const TOTAL_BLOCKS: usize = IMAGE_LEN as usize / BLOCK_BYTES;

pub struct Dsk {
    file: File
}

impl Dsk {
    pub fn from_file(file: File) -> Self {
        Self {
            file
        }
    }
}

impl DiskImage for Dsk {
    fn what_am_i(&self) -> ImageFormat {
        ImageFormat::Dsk
    }
    fn total_blocks(&self) -> usize {
        TOTAL_BLOCKS
    }
    fn read_block(&self,block: usize) -> Result<Block,DYNERR> {
        if block >= TOTAL_BLOCKS {
            return Err(Box::new(img::Error::BlockRange(block)));
        }
        let mut buf = [0u8;BLOCK_BYTES];
        self.file.read_exact_at(&mut buf,(block * BLOCK_BYTES) as u64)?;
        let mut ans: Block = [0;BLOCK_WORDS];
        for i in 0..BLOCK_WORDS {
            let word = u16::from_le_bytes([buf[2*i],buf[2*i+1]]);
            if word & JUNK_BITS != 0 {
                return Err(Box::new(img::Error::CorruptBlock(block)));
            }
            ans[i] = word;
        }
        Ok(ans)
    }
    fn write_block(&mut self,block: usize,data: &Block) -> STDRESULT {
        if block >= TOTAL_BLOCKS {
            return Err(Box::new(img::Error::BlockRange(block)));
        }
        img::verify_words(block,data)?;
        let mut buf = [0u8;BLOCK_BYTES];
        for i in 0..BLOCK_WORDS {
            buf[2*i..2*i+2].copy_from_slice(&data[i].to_le_bytes());
        }
        self.file.write_all_at(&buf,(block * BLOCK_BYTES) as u64)?;
        Ok(())
    }
}
