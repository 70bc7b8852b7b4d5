//! # Support for DECtape images (TU56, DT8)
//!
//! Unconverted simh DECtape files have 129 twelve-bit words per media block,
//! of which OS/8 uses only the first 128.  One OS/8 block therefore spans
//! two consecutive 258 byte media blocks: the first 256 bytes of each hold
//! 128 words as little-endian pairs, and the last two bytes are padding.
//! We write the padding as zeros so the media blocks look clean.

use std::fs::File;
use std::os::unix::fs::FileExt;
use crate::img;
use crate::img::{Block,DiskImage,ImageFormat,BLOCK_WORDS,JUNK_BITS};
use crate::{STDRESULT,DYNERR};

/// 129 words of two bytes each
pub const MEDIA_BLOCK_BYTES: usize = 258;
/// bytes OS/8 actually uses in a media block
const MEDIA_PAYLOAD: usize = 256;
/// host bytes in a full image, 1474 media blocks
pub const IMAGE_LEN: u64 = 380292;
pub const TOTAL_BLOCKS: usize = IMAGE_LEN as usize / (MEDIA_BLOCK_BYTES * 2);

pub struct Dectape {
    file: File
}

impl Dectape {
    pub fn from_file(file: File) -> Self {
        Self {
            file
        }
    }
}

impl DiskImage for Dectape {
    fn what_am_i(&self) -> ImageFormat {
        ImageFormat::Dectape
    }
    fn total_blocks(&self) -> usize {
        TOTAL_BLOCKS
    }
    fn read_block(&self,block: usize) -> Result<Block,DYNERR> {
        if block >= TOTAL_BLOCKS {
            return Err(Box::new(img::Error::BlockRange(block)));
        }
        let mut buf = [0u8;MEDIA_PAYLOAD * 2];
        let mut offset = (block * MEDIA_BLOCK_BYTES * 2) as u64;
        for half in 0..2 {
            self.file.read_exact_at(&mut buf[half*MEDIA_PAYLOAD..(half+1)*MEDIA_PAYLOAD],offset)?;
            offset += MEDIA_BLOCK_BYTES as u64;
        }
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
        let mut offset = (block * MEDIA_BLOCK_BYTES * 2) as u64;
        for half in 0..2 {
            let mut buf = [0u8;MEDIA_BLOCK_BYTES];
            for i in 0..BLOCK_WORDS/2 {
                buf[2*i..2*i+2].copy_from_slice(&data[half*BLOCK_WORDS/2 + i].to_le_bytes());
            }
            self.file.write_all_at(&buf,offset)?;
            offset += MEDIA_BLOCK_BYTES as u64;
        }
        Ok(())
    }
}
