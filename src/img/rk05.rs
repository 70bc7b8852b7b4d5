//! # Support for RK05 images
//!
//! The Mac PDP-8/e simulator packs two 12-bit words into three bytes,
//! big-endian: the first byte is the high 8 bits of the first word, the
//! middle byte splits between the two words, and the last byte is the low
//! 8 bits of the second word.  A block is 384 bytes.
//!
//! An RK05 pack has two platters, each hosting its own OS/8 file system,
//! presented as one host file.  The side-B platter simply offsets every
//! block number by the platter size.  No corruption check is possible on
//! read because three bytes cannot decode to more than twelve bits.

use std::fs::File;
use std::os::unix::fs::FileExt;
use crate::img;
use crate::img::{Block,DiskImage,ImageFormat,Rk05Side,BLOCK_WORDS};
use crate::{STDRESULT,DYNERR};

pub const BLOCK_BYTES: usize = 384;
/// OS/8 blocks on one platter, also the side-B block offset
pub const SIDE_BLOCKS: usize = 3248;

pub struct Rk05 {
    file: File,
    side: Rk05Side
}

impl Rk05 {
    pub fn from_file(file: File,side: Rk05Side) -> Self {
        Self {
            file,
            side
        }
    }
    fn platter_block(&self,block: usize) -> usize {
        match self.side {
            Rk05Side::A => block,
            Rk05Side::B => block + SIDE_BLOCKS
        }
    }
}

impl DiskImage for Rk05 {
    fn what_am_i(&self) -> ImageFormat {
        ImageFormat::Rk05
    }
    fn total_blocks(&self) -> usize {
        SIDE_BLOCKS
    }
    fn read_block(&self,block: usize) -> Result<Block,DYNERR> {
        if block >= SIDE_BLOCKS {
            return Err(Box::new(img::Error::BlockRange(block)));
        }
        let mut buf = [0u8;BLOCK_BYTES];
        self.file.read_exact_at(&mut buf,(self.platter_block(block) * BLOCK_BYTES) as u64)?;
        let mut ans: Block = [0;BLOCK_WORDS];
        for i in 0..BLOCK_WORDS/2 {
            let (b0,b1,b2) = (buf[3*i] as u16,buf[3*i+1] as u16,buf[3*i+2] as u16);
            ans[2*i] = (b0 << 4) | (b1 >> 4);
            ans[2*i+1] = ((b1 & 0o17) << 8) | b2;
        }
        Ok(ans)
    }
    fn write_block(&mut self,block: usize,data: &Block) -> STDRESULT {
        if block >= SIDE_BLOCKS {
            return Err(Box::new(img::Error::BlockRange(block)));
        }
        img::verify_words(block,data)?;
        let mut buf = [0u8;BLOCK_BYTES];
        for i in 0..BLOCK_WORDS/2 {
            let (w1,w2) = (data[2*i],data[2*i+1]);
            buf[3*i] = (w1 >> 4) as u8;
            buf[3*i+1] = (((w1 & 0o17) << 4) | (w2 >> 8)) as u8;
            buf[3*i+2] = (w2 & 0o377) as u8;
        }
        self.file.write_all_at(&buf,(self.platter_block(block) * BLOCK_BYTES) as u64)?;
        Ok(())
    }
}
