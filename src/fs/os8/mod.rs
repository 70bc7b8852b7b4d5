//! # OS/8 file system module
//!
//! The OS/8 directory is six 256-word segments at the front of the device,
//! holding packed entries whose data blocks follow implicitly in on-media
//! order.  This module owns a device image, holds the whole directory in
//! memory while a command runs, and writes back only the segments the
//! command dirtied.
//!
//! Directory mutations mimic the USR (OS/8's User Service Routine) closely
//! enough that a real OS/8 system accepts the volume afterwards: the
//! best-fit empty search behaves like MENTER, a segment is never filled to
//! the brim, and empties never merge across segment boundaries.

pub mod types;
pub mod pack;
pub mod directory;
mod display;

use log::{info,debug};
use types::*;
use directory::{Cursor,Directory};
use crate::img::{Block,BLOCK_WORDS,DiskImage};
use crate::{STDRESULT,DYNERR};

/// The primary interface for OS/8 operations on a device image.
pub struct Disk {
    img: Box<dyn DiskImage>
}

impl Disk {
    /// Create an OS/8 accessor from any device image.  The image becomes
    /// owned storage; host writes have already happened when a block write
    /// returns, there is no save step beyond `flush` for the directory.
    pub fn from_img(img: Box<dyn DiskImage>) -> Self {
        Self {
            img
        }
    }
    pub fn device(&self) -> Device {
        Device::from_format(&self.img.what_am_i())
    }
    pub fn read_directory(&self) -> Result<Directory,DYNERR> {
        Directory::read_from(self.img.as_ref())
    }
    pub fn flush(&mut self,dir: &mut Directory) -> STDRESULT {
        dir.flush(self.img.as_mut())
    }
    pub fn catalog(&self,dir: &Directory,patt: &Pattern,print_empties: bool,columns: usize) -> String {
        display::catalog(dir,patt,print_empties,columns)
    }
    /// Write a brand-new file system: fresh directory, zeroed pre-directory
    /// block, and a write at the last block so the host file takes on the
    /// full media size.  Returns the new in-memory directory.
    pub fn create(&mut self) -> Result<Directory,DYNERR> {
        let device = self.device();
        let mut dir = Directory::new();
        dir.format(&device);
        dir.validate()?;
        let zero_block: Block = [0;BLOCK_WORDS];
        for block in 0..FIRST_DIR_BLOCK as usize {
            self.img.write_block(block,&zero_block)?;
        }
        for idx in 0..DIR_SEGMENTS {
            self.img.write_block(FIRST_DIR_BLOCK as usize + idx,dir.segment(idx).data())?;
        }
        self.img.write_block(device.last_block as usize,&zero_block)?;
        dir.mark_clean();
        info!("created {} file system, {} blocks free",self.img.what_am_i(),device.filesystem_size);
        Ok(dir)
    }
    /// Empty an existing file system, keeping any system blocks ahead of
    /// the first file block.  Only segment 0 is touched.
    pub fn zero(&self,dir: &mut Directory) {
        dir.zero(&self.device());
    }
    /// File data writes go through here so a bad entry can never clobber
    /// the directory region or block 0.
    fn write_file_block(&mut self,block: u16,data: &Block) -> STDRESULT {
        if block <= FIRST_DIR_BLOCK + DIR_SEGMENTS as u16 - 1 {
            return Err(Box::new(Error::DirectoryOverwrite));
        }
        self.img.write_block(block as usize,data)
    }
    /// Copy a host byte stream into a new OS/8 file.  An existing file of
    /// the same name is deleted first, and its slot excluded from the
    /// allocation so the data blocks survive until the directory is final.
    pub fn copy_in(&mut self,dir: &mut Directory,name: &str,data: &[u8]) -> Result<Entry,DYNERR> {
        let name = strip_device(name);
        let sixbit: Name = name.parse()?;
        let blocks = (data.len() + BLOCK_BYTES - 1) / BLOCK_BYTES;
        if blocks == 0 {
            return Err(Box::new(Error::ZeroLength));
        }
        if blocks > self.device().filesystem_size as usize {
            return Err(Box::new(Error::NoRoom));
        }
        let patt = Pattern::compile(name)?;
        let mut cursor = Cursor::new(dir);
        let exclude = match dir.next_match(&mut cursor,&patt) {
            Some(old) => {
                debug!("replacing existing copy of {}",name);
                let empty = dir.delete(&old);
                Some((empty.seg,empty.number))
            },
            None => None
        };
        let slot = match dir.find_empty(exclude,blocks as u16) {
            Some(slot) => slot,
            None => return Err(Box::new(Error::NoRoom))
        };
        for i in 0..blocks {
            let chunk = &data[i*BLOCK_BYTES..usize::min(data.len(),(i+1)*BLOCK_BYTES)];
            let mut block: Block = [0;BLOCK_WORDS];
            for (j,pair) in chunk.chunks(2).enumerate() {
                block[j] = match pair.len() {
                    2 => u16::from_le_bytes([pair[0],pair[1]]),
                    _ => pair[0] as u16
                };
            }
            self.write_file_block(slot.block + i as u16,&block)?;
        }
        dir.enter(&sixbit,blocks as u16,slot)
    }
    /// Copy an OS/8 file out as the two-bytes-per-word stream, the exact
    /// reverse of `copy_in`.
    pub fn copy_out(&self,entry: &Entry) -> Result<Vec<u8>,DYNERR> {
        let mut ans = Vec::new();
        for block in entry.block..entry.block + entry.length() {
            let data = self.img.read_block(block as usize)?;
            for word in data {
                ans.extend_from_slice(&word.to_le_bytes());
            }
        }
        Ok(ans)
    }
    /// Copy host text in, transcoding to the marked, CR-injected, CTRL-Z
    /// terminated OS/8 form.  Transcoding changes the length, so the text
    /// is encoded to a scratch buffer first and then funnels through the
    /// image path.
    pub fn copy_in_text(&mut self,dir: &mut Directory,name: &str,text: &[u8]) -> Result<Entry,DYNERR> {
        let stream = pack::encode_text(text);
        self.copy_in(dir,name,&stream)
    }
    /// Copy an OS/8 text file out as host text, stopping at CTRL-Z or the
    /// end of the entry's blocks.
    pub fn copy_out_text(&self,entry: &Entry) -> Result<Vec<u8>,DYNERR> {
        let mut ans = Vec::new();
        for block in entry.block..entry.block + entry.length() {
            let data = self.img.read_block(block as usize)?;
            if pack::decode_block(&data,&mut ans) {
                break;
            }
        }
        Ok(ans)
    }
    /// Delete every live file matching the pattern, asking `confirm` for
    /// each, then consolidate.  Returns how many were deleted.
    pub fn delete_matching(&self,dir: &mut Directory,patt: &Pattern,confirm: &mut dyn FnMut(&str) -> bool) -> usize {
        let mut deleted = 0;
        let mut cursor = Cursor::new(dir);
        loop {
            let entry = match cursor.peek(dir) {
                Some(e) => e,
                None => break
            };
            let mut walked = entry.clone();
            if let EntryKind::File {name,length,..} = &entry.kind {
                if *length != 0 && patt.matches(name) && confirm(&name.to_string()) {
                    walked = dir.delete(&entry);
                    deleted += 1;
                }
            }
            cursor.advance(&walked);
        }
        dir.consolidate();
        deleted
    }
}
