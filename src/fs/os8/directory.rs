//! ### OS/8 directory structures
//!
//! The directory is six 256-word segments in blocks 1 through 6, chained by
//! a next-segment field.  Each segment is five header words followed by a
//! packed sequence of entries; a file entry is four name words, the
//! segment's extra words, and a negated length, while an empty entry is a
//! zero word and a negated length.  An entry's starting block is never
//! stored; it is the segment's first-file-block plus the lengths of every
//! entry ahead of it, so every walk carries a running block number.
//!
//! All mutations happen in memory against the whole directory and reach the
//! media only at `flush`.  Every mutation leaves the invariants intact that
//! the real USR demands: non-zero entry counts, in-range chain links and
//! flag words, and length accounting that adds up across segments.

use log::{warn,error};
use super::types::*;
use super::pack;
use crate::img::{Block,BLOCK_WORDS,DiskImage};
use crate::{STDRESULT,DYNERR};

/// encode or decode a count stored as a twos-complement negative
pub fn negate(w: u16) -> u16 {
    ((0o10000 - w as u32) % 0o10000) as u16
}

/// One directory segment: the raw block plus a dirty mark.  The accessors
/// decode the negative-magnitude header fields into positive counts; nothing
/// outside this type deals in the on-media encoding.
pub struct Segment {
    words: Block,
    dirty: bool
}

impl Segment {
    fn new() -> Self {
        Self {
            words: [0;BLOCK_WORDS],
            dirty: false
        }
    }
    pub fn data(&self) -> &Block {
        &self.words
    }
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
    pub fn file_count(&self) -> u16 {
        negate(self.words[0])
    }
    pub fn first_file_block(&self) -> u16 {
        self.words[1]
    }
    pub fn next_segment(&self) -> u16 {
        self.words[2]
    }
    pub fn flag_word(&self) -> u16 {
        self.words[3]
    }
    pub fn extra_words(&self) -> u16 {
        negate(self.words[4])
    }
    fn set_file_count(&mut self,count: u16) {
        self.words[0] = negate(count);
        self.dirty = true;
    }
    fn set_first_file_block(&mut self,block: u16) {
        self.words[1] = block;
        self.dirty = true;
    }
    fn set_next_segment(&mut self,next: u16) {
        self.words[2] = next;
        self.dirty = true;
    }
    fn set_flag_word(&mut self,flag: u16) {
        self.words[3] = flag;
        self.dirty = true;
    }
    fn set_extra_words(&mut self,count: u16) {
        self.words[4] = negate(count);
        self.dirty = true;
    }
    fn set_word(&mut self,offset: usize,word: u16) {
        self.words[offset] = word;
        self.dirty = true;
    }
}

/// Stateful walk over directory entries in on-media order.  The cursor
/// carries indices rather than pointers, so it survives the directory
/// moving; it does not survive mutations, which shift entries underneath it.
pub struct Cursor {
    seg: usize,
    offset: usize,
    number: u16,
    block: u16
}

impl Cursor {
    pub fn new(dir: &Directory) -> Self {
        Self {
            seg: 0,
            offset: ENTRY_START,
            number: 1,
            block: dir.segs[0].first_file_block()
        }
    }
    /// follow the segment chain until the cursor rests on a live entry,
    /// false when the walk is over
    fn settle(&mut self,dir: &Directory) -> bool {
        while self.number > dir.segs[self.seg].file_count() {
            let next = dir.segs[self.seg].next_segment();
            if next == 0 {
                return false;
            }
            if next as usize > DIR_SEGMENTS {
                warn!("segment chain left the directory, ending walk");
                return false;
            }
            self.seg = next as usize - 1;
            self.offset = ENTRY_START;
            self.number = 1;
            self.block = dir.segs[self.seg].first_file_block();
        }
        true
    }
    /// decode the entry under the cursor without advancing
    pub fn peek(&mut self,dir: &Directory) -> Option<Entry> {
        match self.settle(dir) {
            true => Some(dir.entry_at(self.seg,self.offset,self.number,self.block)),
            false => None
        }
    }
    pub fn advance(&mut self,entry: &Entry) {
        self.offset += entry.word_len();
        self.number += 1;
        self.block += entry.length();
    }
    /// decode the entry under the cursor and step past it
    pub fn next(&mut self,dir: &Directory) -> Option<Entry> {
        let entry = self.peek(dir)?;
        self.advance(&entry);
        Some(entry)
    }
    fn restore(&mut self,entry: &Entry) {
        self.seg = entry.seg;
        self.offset = entry.offset;
        self.number = entry.number;
        self.block = entry.block;
    }
}

/// The whole directory held in memory, plus every mutation the engine
/// performs on it.  Born from `read_from` or `format`, discarded after
/// `flush`.
pub struct Directory {
    segs: [Segment;DIR_SEGMENTS]
}

impl Directory {
    pub fn new() -> Self {
        Self {
            segs: [Segment::new(),Segment::new(),Segment::new(),Segment::new(),Segment::new(),Segment::new()]
        }
    }
    pub fn segment(&self,idx: usize) -> &Segment {
        &self.segs[idx]
    }
    /// Read segments along the chain starting at block 1.  Anything wrong
    /// with the chain or the invariants aborts before any mutation.
    pub fn read_from(img: &dyn DiskImage) -> Result<Self,DYNERR> {
        let mut dir = Directory::new();
        let mut visited = [false;DIR_SEGMENTS];
        let mut block = FIRST_DIR_BLOCK as usize;
        loop {
            let idx = block - 1;
            if visited[idx] {
                return Err(Box::new(Error::SegmentChain));
            }
            visited[idx] = true;
            dir.segs[idx].words = img.read_block(block)?;
            dir.segs[idx].dirty = false;
            let next = dir.segs[idx].next_segment();
            if next == 0 {
                break;
            }
            if next as usize > DIR_SEGMENTS {
                return Err(Box::new(Error::SegmentChain));
            }
            block = next as usize;
        }
        dir.validate()?;
        Ok(dir)
    }
    /// Write every dirty segment along the chain.  A failed write leaves
    /// the media half-updated; we report and stop.
    pub fn flush(&mut self,img: &mut dyn DiskImage) -> STDRESULT {
        if let Err(e) = self.validate() {
            error!("internal error, directory will not be written");
            return Err(Box::new(e));
        }
        let mut block = FIRST_DIR_BLOCK as usize;
        loop {
            let idx = block - 1;
            if self.segs[idx].dirty {
                if let Err(e) = img.write_block(block,&self.segs[idx].words) {
                    error!("error writing directory, directory may be corrupted");
                    return Err(e);
                }
            }
            self.segs[idx].dirty = false;
            let next = self.segs[idx].next_segment();
            if next == 0 {
                break;
            }
            block = next as usize;
        }
        Ok(())
    }
    pub fn mark_clean(&mut self) {
        for seg in &mut self.segs {
            seg.dirty = false;
        }
    }
    /// Check the header invariants on every segment the chain reaches, and
    /// that each segment's entries fit inside their block.
    pub fn validate(&self) -> Result<(),Error> {
        let mut visited = [false;DIR_SEGMENTS];
        let mut idx = 0;
        loop {
            if visited[idx] {
                return Err(Error::SegmentChain);
            }
            visited[idx] = true;
            let seg = &self.segs[idx];
            let count = seg.file_count();
            let extra = seg.extra_words();
            let flag = seg.flag_word();
            if count == 0 || count >= MAX_SEGMENT_FILES || extra >= MAX_EXTRA_WORDS {
                return Err(Error::BadDirectory);
            }
            if flag != 0 && (flag < FLAG_BASE || flag > FLAG_MAX) {
                return Err(Error::BadDirectory);
            }
            if seg.next_segment() as usize > DIR_SEGMENTS {
                return Err(Error::SegmentChain);
            }
            let mut offset = ENTRY_START;
            for _ in 0..count {
                if offset >= BLOCK_WORDS - 1 {
                    return Err(Error::BadDirectory);
                }
                offset += match seg.words[offset] {
                    0 => EMPTY_ENTRY_WORDS,
                    _ => 4 + extra as usize + 1
                };
                if offset > BLOCK_WORDS {
                    return Err(Error::BadDirectory);
                }
            }
            match self.segs[idx].next_segment() {
                0 => return Ok(()),
                next => idx = next as usize - 1
            }
        }
    }
    fn entry_at(&self,seg: usize,offset: usize,number: u16,block: u16) -> Entry {
        let s = &self.segs[seg];
        let kind = match s.words[offset] {
            0 => EntryKind::Empty {
                length: negate(s.words[offset+1])
            },
            _ => {
                let name = Name([s.words[offset],s.words[offset+1],s.words[offset+2],s.words[offset+3]]);
                let extra = s.words[offset+4..offset+4+s.extra_words() as usize].to_vec();
                let length = negate(s.words[offset + 4 + extra.len()]);
                EntryKind::File {
                    name,
                    extra,
                    length
                }
            }
        };
        Entry {
            seg,
            offset,
            number,
            block,
            kind
        }
    }
    /// store an entry's words at its recorded position
    fn put_entry(&mut self,entry: &Entry) {
        let seg = &mut self.segs[entry.seg];
        match &entry.kind {
            EntryKind::Empty {length} => {
                seg.set_word(entry.offset,0);
                seg.set_word(entry.offset+1,negate(*length));
            },
            EntryKind::File {name,extra,length} => {
                for i in 0..4 {
                    seg.set_word(entry.offset+i,name.0[i]);
                }
                for (i,w) in extra.iter().enumerate() {
                    seg.set_word(entry.offset+4+i,*w);
                }
                seg.set_word(entry.offset+4+extra.len(),negate(*length));
            }
        }
    }
    /// words a new file entry occupies in the given segment
    fn file_entry_words(&self,seg: usize) -> usize {
        4 + self.segs[seg].extra_words() as usize + 1
    }
    /// walk to the last entry of one segment, the way the USR does
    fn last_entry(&self,seg: usize) -> Entry {
        let count = self.segs[seg].file_count();
        let mut offset = ENTRY_START;
        let mut block = self.segs[seg].first_file_block();
        let mut number = 1;
        loop {
            let entry = self.entry_at(seg,offset,number,block);
            if number == count {
                return entry;
            }
            offset += entry.word_len();
            block += entry.length();
            number += 1;
        }
    }
    /// If the segment's tail can hold `need` more words, return the word
    /// offset just past the last entry.
    fn unused_tail(&self,seg: usize,need: usize) -> Option<usize> {
        let last = self.last_entry(seg);
        let tail = last.offset + last.word_len();
        match tail + need < BLOCK_WORDS {
            true => Some(tail),
            false => None
        }
    }
    /// Shift words `lo..=hi` up by `amount` and keep the tentative-entry
    /// flag word pointing at the same entry, clearing it if it would leave
    /// its legal range.
    fn shift_up(&mut self,seg: usize,lo: usize,hi: usize,amount: usize) {
        let s = &mut self.segs[seg];
        let mut i = hi;
        loop {
            s.words[i+amount] = s.words[i];
            if i == lo {
                break;
            }
            i -= 1;
        }
        s.dirty = true;
        let flag = s.flag_word();
        if flag != 0 && (flag - FLAG_BASE) as usize > lo {
            let moved = flag as usize + amount;
            s.set_flag_word(match moved > FLAG_MAX as usize {
                true => 0,
                false => moved as u16
            });
        }
    }
    /// Scrunch the segment down over an entry, keeping its first `keep`
    /// words, with the same flag-word maintenance.
    fn shift_down(&mut self,seg: usize,offset: usize,old_words: usize,keep: usize) {
        let s = &mut self.segs[seg];
        let delta = old_words - keep;
        for i in offset+old_words..BLOCK_WORDS {
            s.words[i-delta] = s.words[i];
        }
        s.dirty = true;
        let flag = s.flag_word();
        if flag != 0 && (flag - FLAG_BASE) as usize > offset {
            let moved = flag as i32 - delta as i32;
            s.set_flag_word(match moved < FLAG_BASE as i32 {
                true => 0,
                false => moved as u16
            });
        }
    }
    /// Walk the cursor to the next live file entry matching the pattern.
    /// Repeated calls with the same cursor yield all further matches.
    pub fn next_match(&self,cursor: &mut Cursor,patt: &Pattern) -> Option<Entry> {
        while let Some(entry) = cursor.next(self) {
            if let EntryKind::File {name,length,..} = &entry.kind {
                if *length != 0 && patt.matches(name) {
                    return Some(entry);
                }
            }
        }
        None
    }
    /// every live file entry matching the pattern, in on-media order
    pub fn lookup_all(&self,patt: &Pattern) -> Vec<Entry> {
        let mut ans = Vec::new();
        let mut cursor = Cursor::new(self);
        while let Some(entry) = self.next_match(&mut cursor,patt) {
            ans.push(entry);
        }
        ans
    }
    /// Best-fit search over the empty entries, in the manner of the USR's
    /// MENTER: a zero request returns the largest empty, otherwise the
    /// smallest that still holds `want` blocks, first match winning ties.
    /// `exclude` keeps a just-deleted file's slot from being reused before
    /// its blocks are overwritten.
    pub fn find_empty(&self,exclude: Option<(usize,u16)>,want: u16) -> Option<Entry> {
        let mut best: Option<Entry> = None;
        let mut cursor = Cursor::new(self);
        while let Some(entry) = cursor.next(self) {
            if let EntryKind::Empty {length} = entry.kind {
                if length == 0 || length < want {
                    continue;
                }
                if exclude == Some((entry.seg,entry.number)) {
                    continue;
                }
                let better = match &best {
                    None => true,
                    Some(b) if want == 0 => length > b.length(),
                    Some(b) => length < b.length()
                };
                if better {
                    best = Some(entry);
                }
            }
        }
        best
    }
    /// Turn a file entry into an empty of the same length, scrunching the
    /// rest of the segment down over the vacated words.
    pub fn delete(&mut self,entry: &Entry) -> Entry {
        self.shift_down(entry.seg,entry.offset,entry.word_len(),EMPTY_ENTRY_WORDS);
        let empty = Entry {
            kind: EntryKind::Empty {
                length: entry.length()
            },
            ..entry.clone()
        };
        self.put_entry(&empty);
        empty
    }
    /// Stamp a new file entry over the front of an empty previously handed
    /// out by `find_empty`, after the data blocks are on the media.
    ///
    /// If the empty's segment cannot hold another entry, file entries
    /// migrate forward off segment tails until it can, new segments being
    /// added at the end of the chain as needed.  A segment is never filled
    /// completely; the real USR refuses to, and a volume that did would be
    /// rejected by it.
    pub fn enter(&mut self,name: &Name,length: u16,mut slot: Entry) -> Result<Entry,DYNERR> {
        let new_len = self.file_entry_words(slot.seg);
        let min_free = new_len + EMPTY_ENTRY_WORDS;
        let tail = loop {
            if let Some(tail) = self.unused_tail(slot.seg,min_free) {
                break tail;
            }
            // no room where the empty lives: find the first successor with
            // room and move its predecessor's last entry to its head
            let mut seg = slot.seg;
            let mut moved = false;
            while self.segs[seg].next_segment() != 0 {
                let next = self.segs[seg].next_segment() as usize - 1;
                if let Some(next_tail) = self.unused_tail(next,min_free) {
                    let last = self.last_entry(seg);
                    let follows_slot = seg == slot.seg && last.number == slot.number;
                    let losing = self.segs[seg].file_count();
                    let gaining = self.segs[next].file_count();
                    self.segs[seg].set_file_count(losing - 1);
                    self.segs[next].set_file_count(gaining + 1);
                    let ffb = self.segs[next].first_file_block() - last.length();
                    self.segs[next].set_first_file_block(ffb);
                    self.shift_up(next,ENTRY_START,next_tail,last.word_len());
                    let migrated = Entry {
                        seg: next,
                        offset: ENTRY_START,
                        number: 1,
                        block: ffb,
                        kind: last.kind.clone()
                    };
                    self.put_entry(&migrated);
                    if follows_slot {
                        slot = migrated;
                    }
                    moved = true;
                    break;
                }
                seg = next;
            }
            if !moved {
                // the chain is out of room; add a segment after the last,
                // assuming as OS/8 does that the chain has no holes
                let idx = seg + 1;
                if idx >= DIR_SEGMENTS {
                    return Err(Box::new(Error::DirectoryFull));
                }
                let last = self.last_entry(seg);
                let extra = self.segs[seg].extra_words();
                self.segs[seg].set_next_segment(idx as u16 + 1);
                self.segs[idx].set_file_count(1);
                self.segs[idx].set_first_file_block(last.block + last.length());
                self.segs[idx].set_next_segment(0);
                self.segs[idx].set_flag_word(0);
                self.segs[idx].set_extra_words(extra);
                // a zero-length empty that consolidation will reap
                self.segs[idx].set_word(ENTRY_START,0);
                self.segs[idx].set_word(ENTRY_START+1,0);
            }
        };
        // open the hole and stamp the new entry ahead of the empty
        self.shift_up(slot.seg,slot.offset,tail,new_len);
        let count = self.segs[slot.seg].file_count();
        self.segs[slot.seg].set_file_count(count + 1);
        let entry = Entry {
            seg: slot.seg,
            offset: slot.offset,
            number: slot.number,
            block: slot.block,
            kind: EntryKind::File {
                name: *name,
                extra: vec![0;self.segs[slot.seg].extra_words() as usize],
                length
            }
        };
        self.put_entry(&entry);
        // the displaced empty sits right behind; it pays for the new file
        let moved = self.entry_at(slot.seg,slot.offset + new_len,slot.number + 1,slot.block + length);
        match moved.kind {
            EntryKind::Empty {length: remainder} if remainder >= length => {
                self.put_entry(&Entry {
                    kind: EntryKind::Empty {
                        length: remainder - length
                    },
                    ..moved
                });
            },
            _ => return Err(Box::new(Error::BadAllocation))
        }
        self.consolidate();
        self.validate()?;
        Ok(entry)
    }
    /// Combine neighbouring empties within each segment and reap
    /// zero-length empties that are not alone in theirs.  Empties abutting
    /// across a segment boundary stay separate, matching the USR's CONSOL.
    pub fn consolidate(&mut self) {
        let mut cursor = Cursor::new(self);
        loop {
            let entry = match cursor.peek(self) {
                Some(e) => e,
                None => break
            };
            let length = match &entry.kind {
                EntryKind::Empty {length} => *length,
                _ => {
                    cursor.advance(&entry);
                    continue;
                }
            };
            let count = self.segs[entry.seg].file_count();
            if length == 0 && count > 1 {
                self.shift_down(entry.seg,entry.offset,EMPTY_ENTRY_WORDS,0);
                self.segs[entry.seg].set_file_count(count - 1);
                // the cursor's offset now addresses the following entry
                continue;
            }
            cursor.advance(&entry);
            if cursor.number > self.segs[entry.seg].file_count() {
                continue;
            }
            if let Some(next) = cursor.peek(self) {
                if let EntryKind::Empty {length: next_length} = next.kind {
                    let merged = Entry {
                        kind: EntryKind::Empty {
                            length: length + next_length
                        },
                        ..entry
                    };
                    self.put_entry(&merged);
                    self.shift_down(next.seg,next.offset,EMPTY_ENTRY_WORDS,0);
                    let neighbours = self.segs[next.seg].file_count();
                    self.segs[next.seg].set_file_count(neighbours - 1);
                    cursor.restore(&merged);
                }
            }
        }
    }
    /// Reset segment 0 to a single empty spanning everything past the
    /// first file block, which is retained so any system blocks survive.
    /// Later segments fall off the chain and are left as they are.
    pub fn zero(&mut self,device: &Device) {
        let first = self.segs[0].first_file_block();
        self.segs[0].set_file_count(1);
        self.segs[0].set_next_segment(0);
        self.segs[0].set_flag_word(0);
        self.segs[0].set_word(ENTRY_START,0);
        self.segs[0].set_word(ENTRY_START+1,negate(device.size - first));
    }
    /// Build a brand-new directory in memory: all segments zeroed, segment 0
    /// holding one empty that spans the whole file system.
    pub fn format(&mut self,device: &Device) {
        for seg in &mut self.segs {
            seg.words = [0;BLOCK_WORDS];
            seg.dirty = false;
        }
        self.segs[0].set_file_count(1);
        self.segs[0].set_first_file_block(FIRST_DIR_BLOCK + DIR_SEGMENTS as u16);
        self.segs[0].set_next_segment(0);
        self.segs[0].set_flag_word(0);
        self.segs[0].set_extra_words(1);
        self.segs[0].set_word(ENTRY_START,0);
        self.segs[0].set_word(ENTRY_START+1,negate(device.filesystem_size));
    }
    /// sixbit name of a file entry as a displayable string
    pub fn entry_name(entry: &Entry) -> Option<String> {
        match &entry.kind {
            EntryKind::File {name,..} => Some(pack::sixbit_to_string(&name.0)),
            EntryKind::Empty {..} => None
        }
    }
}

#[cfg(test)]
use crate::img::ImageFormat;

#[test]
fn negative_counts() {
    assert_eq!(negate(0),0);
    assert_eq!(negate(1),0o7777);
    assert_eq!(negate(0o7777),1);
    assert_eq!(negate(49),0o7717);
}

#[test]
fn flag_word_follows_shifts() {
    use std::str::FromStr;
    let device = Device::from_format(&ImageFormat::Dectape);
    let mut dir = Directory::new();
    dir.format(&device);
    // a tentative entry two words past the head of the trailing empty
    dir.segs[0].set_flag_word(FLAG_BASE + 7);
    let name = Name::from_str("TENT.TV").expect("bad name");
    let slot = dir.find_empty(None,1).expect("no empty");
    dir.enter(&name,1,slot).expect("enter failed");
    // the entry words moved up by one six-word file entry
    assert_eq!(dir.segs[0].flag_word(),FLAG_BASE + 13);
    // deleting the file scrunches four words out, merging the empties two more
    let patt = Pattern::compile("TENT.TV").expect("bad pattern");
    let mut cursor = Cursor::new(&dir);
    let entry = dir.next_match(&mut cursor,&patt).expect("not found");
    dir.delete(&entry);
    dir.consolidate();
    assert_eq!(dir.segs[0].flag_word(),FLAG_BASE + 7);
    assert_eq!(dir.segs[0].file_count(),1);
    dir.validate().expect("invariants broken");
}
