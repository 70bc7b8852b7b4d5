//! Fundamental types for the OS/8 file system: word-level constants,
//! six-bit names, wildcard patterns, directory entries, and device geometry.

use std::str::FromStr;
use std::fmt;
use regex::Regex;
use crate::img::{ImageFormat,dsk,rk05};
use super::pack;

/// directory segments live in blocks 1 through 6
pub const DIR_SEGMENTS: usize = 6;
pub const FIRST_DIR_BLOCK: u16 = 1;
/// word offset of the first entry in a segment, past the five header words
pub const ENTRY_START: usize = 5;
/// an empty entry is a zero word followed by a length word
pub const EMPTY_ENTRY_WORDS: usize = 2;
/// non-zero flag words index the segment relative to this base
pub const FLAG_BASE: u16 = 0o1400;
pub const FLAG_MAX: u16 = 0o1777;
pub const MAX_SEGMENT_FILES: u16 = 100;
pub const MAX_EXTRA_WORDS: u16 = 10;
/// host bytes per OS/8 block in the two-bytes-per-word stream
pub const BLOCK_BYTES: usize = 512;

/// extensions OS/8 software treats as text, everything else moves as an image
pub const TEXT_EXTENSIONS: [&str;16] = [
    "ba", // BASIC source
    "bi", // BATCH input
    "fc", // FOCAL source
    "ft", // FORTRAN source
    "he", // HELP
    "hl", // HELP
    "ls", // listing
    "ma", // MACRO source
    "pa", // PAL source
    "ps", // Pascal source
    "ra", // RALF source
    "ro", // Runoff source
    "sb", // SABR source
    "sl", // SABR source
    "te", // TECO file
    "tx"  // text file
];

/// OS/8 file specs are marked on the command line with this prefix
pub const DEVICE_PREFIX: &str = "os8:";

/// Enumerates OS/8 file system errors.  The `Display` trait will print the long message.
#[derive(thiserror::Error,Debug)]
pub enum Error {
    #[error("not a legal OS/8 file name")]
    BadName,
    #[error("invalid directory structure")]
    BadDirectory,
    #[error("directory segment chain is out of range")]
    SegmentChain,
    #[error("file not found")]
    FileNotFound,
    #[error("insufficient space")]
    NoRoom,
    #[error("no directory segment available")]
    DirectoryFull,
    #[error("write would land in the directory region")]
    DirectoryOverwrite,
    #[error("entry does not match the prior allocation")]
    BadAllocation,
    #[error("zero length file")]
    ZeroLength
}

/// Per-format block counts: the whole device, the last writable block, and
/// the span available to file entries once block 0 and the directory are set
/// aside.
#[derive(PartialEq,Eq,Clone,Copy)]
pub struct Device {
    pub last_block: u16,
    pub filesystem_size: u16,
    pub size: u16
}

impl Device {
    pub fn from_format(fmt: &ImageFormat) -> Self {
        let size = match fmt {
            ImageFormat::Dsk | ImageFormat::Dectape => dsk::TOTAL_BLOCKS as u16,
            ImageFormat::Rk05 => rk05::SIDE_BLOCKS as u16
        };
        Self {
            last_block: size - 1,
            filesystem_size: size - FIRST_DIR_BLOCK - DIR_SEGMENTS as u16,
            size
        }
    }
}

/// A file name in packed six-bit form: words 0..2 carry the name, word 3
/// the extension.  A zero first word is never a `Name`; that bit pattern
/// marks an empty entry on the media.
#[derive(PartialEq,Eq,Clone,Copy)]
pub struct Name(pub [u16;4]);

impl FromStr for Name {
    type Err = Error;
    /// Accepts a bare OS/8 name (no `os8:` prefix, no wildcard); case is folded.
    fn from_str(s: &str) -> Result<Self,Self::Err> {
        if !is_name_valid(s) || has_wildcard(s) {
            return Err(Error::BadName);
        }
        Ok(Self(pack::string_to_sixbit(s)))
    }
}

impl fmt::Display for Name {
    fn fmt(&self,f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f,"{}",pack::sixbit_to_string(&self.0))
    }
}

/// Compiled form of a possibly-wildcarded OS/8 name.  A `*` terminating the
/// name or extension field zeroes the mask from that character position
/// through the end of the field; matching then requires equality only on
/// the masked six-bit characters.
pub struct Pattern {
    want: [u16;4],
    mask: [u16;4]
}

impl Pattern {
    /// Compile a bare OS/8 name, wildcards allowed.
    pub fn compile(name: &str) -> Result<Self,Error> {
        if !is_name_valid(name) {
            return Err(Error::BadName);
        }
        let mut mask = [0o7777u16;4];
        mask_part(&mut mask,0,5,name);
        if let Some(dot) = name.find('.') {
            mask_part(&mut mask,6,7,&name[dot+1..]);
        }
        Ok(Self {
            want: pack::string_to_sixbit(name),
            mask
        })
    }
    pub fn matches(&self,name: &Name) -> bool {
        for i in 0..4 {
            if (name.0[i] ^ self.want[i]) & self.mask[i] != 0 {
                return false;
            }
        }
        true
    }
}

/// Zero the mask from a `*` in the given field through the field's end.
/// Character positions 0..5 are the name field, 6..7 the extension field.
fn mask_part(mask: &mut [u16;4],start: usize,finish: usize,part: &str) {
    let mut i = start;
    for ch in part.chars() {
        if ch == '.' {
            return;
        }
        if ch == '*' {
            while i <= finish {
                mask[i/2] &= match i & 1 {
                    1 => 0o7700,
                    _ => 0
                };
                i += 1;
            }
            return;
        }
        i += 1;
    }
}

/// A decoded directory entry together with where it sits.  The location
/// fields let the entry be handed back to the engine within the same
/// transaction; they go stale across any directory mutation.
#[derive(Clone,PartialEq)]
pub struct Entry {
    /// segment index, 0 through 5
    pub seg: usize,
    /// word offset of the entry within the segment block
    pub offset: usize,
    /// ordinal within the segment, the first entry is 1
    pub number: u16,
    /// device block where the entry's data begins (derived by the walk)
    pub block: u16,
    pub kind: EntryKind
}

#[derive(Clone,PartialEq)]
pub enum EntryKind {
    File {
        name: Name,
        /// per-segment extra words, opaque (normally one reserved date word)
        extra: Vec<u16>,
        length: u16
    },
    Empty {
        length: u16
    }
}

impl Entry {
    /// blocks of device space the entry accounts for
    pub fn length(&self) -> u16 {
        match &self.kind {
            EntryKind::File {length,..} => *length,
            EntryKind::Empty {length} => *length
        }
    }
    /// words the entry occupies in its segment
    pub fn word_len(&self) -> usize {
        match &self.kind {
            EntryKind::File {extra,..} => 4 + extra.len() + 1,
            EntryKind::Empty {..} => EMPTY_ENTRY_WORDS
        }
    }
    pub fn is_empty(&self) -> bool {
        matches!(self.kind,EntryKind::Empty {..})
    }
}

/// A legal OS/8 name is 1-6 characters, leading alphabetic, the rest
/// alphanumeric, with an optional single trailing `*`, plus an optional
/// extension of 0-2 alphanumerics with its own optional trailing `*`.
/// Either field may also be `*` alone.  Case is accepted and folded later.
pub fn is_name_valid(s: &str) -> bool {
    let shape = Regex::new(r"^(\*|[A-Za-z][A-Za-z0-9]*\*?)(\.([A-Za-z0-9]*\*?)?)?$").expect("unreachable");
    if !shape.is_match(s) {
        return false;
    }
    let (name,ext) = match s.find('.') {
        Some(dot) => (&s[..dot],&s[dot+1..]),
        None => (s,"")
    };
    name.len() <= 6 && ext.len() <= 2
}

/// A file spec is `os8:` followed by a legal name.
pub fn is_file_spec(s: &str) -> bool {
    match s.strip_prefix(DEVICE_PREFIX) {
        Some(name) => is_name_valid(name),
        None => false
    }
}

/// The bare device spec `os8:` stands for the whole file system.
pub fn is_device_spec(s: &str) -> bool {
    s == DEVICE_PREFIX
}

pub fn strip_device(s: &str) -> &str {
    match s.strip_prefix(DEVICE_PREFIX) {
        Some(name) => name,
        None => s
    }
}

pub fn has_wildcard(s: &str) -> bool {
    s.contains('*')
}

/// Text or image transfer, judged by the host-side extension.
pub fn is_text_name(s: &str) -> bool {
    match s.rfind('.') {
        Some(dot) => TEXT_EXTENSIONS.contains(&s[dot+1..].to_lowercase().as_str()),
        None => false
    }
}

#[test]
fn name_validity() {
    assert!(is_name_valid("ABCDEF"));
    assert!(is_name_valid("a1"));
    assert!(is_name_valid("FOO.PA"));
    assert!(is_name_valid("FOO."));
    assert!(is_name_valid("FOO.P*"));
    assert!(is_name_valid("FOO*"));
    assert!(is_name_valid("*.*"));
    assert!(is_name_valid("F.9"));
    assert!(!is_name_valid(""));
    assert!(!is_name_valid("1FOO"));
    assert!(!is_name_valid("TOOLONGX"));
    assert!(!is_name_valid("FOO.EXT"));
    assert!(!is_name_valid("FO*O"));
    assert!(!is_name_valid("FOO.*X"));
    assert!(!is_name_valid("FOO BAR"));
}

#[test]
fn pattern_matching() {
    let foo_pa = Name::from_str("FOO.PA").expect("bad name");
    let foo_bn = Name::from_str("foo.bn").expect("bad name");
    let bar_pa = Name::from_str("BAR.PA").expect("bad name");
    let fo = Name::from_str("FO").expect("bad name");
    let exact = Pattern::compile("foo.pa").expect("bad pattern");
    assert!(exact.matches(&foo_pa));
    assert!(!exact.matches(&foo_bn));
    assert!(!exact.matches(&bar_pa));
    let any_ext = Pattern::compile("FOO.*").expect("bad pattern");
    assert!(any_ext.matches(&foo_pa));
    assert!(any_ext.matches(&foo_bn));
    assert!(!any_ext.matches(&bar_pa));
    let prefix = Pattern::compile("F*.*").expect("bad pattern");
    assert!(prefix.matches(&foo_pa));
    assert!(prefix.matches(&fo));
    assert!(!prefix.matches(&bar_pa));
    let all = Pattern::compile("*.*").expect("bad pattern");
    assert!(all.matches(&foo_pa));
    assert!(all.matches(&fo));
    let no_ext = Pattern::compile("FO.").expect("bad pattern");
    assert!(no_ext.matches(&fo));
    assert!(!no_ext.matches(&foo_pa));
}

#[test]
fn file_specs() {
    assert!(is_file_spec("os8:FOO.PA"));
    assert!(is_file_spec("os8:*.*"));
    assert!(!is_file_spec("FOO.PA"));
    assert!(!is_file_spec("os8:"));
    assert!(is_device_spec("os8:"));
    assert_eq!(strip_device("os8:FOO.PA"),"FOO.PA");
    assert_eq!(strip_device("FOO.PA"),"FOO.PA");
    assert!(is_text_name("FOO.PA"));
    assert!(is_text_name("foo.tx"));
    assert!(!is_text_name("FOO.BN"));
    assert!(!is_text_name("FOO"));
}
