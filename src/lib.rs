//! # `os8kit` main library
//!
//! This library manipulates OS/8 file systems directly on PDP-8 device
//! image files, covering most of what OS/8's PIP program does: directory
//! listing, copying files in and out (with text transcoding), deletion,
//! and file system creation.
//!
//! ## Architecture
//!
//! Operations are built around two layers:
//! * `img::DiskImage` moves 256-word OS/8 blocks to and from the host file,
//!   one implementation per physical encoding (DSK, DECtape, RK05)
//! * `fs::os8::Disk` imposes the OS/8 directory structure on those blocks
//!
//! When a `Disk` is created it takes ownership of a `DiskImage`.  File data
//! writes go straight to the host file; the directory is mutated in memory
//! and reaches the media when `flush` writes back the dirty segments.
//!
//! The host image file is held under an advisory exclusive lock from open
//! to close, taken without blocking, so two commands cannot interleave
//! mutations.  The lock rides with the image handle and releases on every
//! exit path when the handle drops.

pub mod img;
pub mod fs;
pub mod commands;
pub mod cli;

use std::fs::OpenOptions;
use std::str::FromStr;
use fs2::FileExt;
use log::{info,error};
use img::{DiskImage,ImageFormat,Rk05Side};

type DYNERR = Box<dyn std::error::Error>;
type STDRESULT = Result<(),Box<dyn std::error::Error>>;

/// How a command needs the image file opened.
#[derive(PartialEq,Eq,Clone,Copy)]
pub enum Access {
    Read,
    ReadWrite,
    /// make a new host file, refusing to clobber one that exists
    CreateNew,
    /// write into a host file that must already exist
    WriteExisting
}

/// Pick the image format from the host file extension.
pub fn infer_format(path: &str) -> Result<ImageFormat,DYNERR> {
    let ext = match path.split('.').last() {
        Some(x) => x.to_lowercase(),
        None => "".to_string()
    };
    match ImageFormat::from_str(&ext) {
        Ok(fmt) => Ok(fmt),
        Err(e) => {
            error!("cannot infer a format from `{}`, expected tu56, dt8, dsk, or rk05",path);
            Err(Box::new(e))
        }
    }
}

/// Open the host image file, take the advisory exclusive lock, and wire up
/// the codec for the format.  DECtape images are checked for length at this
/// point: a 128-word-block tape is byte-identical to a DSK image and is
/// re-typed as one, and any other wrong length is refused the way the
/// PDP-8/e DECtape handler would refuse to mount it.
pub fn open_image(path: &str,format: ImageFormat,side: Rk05Side,access: Access) -> Result<Box<dyn DiskImage>,DYNERR> {
    let mut opts = OpenOptions::new();
    match access {
        Access::Read => opts.read(true),
        Access::ReadWrite => opts.read(true).write(true),
        Access::CreateNew => opts.write(true).create_new(true),
        Access::WriteExisting => opts.write(true)
    };
    let file = opts.open(path)?;
    if file.try_lock_exclusive().is_err() {
        error!("OS/8 file is locked by another process");
        return Err(Box::new(img::Error::Locked));
    }
    let mut format = format;
    if format == ImageFormat::Dectape && access != Access::CreateNew {
        let len = file.metadata()?.len();
        if len == img::dsk::IMAGE_LEN {
            info!("DECtape image has 128 word blocks, treating as dsk");
            format = ImageFormat::Dsk;
        } else if len != img::dectape::IMAGE_LEN {
            error!("OS/8 DECtape files must be {} bytes long, generic PDP-8 DECtape files {} bytes long",
                img::dectape::IMAGE_LEN,img::dsk::IMAGE_LEN);
            return Err(Box::new(img::Error::ImageSizeMismatch));
        }
    }
    Ok(match format {
        ImageFormat::Dsk => Box::new(img::dsk::Dsk::from_file(file)),
        ImageFormat::Dectape => Box::new(img::dectape::Dectape::from_file(file)),
        ImageFormat::Rk05 => Box::new(img::rk05::Rk05::from_file(file,side))
    })
}
