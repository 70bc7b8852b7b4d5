//! # CLI Verbs
//!
//! Contains modules that run the verbs.  Each one validates its file
//! arguments, opens the image with the access the verb needs, runs the
//! engine, and flushes the directory if it mutated anything.

pub mod catalog;
pub mod erase;
pub mod mkfs;
pub mod transfer;

use std::io::{self,BufRead,Write};
use clap::ArgMatches;
use crate::img::{ImageFormat,Rk05Side};
use crate::DYNERR;

const RCH: &str = "unreachable was reached";

#[derive(thiserror::Error,Debug)]
pub enum CommandError {
    #[error("command could not be interpreted")]
    InvalidCommand,
    #[error("wrong number of file arguments")]
    FileCount,
    #[error("file arguments must be OS/8 file specs")]
    BadFileSpec,
    #[error("output must be an existing host directory")]
    DestinationNotDirectory,
    #[error("output must be the os8: device")]
    DestinationNotDevice
}

/// the OS/8 image path plus everything needed to choose a codec
pub struct ImageSpec {
    pub path: String,
    pub format: ImageFormat,
    pub side: Rk05Side
}

/// Settle the image format (flags beat the extension) and the RK05 side.
pub fn resolve_image(cmd: &ArgMatches) -> Result<ImageSpec,DYNERR> {
    let path = cmd.get_one::<String>("os8").expect(RCH).to_string();
    let format = match (cmd.get_flag("rk05"),cmd.get_flag("tu56") || cmd.get_flag("dt8"),cmd.get_flag("dsk")) {
        (true,_,_) => ImageFormat::Rk05,
        (_,true,_) => ImageFormat::Dectape,
        (_,_,true) => ImageFormat::Dsk,
        _ => crate::infer_format(&path)?
    };
    let side = match cmd.get_flag("rkb") {
        true => Rk05Side::B,
        false => Rk05Side::A
    };
    Ok(ImageSpec {
        path,
        format,
        side
    })
}

pub fn file_args(cmd: &ArgMatches) -> Vec<String> {
    match cmd.get_many::<String>("files") {
        Some(iter) => iter.map(|s| s.to_string()).collect(),
        None => Vec::new()
    }
}

/// first-character yes/no prompt on stdin
pub fn yes_no(prompt: &str) -> bool {
    print!("{} ",prompt);
    io::stdout().flush().expect(RCH);
    let mut line = String::new();
    match io::stdin().lock().read_line(&mut line) {
        Ok(_) => matches!(line.trim_start().chars().next(),Some('y') | Some('Y')),
        Err(_) => false
    }
}

pub fn yes_no_sure() -> bool {
    yes_no("Are you sure?")
}
