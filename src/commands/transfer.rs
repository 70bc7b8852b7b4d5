//! The default verb: copy files between the host and the OS/8 file system,
//! or print a single OS/8 text file.  Direction is inferred from which side
//! of the argument list carries the `os8:` prefix.

use std::io::Write;
use std::path::Path;
use clap::ArgMatches;
use crate::fs::os8::{types,Disk};
use crate::fs::os8::types::{Error,Pattern};
use crate::fs::os8::directory::{Cursor,Directory};
use super::{resolve_image,file_args,CommandError,RCH};
use crate::{open_image,Access,STDRESULT};

/// text or image transfer for this file, forced modes beating the extension
fn text_mode(name: &str,cmd: &ArgMatches) -> bool {
    match (cmd.get_flag("text"),cmd.get_flag("image")) {
        (true,_) => true,
        (_,true) => false,
        _ => types::is_text_name(name)
    }
}

pub fn copy(cmd: &ArgMatches) -> STDRESULT {
    let files = file_args(cmd);
    if files.is_empty() {
        eprintln!("no files to copy");
        return Err(Box::new(CommandError::FileCount));
    }
    if files.len() == 1 {
        return print_text(cmd,&files[0]);
    }
    let last = files.last().expect(RCH);
    let sources = &files[..files.len()-1];
    match types::is_device_spec(last) || types::is_file_spec(last) {
        true => copy_to_os8(cmd,sources,last),
        false => copy_from_os8(cmd,sources,last)
    }
}

/// a lone OS/8 text-file spec prints to stdout
fn print_text(cmd: &ArgMatches,spec_str: &str) -> STDRESULT {
    if !types::is_file_spec(spec_str) || types::has_wildcard(spec_str)
        || !text_mode(types::strip_device(spec_str),cmd) {
        eprintln!("filename must be an OS/8 text file with no wild cards");
        return Err(Box::new(CommandError::InvalidCommand));
    }
    let spec = resolve_image(cmd)?;
    let img = open_image(&spec.path,spec.format,spec.side,Access::Read)?;
    let disk = Disk::from_img(img);
    let dir = disk.read_directory()?;
    let patt = Pattern::compile(types::strip_device(spec_str))?;
    let mut cursor = Cursor::new(&dir);
    match dir.next_match(&mut cursor,&patt) {
        Some(entry) => {
            let text = disk.copy_out_text(&entry)?;
            std::io::stdout().write_all(&text)?;
            Ok(())
        },
        None => {
            eprintln!("OS/8 file not found");
            Err(Box::new(Error::FileNotFound))
        }
    }
}

fn copy_to_os8(cmd: &ArgMatches,sources: &[String],last: &str) -> STDRESULT {
    if sources.iter().any(|f| types::is_file_spec(f) || types::is_device_spec(f)) {
        eprintln!("can only copy host files to an OS/8 file or device");
        return Err(Box::new(CommandError::BadFileSpec));
    }
    if sources.len() > 1 && !types::is_device_spec(last) {
        eprintln!("output file must be \"{}\"",types::DEVICE_PREFIX);
        return Err(Box::new(CommandError::DestinationNotDevice));
    }
    let spec = resolve_image(cmd)?;
    let img = open_image(&spec.path,spec.format,spec.side,Access::ReadWrite)?;
    let mut disk = Disk::from_img(img);
    let mut dir = disk.read_directory()?;
    for src in sources {
        let data = std::fs::read(src)?;
        let os8_name = match types::is_device_spec(last) {
            true => {
                let base = Path::new(src).file_name().and_then(|s| s.to_str()).unwrap_or("");
                if !types::is_name_valid(base) || types::has_wildcard(base) {
                    eprintln!("\"{}\" is not a legal OS/8 filename",base);
                    return Err(Box::new(Error::BadName));
                }
                base.to_string()
            },
            false => types::strip_device(last).to_string()
        };
        let copied = match text_mode(src,cmd) {
            true => disk.copy_in_text(&mut dir,&os8_name,&data),
            false => disk.copy_in(&mut dir,&os8_name,&data)
        };
        if let Err(e) = copied {
            eprintln!("error copying host file {} to OS/8 file {}",src,os8_name);
            return Err(e);
        }
    }
    disk.flush(&mut dir)
}

fn copy_from_os8(cmd: &ArgMatches,sources: &[String],last: &str) -> STDRESULT {
    if !sources.iter().all(|f| types::is_file_spec(f)) {
        eprintln!("can only copy OS/8 files to a host file or directory");
        return Err(Box::new(CommandError::BadFileSpec));
    }
    let is_dir = Path::new(last).is_dir();
    let fan_out = sources.len() > 1 || types::has_wildcard(&sources[0]);
    if fan_out && !is_dir {
        eprintln!("output file must be an existing host directory");
        return Err(Box::new(CommandError::DestinationNotDirectory));
    }
    let spec = resolve_image(cmd)?;
    let img = open_image(&spec.path,spec.format,spec.side,Access::Read)?;
    let disk = Disk::from_img(img);
    let dir = disk.read_directory()?;
    for src in sources {
        let patt = Pattern::compile(types::strip_device(src))?;
        let mut cursor = Cursor::new(&dir);
        while let Some(entry) = dir.next_match(&mut cursor,&patt) {
            let name = Directory::entry_name(&entry).expect(RCH);
            let path = match is_dir {
                true => Path::new(last).join(&name),
                false => Path::new(last).to_path_buf()
            };
            let copied = match text_mode(&name,cmd) {
                true => disk.copy_out_text(&entry),
                false => disk.copy_out(&entry)
            };
            match copied {
                Ok(bytes) => std::fs::write(&path,bytes)?,
                Err(e) => {
                    eprintln!("error copying OS/8 file {} to {}",name,path.display());
                    return Err(e);
                }
            }
        }
    }
    Ok(())
}
