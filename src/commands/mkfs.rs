use clap::ArgMatches;
use crate::fs::os8::Disk;
use super::{resolve_image,file_args,yes_no_sure,CommandError};
use crate::{open_image,Access,STDRESULT};

pub fn create(cmd: &ArgMatches) -> STDRESULT {
    if !file_args(cmd).is_empty() {
        eprintln!("too many files for --create");
        return Err(Box::new(CommandError::FileCount));
    }
    let spec = resolve_image(cmd)?;
    let exists = cmd.get_flag("exists");
    if exists && !yes_no_sure() {
        return Ok(());
    }
    let access = match exists {
        true => Access::WriteExisting,
        false => Access::CreateNew
    };
    let img = open_image(&spec.path,spec.format,spec.side,access)?;
    let mut disk = Disk::from_img(img);
    disk.create()?;
    Ok(())
}

pub fn zero(cmd: &ArgMatches) -> STDRESULT {
    if !file_args(cmd).is_empty() {
        eprintln!("too many files for --zero");
        return Err(Box::new(CommandError::FileCount));
    }
    if !yes_no_sure() {
        return Ok(());
    }
    let spec = resolve_image(cmd)?;
    let img = open_image(&spec.path,spec.format,spec.side,Access::ReadWrite)?;
    let mut disk = Disk::from_img(img);
    let mut dir = disk.read_directory()?;
    disk.zero(&mut dir);
    disk.flush(&mut dir)
}
