use clap::ArgMatches;
use crate::fs::os8::{types,Disk};
use crate::fs::os8::types::Pattern;
use super::{resolve_image,file_args,yes_no,CommandError};
use crate::{open_image,Access,STDRESULT};

pub fn erase(cmd: &ArgMatches) -> STDRESULT {
    let files = file_args(cmd);
    if files.is_empty() {
        eprintln!("no files to delete");
        return Err(Box::new(CommandError::FileCount));
    }
    if !files.iter().all(|f| types::is_file_spec(f)) {
        eprintln!("can only delete OS/8 files");
        return Err(Box::new(CommandError::BadFileSpec));
    }
    let spec = resolve_image(cmd)?;
    let img = open_image(&spec.path,spec.format,spec.side,Access::ReadWrite)?;
    let mut disk = Disk::from_img(img);
    let mut dir = disk.read_directory()?;
    let quiet = cmd.get_flag("quiet");
    let mut deleted = 0;
    for f in &files {
        let patt = Pattern::compile(types::strip_device(f))?;
        deleted += disk.delete_matching(&mut dir,&patt,&mut |name| {
            quiet || yes_no(&format!("Delete file {}?",name))
        });
    }
    println!("{} files deleted",deleted);
    disk.flush(&mut dir)
}
