use clap::ArgMatches;
use crate::fs::os8::{types,Disk};
use crate::fs::os8::types::Pattern;
use super::{resolve_image,file_args,CommandError};
use crate::{open_image,Access,STDRESULT};

pub fn catalog(cmd: &ArgMatches) -> STDRESULT {
    let files = file_args(cmd);
    let match_name = match files.len() {
        0 => "*.*".to_string(),
        1 => {
            if !types::is_file_spec(&files[0]) {
                eprintln!("file argument to --dir must be an os8 file pattern");
                return Err(Box::new(CommandError::BadFileSpec));
            }
            types::strip_device(&files[0]).to_string()
        },
        _ => {
            eprintln!("too many files for --dir");
            return Err(Box::new(CommandError::FileCount));
        }
    };
    let spec = resolve_image(cmd)?;
    let img = open_image(&spec.path,spec.format,spec.side,Access::Read)?;
    let disk = Disk::from_img(img);
    let dir = disk.read_directory()?;
    let patt = Pattern::compile(&match_name)?;
    let columns = cmd.get_one::<u16>("columns").copied().unwrap_or(2) as usize;
    print!("{}",disk.catalog(&dir,&patt,cmd.get_flag("empties"),columns));
    Ok(())
}
