use clap::{crate_version, value_parser, Arg, ArgAction, ArgGroup, Command, ValueHint};

pub fn build_cli() -> Command {
    let long_help = "os8kit works directly on OS/8 device image files.
Exactly one of --dir, --delete, --create, or --zero selects a verb;
with none of them the file arguments imply a copy, OS/8 names being
marked with the os8: prefix.  A single OS/8 text file with no other
verb is printed to stdout.
Set RUST_LOG environment variable to control logging level.
  levels: trace,debug,info,warn,error

Examples:
---------
directory listing:     `os8kit --os8 sys.tu56 --dir --empties`
copy files in:         `os8kit --os8 sys.tu56 hello.pa data.bn os8:`
copy files out:        `os8kit --os8 sys.tu56 'os8:*.pa' srcdir`
print a text file:     `os8kit --os8 sys.tu56 os8:hello.pa`
wildcard delete:       `os8kit --os8 sys.tu56 --delete 'os8:*.bn' --quiet`
fresh file system:     `os8kit --os8 fresh.rk05 --rkb --create`";

    Command::new("os8kit")
        .about("Manipulates DEC OS/8 file systems directly on PDP-8 device image files.")
        .after_long_help(long_help)
        .version(crate_version!())
        .arg(Arg::new("os8").long("os8").short('8').help("path to the OS/8 device image")
            .value_name("PATH").value_hint(ValueHint::FilePath).required(true)
        )
        .arg(Arg::new("rk05").long("rk05").help("image is an RK05 pack, overriding the extension")
            .action(ArgAction::SetTrue))
        .arg(Arg::new("tu56").long("tu56").help("image is a 129-word-block DECtape, overriding the extension")
            .action(ArgAction::SetTrue))
        .arg(Arg::new("dt8").long("dt8").help("same as --tu56")
            .action(ArgAction::SetTrue))
        .arg(Arg::new("dsk").long("dsk").help("image is a simh disk, overriding the extension")
            .action(ArgAction::SetTrue))
        .group(ArgGroup::new("format").args(["rk05","tu56","dt8","dsk"]))
        .arg(Arg::new("rka").long("rka").help("use the first RK05 platter (the default)")
            .action(ArgAction::SetTrue))
        .arg(Arg::new("rkb").long("rkb").help("use the second RK05 platter")
            .action(ArgAction::SetTrue))
        .group(ArgGroup::new("side").args(["rka","rkb"]))
        .arg(Arg::new("dir").long("dir").short('d').help("print the directory")
            .action(ArgAction::SetTrue))
        .arg(Arg::new("columns").long("columns").short('c').help("directory listing columns")
            .value_name("N").value_parser(value_parser!(u16).range(1..))
            .requires("dir"))
        .arg(Arg::new("empties").long("empties").help("list empty entries too")
            .action(ArgAction::SetTrue).requires("dir"))
        .arg(Arg::new("delete").long("delete").short('x').help("delete the named OS/8 files")
            .action(ArgAction::SetTrue))
        .arg(Arg::new("quiet").long("quiet").short('q').help("delete without asking per file")
            .action(ArgAction::SetTrue).requires("delete"))
        .arg(Arg::new("create").long("create").help("write a brand-new file system")
            .action(ArgAction::SetTrue))
        .arg(Arg::new("exists").long("exists").help("allow --create on an existing image file")
            .action(ArgAction::SetTrue).requires("create"))
        .arg(Arg::new("zero").long("zero").help("empty the directory of an existing file system")
            .action(ArgAction::SetTrue))
        .group(ArgGroup::new("verb").args(["dir","delete","create","zero"]))
        .arg(Arg::new("text").long("text").short('t').help("force text transfer regardless of extension")
            .action(ArgAction::SetTrue))
        .arg(Arg::new("image").long("image").short('i').help("force image transfer regardless of extension")
            .action(ArgAction::SetTrue))
        .group(ArgGroup::new("mode").args(["text","image"]))
        .arg(Arg::new("files").help("host files and os8: file specs")
            .value_name("FILE").value_hint(ValueHint::AnyPath).num_args(0..)
        )
}
