//! # Command Line Interface
//!
//! The verb flags select an operation; with no verb the file arguments
//! imply a copy, direction inferred from which side carries the `os8:`
//! prefix.  The verbs themselves are in the `commands` module.

use env_logger;
use os8kit::commands;

fn main() -> Result<(),Box<dyn std::error::Error>> {
    env_logger::init();
    let matches = os8kit::cli::build_cli().get_matches();

    if matches.get_flag("dir") {
        return commands::catalog::catalog(&matches);
    }
    if matches.get_flag("delete") {
        return commands::erase::erase(&matches);
    }
    if matches.get_flag("create") {
        return commands::mkfs::create(&matches);
    }
    if matches.get_flag("zero") {
        return commands::mkfs::zero(&matches);
    }
    commands::transfer::copy(&matches)
}
