//! # File System Module
//!
//! This is a container for file system modules.  A file system module
//! imposes a directory structure on the decoded blocks supplied by the
//! `img` module.  Only the OS/8 file system is supported; the two RK05
//! platters are the same file system at different block offsets, which the
//! image layer hides.

pub mod os8;
