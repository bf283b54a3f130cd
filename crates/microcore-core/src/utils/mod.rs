//! # Microcore Utilities
//!
//! Small filesystem helpers used by the kernel's model capture.
pub mod fs;

pub use fs::{find_files, find_files_with_extension};
