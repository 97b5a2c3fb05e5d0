//! Utility functions/types to use across the whole crate.

mod file_system;
mod log;
mod process;

pub use file_system::*;
pub use self::log::{log_file_path, Logger};
pub use process::*;
