//! File logging through log4rs, used when the CLI is given a log directory.

pub mod setup;

pub use setup::{log_file_path, setup_file_logging};
