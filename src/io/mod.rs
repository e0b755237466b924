//! Input/Output handling for the CLI.

pub mod exit_code;

pub use exit_code::ExitCode;
