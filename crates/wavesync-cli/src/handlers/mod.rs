//! Command handlers.
//!
//! Each handler takes the composed [`CliContext`](crate::CliContext), calls
//! the installer and formats the result for the terminal.

pub mod install;
pub mod size;
pub mod status;
