//! Command line interface for the semtok binary.

pub mod args;
pub mod commands;
