//! spriteport CLI library.
//!
//! Commands, the project configuration store and path expansion used by the
//! `spriteport` binary.

pub mod commands;
pub mod config_store;
pub mod input;
