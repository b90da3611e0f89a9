//! CLI command implementations

pub mod config;
pub mod doctor;
pub mod import;

mod json_output;
