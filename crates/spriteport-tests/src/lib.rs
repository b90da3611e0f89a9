//! spriteport End-to-End Test Infrastructure
//!
//! This crate provides integration tests for the import pipeline:
//!
//! - Import: metadata -> clips -> sprite, clip and controller artifacts
//! - Idempotence: re-importing unchanged input writes nothing
//! - Batches: a failing file never stops the others
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p spriteport-tests
//!
//! # Only the subprocess tests (Unix, uses a shell script as the tool)
//! cargo test -p spriteport-tests --test e2e_tool
//! ```
//!
//! Most suites use [`fixtures::FakeExporter`] in place of Aseprite, so no
//! installation is needed.

pub mod fixtures;

pub use fixtures::{
    sheet_json, sheet_json_mapping, tree_hashes, FakeExporter, ProjectFixture, TagSpec,
};
