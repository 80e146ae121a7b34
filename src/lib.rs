//! Wrapper around Apple's `safari-web-extension-converter`.
//!
//! The converter reports its results as loosely formatted text and writes
//! wrong bundle identifiers into the project it generates. This crate turns
//! that text into typed fields and repairs the generated project.

pub mod config;
pub mod contexts;
pub mod data;
pub mod error;
pub mod pbxproj;
pub mod run_log;
pub mod schemes;
