//! Core grade calculations, input handling and reporting

pub mod classify;
pub mod config;
pub mod grades;
pub mod input;
pub mod models;
pub mod report;
pub mod simulation;

/// Returns the current version of the `degree-forecast` crate
#[must_use]
pub const fn get_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
