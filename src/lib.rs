//! Library for `degree-forecast`
//!
//! Predicts a final degree grade from partially marked units: a
//! credit-weighted projection, guaranteed minimum and best-case bounds, and a
//! Monte Carlo distribution mapped onto classification bands.

pub mod core;
pub mod logger;

pub use crate::core::config;
pub use crate::core::get_version;
