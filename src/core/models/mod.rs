//! Data models for `degree-forecast`

pub mod assessment;
pub mod classification;
pub mod gradebook;
pub mod unit;

pub use assessment::Assessment;
pub use classification::ClassificationBand;
pub use gradebook::Gradebook;
pub use unit::{normalize_units, NormalizedUnit, Unit, WeightedMark};
