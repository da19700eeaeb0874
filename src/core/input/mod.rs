//! Loading and validating gradebook input files

pub mod validation;
pub mod yaml_parser;

pub use validation::{validate, IssueKind, ValidationIssue};
pub use yaml_parser::{load_gradebook, parse_gradebook, LoadError};
