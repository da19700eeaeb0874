//! Structural validation of a gradebook document
//!
//! Runs over the untyped YAML tree before anything is deserialized, so every
//! problem in the file is reported at once with the path of the offending
//! field (e.g. `units.0.assessments.1.mark`).

use serde_yaml::{Mapping, Value};
use std::fmt;

/// Category of a validation problem
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueKind {
    /// A required field is absent
    Missing,
    /// Expected a mapping
    DictType,
    /// Expected a sequence
    ListType,
    /// Expected a string
    StringType,
    /// Expected an integer
    IntType,
    /// Expected a number
    FloatType,
    /// Right type, unacceptable value
    ValueError,
}

impl IssueKind {
    /// Short machine-readable name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Missing => "missing",
            Self::DictType => "dict_type",
            Self::ListType => "list_type",
            Self::StringType => "string_type",
            Self::IntType => "int_type",
            Self::FloatType => "float_type",
            Self::ValueError => "value_error",
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One problem found in the input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Dotted path to the field (`<root>` for the document itself)
    pub path: String,
    /// Human-readable description
    pub message: String,
    /// Problem category
    pub kind: IssueKind,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} ({})", self.path, self.message, self.kind)
    }
}

const DICT_MSG: &str = "Input should be a valid dictionary";
const LIST_MSG: &str = "Input should be a valid list";
const STRING_MSG: &str = "Input should be a valid string";
const INT_MSG: &str = "Input should be a valid integer";
const FLOAT_MSG: &str = "Input should be a valid number";
const MISSING_MSG: &str = "Field required";

#[derive(Default)]
struct Validator {
    path: Vec<String>,
    issues: Vec<ValidationIssue>,
}

impl Validator {
    fn report(&mut self, message: &str, kind: IssueKind) {
        let path = if self.path.is_empty() {
            "<root>".to_string()
        } else {
            self.path.join(".")
        };
        self.issues.push(ValidationIssue {
            path,
            message: message.to_string(),
            kind,
        });
    }

    fn value_error(&mut self, message: &str) {
        self.report(&format!("Value error, {message}"), IssueKind::ValueError);
    }

    /// Run `check` with `segment` appended to the current path
    fn nested<F: FnOnce(&mut Self)>(&mut self, segment: impl ToString, check: F) {
        self.path.push(segment.to_string());
        check(self);
        self.path.pop();
    }

    /// Look up a required key, reporting it as missing when absent
    fn required<'v>(&mut self, map: &'v Mapping, key: &str) -> Option<&'v Value> {
        let value = map.get(key);
        if value.is_none() {
            self.nested(key, |v| v.report(MISSING_MSG, IssueKind::Missing));
        }
        value
    }

    fn mapping<'v>(&mut self, value: &'v Value) -> Option<&'v Mapping> {
        let map = value.as_mapping();
        if map.is_none() {
            self.report(DICT_MSG, IssueKind::DictType);
        }
        map
    }

    fn sequence<'v>(&mut self, value: &'v Value) -> Option<&'v [Value]> {
        let seq = value.as_sequence().map(Vec::as_slice);
        if seq.is_none() {
            self.report(LIST_MSG, IssueKind::ListType);
        }
        seq
    }

    fn string(&mut self, value: &Value) {
        if !value.is_string() {
            self.report(STRING_MSG, IssueKind::StringType);
        }
    }

    fn integer(&mut self, value: &Value) -> Option<i128> {
        let int = match value {
            Value::Number(n) => n
                .as_i64()
                .map(i128::from)
                .or_else(|| n.as_u64().map(i128::from)),
            _ => None,
        };
        if int.is_none() {
            self.report(INT_MSG, IssueKind::IntType);
        }
        int
    }

    fn number(&mut self, value: &Value) -> Option<f64> {
        let num = match value {
            Value::Number(n) => n.as_f64(),
            _ => None,
        };
        if num.is_none() {
            self.report(FLOAT_MSG, IssueKind::FloatType);
        }
        num
    }

    fn name_field(&mut self, map: &Mapping) {
        if let Some(name) = self.required(map, "name") {
            self.nested("name", |v| v.string(name));
        }
    }

    fn document(&mut self, document: &Value) {
        let Some(root) = self.mapping(document) else {
            return;
        };

        if let Some(units) = self.required(root, "units") {
            self.nested("units", |v| v.units(units));
        }

        match root.get("classifications") {
            None | Some(Value::Null) => {}
            Some(bands) => self.nested("classifications", |v| v.classifications(bands)),
        }
    }

    fn units(&mut self, units: &Value) {
        let Some(units) = self.sequence(units) else {
            return;
        };
        if units.is_empty() {
            self.value_error("At least one unit is required");
        }
        for (idx, unit) in units.iter().enumerate() {
            self.nested(idx, |v| v.unit(unit));
        }
    }

    fn unit(&mut self, unit: &Value) {
        let Some(map) = self.mapping(unit) else {
            return;
        };

        self.name_field(map);

        if let Some(credits) = self.required(map, "credits") {
            self.nested("credits", |v| {
                if let Some(credits) = v.integer(credits) {
                    if credits <= 0 {
                        v.value_error("Credits must be a positive integer");
                    } else if credits > i128::from(u32::MAX) {
                        v.value_error("Credits must be at most 4294967295");
                    }
                }
            });
        }

        if let Some(assessments) = self.required(map, "assessments") {
            self.nested("assessments", |v| {
                if let Some(assessments) = v.sequence(assessments) {
                    for (idx, assessment) in assessments.iter().enumerate() {
                        v.nested(idx, |v| v.assessment(assessment));
                    }
                }
            });
        }
    }

    fn assessment(&mut self, assessment: &Value) {
        let Some(map) = self.mapping(assessment) else {
            return;
        };

        self.name_field(map);

        if let Some(weight) = self.required(map, "weight") {
            self.nested("weight", |v| {
                if let Some(weight) = v.integer(weight) {
                    if !(0..=100).contains(&weight) {
                        v.value_error("Weight must be between 0 and 100");
                    }
                }
            });
        }

        match map.get("mark") {
            None | Some(Value::Null) => {}
            Some(mark) => self.nested("mark", |v| {
                if let Some(mark) = v.number(mark) {
                    if !(0.0..=100.0).contains(&mark) {
                        v.value_error("Mark must be between 0 and 100, or null");
                    }
                }
            }),
        }
    }

    fn classifications(&mut self, bands: &Value) {
        let Some(bands) = self.sequence(bands) else {
            return;
        };
        for (idx, band) in bands.iter().enumerate() {
            self.nested(idx, |v| v.band(band));
        }
    }

    fn band(&mut self, band: &Value) {
        let Some(map) = self.mapping(band) else {
            return;
        };

        self.name_field(map);

        if let Some(threshold) = self.required(map, "threshold") {
            self.nested("threshold", |v| {
                if let Some(threshold) = v.number(threshold) {
                    if !(0.0..=100.0).contains(&threshold) {
                        v.value_error("Threshold must be between 0 and 100");
                    }
                }
            });
        }
    }
}

/// Check a parsed gradebook document and collect every problem found.
///
/// An empty result means the document can be deserialized into a
/// [`Gradebook`](crate::core::models::Gradebook) and satisfies the ranges the
/// calculations rely on: at least one unit, positive credits, weights and
/// marks within 0-100, thresholds within 0-100.
#[must_use]
pub fn validate(document: &Value) -> Vec<ValidationIssue> {
    let mut validator = Validator::default();
    validator.document(document);
    validator.issues
}
