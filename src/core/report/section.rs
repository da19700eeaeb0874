//! Titled groups of human-readable result lines

use std::fmt::Write;

/// Destination for the human-readable lines a calculation produces.
///
/// Calculations only append lines; indentation, headings and where the text
/// ends up are decided by whoever renders the collected output.
pub trait LineSink {
    /// Append one line of output
    fn push_line(&mut self, line: String);
}

impl LineSink for Vec<String> {
    fn push_line(&mut self, line: String) {
        self.push(line);
    }
}

/// A titled block of output lines for one calculation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// Heading printed above the lines
    pub title: String,
    /// Lines collected from the calculation
    pub lines: Vec<String>,
}

impl Section {
    /// Create an empty section
    #[must_use]
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            lines: Vec::new(),
        }
    }

    /// Render the title followed by each line prefixed with `indent`
    #[must_use]
    pub fn render(&self, indent: &str) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.title);
        for line in &self.lines {
            let _ = writeln!(out, "{indent}{line}");
        }
        out
    }
}

impl LineSink for Section {
    fn push_line(&mut self, line: String) {
        self.lines.push(line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec_sink_collects_lines() {
        let mut sink: Vec<String> = Vec::new();
        sink.push_line("one".to_string());
        sink.push_line("two".to_string());

        assert_eq!(sink, vec!["one", "two"]);
    }

    #[test]
    fn test_section_render_indents_lines_only() {
        let mut section = Section::new("MAXIMUM");
        section.push_line("Maximum possible degree grade: 86.67".to_string());

        assert_eq!(
            section.render("  "),
            "MAXIMUM\n  Maximum possible degree grade: 86.67\n"
        );
    }

    #[test]
    fn test_empty_section_renders_title() {
        assert_eq!(Section::new("MINIMUM/ACTUAL").render("  "), "MINIMUM/ACTUAL\n");
    }
}
