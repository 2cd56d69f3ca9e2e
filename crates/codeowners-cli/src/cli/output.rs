//! Output formatting for the CLI.
//!
//! This module provides human-readable and JSON output formatters for
//! per-path ownership reports.

use codeowners_resolver_core::{
    Identity, MatchError, OwnershipTable, ResolutionOutcome, ResolveError,
};
use colored::Colorize;
use serde::Serialize;
use std::io::Write;

/// A single error in JSON format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JsonIssue {
    /// Machine-readable error kind.
    pub kind: &'static str,
    /// Human-readable message.
    pub message: String,
}

impl From<&ResolveError> for JsonIssue {
    fn from(error: &ResolveError) -> Self {
        Self {
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

/// What was found for one path.
#[derive(Debug, Serialize)]
pub struct PathReport {
    /// The repository-relative path.
    pub path: String,
    /// The owner tokens of the matching rule.
    pub specifiers: Vec<String>,
    /// The resolved identities. Absent when resolution was skipped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identities: Option<Vec<Identity>>,
    /// Errors from matching or resolution.
    pub errors: Vec<JsonIssue>,
    /// True if resolution was cut short.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub cancelled: bool,
}

impl PathReport {
    /// Creates a report from a match, without resolution.
    pub fn matched(path: impl Into<String>, matched: Result<&[String], MatchError>) -> Self {
        let (specifiers, errors) = match matched {
            Ok(specifiers) => (specifiers.to_vec(), Vec::new()),
            Err(e) => (Vec::new(), vec![JsonIssue::from(&ResolveError::from(e))]),
        };
        Self {
            path: path.into(),
            specifiers,
            identities: None,
            errors,
            cancelled: false,
        }
    }

    /// Creates a report from a resolution.
    pub fn resolved(
        path: impl Into<String>,
        specifiers: &[String],
        outcome: ResolutionOutcome,
    ) -> Self {
        Self {
            path: path.into(),
            specifiers: specifiers.to_vec(),
            errors: outcome.errors.iter().map(JsonIssue::from).collect(),
            identities: Some(outcome.identities),
            cancelled: outcome.cancelled,
        }
    }

    /// Returns true if the path has an owner: at least one identity, or a
    /// matching rule when resolution was skipped.
    pub fn is_owned(&self) -> bool {
        match &self.identities {
            Some(identities) => !identities.is_empty(),
            None => !self.specifiers.is_empty(),
        }
    }
}

/// Output formatter for human-readable console output.
pub struct HumanOutput<W: Write> {
    writer: W,
    use_colors: bool,
}

impl<W: Write> HumanOutput<W> {
    /// Creates a new human output formatter.
    pub fn new(writer: W, use_colors: bool) -> Self {
        Self { writer, use_colors }
    }

    /// Writes a header for a path.
    pub fn write_path_header(&mut self, path: &str) -> std::io::Result<()> {
        let header = format!("==> {}", path);
        if self.use_colors {
            writeln!(self.writer, "\n{}", header.cyan().bold())
        } else {
            writeln!(self.writer, "\n{}", header)
        }
    }

    /// Writes the report for one path.
    pub fn write_report(&mut self, report: &PathReport) -> std::io::Result<()> {
        self.write_path_header(&report.path)?;

        match &report.identities {
            Some(identities) => {
                for identity in identities {
                    writeln!(self.writer, "  {}", identity)?;
                }
            }
            None => {
                for specifier in &report.specifiers {
                    writeln!(self.writer, "  {}", specifier)?;
                }
            }
        }

        // Errors are warnings when the path still got an owner.
        let label = if report.is_owned() { "WARN" } else { "ERROR" };
        for issue in &report.errors {
            self.write_issue(label, &issue.message)?;
        }
        if report.cancelled {
            self.write_issue("WARN", "resolution was cancelled, results are partial")?;
        }

        Ok(())
    }

    /// Writes a single labelled issue.
    pub fn write_issue(&mut self, label: &str, message: &str) -> std::io::Result<()> {
        if self.use_colors {
            let colored_label = match label {
                "ERROR" => format!("[{}]", label).red().bold(),
                _ => format!("[{}]", label).yellow().bold(),
            };
            writeln!(self.writer, "  {} {}", colored_label, message)
        } else {
            writeln!(self.writer, "  [{}] {}", label, message)
        }
    }

    /// Writes a summary line.
    pub fn write_summary(&mut self, total: usize, unowned: usize) -> std::io::Result<()> {
        writeln!(self.writer)?;

        if unowned == 0 {
            let message = format!("✓ Found owners for {} path(s)", total);
            if self.use_colors {
                writeln!(self.writer, "{}", message.green().bold())
            } else {
                writeln!(self.writer, "{}", message)
            }
        } else {
            let message = format!("✗ {} of {} path(s) have no owner", unowned, total);
            if self.use_colors {
                writeln!(self.writer, "{}", message.red().bold())
            } else {
                writeln!(self.writer, "{}", message)
            }
        }
    }

    /// Writes a startup error.
    pub fn write_error(&mut self, message: &str) -> std::io::Result<()> {
        if self.use_colors {
            writeln!(self.writer, "{} {}", "Error:".red().bold(), message)
        } else {
            writeln!(self.writer, "Error: {}", message)
        }
    }
}

/// Reports for every requested path, in request order.
#[derive(Debug, Default, Serialize)]
pub struct Reports {
    paths: Vec<PathReport>,
}

impl Reports {
    /// Creates a new empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a report.
    pub fn add(&mut self, report: PathReport) {
        self.paths.push(report);
    }

    /// Returns the number of paths without an owner.
    pub fn unowned(&self) -> usize {
        self.paths.iter().filter(|r| !r.is_owned()).count()
    }

    /// Returns true if every path has an owner.
    pub fn all_owned(&self) -> bool {
        self.unowned() == 0
    }

    /// Iterates over the reports in order.
    pub fn iter(&self) -> impl Iterator<Item = &PathReport> {
        self.paths.iter()
    }

    /// Writes reports in human-readable format.
    pub fn write_human<W: Write>(&self, writer: &mut W, use_colors: bool) -> std::io::Result<()> {
        let mut output = HumanOutput::new(writer, use_colors);

        for report in self.iter() {
            output.write_report(report)?;
        }

        output.write_summary(self.paths.len(), self.unowned())
    }

    /// Writes reports in JSON format.
    pub fn write_json<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        writeln!(writer, "{}", json)
    }
}

/// A rule in JSON format.
#[derive(Debug, Serialize)]
struct JsonRule<'a> {
    pattern: &'a str,
    owners: &'a [String],
}

/// Writes the rule table in JSON format.
pub fn write_rules_json<W: Write>(table: &OwnershipTable, writer: &mut W) -> std::io::Result<()> {
    let rules: Vec<JsonRule<'_>> = table
        .rules()
        .iter()
        .map(|rule| JsonRule {
            pattern: &rule.pattern,
            owners: &rule.specifiers,
        })
        .collect();
    let json = serde_json::to_string_pretty(&serde_json::json!({ "rules": rules }))
        .map_err(std::io::Error::other)?;
    writeln!(writer, "{}", json)
}
