//! Output formatting for the CLI.
//!
//! This module provides human-readable and JSON output for the result of
//! handling one event.

use crate::cli::dry_run::PlannedAction;
use colored::Colorize;
use serde::Serialize;
use sig_welcome_core::hosting::EventTarget;
use sig_welcome_core::{WelcomeError, WelcomeEvent, WelcomeOutcome};
use std::io::Write;

/// Whether the event was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    /// Comment and label were posted (or planned, in a dry run).
    Welcomed,
    /// The owners could not be resolved; nothing was posted.
    Unresolved,
    /// Owners were resolved but posting failed.
    DeliveryFailed,
}

/// The result of handling one event, in output form.
#[derive(Debug, Serialize)]
pub struct WelcomeReport {
    /// Repository in `org/repo` form.
    pub repository: String,
    /// The issue or merge request.
    pub target: EventTarget,
    /// Who opened it.
    pub author: String,
    /// Whether writes were only recorded.
    pub dry_run: bool,
    /// Overall status.
    pub status: ReportStatus,
    /// The SIG owning the repository, when resolved.
    pub sig: Option<String>,
    /// The label attached, when resolved.
    pub label: Option<String>,
    /// Maintainers mentioned.
    pub maintainers: Vec<String>,
    /// Committers mentioned.
    pub committers: Vec<String>,
    /// The comment body, when resolved.
    pub comment: Option<String>,
    /// Writes recorded in a dry run.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub planned_actions: Vec<PlannedAction>,
    /// Error messages.
    pub errors: Vec<String>,
}

impl WelcomeReport {
    /// Builds a report from the handler's result.
    pub fn new(
        event: &WelcomeEvent,
        dry_run: bool,
        result: &Result<WelcomeOutcome, WelcomeError>,
        planned_actions: Vec<PlannedAction>,
    ) -> Self {
        let mut report = Self {
            repository: event.repo.to_string(),
            target: event.target,
            author: event.author.clone(),
            dry_run,
            status: ReportStatus::Welcomed,
            sig: None,
            label: None,
            maintainers: Vec::new(),
            committers: Vec::new(),
            comment: None,
            planned_actions,
            errors: Vec::new(),
        };

        match result {
            Ok(outcome) => report.fill(outcome),
            Err(WelcomeError::Delivery { outcome, errors }) => {
                report.fill(outcome);
                report.status = ReportStatus::DeliveryFailed;
                report.errors = errors.iter().map(ToString::to_string).collect();
            }
            Err(e @ WelcomeError::Resolution(_)) => {
                report.status = ReportStatus::Unresolved;
                report.errors.push(e.to_string());
            }
        }
        report
    }

    fn fill(&mut self, outcome: &WelcomeOutcome) {
        self.sig = Some(outcome.sig.clone());
        self.label = Some(outcome.label.clone());
        self.maintainers = outcome.owners.maintainers.clone();
        self.committers = outcome.owners.committers.clone();
        self.comment = Some(outcome.comment.clone());
    }

    /// Returns true if the event was handled.
    pub fn is_success(&self) -> bool {
        self.status == ReportStatus::Welcomed
    }

    /// Writes the report as human-readable text.
    pub fn write_human<W: Write>(&self, writer: &mut W, use_colors: bool) -> std::io::Result<()> {
        HumanOutput::new(writer, use_colors).write_report(self)
    }

    /// Writes the report as JSON.
    pub fn write_json<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        writeln!(writer, "{}", json)
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

    /// Writes a section header.
    pub fn write_header(&mut self, title: &str) -> std::io::Result<()> {
        let header = format!("==> {}", title);
        if self.use_colors {
            writeln!(self.writer, "{}", header.cyan().bold())
        } else {
            writeln!(self.writer, "{}", header)
        }
    }

    /// Writes a whole report.
    pub fn write_report(&mut self, report: &WelcomeReport) -> std::io::Result<()> {
        self.write_header(&format!("{} {}", report.repository, report.target))?;

        if let (Some(sig), Some(label)) = (&report.sig, &report.label) {
            writeln!(self.writer, "  SIG:         {} (label {})", sig, label)?;
            writeln!(self.writer, "  Maintainers: {}", mentions(&report.maintainers))?;
            writeln!(self.writer, "  Committers:  {}", mentions(&report.committers))?;
        }

        if let Some(comment) = &report.comment {
            writeln!(self.writer, "  Comment:")?;
            for line in comment.lines() {
                writeln!(self.writer, "    | {}", line)?;
            }
        }

        if !report.planned_actions.is_empty() {
            writeln!(self.writer, "  Planned (dry run):")?;
            for action in &report.planned_actions {
                writeln!(self.writer, "    - {}", describe(action))?;
            }
        }

        for error in &report.errors {
            self.write_error(error)?;
        }

        self.write_summary(report)
    }

    /// Writes the closing status line.
    pub fn write_summary(&mut self, report: &WelcomeReport) -> std::io::Result<()> {
        writeln!(self.writer)?;

        let message = match report.status {
            ReportStatus::Welcomed if report.dry_run => {
                format!("✓ Would welcome {} on {}", report.author, report.target)
            }
            ReportStatus::Welcomed => format!("✓ Welcomed {} on {}", report.author, report.target),
            ReportStatus::Unresolved => {
                format!("✗ Could not resolve owners for {}", report.repository)
            }
            ReportStatus::DeliveryFailed => format!(
                "✗ Welcome on {} partially failed with {} error(s)",
                report.target,
                report.errors.len()
            ),
        };

        if !self.use_colors {
            writeln!(self.writer, "{}", message)
        } else if report.is_success() {
            writeln!(self.writer, "{}", message.green().bold())
        } else {
            writeln!(self.writer, "{}", message.red().bold())
        }
    }

    /// Writes an error message.
    pub fn write_error(&mut self, message: &str) -> std::io::Result<()> {
        if self.use_colors {
            writeln!(self.writer, "{} {}", "Error:".red().bold(), message)
        } else {
            writeln!(self.writer, "Error: {}", message)
        }
    }
}

fn mentions(names: &[String]) -> String {
    if names.is_empty() {
        "(none)".to_string()
    } else {
        names
            .iter()
            .map(|n| format!("@{}", n))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn describe(action: &PlannedAction) -> String {
    match action {
        PlannedAction::Comment { target, .. } => format!("comment on {}", target),
        PlannedAction::CreateLabel { name } => format!("create label {}", name),
        PlannedAction::AddLabel { target, name } => format!("add label {} to {}", name, target),
    }
}
