// crates/suite-harness-core/src/runtime/audit.rs
// ============================================================================
// Module: Harness Audit Logging
// Description: Structured audit events for the test lifecycle.
// Purpose: Emit lifecycle events as JSON lines without hard dependencies.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Every lifecycle phase records a [`HarnessAuditEvent`] through a
//! [`HarnessAuditSink`]. Sinks write JSON lines to stderr or to an
//! append-only file, or drop events entirely.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Lifecycle phase classification.
///
/// # Invariants
/// - Variants are stable for audit labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HarnessPhase {
    /// Service reset pass.
    ResetServices,
    /// Sealed set-up phase.
    BeforeEach,
    /// Test body.
    Body,
    /// Sealed tear-down phase.
    AfterEach,
    /// Session user swap.
    SessionSwap,
}

impl HarnessPhase {
    /// Returns a stable label for the phase.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ResetServices => "reset_services",
            Self::BeforeEach => "before_each",
            Self::Body => "body",
            Self::AfterEach => "after_each",
            Self::SessionSwap => "session_swap",
        }
    }
}

impl fmt::Display for HarnessPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle outcome classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HarnessOutcome {
    /// Phase completed.
    Ok,
    /// Phase failed.
    Error,
}

/// Harness audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct HarnessAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Test case name.
    pub test_case: String,
    /// Lifecycle phase.
    pub phase: HarnessPhase,
    /// Phase outcome.
    pub outcome: HarnessOutcome,
    /// Failure detail or phase-specific note.
    pub detail: Option<String>,
}

impl HarnessAuditEvent {
    /// Builds an event stamped with the current time.
    #[must_use]
    pub fn new(
        test_case: &str,
        phase: HarnessPhase,
        outcome: HarnessOutcome,
        detail: Option<String>,
    ) -> Self {
        Self {
            event: "harness_lifecycle",
            timestamp_ms: now_millis(),
            test_case: test_case.to_string(),
            phase,
            outcome,
            detail,
        }
    }
}

/// Returns the current time in milliseconds since the Unix epoch.
fn now_millis() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis()
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Audit sink for harness lifecycle events.
pub trait HarnessAuditSink: Send + Sync {
    /// Record an audit event.
    fn record(&self, event: &HarnessAuditEvent);
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrHarnessAuditSink;

impl HarnessAuditSink for StderrHarnessAuditSink {
    fn record(&self, event: &HarnessAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that logs JSON lines to a file.
pub struct FileHarnessAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileHarnessAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl HarnessAuditSink for FileHarnessAuditSink {
    fn record(&self, event: &HarnessAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// No-op audit sink.
pub struct NoopHarnessAuditSink;

impl HarnessAuditSink for NoopHarnessAuditSink {
    fn record(&self, _event: &HarnessAuditEvent) {}
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only assertions favor direct unwrap/expect for clarity."
    )]

    use super::FileHarnessAuditSink;
    use super::HarnessAuditEvent;
    use super::HarnessAuditSink;
    use super::HarnessOutcome;
    use super::HarnessPhase;

    #[test]
    fn file_sink_appends_json_lines() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("audit.jsonl");
        let sink = FileHarnessAuditSink::new(&path).expect("open sink");
        sink.record(&HarnessAuditEvent::new(
            "case",
            HarnessPhase::BeforeEach,
            HarnessOutcome::Ok,
            None,
        ));
        sink.record(&HarnessAuditEvent::new(
            "case",
            HarnessPhase::AfterEach,
            HarnessOutcome::Error,
            Some("leak".to_string()),
        ));
        let content = std::fs::read_to_string(&path).expect("read log");
        let lines: Vec<serde_json::Value> =
            content.lines().map(|line| serde_json::from_str(line).expect("json line")).collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["phase"], "before_each");
        assert_eq!(lines[1]["outcome"], "error");
        assert_eq!(lines[1]["detail"], "leak");
    }

    #[test]
    fn phase_labels_match_serialized_form() {
        for phase in [
            HarnessPhase::ResetServices,
            HarnessPhase::BeforeEach,
            HarnessPhase::Body,
            HarnessPhase::AfterEach,
            HarnessPhase::SessionSwap,
        ] {
            let json = serde_json::to_value(phase).expect("serialize");
            assert_eq!(json, phase.as_str());
        }
    }
}
