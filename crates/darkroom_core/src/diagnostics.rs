//! Append-only diagnostic log.
//!
//! Recoverable failures during ingestion and derivation are recorded here
//! instead of failing the upload. Each entry is also emitted through `tracing`.

use crate::Capability;
use chrono::{DateTime, Utc};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{info, warn};

/// What kind of degradation a diagnostic reports.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
pub enum DiagnosticCategory {
    /// An optional tool is disabled, so a branch was skipped
    #[display("capability-disabled")]
    CapabilityDisabled,
    /// Rendering a variant failed
    #[display("render-failed")]
    RenderFailed,
    /// Probing a video failed
    #[display("probe-failed")]
    ProbeFailed,
    /// Metadata extraction returned less than expected
    #[display("metadata-degraded")]
    MetadataDegraded,
    /// Live photo pairing found something unexpected
    #[display("pairing-anomaly")]
    PairingAnomaly,
    /// A storage cleanup or relocation failed after the fact
    #[display("storage-failed")]
    StorageFailed,
}

/// One log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct Diagnostic {
    /// Category of the entry
    category: DiagnosticCategory,
    /// Record id or file name the entry is about
    subject: String,
    /// Human-readable message
    message: String,
    /// When the entry was written
    recorded_at: DateTime<Utc>,
}

impl Diagnostic {
    /// Whether every fragment occurs in the message, in order.
    ///
    /// `matches(&["FFmpeg", "disabled"])` behaves like the SQL pattern
    /// `%FFmpeg%disabled%`.
    pub fn matches(&self, fragments: &[&str]) -> bool {
        let mut rest = self.message.as_str();
        for fragment in fragments {
            match rest.find(fragment) {
                Some(index) => rest = &rest[index + fragment.len()..],
                None => return false,
            }
        }
        true
    }
}

#[derive(Debug, Default)]
struct LogState {
    entries: Vec<Diagnostic>,
    disabled_reported: HashSet<(String, Capability)>,
}

/// Shared, cloneable diagnostic sink.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticLog {
    state: Arc<Mutex<LogState>>,
}

impl DiagnosticLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, LogState> {
        // Entries are plain data; a panic mid-push cannot leave them inconsistent.
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Append an entry.
    pub fn record(
        &self,
        category: DiagnosticCategory,
        subject: impl Into<String>,
        message: impl Into<String>,
    ) {
        let entry = Diagnostic {
            category,
            subject: subject.into(),
            message: message.into(),
            recorded_at: Utc::now(),
        };
        match category {
            DiagnosticCategory::CapabilityDisabled => {
                info!(category = %category, subject = %entry.subject, "{}", entry.message)
            }
            _ => warn!(category = %category, subject = %entry.subject, "{}", entry.message),
        }
        self.state().entries.push(entry);
    }

    /// Report that `capability` is disabled while handling `subject`.
    ///
    /// Writes at most one entry per (subject, capability). Returns whether an
    /// entry was written.
    pub fn capability_disabled(
        &self,
        subject: impl Into<String>,
        capability: Capability,
        context: &str,
    ) -> bool {
        let subject = subject.into();
        {
            let mut state = self.state();
            if !state
                .disabled_reported
                .insert((subject.clone(), capability))
            {
                return false;
            }
        }
        self.record(
            DiagnosticCategory::CapabilityDisabled,
            subject,
            format!("{} is disabled: {}", capability, context),
        );
        true
    }

    /// Forget which capabilities were reported for `subject`.
    ///
    /// Call once the subject's upload or backfill step is over; the
    /// once-per-subject guarantee only needs to hold while it is in flight.
    pub fn release(&self, subject: &str) {
        self.state()
            .disabled_reported
            .retain(|(reported, _)| reported != subject);
    }

    /// Report a failed video probe.
    pub fn probe_failed(&self, subject: impl Into<String>, error: impl std::fmt::Display) {
        let subject = subject.into();
        let message = format!("ffprobe failed for {}: {}", subject, error);
        self.record(DiagnosticCategory::ProbeFailed, subject, message);
    }

    /// Report a failed variant render.
    pub fn render_failed(
        &self,
        subject: impl Into<String>,
        variant: impl std::fmt::Display,
        error: impl std::fmt::Display,
    ) {
        let subject = subject.into();
        let message = format!("Could not render {} for {}: {}", variant, subject, error);
        self.record(DiagnosticCategory::RenderFailed, subject, message);
    }

    /// Snapshot of all entries in write order.
    pub fn entries(&self) -> Vec<Diagnostic> {
        self.state().entries.clone()
    }

    /// Entries of one category.
    pub fn by_category(&self, category: DiagnosticCategory) -> Vec<Diagnostic> {
        self.state()
            .entries
            .iter()
            .filter(|entry| entry.category == category)
            .cloned()
            .collect()
    }

    /// Number of entries whose message matches `fragments` in order.
    pub fn count_matching(&self, fragments: &[&str]) -> usize {
        self.state()
            .entries
            .iter()
            .filter(|entry| entry.matches(fragments))
            .count()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.state().entries.len()
    }

    /// Whether nothing has been logged.
    pub fn is_empty(&self) -> bool {
        self.state().entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_disabled_is_written_once_per_subject() {
        let log = DiagnosticLog::new();
        assert!(log.capability_disabled("clip.mov", Capability::FFmpeg, "no thumb"));
        assert!(!log.capability_disabled("clip.mov", Capability::FFmpeg, "no small"));
        assert!(log.capability_disabled("clip.mov", Capability::ExifTool, "no metadata"));
        assert!(log.capability_disabled("other.mov", Capability::FFmpeg, "no thumb"));
        assert_eq!(log.count_matching(&["FFmpeg", "disabled"]), 2);
    }

    #[test]
    fn test_release_drops_dedup_state_but_keeps_entries() {
        let log = DiagnosticLog::new();
        for subject in ["a.mov", "b.mov", "c.mov"] {
            log.capability_disabled(subject, Capability::FFmpeg, "no thumb");
            log.capability_disabled(subject, Capability::ExifTool, "no metadata");
            log.release(subject);
        }
        assert!(log.state().disabled_reported.is_empty());
        assert_eq!(log.len(), 6);

        log.capability_disabled("d.mov", Capability::FFmpeg, "no thumb");
        log.release("a.mov");
        assert_eq!(log.state().disabled_reported.len(), 1);
    }

    #[test]
    fn test_fragments_must_appear_in_order() {
        let log = DiagnosticLog::new();
        log.probe_failed("motion.jpg", "exit status 1");
        assert_eq!(log.count_matching(&["ffprobe", "failed"]), 1);
        assert_eq!(log.count_matching(&["failed", "ffprobe"]), 0);
        assert_eq!(log.by_category(DiagnosticCategory::ProbeFailed).len(), 1);
    }
}
