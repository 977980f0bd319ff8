//! What a run did, and what it skipped.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// A reserved-namespace cross-reference that does not parse as a URI
    /// with a fragment.
    MalformedCrossReference,
    /// No counterpart for a class or property reference.
    UnresolvedReference,
    /// Flagged with the ignore annotation.
    Ignored,
    /// The target class already carries an equal restriction.
    DuplicateRestriction,
    /// The restriction or expression became empty after filtering.
    VacuousRestriction,
    /// The copy resolved to a class the target graph does not own.
    ForeignClass,
    /// The attachment annotation names no known model class.
    MissingAttachment,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipNote {
    pub subject: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub classes_created: usize,
    pub properties_created: usize,
    pub restrictions_attached: usize,
    pub links_written: usize,
    pub skipped: Vec<SkipNote>,
}

impl RunReport {
    pub(crate) fn skip(&mut self, subject: impl Into<String>, reason: SkipReason) {
        let subject = subject.into();
        match reason {
            SkipReason::MalformedCrossReference | SkipReason::MissingAttachment => {
                tracing::warn!(subject = %subject, reason = ?reason, "skipping");
            }
            _ => tracing::debug!(subject = %subject, reason = ?reason, "skipping"),
        }
        self.skipped.push(SkipNote { subject, reason });
    }

    pub fn skipped_for(&self, reason: SkipReason) -> impl Iterator<Item = &SkipNote> {
        self.skipped.iter().filter(move |n| n.reason == reason)
    }
}
