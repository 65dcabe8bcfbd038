//! Continuity classification of consecutive data records.
//!
//! Input files may overlap: the last record of one file is commonly
//! repeated as the first record of the next. Each record is compared with
//! the last accepted one using the `[start, end]` dates it carries in its
//! first two values.

use crate::context::JdSpan;

/// Outcome of comparing a record with the previously accepted one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Continuity {
    /// Nothing to compare with (first record, or degenerate previous span).
    /// The record is written and becomes the reference.
    NotChecked(JdSpan),
    /// The record starts where the previous one ended. Written, becomes the reference.
    Continuation(JdSpan),
    /// The record repeats the previous one exactly. Skipped.
    Duplication,
    /// Any other relation: a gap, an overlap or a reordering.
    OutOfSequence { previous: JdSpan, found: JdSpan },
}

impl Continuity {
    /// Span to adopt as the new reference, for accepted records.
    pub fn accepted_span(&self) -> Option<JdSpan> {
        match self {
            Continuity::NotChecked(span) | Continuity::Continuation(span) => Some(*span),
            Continuity::Duplication | Continuity::OutOfSequence { .. } => None,
        }
    }
}

/// Classify `candidate` against the last accepted span.
///
/// Dates are compared exactly, without tolerance.
pub fn classify(previous: Option<JdSpan>, candidate: JdSpan) -> Continuity {
    match previous {
        None => Continuity::NotChecked(candidate),
        Some(previous) if previous.is_degenerate() => Continuity::NotChecked(candidate),
        Some(previous) if previous == candidate => Continuity::Duplication,
        Some(previous) if previous.end == candidate.start => Continuity::Continuation(candidate),
        Some(previous) => Continuity::OutOfSequence {
            previous,
            found: candidate,
        },
    }
}
