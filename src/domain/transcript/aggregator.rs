//! Transcript aggregation

use super::segment::Segment;

/// View of the accumulated text for one capture session.
///
/// `finalized` is append-only within a session; `provisional` is the current
/// interim tail and is replaced wholesale each time the engine revises it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Utterance {
    pub finalized: String,
    pub provisional: String,
}

/// Merges engine segments into one ordered, duplicate-free utterance.
///
/// Engines that restart mid-session may redeliver results they already
/// reported; the sequence guard drops anything at or below the highest
/// sequence number seen so far.
#[derive(Debug, Clone, Default)]
pub struct TranscriptAggregator {
    finalized: String,
    provisional: String,
    last_sequence: Option<u64>,
}

impl TranscriptAggregator {
    /// Create an empty aggregator
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one segment and return the resulting utterance view.
    ///
    /// Final segments append their text (plus a separating space) to the
    /// finalized buffer and clear the provisional buffer. Interim segments
    /// replace the provisional buffer. Stale sequence numbers are ignored.
    pub fn ingest(&mut self, segment: &Segment) -> Utterance {
        if let Some(last) = self.last_sequence {
            if segment.sequence() <= last {
                return self.utterance();
            }
        }
        self.last_sequence = Some(segment.sequence());

        if segment.is_final() {
            self.finalized.push_str(segment.text());
            self.finalized.push(' ');
            self.provisional.clear();
        } else {
            self.provisional.clear();
            self.provisional.push_str(segment.text());
        }

        self.utterance()
    }

    /// Replace the provisional tail by hand (manual transcript editing)
    pub fn set_provisional(&mut self, text: impl Into<String>) {
        self.provisional = text.into();
    }

    /// Get the current utterance view
    pub fn utterance(&self) -> Utterance {
        Utterance {
            finalized: self.finalized.clone(),
            provisional: self.provisional.clone(),
        }
    }

    /// The live display value: finalized text followed by the interim tail
    pub fn snapshot(&self) -> String {
        format!("{}{}", self.finalized, self.provisional)
    }

    /// The dispatch value: finalized text only, trimmed
    pub fn final_text(&self) -> String {
        self.finalized.trim().to_string()
    }

    /// Whether any finalized text has been committed
    pub fn has_final_text(&self) -> bool {
        !self.finalized.trim().is_empty()
    }
}
