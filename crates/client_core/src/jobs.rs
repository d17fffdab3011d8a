//! Per-section job bookkeeping, kept apart from the document model.

use std::collections::HashMap;

use shared::domain::SectionId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobKind {
    Generate,
    Refine,
    Feedback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JobKey {
    pub section_id: SectionId,
    pub kind: JobKind,
}

impl JobKey {
    pub fn new(section_id: SectionId, kind: JobKind) -> Self {
        Self { section_id, kind }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum JobState {
    #[default]
    Idle,
    InFlight,
    Succeeded,
    Failed {
        message: String,
    },
}

impl JobState {
    pub fn is_in_flight(&self) -> bool {
        matches!(self, Self::InFlight)
    }

    /// Error retained from the last attempt, if it failed.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Failed { message } => Some(message),
            _ => None,
        }
    }
}

/// Side table keyed by `(section, kind)`. Missing entries read as idle.
#[derive(Debug, Default)]
pub struct JobTable {
    states: HashMap<JobKey, JobState>,
}

impl JobTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, key: JobKey) -> JobState {
        self.states.get(&key).cloned().unwrap_or_default()
    }

    /// Marks `key` in flight. Returns false, leaving the entry untouched, if a
    /// job for the same key is already outstanding.
    pub fn try_begin(&mut self, key: JobKey) -> bool {
        let entry = self.states.entry(key).or_default();
        if entry.is_in_flight() {
            return false;
        }
        *entry = JobState::InFlight;
        true
    }

    pub fn finish(&mut self, key: JobKey, state: JobState) {
        debug_assert!(!state.is_in_flight(), "finish() needs a terminal state");
        self.states.insert(key, state);
    }

    pub fn is_section_busy(&self, section_id: SectionId) -> bool {
        self.states
            .iter()
            .any(|(key, state)| key.section_id == section_id && state.is_in_flight())
    }

    pub fn in_flight_count(&self) -> usize {
        self.states.values().filter(|state| state.is_in_flight()).count()
    }

    /// Drops every settled entry. In-flight entries survive so their guard
    /// keeps holding until the job completes.
    pub fn clear_settled(&mut self) {
        self.states.retain(|_, state| state.is_in_flight());
    }
}

#[cfg(test)]
#[path = "tests/jobs_tests.rs"]
mod tests;
