//! Group and Court: one physical playing area with its own queue and timer.

use serde::{Deserialize, Serialize};

/// Players scheduled to play together, in the order they were entered.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Group(Vec<String>);

impl Group {
    /// Build a group from raw names: each name is trimmed and blank names are dropped.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            names
                .into_iter()
                .map(|n| n.as_ref().trim().to_string())
                .filter(|n| !n.is_empty())
                .collect(),
        )
    }

    pub fn players(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Scheduling state for a single court.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Court {
    /// Stable name used for display and lookup (e.g. "Court 1", "Door").
    pub name: String,
    /// Group currently on court; empty when nobody is playing.
    pub current_group: Group,
    /// Waiting groups, first in first out.
    pub queue: Vec<Group>,
    pub remaining_seconds: u32,
    pub total_seconds: u32,
    /// Countdown is decrementing. Only ever true while a group is on court.
    pub is_running: bool,
}

impl Court {
    /// Create an idle court with an empty queue and a full timer.
    pub fn new(name: impl Into<String>, total_seconds: u32) -> Self {
        Self {
            name: name.into(),
            current_group: Group::default(),
            queue: Vec::new(),
            remaining_seconds: total_seconds,
            total_seconds,
            is_running: false,
        }
    }

    /// A group is on court.
    pub fn is_active(&self) -> bool {
        !self.current_group.is_empty()
    }

    /// Return the court to its freshly created shape (name kept).
    pub fn reset(&mut self, total_seconds: u32) {
        *self = Self::new(std::mem::take(&mut self.name), total_seconds);
    }

    /// Stop the timer and refill it.
    pub(crate) fn stop_and_refill(&mut self) {
        self.is_running = false;
        self.remaining_seconds = self.total_seconds;
    }

    /// Replace the current group with the queue head, or with nobody if the queue is empty.
    pub(crate) fn promote_next(&mut self) {
        self.current_group = if self.queue.is_empty() {
            Group::default()
        } else {
            self.queue.remove(0)
        };
    }

    /// Change the session length. An idle court is refilled; a running court keeps its
    /// remaining time, capped at the new total.
    pub(crate) fn set_total_seconds(&mut self, total_seconds: u32) {
        self.total_seconds = total_seconds;
        if self.is_running {
            self.remaining_seconds = self.remaining_seconds.min(total_seconds);
        } else {
            self.remaining_seconds = total_seconds;
        }
    }

    /// Check the timer bounds and the running-implies-active rule.
    pub fn check_invariants(&self) -> Result<(), String> {
        if self.remaining_seconds > self.total_seconds {
            return Err(format!(
                "{}: remaining {}s exceeds total {}s",
                self.name, self.remaining_seconds, self.total_seconds
            ));
        }
        if self.is_running && !self.is_active() {
            return Err(format!("{}: timer running with nobody on court", self.name));
        }
        Ok(())
    }
}
