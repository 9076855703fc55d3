//! Local suspect selection during the vote
//!
//! Before a vote is sent the participant marks suspects locally. The number
//! of marks is capped by the quota, which equals the number of imposters,
//! and a vote may only be confirmed with exactly that many marks.

use itertools::Itertools;
use serde::Serialize;
use thiserror::Error;

use crate::snapshot::{PlayerId, VoteSet};

/// Errors that can occur while selecting suspects
#[derive(Error, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The selection already holds as many suspects as the quota allows
    #[error("you can only select up to {quota} players")]
    CapacityExceeded {
        /// The quota that would have been exceeded
        quota: usize,
    },
}

/// Outcome of toggling a suspect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    /// The suspect was added to the selection
    Selected,
    /// The suspect was removed from the selection
    Deselected,
    /// A vote was already cast, the selection is read-only
    Locked,
}

/// Suspects marked by the local participant, in the order they were marked
///
/// The selection is never persisted and never sent until confirmed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VoteSelection {
    selected: Vec<PlayerId>,
    locked: bool,
}

impl VoteSelection {
    /// Creates an empty, writable selection
    pub fn new() -> Self {
        Self::default()
    }

    /// The marked suspects in marking order
    pub fn selected(&self) -> &[PlayerId] {
        &self.selected
    }

    /// Whether `id` is currently marked
    pub fn contains(&self, id: &PlayerId) -> bool {
        self.selected.contains(id)
    }

    /// Number of marked suspects
    pub fn len(&self) -> usize {
        self.selected.len()
    }

    /// Whether nobody is marked
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Whether the selection became read-only because a vote was recorded
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Makes the selection read-only for the rest of the vote
    pub fn lock(&mut self) {
        self.locked = true;
    }

    /// Empties the selection and makes it writable again
    pub fn clear(&mut self) {
        self.selected.clear();
        self.locked = false;
    }

    /// Marks or unmarks a suspect
    ///
    /// Unmarking is always allowed. Marking is allowed only while fewer than
    /// `quota` suspects are marked. Once locked, toggling does nothing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapacityExceeded`] when marking would exceed the
    /// quota; the selection is left unchanged.
    pub fn toggle(&mut self, id: PlayerId, quota: usize) -> Result<Toggle, Error> {
        if self.locked {
            return Ok(Toggle::Locked);
        }

        if let Some((position, _)) = self.selected.iter().find_position(|s| **s == id) {
            self.selected.remove(position);
            return Ok(Toggle::Deselected);
        }

        if self.selected.len() < quota {
            self.selected.push(id);
            Ok(Toggle::Selected)
        } else {
            Err(Error::CapacityExceeded { quota })
        }
    }

    /// Whether the selection may be sent as a vote
    ///
    /// True only if no vote was cast yet and exactly `quota` suspects are
    /// marked.
    pub fn is_confirmable(&self, quota: usize, already_voted: bool) -> bool {
        !already_voted && !self.locked && self.selected.len() == quota
    }

    /// Converts the selection into the wire form of a vote
    pub fn to_vote_set(&self) -> VoteSet {
        self.selected.iter().cloned().collect()
    }
}
