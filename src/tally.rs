//! Vote tabulation
//!
//! This module turns the vote matrix of a round into the set of players
//! accused by the room. Players are ranked by how many votes they received
//! and the accused set is filled with whole tie groups until the quota is
//! met. A tie at the cutoff is never split, so the accused set may be larger
//! than the quota.
//!
//! Tabulation only looks at votes. Roles play no part in it.

use std::{cmp::Reverse, collections::HashMap};

use itertools::Itertools;
use serde::Serialize;

use crate::snapshot::{Player, PlayerId};

/// Players sharing the same number of received votes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TieGroup {
    /// Votes received by every member of the group
    pub count: usize,
    /// Members in the order they appear in the snapshot
    pub players: Vec<PlayerId>,
}

/// Result of tabulating a vote matrix
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Tabulation {
    /// Votes received per id, including ids of players no longer listed
    pub vote_counts: HashMap<PlayerId, usize>,
    /// Accused players, highest tally first
    pub accused: Vec<PlayerId>,
    /// Every tie group, highest tally first
    pub tie_groups: Vec<TieGroup>,
}

impl Tabulation {
    /// Number of votes `id` received
    pub fn received(&self, id: &PlayerId) -> usize {
        self.vote_counts.get(id).copied().unwrap_or_default()
    }

    /// Whether `id` ended up accused
    pub fn is_accused(&self, id: &PlayerId) -> bool {
        self.accused.contains(id)
    }
}

/// Tabulates the votes cast by `players` against a quota of suspects
///
/// A quota of zero accuses nobody, and so does a round in which nobody
/// received a vote.
///
/// # Examples
///
/// ```rust
/// use inposter::{snapshot::Player, tally::tabulate};
///
/// let players: Vec<Player> = Vec::new();
/// assert!(tabulate(&players, 1).accused.is_empty());
/// ```
pub fn tabulate<'a>(players: impl IntoIterator<Item = &'a Player>, quota: usize) -> Tabulation {
    let players = players.into_iter().collect_vec();

    let mut vote_counts: HashMap<PlayerId, usize> =
        players.iter().map(|player| (player.id.clone(), 0)).collect();
    for accused in players.iter().flat_map(|voter| voter.votes.iter()) {
        *vote_counts.entry(accused.clone()).or_default() += 1;
    }

    let tie_groups = players
        .iter()
        .map(|player| (vote_counts[&player.id], player.id.clone()))
        .into_group_map()
        .into_iter()
        .sorted_by_key(|(count, _)| Reverse(*count))
        .map(|(count, players)| TieGroup { count, players })
        .collect_vec();

    let mut accused = Vec::new();
    if tie_groups.first().is_some_and(|top| top.count > 0) {
        let mut remaining = quota;
        for group in &tie_groups {
            if remaining == 0 {
                break;
            }
            accused.extend(group.players.iter().cloned());
            if group.players.len() > remaining {
                break;
            }
            remaining -= group.players.len();
        }
    }

    Tabulation {
        vote_counts,
        accused,
        tie_groups,
    }
}
