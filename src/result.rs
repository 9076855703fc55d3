//! Round results
//!
//! At the end of a round the server reveals roles and the secret word. This
//! module combines that reveal with the vote tabulation into what the result
//! screen shows: who the imposters really were, who the room accused, and
//! how each player voted.

use itertools::Itertools;
use serde::Serialize;

use crate::{
    snapshot::{PlayerId, Role, RoomSnapshot},
    tally::{Tabulation, tabulate},
};

/// Placeholder for an empty list of names
const NONE_LABEL: &str = "None";
/// Placeholder for an accused id that is no longer in the room
const UNKNOWN_PLAYER: &str = "?";

/// One player's line on the result screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerResult {
    /// Player name
    pub name: String,
    /// Whether the player really was an imposter
    pub is_imposter: bool,
    /// Votes the player received
    pub votes_received: usize,
    /// Names of the players this player accused
    pub voted_for: Vec<String>,
}

/// Everything the result screen shows
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundSummary {
    /// The secret word of the round
    pub secret_word: Option<String>,
    /// Names of the actual imposters
    pub imposters: Vec<String>,
    /// Names of the players accused by vote
    pub accused: Vec<String>,
    /// Per-player breakdown in room order
    pub players: Vec<PlayerResult>,
}

/// Joins names for display, or `"None"` if there are none
fn list_label(names: &[String]) -> String {
    if names.is_empty() {
        NONE_LABEL.to_owned()
    } else {
        names.join(", ")
    }
}

impl RoundSummary {
    /// Number of suspects accused in `snapshot`, at least one
    pub fn quota(snapshot: &RoomSnapshot) -> usize {
        snapshot.settings.imposters.max(1) as usize
    }

    /// Builds the summary of a finished round
    pub fn new(snapshot: &RoomSnapshot) -> Self {
        Self::with_tabulation(snapshot, &tabulate(snapshot.players(), Self::quota(snapshot)))
    }

    /// Builds the summary from an existing tabulation of `snapshot`
    pub fn with_tabulation(snapshot: &RoomSnapshot, tabulation: &Tabulation) -> Self {
        let name_of = |id: &PlayerId| {
            snapshot
                .player_name(id)
                .unwrap_or(UNKNOWN_PLAYER)
                .to_owned()
        };

        Self {
            secret_word: snapshot.secret_word.clone(),
            imposters: snapshot
                .imposters()
                .map(|player| player.name.clone())
                .collect(),
            accused: tabulation.accused.iter().map(name_of).collect(),
            players: snapshot
                .players()
                .map(|player| PlayerResult {
                    name: player.name.clone(),
                    is_imposter: player.role == Role::Imposter,
                    votes_received: tabulation.received(&player.id),
                    voted_for: player.votes.iter().map(name_of).collect_vec(),
                })
                .collect(),
        }
    }

    /// Actual imposters for display
    pub fn imposters_label(&self) -> String {
        list_label(&self.imposters)
    }

    /// Accused players for display
    pub fn accused_label(&self) -> String {
        list_label(&self.accused)
    }
}

impl PlayerResult {
    /// Accused players for display, `"none"` if the player did not vote
    pub fn voted_for_label(&self) -> String {
        if self.voted_for.is_empty() {
            "none".to_owned()
        } else {
            self.voted_for.join(", ")
        }
    }
}
