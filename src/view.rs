//! Read-only views of a snapshot
//!
//! These are the values the screens display. They are derived on demand
//! from the latest snapshot and hold no state of their own.

use serde::Serialize;

use crate::{
    snapshot::{HistoryEntry, PlayerId, RoomSnapshot},
    turn::{TurnResolution, resolve_turn},
    vote::VoteSelection,
};

/// Placeholder shown before any word was submitted
pub const NO_WORD_YET: &str = "---";

/// A player in the lobby roster
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LobbyRow {
    /// Player name
    pub name: String,
    /// Whether the player hosts the room
    pub is_host: bool,
    /// Whether the player is ready
    pub is_ready: bool,
}

/// Lobby roster in room order
pub fn lobby_roster(snapshot: &RoomSnapshot) -> Vec<LobbyRow> {
    snapshot
        .players()
        .map(|player| LobbyRow {
            name: player.name.clone(),
            is_host: snapshot.is_host(&player.id),
            is_ready: player.is_ready,
        })
        .collect()
}

/// Whether every player is ready and there are enough players to start
pub fn ready_to_start(snapshot: &RoomSnapshot) -> bool {
    snapshot.player_count() >= crate::constants::room::MIN_PLAYERS_TO_START
        && snapshot.players().all(|player| player.is_ready)
}

/// Whether every player asked to move on to the vote
pub fn ready_to_vote(snapshot: &RoomSnapshot) -> bool {
    snapshot.players().all(|player| player.wants_vote)
}

/// Pre-vote progress such as `"2/4 Players Ready"`
pub fn pre_vote_status(snapshot: &RoomSnapshot) -> String {
    let ready = snapshot.players().filter(|player| player.wants_vote).count();
    format!("{ready}/{} Players Ready", snapshot.player_count())
}

/// The word-submission screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameView {
    /// Current word cycle
    pub cycle: Option<u32>,
    /// Most recent word, or the placeholder
    pub latest_word: String,
    /// Who submitted the most recent word
    pub latest_author: String,
    /// All submitted words, oldest first
    pub history: Vec<HistoryEntry>,
    /// Whose turn it is
    pub turn: TurnResolution,
    /// Turn banner text
    pub turn_label: String,
    /// Whether the word input accepts a submission
    pub input_enabled: bool,
}

impl GameView {
    /// Builds the game view for `local_player`
    ///
    /// Once the word cycles are over (`game_over`) submission stays locked
    /// regardless of the turn data.
    pub fn new(snapshot: &RoomSnapshot, local_player: Option<&PlayerId>, game_over: bool) -> Self {
        let turn = resolve_turn(&snapshot.turn_order, snapshot.turn_index, local_player);

        let (latest_word, latest_author) = match snapshot.latest_entry() {
            Some(entry) => (entry.word.clone(), format!("Typed by: {}", entry.player)),
            None => (NO_WORD_YET.to_owned(), "Game Started".to_owned()),
        };

        let turn_label = if turn.is_local_turn {
            "YOUR TURN!".to_owned()
        } else {
            let name = turn
                .current_player
                .as_ref()
                .and_then(|id| snapshot.player_name(id))
                .unwrap_or("...");
            format!("Waiting for {name}...")
        };

        Self {
            cycle: snapshot.current_cycle,
            latest_word,
            latest_author,
            history: snapshot.history.clone(),
            input_enabled: turn.is_local_turn && !game_over,
            turn,
            turn_label,
        }
    }
}

/// A player that can be accused
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoteCandidate {
    /// Player id
    pub id: PlayerId,
    /// Player name
    pub name: String,
    /// Whether the player is marked
    pub selected: bool,
}

/// The vote screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoteBoard {
    /// Every player except the local one
    pub candidates: Vec<VoteCandidate>,
    /// Whether the board is read-only because a vote was cast
    pub locked: bool,
    /// Instruction text
    pub instruction: String,
    /// Whether the confirm action is available
    pub can_confirm: bool,
}

impl VoteBoard {
    /// Builds the vote board for `local_player`
    ///
    /// Before voting, marks come from the local selection. After voting,
    /// they come from the vote echoed back in the snapshot.
    pub fn new(
        snapshot: &RoomSnapshot,
        local_player: Option<&PlayerId>,
        selection: &VoteSelection,
        quota: usize,
    ) -> Self {
        let cast = local_player
            .and_then(|id| snapshot.player(id))
            .filter(|player| player.has_voted())
            .map(|player| &player.votes);

        let candidates = snapshot
            .players()
            .filter(|player| Some(&player.id) != local_player)
            .map(|player| VoteCandidate {
                id: player.id.clone(),
                name: player.name.clone(),
                selected: match cast {
                    Some(votes) => votes.contains(&player.id),
                    None => selection.contains(&player.id),
                },
            })
            .collect();

        Self {
            candidates,
            locked: cast.is_some(),
            instruction: format!("Select {quota} player(s) you suspect."),
            can_confirm: selection.is_confirmable(quota, cast.is_some()),
        }
    }
}
