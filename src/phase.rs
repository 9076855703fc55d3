//! Phase transitions
//!
//! Every snapshot carries the phase of the round. When the phase differs
//! from the last one observed, the client runs a fixed set of one-shot
//! effects keyed by the phase being entered. Snapshots that keep the phase
//! run nothing.
//!
//! Transitions are not validated. The server is the only authority on the
//! phase, so a value arriving out of sequence is simply a jump to that
//! phase: its entry effects run and nothing else does.

use serde::Serialize;
use tracing::debug;

use crate::snapshot::{Phase, RoomCode, RoomSnapshot};

/// Screens the client can show
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum Screen {
    /// Create or join a room
    #[default]
    Start,
    /// Roster and ready toggles
    Lobby,
    /// Private role and word reveal
    Reveal,
    /// Word submission, also used while waiting for the vote
    Game,
    /// Suspect selection
    Vote,
    /// Round results
    Result,
}

impl Screen {
    /// Whether the chat panel accompanies this screen
    pub fn shows_chat(self) -> bool {
        !matches!(self, Self::Start)
    }
}

/// One-shot effect run when a phase is entered
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Effect {
    /// Switch to a screen
    Navigate(Screen),
    /// Display the room code so it can be shared
    ShowRoomCode(RoomCode),
    /// Make the ready toggle available again
    ResetReady,
    /// (Re)start the reveal countdown from the top
    StartRevealCountdown,
    /// Stop the reveal countdown if one is running
    StopRevealCountdown,
    /// Hide the game-over section and reset the latest word display
    ResetGameView,
    /// Show the game-over section and lock word submission
    ShowGameOver,
    /// Empty the local suspect selection and re-enable confirmation
    ResetVoteSelection,
}

/// Effects produced by one snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransitionEffects {
    /// Phase observed before the snapshot
    pub from: Option<Phase>,
    /// Phase carried by the snapshot
    pub to: Phase,
    /// Effects to run, empty when the phase did not change
    pub effects: Vec<Effect>,
}

impl TransitionEffects {
    /// Whether the snapshot changed the phase
    pub fn is_transition(&self) -> bool {
        self.from != Some(self.to)
    }
}

/// Entry effects of `phase`
fn entry_effects(phase: Phase, snapshot: &RoomSnapshot) -> Vec<Effect> {
    match phase {
        Phase::Lobby => vec![
            Effect::StopRevealCountdown,
            Effect::Navigate(Screen::Lobby),
            Effect::ShowRoomCode(snapshot.id.clone()),
            Effect::ResetReady,
        ],
        Phase::Reveal => vec![
            Effect::Navigate(Screen::Reveal),
            Effect::StartRevealCountdown,
        ],
        Phase::Game => vec![
            Effect::StopRevealCountdown,
            Effect::Navigate(Screen::Game),
            Effect::ResetGameView,
        ],
        Phase::PreVote => vec![
            Effect::StopRevealCountdown,
            Effect::Navigate(Screen::Game),
            Effect::ShowGameOver,
        ],
        Phase::Vote => vec![
            Effect::StopRevealCountdown,
            Effect::Navigate(Screen::Vote),
            Effect::ResetVoteSelection,
        ],
        Phase::Result => vec![
            Effect::StopRevealCountdown,
            Effect::Navigate(Screen::Result),
        ],
    }
}

/// Computes the effects of receiving `snapshot` after `previous`
///
/// # Examples
///
/// ```rust
/// use inposter::phase::{on_snapshot, Effect};
/// use inposter::snapshot::{Phase, RoomSnapshot};
///
/// let snapshot: RoomSnapshot =
///     serde_json::from_str(r#"{"id": "ROOM", "phase": "VOTE"}"#).unwrap();
///
/// assert!(on_snapshot(Some(Phase::Vote), &snapshot).effects.is_empty());
/// assert!(
///     on_snapshot(Some(Phase::PreVote), &snapshot)
///         .effects
///         .contains(&Effect::ResetVoteSelection)
/// );
/// ```
pub fn on_snapshot(previous: Option<Phase>, snapshot: &RoomSnapshot) -> TransitionEffects {
    let effects = if previous == Some(snapshot.phase) {
        Vec::new()
    } else {
        entry_effects(snapshot.phase, snapshot)
    };

    TransitionEffects {
        from: previous,
        to: snapshot.phase,
        effects,
    }
}

/// Remembers the last observed phase between snapshots
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PhaseTracker {
    current: Option<Phase>,
}

impl PhaseTracker {
    /// The last observed phase, `None` before the first snapshot
    pub fn current(&self) -> Option<Phase> {
        self.current
    }

    /// Observes a snapshot and returns the effects it triggers
    pub fn observe(&mut self, snapshot: &RoomSnapshot) -> TransitionEffects {
        let transition = on_snapshot(self.current, snapshot);
        if transition.is_transition() {
            debug!(from = ?transition.from, to = ?transition.to, "phase changed");
        }
        self.current = Some(snapshot.phase);
        transition
    }

    /// Forgets the last observed phase, as when leaving a room
    pub fn reset(&mut self) {
        self.current = None;
    }
}
