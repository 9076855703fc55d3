//! Turn resolution for the word-submission phase

use serde::Serialize;

use crate::snapshot::PlayerId;

/// Whose turn it is and whether the local participant may submit a word
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TurnResolution {
    /// The player expected to submit next, if any
    pub current_player: Option<PlayerId>,
    /// Whether that player is the local participant
    pub is_local_turn: bool,
}

/// Derives the current turn from the turn order and index
///
/// An empty order or an index outside of it means nobody's turn. This never
/// fails: whatever the server sends is resolved to some answer.
///
/// # Examples
///
/// ```rust
/// use inposter::{snapshot::PlayerId, turn::resolve_turn};
///
/// let order = [PlayerId::from("x"), PlayerId::from("y")];
/// let turn = resolve_turn(&order, 1, Some(&PlayerId::from("y")));
/// assert!(turn.is_local_turn);
/// ```
pub fn resolve_turn(
    turn_order: &[PlayerId],
    turn_index: i64,
    local_player: Option<&PlayerId>,
) -> TurnResolution {
    let current_player = usize::try_from(turn_index)
        .ok()
        .and_then(|index| turn_order.get(index))
        .cloned();

    let is_local_turn = match (&current_player, local_player) {
        (Some(current), Some(local)) => current == local,
        _ => false,
    };

    TurnResolution {
        current_player,
        is_local_turn,
    }
}
