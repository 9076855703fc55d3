//! Authoritative room snapshots
//!
//! The server pushes the full state of a room on every change. This module
//! holds the typed form of one such push. Snapshots are plain data: they are
//! never patched in place, each push supersedes the previous one entirely.

use std::{
    collections::{BTreeMap, BTreeSet},
    convert::Infallible,
    fmt::Display,
    str::FromStr,
};

use serde::{Deserialize, Deserializer, Serialize};
use serde_with::{DefaultOnNull, DeserializeFromStr, SerializeDisplay, serde_as, skip_serializing_none};

/// Opaque connection identifier of a participant, unique within a room
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    /// Wraps a raw connection identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the raw identifier
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Code of a room, as shared between players to join it
#[derive(
    Debug,
    Clone,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
#[serde(transparent)]
pub struct RoomCode(String);

impl RoomCode {
    /// Wraps a raw room code
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Returns the raw room code
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RoomCode {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

/// Hidden role assigned to a player by the server
///
/// Anything the client does not recognise, including the empty string sent
/// before roles are dealt, reads as [`Role::Unassigned`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, SerializeDisplay, DeserializeFromStr)]
pub enum Role {
    /// No role dealt yet
    #[default]
    Unassigned,
    /// Knows the secret word
    Crew,
    /// Does not know the secret word and must blend in
    Imposter,
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Unassigned => "",
            Self::Crew => "Crew",
            Self::Imposter => "Imposter",
        })
    }
}

impl FromStr for Role {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "Crew" => Self::Crew,
            "Imposter" => Self::Imposter,
            _ => Self::Unassigned,
        })
    }
}

/// Phase of a round
///
/// Rounds advance strictly from [`Phase::Lobby`] to [`Phase::Result`], but
/// the client accepts whatever phase the server reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    /// Players gather and mark themselves ready
    Lobby,
    /// Roles and the secret word are revealed privately
    Reveal,
    /// Players submit words in turn
    Game,
    /// Word cycles are over, players signal they want to vote
    PreVote,
    /// Players select their suspects
    Vote,
    /// Votes, roles and the secret word are revealed
    Result,
}

/// Room settings chosen at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Number of imposters, which is also the voting quota
    pub imposters: u32,
    /// Number of full word cycles before voting
    pub cycles: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            imposters: 1,
            cycles: 1,
        }
    }
}

/// Set of players accused by a single voter
///
/// On the wire this is an object mapping accused ids to `true`. Entries set
/// to `false` are not accusations and are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoteSet(BTreeSet<PlayerId>);

impl VoteSet {
    /// Whether this voter accused nobody
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of players accused
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether `id` is among the accused
    pub fn contains(&self, id: &PlayerId) -> bool {
        self.0.contains(id)
    }

    /// Iterates over the accused ids
    pub fn iter(&self) -> impl Iterator<Item = &PlayerId> {
        self.0.iter()
    }
}

impl FromIterator<PlayerId> for VoteSet {
    fn from_iter<I: IntoIterator<Item = PlayerId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Serialize for VoteSet {
    /// Serializes the set as an object of `id: true` entries
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_map(self.0.iter().map(|id| (id, true)))
    }
}

impl<'de> Deserialize<'de> for VoteSet {
    fn deserialize<D>(deserializer: D) -> Result<VoteSet, D::Error>
    where
        D: Deserializer<'de>,
    {
        let marks = BTreeMap::<PlayerId, bool>::deserialize(deserializer)?;
        Ok(marks
            .into_iter()
            .filter_map(|(id, marked)| marked.then_some(id))
            .collect())
    }
}

/// A participant as seen in a snapshot
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    /// Connection identifier
    pub id: PlayerId,
    /// Display name, not guaranteed unique
    #[serde(default)]
    pub name: String,
    /// Whether the player is ready in the lobby
    #[serde(default)]
    pub is_ready: bool,
    /// Hidden role, only meaningful once revealed
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub role: Role,
    /// Players this player accused
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub votes: VoteSet,
    /// Whether the player asked to move on to the vote
    #[serde(default)]
    pub wants_vote: bool,
}

impl Player {
    /// Whether this player has already cast a vote this round
    pub fn has_voted(&self) -> bool {
        !self.votes.is_empty()
    }
}

/// One submitted word
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Name of the player who submitted the word
    pub player: String,
    /// The submitted word
    pub word: String,
}

/// Private reveal sent to each participant when roles are dealt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretReveal {
    /// The participant's role
    #[serde(default)]
    pub role: Role,
    /// The word shown to the participant
    #[serde(default)]
    pub word: String,
}

/// A full authoritative push of room state
#[serde_as]
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSnapshot {
    /// Room code
    pub id: RoomCode,
    /// Connection identifier of the host
    #[serde(default)]
    pub host_id: Option<PlayerId>,
    /// Current phase
    pub phase: Phase,
    /// Room settings
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub settings: Settings,
    /// Players keyed by id, in the order the server listed them
    #[serde_as(as = "DefaultOnNull<serde_with::Map<_, _>>")]
    #[serde(default)]
    pub players: Vec<(PlayerId, Player)>,
    /// Fixed order in which players submit words
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub turn_order: Vec<PlayerId>,
    /// Index into `turn_order`, meaningless outside [`Phase::Game`]
    #[serde(default)]
    pub turn_index: i64,
    /// Current word cycle, counted by the server
    #[serde(default)]
    pub current_cycle: Option<u32>,
    /// Submitted words, oldest first
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
    /// The secret word, present from [`Phase::Result`] onward
    #[serde(default)]
    pub secret_word: Option<String>,
}

impl RoomSnapshot {
    /// Iterates over the players in server order
    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().map(|(_, player)| player)
    }

    /// Number of players in the room
    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Looks up a player by id
    pub fn player(&self, id: &PlayerId) -> Option<&Player> {
        self.players
            .iter()
            .find_map(|(key, player)| (key == id).then_some(player))
    }

    /// Looks up a player's display name by id
    pub fn player_name(&self, id: &PlayerId) -> Option<&str> {
        self.player(id).map(|player| player.name.as_str())
    }

    /// Whether `id` is the host of the room
    pub fn is_host(&self, id: &PlayerId) -> bool {
        self.host_id.as_ref() == Some(id)
    }

    /// The most recently submitted word
    pub fn latest_entry(&self) -> Option<&HistoryEntry> {
        self.history.last()
    }

    /// Players whose revealed role is [`Role::Imposter`]
    pub fn imposters(&self) -> impl Iterator<Item = &Player> {
        self.players().filter(|player| player.role == Role::Imposter)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> serde_json::Value {
        json!({
            "id": "ABCD",
            "hostId": "p2",
            "phase": "PRE_VOTE",
            "settings": { "imposters": 2, "cycles": 3 },
            "players": {
                "p2": { "id": "p2", "name": "Bea", "isReady": true, "role": "Crew", "votes": {}, "wantsVote": true },
                "p1": { "id": "p1", "name": "Al", "isReady": false, "role": "Imposter", "votes": { "p2": true, "p3": false }, "wantsVote": false },
                "p3": { "id": "p3", "name": "Cy", "isReady": true, "role": "", "votes": null }
            },
            "turnOrder": ["p1", "p2", "p3"],
            "turnIndex": 1,
            "currentCycle": 2,
            "history": [{ "player": "Al", "word": "salt" }, { "player": "Bea", "word": "sea" }]
        })
    }

    #[test]
    fn test_snapshot_deserialization() {
        let snapshot: RoomSnapshot = serde_json::from_value(sample()).unwrap();

        assert_eq!(snapshot.id, RoomCode::from("ABCD"));
        assert_eq!(snapshot.phase, Phase::PreVote);
        assert_eq!(snapshot.settings.imposters, 2);
        assert_eq!(snapshot.turn_index, 1);
        assert_eq!(snapshot.current_cycle, Some(2));
        assert_eq!(snapshot.secret_word, None);
        assert!(snapshot.is_host(&PlayerId::from("p2")));
        assert!(!snapshot.is_host(&PlayerId::from("p1")));
    }

    #[test]
    fn test_players_keep_server_order() {
        let snapshot: RoomSnapshot = serde_json::from_str(
            r#"{
                "id": "ABCD",
                "phase": "LOBBY",
                "players": {
                    "p2": { "id": "p2", "name": "Bea" },
                    "p1": { "id": "p1", "name": "Al" },
                    "p3": { "id": "p3", "name": "Cy" }
                }
            }"#,
        )
        .unwrap();

        let names: Vec<_> = snapshot.players().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Bea", "Al", "Cy"]);
    }

    #[test]
    fn test_votes_keep_only_true_marks() {
        let snapshot: RoomSnapshot = serde_json::from_value(sample()).unwrap();

        let al = snapshot.player(&PlayerId::from("p1")).unwrap();
        assert_eq!(al.votes.len(), 1);
        assert!(al.votes.contains(&PlayerId::from("p2")));
        assert!(al.has_voted());

        let cy = snapshot.player(&PlayerId::from("p3")).unwrap();
        assert!(cy.votes.is_empty());
        assert!(!cy.has_voted());
        assert!(!cy.wants_vote);
    }

    #[test]
    fn test_roles_parse_leniently() {
        assert_eq!(Role::from_str("Imposter"), Ok(Role::Imposter));
        assert_eq!(Role::from_str("Crew"), Ok(Role::Crew));
        assert_eq!(Role::from_str(""), Ok(Role::Unassigned));
        assert_eq!(Role::from_str("Jester"), Ok(Role::Unassigned));

        let snapshot: RoomSnapshot = serde_json::from_value(sample()).unwrap();
        let imposters: Vec<_> = snapshot.imposters().map(|p| p.name.as_str()).collect();
        assert_eq!(imposters, ["Al"]);
    }

    #[test]
    fn test_missing_collections_default_to_empty() {
        let snapshot: RoomSnapshot = serde_json::from_value(json!({
            "id": "ROOM",
            "phase": "LOBBY",
            "players": null,
            "turnOrder": null,
            "history": null
        }))
        .unwrap();

        assert_eq!(snapshot.player_count(), 0);
        assert!(snapshot.turn_order.is_empty());
        assert!(snapshot.latest_entry().is_none());
        assert_eq!(snapshot.settings, Settings::default());
        assert_eq!(snapshot.host_id, None);
    }

    #[test]
    fn test_vote_set_serializes_as_marks() {
        let votes: VoteSet = [PlayerId::from("b"), PlayerId::from("a")]
            .into_iter()
            .collect();

        assert_eq!(
            serde_json::to_value(&votes).unwrap(),
            json!({ "a": true, "b": true })
        );
    }

    #[test]
    fn test_phase_wire_names() {
        assert_eq!(serde_json::to_string(&Phase::PreVote).unwrap(), "\"PRE_VOTE\"");
        assert_eq!(
            serde_json::from_str::<Phase>("\"RESULT\"").unwrap(),
            Phase::Result
        );
        assert!(serde_json::from_str::<Phase>("\"INTERMISSION\"").is_err());
    }

    #[test]
    fn test_latest_entry() {
        let snapshot: RoomSnapshot = serde_json::from_value(sample()).unwrap();

        let latest = snapshot.latest_entry().unwrap();
        assert_eq!(latest.player, "Bea");
        assert_eq!(latest.word, "sea");
        assert_eq!(snapshot.player_name(&PlayerId::from("p3")), Some("Cy"));
        assert_eq!(snapshot.player_name(&PlayerId::from("p9")), None);
    }
}
