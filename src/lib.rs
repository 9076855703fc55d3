//! # Inposter Client Library
//!
//! This library provides the client-side session logic for Inposter, a
//! social deduction word game. Players take turns submitting a word related
//! to a secret that only the crew knows, then vote on who the imposters are.
//!
//! The server pushes the full room state after every change. The client
//! keeps its local state in line with those pushes, runs the one-shot
//! effects of each phase change, gates what the local participant may do,
//! and tabulates the vote into the set of accused players.

#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::struct_field_names)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::wildcard_imports)]
use serde::{Deserialize, Serialize};

pub mod constants;

pub mod action;
pub mod chat;
pub mod client;
pub mod config;
pub mod countdown;
pub mod phase;
pub mod result;
pub mod session;
pub mod snapshot;
pub mod store;
pub mod tally;
pub mod turn;
pub mod view;
pub mod vote;

/// Messages pushed by the server
///
/// On the wire each message is an object naming the event and carrying its
/// payload, e.g. `{"event": "error", "data": "room not found"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum IncomingMessage {
    /// Full room state after a change
    GameState(Box<snapshot::RoomSnapshot>),
    /// Private reveal of the local participant's role and word
    RevealSecret(snapshot::SecretReveal),
    /// Final room state of a round
    GameResult(Box<snapshot::RoomSnapshot>),
    /// Error reported by the server
    Error(String),
    /// Chat message
    ChatMessage(chat::ChatMessage),
}

impl IncomingMessage {
    /// Parses a message received from the server
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a well-formed server message.
    pub fn from_message(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

/// Requests sent to the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum OutgoingMessage {
    /// Create a room and host it
    CreateRoom(action::CreateRoom),
    /// Join an existing room
    JoinRoom(action::JoinRoom),
    /// Flip the ready flag in the lobby
    ToggleReady(snapshot::RoomCode),
    /// Start the round, sent by the host
    StartGame(snapshot::RoomCode),
    /// Submit a word on the participant's turn
    SubmitWord(action::SubmitWord),
    /// Ask to move on to the vote
    ReadyForVote(snapshot::RoomCode),
    /// Cast a vote
    SubmitVote(action::SubmitVote),
    /// Open the vote, sent by the host
    ForceVotePhase(snapshot::RoomCode),
    /// Send a chat message
    SendChat(action::SendChat),
}

impl OutgoingMessage {
    /// Converts the message to a JSON string for transmission
    ///
    /// # Panics
    ///
    /// This method panics if serialization fails, which should never happen
    /// with the default JSON serializer for well-formed data.
    pub fn to_message(&self) -> String {
        serde_json::to_string(self).expect("default serializer cannot fail")
    }
}

/// Alarm messages for timed client events
///
/// The host environment schedules these and feeds them back to
/// [`client::Client::receive_alarm`] once their delay has elapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::From, Serialize, Deserialize)]
pub enum AlarmMessage {
    /// Reveal countdown alarms
    Countdown(countdown::AlarmMessage),
}
