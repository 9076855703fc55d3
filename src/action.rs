//! Outbound actions
//!
//! Payloads of the requests the client sends to the server. Constructors
//! trim and validate user input; an action that fails validation is never
//! sent.

use garde::Validate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    chat::ChatTarget,
    constants,
    snapshot::{RoomCode, VoteSet},
};

/// Errors that prevent an action from being sent
#[derive(Error, Serialize, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// No name was entered
    #[error("enter your name")]
    EmptyName,
    /// No room code was entered
    #[error("enter a room code")]
    EmptyRoom,
    /// No word was entered
    #[error("word cannot be empty")]
    EmptyWord,
    /// No chat message was entered
    #[error("message cannot be empty")]
    EmptyMessage,
    /// The participant is not in a room
    #[error("not in a room")]
    NoRoom,
    /// It is not the participant's turn to submit a word
    #[error("it is not your turn")]
    NotYourTurn,
    /// The vote does not have exactly as many suspects as required
    #[error("select exactly {quota} player(s) before confirming")]
    VoteIncomplete {
        /// Number of suspects required
        quota: usize,
    },
    /// A vote was already cast this round
    #[error("you already voted")]
    AlreadyVoted,
    /// Input failed validation
    #[error("{0}")]
    Invalid(String),
}

impl From<garde::Report> for Error {
    fn from(report: garde::Report) -> Self {
        Self::Invalid(report.to_string())
    }
}

type ValidationResult = garde::Result;

/// Validates that a room code is not longer than allowed
fn validate_room_code(code: &RoomCode) -> ValidationResult {
    if code.as_str().len() <= constants::room::MAX_CODE_LENGTH {
        Ok(())
    } else {
        Err(garde::Error::new(format!(
            "room code is longer than {} characters",
            constants::room::MAX_CODE_LENGTH
        )))
    }
}

/// Trims `input`, failing with `empty` if nothing is left
fn required(input: &str, empty: Error) -> Result<String, Error> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        Err(empty)
    } else {
        Ok(trimmed.to_owned())
    }
}

/// Request to create a room and join it as host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct CreateRoom {
    /// Host's name
    #[garde(length(min = 1, max = constants::name::MAX_LENGTH))]
    pub name: String,
    /// Number of imposters
    #[garde(range(min = constants::room::MIN_IMPOSTERS, max = constants::room::MAX_IMPOSTERS))]
    pub imposters: u32,
    /// Number of word cycles
    #[garde(range(min = constants::room::MIN_CYCLES, max = constants::room::MAX_CYCLES))]
    pub cycles: u32,
}

impl CreateRoom {
    /// Builds a validated request
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyName`] for a blank name and [`Error::Invalid`]
    /// when a value is out of bounds.
    pub fn new(name: &str, imposters: u32, cycles: u32) -> Result<Self, Error> {
        let request = Self {
            name: required(name, Error::EmptyName)?,
            imposters,
            cycles,
        };
        request.validate()?;
        Ok(request)
    }
}

/// Request to join an existing room
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoom {
    /// Participant's name
    #[garde(length(min = 1, max = constants::name::MAX_LENGTH))]
    pub name: String,
    /// Room to join
    #[garde(custom(|v, _| validate_room_code(v)))]
    pub room_id: RoomCode,
}

impl JoinRoom {
    /// Builds a validated request
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyName`] or [`Error::EmptyRoom`] for blank input
    /// and [`Error::Invalid`] when a value is too long.
    pub fn new(name: &str, room: &str) -> Result<Self, Error> {
        let request = Self {
            name: required(name, Error::EmptyName)?,
            room_id: RoomCode::new(required(room, Error::EmptyRoom)?),
        };
        request.validate()?;
        Ok(request)
    }
}

/// Submission of a word on the participant's turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitWord {
    /// Room the word is for
    #[garde(skip)]
    pub room_id: RoomCode,
    /// The word
    #[garde(length(min = 1, max = constants::word::MAX_LENGTH))]
    pub word: String,
}

impl SubmitWord {
    /// Builds a validated submission
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyWord`] for a blank word and [`Error::Invalid`]
    /// when it is too long.
    pub fn new(room_id: RoomCode, word: &str) -> Result<Self, Error> {
        let submission = Self {
            room_id,
            word: required(word, Error::EmptyWord)?,
        };
        submission.validate()?;
        Ok(submission)
    }
}

/// A cast vote
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitVote {
    /// Room the vote is for
    pub room_id: RoomCode,
    /// Accused players
    pub votes_obj: VoteSet,
}

/// A chat message to send
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SendChat {
    /// Room the message is for
    #[garde(skip)]
    pub room_id: RoomCode,
    /// Message text
    #[garde(length(min = 1, max = constants::chat::MAX_LENGTH))]
    pub msg: String,
    /// Recipient
    #[garde(skip)]
    pub target: ChatTarget,
}

impl SendChat {
    /// Builds a validated message
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyMessage`] for a blank message and
    /// [`Error::Invalid`] when it is too long.
    pub fn new(room_id: RoomCode, msg: &str, target: ChatTarget) -> Result<Self, Error> {
        let message = Self {
            room_id,
            msg: required(msg, Error::EmptyMessage)?,
            target,
        };
        message.validate()?;
        Ok(message)
    }
}
