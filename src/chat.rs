//! Room chat
//!
//! Chat messages are addressed either to the whole room or privately to one
//! player, by name.

use std::{convert::Infallible, fmt::Display, str::FromStr};

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};

use crate::{constants::chat::BROADCAST_TARGET, snapshot::RoomSnapshot};

/// Recipient of a chat message
///
/// On the wire the broadcast target is the literal `"ALL"`, so a player who
/// is named `ALL` can only be reached by a broadcast.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, SerializeDisplay, DeserializeFromStr)]
pub enum ChatTarget {
    /// Everybody in the room
    #[default]
    All,
    /// A single player, by name
    Player(String),
}

impl ChatTarget {
    /// Whether the message is private
    pub fn is_private(&self) -> bool {
        matches!(self, Self::Player(_))
    }
}

impl Display for ChatTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => f.write_str(BROADCAST_TARGET),
            Self::Player(name) => f.write_str(name),
        }
    }
}

impl FromStr for ChatTarget {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(if s == BROADCAST_TARGET {
            Self::All
        } else {
            Self::Player(s.to_owned())
        })
    }
}

/// A chat message pushed by the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Name of the sender
    pub sender: String,
    /// Message text
    pub msg: String,
    /// Recipient the sender chose
    pub target: ChatTarget,
}

/// A received message as shown in the chat panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatLine {
    /// Name of the sender
    pub sender: String,
    /// Message text
    pub text: String,
    /// Whether only the local participant was addressed
    pub private: bool,
}

impl From<ChatMessage> for ChatLine {
    fn from(ChatMessage { sender, msg, target }: ChatMessage) -> Self {
        Self {
            sender,
            text: msg,
            private: target.is_private(),
        }
    }
}

/// Chat panel state: received lines and the selected recipient
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Chat {
    lines: Vec<ChatLine>,
    targets: Vec<ChatTarget>,
    target: ChatTarget,
}

impl Chat {
    /// Received lines, oldest first
    pub fn lines(&self) -> &[ChatLine] {
        &self.lines
    }

    /// Recipients that can currently be selected, starting with everybody
    pub fn targets(&self) -> impl Iterator<Item = &ChatTarget> {
        std::iter::once(&ChatTarget::All).chain(self.targets.iter())
    }

    /// The selected recipient
    pub fn target(&self) -> &ChatTarget {
        &self.target
    }

    /// Records a received message
    pub fn receive(&mut self, message: ChatMessage) {
        self.lines.push(message.into());
    }

    /// Selects a recipient
    ///
    /// Returns `false` and keeps the current selection if `target` is not
    /// one of the available recipients.
    pub fn select(&mut self, target: ChatTarget) -> bool {
        if target == ChatTarget::All || self.targets.contains(&target) {
            self.target = target;
            true
        } else {
            false
        }
    }

    /// Rebuilds the recipients from a snapshot, leaving out `own_name`
    ///
    /// The selected recipient is kept while they are still in the room and
    /// falls back to everybody otherwise.
    pub fn refresh_targets(&mut self, snapshot: &RoomSnapshot, own_name: &str) {
        self.targets = snapshot
            .players()
            .map(|player| player.name.as_str())
            .filter(|name| *name != own_name)
            .unique()
            .map(|name| ChatTarget::Player(name.to_owned()))
            .collect();

        if !self.targets.contains(&self.target) {
            self.target = ChatTarget::All;
        }
    }
}
