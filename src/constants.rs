//! Configuration constants for the Inposter client
//!
//! This module contains the fixed keys, limits and timings used throughout
//! the client so that validation and persistence agree on the same values.

/// Persistence keys for the durable client records
pub mod storage {
    /// Key under which the `{name, room}` session identity is stored
    pub const SESSION_KEY: &str = "spyGameMe";
    /// Key under which the colour theme preference is stored
    pub const THEME_KEY: &str = "theme";
}

/// Room creation and lobby constants
pub mod room {
    /// Minimum number of players before the host may auto-start a round
    pub const MIN_PLAYERS_TO_START: usize = 2;
    /// Minimum number of imposters a room may be created with
    pub const MIN_IMPOSTERS: u32 = 1;
    /// Maximum number of imposters a room may be created with
    pub const MAX_IMPOSTERS: u32 = 10;
    /// Minimum number of word cycles per round
    pub const MIN_CYCLES: u32 = 1;
    /// Maximum number of word cycles per round
    pub const MAX_CYCLES: u32 = 20;
    /// Maximum length of a room code in characters
    pub const MAX_CODE_LENGTH: usize = 32;
}

/// Player name constants
pub mod name {
    /// Maximum length of a player name in characters
    pub const MAX_LENGTH: usize = 30;
}

/// Word submission constants
pub mod word {
    /// Maximum length of a submitted word in characters
    pub const MAX_LENGTH: usize = 100;
}

/// Chat constants
pub mod chat {
    /// Wire value addressing every player in the room
    pub const BROADCAST_TARGET: &str = "ALL";
    /// Maximum length of a chat message in characters
    pub const MAX_LENGTH: usize = 500;
}

/// Reveal countdown constants
pub mod reveal {
    /// Seconds shown on the reveal countdown when it starts
    pub const COUNTDOWN_SECONDS: u64 = 20;
    /// Interval between countdown ticks in milliseconds
    pub const TICK_MILLIS: u64 = 1000;
}
