//! Durable client records
//!
//! The client keeps two small records across reloads: the name and room
//! needed to rejoin after a disconnect, and the colour theme. Both live in a
//! key/value [`Storage`], one fixed key each. Stored data that cannot be
//! read back is treated as if nothing had been stored.

use std::{
    collections::HashMap,
    fmt::Display,
    fs, io,
    path::{Path, PathBuf},
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::{constants::storage, snapshot::RoomCode};

/// Errors that can occur while writing to storage
#[derive(Error, Debug)]
pub enum Error {
    /// The backing medium rejected the operation
    #[error("storage is unavailable: {0}")]
    Io(#[from] io::Error),
    /// The record could not be encoded
    #[error("record could not be encoded: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A string key/value store with atomic per-key writes
///
/// Reads are infallible: anything that cannot be read is absent.
pub trait Storage {
    /// Reads the value stored under `key`
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`, replacing any previous value
    ///
    /// # Errors
    ///
    /// Returns an error if the backing medium rejects the write.
    fn set(&mut self, key: &str, value: &str) -> Result<(), Error>;

    /// Removes the value stored under `key`, if any
    ///
    /// # Errors
    ///
    /// Returns an error if the backing medium rejects the removal.
    fn remove(&mut self, key: &str) -> Result<(), Error>;
}

/// Storage kept in memory, lost when dropped
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    values: HashMap<String, String>,
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), Error> {
        self.values.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), Error> {
        self.values.remove(key);
        Ok(())
    }
}

/// Storage backed by one file per key inside a directory
#[derive(Debug, Clone)]
pub struct FileStorage {
    directory: PathBuf,
}

impl FileStorage {
    /// Uses `directory` for storage; it is created on first write
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    /// The directory holding the stored values
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn path(&self, key: &str) -> PathBuf {
        self.directory.join(key)
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.path(key)).ok()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), Error> {
        fs::create_dir_all(&self.directory)?;
        let staging = self.directory.join(format!(".{key}.tmp"));
        fs::write(&staging, value)?;
        fs::rename(&staging, self.path(key))?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), Error> {
        match fs::remove_file(self.path(key)) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

/// What a participant needs to rejoin their room after a reload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionIdentity {
    /// Name the participant joined with
    pub name: String,
    /// Room the participant is in
    pub room: RoomCode,
}

impl SessionIdentity {
    /// Creates an identity from a name and room code
    pub fn new(name: impl Into<String>, room: impl Into<RoomCode>) -> Self {
        Self {
            name: name.into(),
            room: room.into(),
        }
    }

    fn is_complete(&self) -> bool {
        !self.name.is_empty() && !self.room.as_str().is_empty()
    }
}

/// Colour theme of the client
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Theme {
    /// Light background
    #[default]
    Bright,
    /// Dark background
    Dark,
}

impl Theme {
    /// The other theme
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Bright => Self::Dark,
            Self::Dark => Self::Bright,
        }
    }
}

impl Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Bright => "bright",
            Self::Dark => "dark",
        })
    }
}

impl FromStr for Theme {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bright" => Ok(Self::Bright),
            "dark" => Ok(Self::Dark),
            _ => Err(()),
        }
    }
}

/// Durable records of the client on top of a [`Storage`]
#[derive(Debug, Clone, Default)]
pub struct SessionStore<S> {
    storage: S,
}

impl<S: Storage> SessionStore<S> {
    /// Wraps a storage backend
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// The underlying storage
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Remembers the identity to rejoin with
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be written.
    pub fn save(&mut self, identity: &SessionIdentity) -> Result<(), Error> {
        let record = serde_json::to_string(identity)?;
        self.storage.set(storage::SESSION_KEY, &record)?;
        debug!(name = %identity.name, room = %identity.room, "session identity saved");
        Ok(())
    }

    /// Reads the remembered identity
    ///
    /// Returns `None` when nothing is stored, or when the stored record is
    /// unreadable or lacks a name or room.
    pub fn load(&self) -> Option<SessionIdentity> {
        let record = self.storage.get(storage::SESSION_KEY)?;
        match serde_json::from_str::<SessionIdentity>(&record) {
            Ok(identity) if identity.is_complete() => Some(identity),
            Ok(_) => None,
            Err(e) => {
                warn!(error = %e, "ignoring malformed session identity");
                None
            }
        }
    }

    /// Forgets the remembered identity
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be removed.
    pub fn clear(&mut self) -> Result<(), Error> {
        self.storage.remove(storage::SESSION_KEY)
    }

    /// The stored theme, [`Theme::Bright`] unless `dark` was stored
    pub fn theme(&self) -> Theme {
        self.storage
            .get(storage::THEME_KEY)
            .and_then(|stored| stored.parse().ok())
            .unwrap_or_default()
    }

    /// Stores the theme preference
    ///
    /// # Errors
    ///
    /// Returns an error if the preference cannot be written.
    pub fn set_theme(&mut self, theme: Theme) -> Result<(), Error> {
        self.storage.set(storage::THEME_KEY, &theme.to_string())
    }

    /// Switches to the other theme and stores it
    ///
    /// # Errors
    ///
    /// Returns an error if the preference cannot be written.
    pub fn toggle_theme(&mut self) -> Result<Theme, Error> {
        let theme = self.theme().toggled();
        self.set_theme(theme)?;
        Ok(theme)
    }
}
