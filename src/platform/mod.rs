//! Platform abstraction layer
//!
//! Input arrives as discrete `Command`s. The session never sees raw pointer
//! or keyboard events; an `InputSource` translates whatever the host has into
//! commands and hands them over between frames.

use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::Command;

/// Producer of player commands
pub trait InputSource {
    /// Commands that became due at or before `now_ms` (session wall-clock)
    fn poll(&mut self, now_ms: f64) -> Vec<Command>;

    /// True once the source will never produce another command
    fn is_exhausted(&self) -> bool {
        false
    }
}

/// Errors from loading a command script
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("failed to read script {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse script: {0}")]
    Parse(#[from] serde_json::Error),
}

/// One timed entry in a command script
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptedCommand {
    /// Wall-clock time (ms) at which the command is issued
    pub at_ms: f64,
    #[serde(flatten)]
    pub command: Command,
}

/// Replays a fixed list of timed commands
///
/// Script format is a JSON array:
/// `[{"at_ms": 0, "command": "place_unit", "kind": "Ranger"}, ...]`
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    pending: VecDeque<ScriptedCommand>,
}

impl ScriptedInput {
    /// Build from entries in any order; ties keep their listed order
    pub fn new(mut entries: Vec<ScriptedCommand>) -> Self {
        entries.sort_by(|a, b| a.at_ms.total_cmp(&b.at_ms));
        Self {
            pending: entries.into(),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, ScriptError> {
        let entries: Vec<ScriptedCommand> = serde_json::from_str(json)?;
        Ok(Self::new(entries))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScriptError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ScriptError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let script = Self::from_json_str(&json)?;
        log::info!(
            "Loaded {} scripted commands from {}",
            script.len(),
            path.display()
        );
        Ok(script)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl InputSource for ScriptedInput {
    fn poll(&mut self, now_ms: f64) -> Vec<Command> {
        let mut due = Vec::new();
        while self.pending.front().is_some_and(|e| e.at_ms <= now_ms) {
            if let Some(entry) = self.pending.pop_front() {
                due.push(entry.command);
            }
        }
        due
    }

    fn is_exhausted(&self) -> bool {
        self.pending.is_empty()
    }
}
