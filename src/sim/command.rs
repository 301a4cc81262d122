//! Player commands and their rejection reasons

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::unit::UnitKind;
use super::upgrades::UpgradeKind;

/// A discrete player action applied between frames
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    /// Start placing a unit bought from the shop
    PlaceUnit { kind: UnitKind },
    /// Drop the pending unit at a position
    ConfirmPlacement { x: f64, y: f64 },
    CancelPlacement,
    BuyUpgrade { kind: UpgradeKind },
    /// Select the unit under the cursor, or clear the selection
    SelectUnitAt { x: f64, y: f64 },
    /// Evolve the selected unit along the named path
    Evolve { path: String },
    TogglePause,
    ToggleSpeed,
    Restart,
    /// Cursor position for the placement preview
    PointerMoved { x: f64, y: f64 },
}

impl Command {
    /// Commands accepted while paused or after game over
    pub fn allowed_when_not_playing(&self) -> bool {
        matches!(
            self,
            Command::TogglePause
                | Command::ToggleSpeed
                | Command::Restart
                | Command::CancelPlacement
                | Command::PointerMoved { .. }
        )
    }
}

/// Why a placement position was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PlacementError {
    #[error("too close to the core")]
    TooCloseToCore,
    #[error("too close to another unit")]
    TooCloseToUnit,
    #[error("outside the play area")]
    OutOfBounds,
}

/// A rejected command. Rejections never change session state.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandError {
    #[error("the game is not running")]
    NotPlaying,
    #[error("insufficient funds: need {needed}, have {available}")]
    InsufficientFunds { needed: f64, available: f64 },
    #[error("invalid placement: {0}")]
    InvalidPlacement(#[from] PlacementError),
    #[error("no unit is waiting to be placed")]
    NoPlacementPending,
    #[error("{0} cannot be bought")]
    NotForSale(UnitKind),
    #[error("no unit selected")]
    NoSelection,
    #[error("selected unit cannot evolve")]
    NotEvolvable,
    #[error("unknown evolution path '{0}'")]
    UnknownEvolutionPath(String),
}
