use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

/// Identity of a reveal board cell, `0..BOARD_SIZE`.
pub type CellId = u8;

/// Number of cells on a reveal board.
pub const BOARD_SIZE: usize = 12;

/// Named screens of the flow, exactly one is active at a time.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Screen {
    #[default]
    Initial,
    Verify,
    ConfirmPending,
    MathChallenge,
    GenderPrompt,
    RevealGame,
    FinalQuestion,
    DateSelect,
    FinalConfirm,
}

impl Screen {
    pub const fn as_str(self) -> &'static str {
        use Screen::*;
        match self {
            Initial => "initial",
            Verify => "verify",
            ConfirmPending => "confirmPending",
            MathChallenge => "mathChallenge",
            GenderPrompt => "genderPrompt",
            RevealGame => "revealGame",
            FinalQuestion => "finalQuestion",
            DateSelect => "dateSelect",
            FinalConfirm => "finalConfirm",
        }
    }

    /// Screens the flow resets through.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Initial | Self::FinalConfirm)
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    #[default]
    Unset,
    Female,
    Male,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseGenderError;

impl fmt::Display for ParseGenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("expected one of: female, male, other")
    }
}

impl FromStr for Gender {
    type Err = ParseGenderError;

    fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
        match s {
            "female" => Ok(Self::Female),
            "male" => Ok(Self::Male),
            "other" => Ok(Self::Other),
            _ => Err(ParseGenderError),
        }
    }
}

/// Position of the decoy button, in percent of its container.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DecoyPosition {
    pub x: f64,
    pub y: f64,
}

impl DecoyPosition {
    pub const MAX_X: f64 = 80.0;
    pub const MAX_Y: f64 = 70.0;

    pub fn is_in_bounds(self) -> bool {
        self.x >= 0.0 && self.x <= Self::MAX_X && self.y >= 0.0 && self.y <= Self::MAX_Y
    }
}

impl Default for DecoyPosition {
    fn default() -> Self {
        Self { x: 50.0, y: 50.0 }
    }
}
