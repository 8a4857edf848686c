use thiserror::Error;

use crate::{CellId, Screen};

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum FlowError {
    #[error("`{action}` is not available on the {screen} screen")]
    WrongScreen {
        action: &'static str,
        screen: Screen,
    },
    #[error("Invalid cell {0}")]
    InvalidCell(CellId),
    #[error("Game already ended, no new moves are accepted")]
    AlreadyEnded,
    #[error("Game is still in progress")]
    GameInProgress,
    #[error("Game ended the other way")]
    WrongResult,
    #[error("A response is already pending")]
    ResponsePending,
    #[error("No gender selected")]
    UnsetGender,
}

pub type Result<T> = core::result::Result<T, FlowError>;

/// A [`crate::FlowConfig`] value the flow cannot run with.
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("challenge_n must be in 1..={max}, got {value}")]
    ChallengeOutOfRange { value: i64, max: i64 },
    #[error("token_len must be in 1..={max}, got {value}")]
    TokenLenOutOfRange { value: usize, max: usize },
}
