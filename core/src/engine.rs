use core::num::Saturating;
use serde::{Deserialize, Serialize};

use crate::*;

/// Win-token reveals needed to win a board.
pub const WIN_TOKENS_TO_WIN: u8 = 3;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    #[default]
    Active,
    Won,
    Lost,
}

impl GameState {
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

/// The tile-reveal minigame: a 12 cell board and its counters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RevealGame {
    cells: [Cell; BOARD_SIZE],
    revealed_count: Saturating<u8>,
    win_tokens: Saturating<u8>,
    state: GameState,
}

impl RevealGame {
    /// Board with the given layout, rejected unless it holds exactly the fixed composition.
    pub fn from_values(values: [CellValue; BOARD_SIZE]) -> Option<Self> {
        let valid = CellValue::COMPOSITION
            .iter()
            .all(|&(kind, count)| values.iter().filter(|&&value| value == kind).count() == count);
        if !valid {
            return None;
        }

        let mut id: CellId = 0;
        let cells = values.map(|value| {
            let cell = Cell::new(id, value);
            id += 1;
            cell
        });

        Some(Self {
            cells,
            revealed_count: Saturating(0),
            win_tokens: Saturating(0),
            state: Default::default(),
        })
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    pub fn won(&self) -> bool {
        matches!(self.state, GameState::Won)
    }

    pub fn revealed_count(&self) -> u8 {
        self.revealed_count.0
    }

    pub fn win_tokens(&self) -> u8 {
        self.win_tokens.0
    }

    pub fn cells(&self) -> &[Cell; BOARD_SIZE] {
        &self.cells
    }

    pub fn cell_at(&self, id: CellId) -> Option<Cell> {
        self.cells.get(usize::from(id)).copied()
    }

    pub fn can_reveal(&self, id: CellId) -> bool {
        !self.is_finished() && self.cell_at(id).is_some_and(|cell| !cell.is_revealed())
    }

    pub fn reveal(&mut self, id: CellId) -> Result<RevealOutcome> {
        let index = self.validate_id(id)?;

        if self.cells[index].is_revealed() {
            return Ok(RevealOutcome::NoChange);
        }
        self.check_not_finished()?;

        let cell = &mut self.cells[index];
        cell.reveal();
        self.revealed_count += 1;

        Ok(match cell.value() {
            CellValue::WinToken => {
                self.win_tokens += 1;
                if self.win_tokens.0 >= WIN_TOKENS_TO_WIN {
                    self.state = GameState::Won;
                    RevealOutcome::Won
                } else {
                    RevealOutcome::Revealed
                }
            }
            CellValue::LosingToken => {
                self.state = GameState::Lost;
                RevealOutcome::Lost
            }
            CellValue::Neutral => RevealOutcome::Revealed,
        })
    }

    fn validate_id(&self, id: CellId) -> Result<usize> {
        let index = usize::from(id);
        if index < self.cells.len() {
            Ok(index)
        } else {
            Err(FlowError::InvalidCell(id))
        }
    }

    fn check_not_finished(&self) -> Result<()> {
        if self.state.is_finished() {
            Err(FlowError::AlreadyEnded)
        } else {
            Ok(())
        }
    }
}
