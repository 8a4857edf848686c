use serde::{Deserialize, Serialize};

use crate::CellId;

/// Hidden outcome behind a reveal board cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellValue {
    /// Three of these end the game as a win.
    WinToken,
    /// No effect besides counting as revealed.
    Neutral,
    /// A single one ends the game as a loss.
    LosingToken,
}

impl CellValue {
    /// How many of each outcome a board holds.
    pub const COMPOSITION: [(CellValue, usize); 3] = [
        (CellValue::WinToken, 5),
        (CellValue::Neutral, 2),
        (CellValue::LosingToken, 5),
    ];
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    id: CellId,
    value: CellValue,
    revealed: bool,
}

impl Cell {
    pub(crate) const fn new(id: CellId, value: CellValue) -> Self {
        Self {
            id,
            value,
            revealed: false,
        }
    }

    pub const fn id(self) -> CellId {
        self.id
    }

    pub const fn is_revealed(self) -> bool {
        self.revealed
    }

    /// Value as seen by the player, `None` while hidden.
    pub const fn visible_value(self) -> Option<CellValue> {
        if self.revealed { Some(self.value) } else { None }
    }

    pub(crate) const fn value(self) -> CellValue {
        self.value
    }

    pub(crate) fn reveal(&mut self) {
        self.revealed = true;
    }
}
