use crate::*;
pub use random::*;

mod random;

pub trait BoardGenerator {
    fn generate(self) -> RevealGame;
}

/// Values of a fresh board before shuffling, in composition order.
pub fn unshuffled_values() -> [CellValue; BOARD_SIZE] {
    let mut values = [CellValue::Neutral; BOARD_SIZE];
    let mut i = 0;
    for (value, count) in CellValue::COMPOSITION {
        for slot in &mut values[i..i + count] {
            *slot = value;
        }
        i += count;
    }
    values
}
