use super::*;

/// Purely random board, an unbiased shuffle of the fixed composition.
#[derive(Clone, Debug, PartialEq)]
pub struct ShuffledBoardGenerator {
    seed: u64,
}

impl ShuffledBoardGenerator {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl BoardGenerator for ShuffledBoardGenerator {
    fn generate(self) -> RevealGame {
        use rand::prelude::*;

        let mut rng = SmallRng::seed_from_u64(self.seed);
        let mut values = unshuffled_values();

        // Fisher-Yates, each position picks from the not yet placed prefix
        for i in (1..values.len()).rev() {
            let j = rng.random_range(0..=i);
            values.swap(i, j);
        }

        log::debug!("new reveal board from seed {}", self.seed);
        RevealGame::from_values(values)
            .expect("shuffling preserves the board composition")
    }
}
