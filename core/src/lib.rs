pub use cell::*;
pub use config::*;
pub use engine::*;
pub use error::*;
pub use flow::*;
pub use generator::*;
pub use notify::*;
pub use timer::*;
pub use types::*;

mod cell;
mod config;
mod engine;
mod error;
mod flow;
mod generator;
mod notify;
mod timer;
mod types;

pub use gauntlet_protocol::{CompletionNotice, NoticeTemplate};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RevealOutcome {
    NoChange,
    Revealed,
    Won,
    Lost,
}

impl RevealOutcome {
    pub const fn has_update(self) -> bool {
        use RevealOutcome::*;
        match self {
            NoChange => false,
            Revealed => true,
            Won => true,
            Lost => true,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Verification {
    Accepted,
    Rejected,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MathOutcome {
    Correct,
    Incorrect,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// Nothing is armed.
    Idle,
    /// The gate is still counting down.
    Counting,
    GateOpened,
    /// A deferred response fired and landed on this screen.
    Fired(Screen),
}

impl TickOutcome {
    pub const fn has_update(self) -> bool {
        use TickOutcome::*;
        match self {
            Idle => false,
            Counting => true,
            GateOpened => true,
            Fired(_) => true,
        }
    }
}
