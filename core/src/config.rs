use chrono::NaiveDate;
use core::time::Duration;
use gauntlet_protocol::NoticeTemplate;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

pub const TOKEN_ALPHABET: &[u8] =
    b"!@#$%^&*()_+ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
pub const DEFAULT_TOKEN_LEN: usize = 16;
pub const DEFAULT_GATE_DELAY_MS: u64 = 15_000;
pub const DEFAULT_RESPONSE_DELAY_MS: u64 = 2_000;
pub const DEFAULT_CHALLENGE_N: i64 = 7;
pub const MAX_CHALLENGE_N: i64 = 1_000_000;
pub const MAX_TOKEN_LEN: usize = 256;

pub fn default_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 2, 23).unwrap_or_default()
}

/// Everything the flow treats as a constant, injected at construction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowConfig {
    /// Verification token, generated from the seed when absent.
    pub token: Option<String>,
    pub token_len: usize,
    pub gate_delay_ms: u64,
    pub response_delay_ms: u64,
    pub date: NaiveDate,
    /// Upper bound of the `1 + 2 + .. + n` challenge.
    pub challenge_n: i64,
    /// Seeds every random draw of a session, supplied by the caller rather than config files.
    #[serde(skip)]
    pub seed: u64,
    pub notice: NoticeTemplate,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            token: None,
            token_len: DEFAULT_TOKEN_LEN,
            gate_delay_ms: DEFAULT_GATE_DELAY_MS,
            response_delay_ms: DEFAULT_RESPONSE_DELAY_MS,
            date: default_date(),
            challenge_n: DEFAULT_CHALLENGE_N,
            seed: 0,
            notice: NoticeTemplate::default(),
        }
    }
}

impl FlowConfig {
    pub fn gate_delay(&self) -> Duration {
        Duration::from_millis(self.gate_delay_ms)
    }

    pub fn response_delay(&self) -> Duration {
        Duration::from_millis(self.response_delay_ms)
    }

    /// `1 + 2 + .. + n`, `None` when it does not fit an `i64`.
    pub fn challenge_answer(&self) -> Option<i64> {
        let n = self.challenge_n;
        n.checked_add(1)?.checked_mul(n).map(|sum| sum / 2)
    }

    /// Rejects values loaded from outside that the flow cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_CHALLENGE_N).contains(&self.challenge_n) {
            return Err(ConfigError::ChallengeOutOfRange {
                value: self.challenge_n,
                max: MAX_CHALLENGE_N,
            });
        }
        if !(1..=MAX_TOKEN_LEN).contains(&self.token_len) {
            return Err(ConfigError::TokenLenOutOfRange {
                value: self.token_len,
                max: MAX_TOKEN_LEN,
            });
        }
        Ok(())
    }
}

pub fn generate_token(rng: &mut SmallRng, len: usize) -> String {
    use rand::prelude::*;

    (0..len)
        .map(|_| char::from(TOKEN_ALPHABET[rng.random_range(0..TOKEN_ALPHABET.len())]))
        .collect()
}
