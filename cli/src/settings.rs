use anyhow::Context;
use gauntlet_core::FlowConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Contents of the `--config` file, every key is optional.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub(crate) struct Settings {
    pub seed: Option<u64>,
    /// File the completion notice is appended to, as JSON lines.
    pub outbox: Option<PathBuf>,
    pub flow: FlowConfig,
}

impl Settings {
    pub(crate) fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read config {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("Invalid config {}", path.display()))
    }

    fn parse(text: &str) -> anyhow::Result<Self> {
        let settings: Self = toml::from_str(text)?;
        settings.flow.validate().context("Invalid [flow] section")?;
        Ok(settings)
    }
}
