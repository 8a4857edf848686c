use anyhow::Context;
use gauntlet_core::{CompletionNotice, Notifier};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

/// Appends each notice to a JSON-lines file, or only logs it when no file is configured.
#[derive(Clone, Debug, Default)]
pub(crate) struct OutboxNotifier {
    path: Option<PathBuf>,
}

impl OutboxNotifier {
    pub(crate) fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }
}

impl Notifier for OutboxNotifier {
    type Error = anyhow::Error;

    fn send(&mut self, notice: &CompletionNotice) -> anyhow::Result<()> {
        let Some(path) = &self.path else {
            log::info!("no outbox configured, notice: {}", notice.message);
            return Ok(());
        };

        let line = notice.to_json_line()?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Could not open outbox {}", path.display()))?;
        file.write_all(line.as_bytes())?;
        log::debug!("notice appended to {}", path.display());
        Ok(())
    }
}
