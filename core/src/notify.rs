use core::fmt::Display;
use gauntlet_protocol::CompletionNotice;

/// Delivers the completion notice, failures are only ever logged by the caller.
pub trait Notifier {
    type Error: Display;

    fn send(&mut self, notice: &CompletionNotice) -> Result<(), Self::Error>;
}

/// Notifier that only writes the notice to the log.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    type Error = core::convert::Infallible;

    fn send(&mut self, notice: &CompletionNotice) -> Result<(), Self::Error> {
        log::info!(
            "completion notice \"{}\" at {}: {}",
            notice.subject,
            notice.timestamp,
            notice.message
        );
        Ok(())
    }
}

/// Sends and swallows the outcome, keeping the caller's transition unconditional.
pub(crate) fn deliver<N: Notifier>(notifier: &mut N, notice: &CompletionNotice) {
    match notifier.send(notice) {
        Ok(()) => log::debug!("completion notice sent"),
        Err(err) => log::error!("failed to send completion notice: {}", err),
    }
}
