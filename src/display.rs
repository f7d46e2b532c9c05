//! Hands the latest display text from the poller to the presentation task.
//!
//! The slot is a [`tokio::sync::watch`] channel: one writer, one reader, and
//! only the newest value is kept.

use chrono::Local;
use std::io::Write;
use tokio::sync::watch;
use tracing::warn;

use crate::status::{LogSink, Status, StatusSink};

/// Writer side of the display slot. Also logs everything it publishes, through
/// [`LogSink`].
pub struct DisplayHandle {
    tx: watch::Sender<String>,
}

/// Creates the slot, starting with the [`Status::Starting`] text.
pub fn channel() -> (DisplayHandle, watch::Receiver<String>) {
    let (tx, rx) = watch::channel(Status::Starting.to_string());
    (DisplayHandle { tx }, rx)
}

impl StatusSink for DisplayHandle {
    fn publish(&self, status: Status) {
        let text = status.to_string();
        LogSink.publish(status);
        // Succeeds even after the presenter has stopped.
        self.tx.send_replace(text);
    }
}

/// Something that can show a line of text.
pub trait Presenter {
    fn show(&mut self, text: &str) -> std::io::Result<()>;
}

/// Prints each new message with a local timestamp.
pub struct ConsolePresenter<W> {
    out: W,
}

impl<W: Write> ConsolePresenter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Presenter for ConsolePresenter<W> {
    fn show(&mut self, text: &str) -> std::io::Result<()> {
        writeln!(
            self.out,
            "{} leave-now:{}",
            Local::now().format("%b %d %H:%M:%S"),
            text
        )?;
        self.out.flush()
    }
}

/// Shows the current text, then each change, until the writer is dropped.
pub async fn run_presenter<P: Presenter>(mut rx: watch::Receiver<String>, mut presenter: P) -> P {
    loop {
        let text = rx.borrow_and_update().clone();
        if let Err(e) = presenter.show(&text) {
            warn!(error = %e, "Failed to present display text");
        }
        if rx.changed().await.is_err() {
            break;
        }
    }
    presenter
}
