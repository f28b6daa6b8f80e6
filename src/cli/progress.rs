use crate::data::Card;
use crate::error::{Error, Result};
use crate::logs::{LogEvent, ProgressBar};
use crate::pipeline::Visitor;

use std::io::Error as IoError;
use std::num::NonZero;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

const REFRESH: Duration = Duration::from_millis(100);

/// Forwards pipeline progress to the progress bar thread.
#[derive(Debug, Clone)]
pub struct ProgressVisitor {
    tx: Sender<LogEvent>,
}

impl ProgressVisitor {
    pub fn new(tx: Sender<LogEvent>) -> Self {
        Self { tx }
    }

    fn send(&self, event: LogEvent) {
        // the bar is gone when stderr is not a terminal
        let _ = self.tx.send(event);
    }
}

impl Visitor for ProgressVisitor {
    fn on_read_err(&self, index: usize, e: &Error) {
        self.send(LogEvent::Warn(0, format!("row {}: {e}", index + 1)));
    }

    fn on_skip(&self, _index: usize, e: &Error) {
        self.send(LogEvent::Skipped(e.to_string()));
    }

    fn on_total(&self, total: usize) {
        self.send(LogEvent::Total(total));
    }

    fn on_iter_start(&self, worker: usize, _index: usize, card: &Card) {
        self.send(LogEvent::Status(worker, format!("rendering `{}`...", card.name.trim())));
    }

    fn on_iter_ok(&self, worker: usize, _index: usize, _card: &Card) {
        self.send(LogEvent::Rendered(worker));
    }

    fn on_iter_err(&self, worker: usize, _index: usize, _card: &Card, e: &Error) {
        self.send(LogEvent::Failed(worker, e.to_string()));
    }

    fn on_finish(&self, worker: usize, result: &Result<()>) {
        match result {
            Ok(()) => self.send(LogEvent::Done(worker, "done!".to_string())),
            Err(e) => self.send(LogEvent::Error(worker, e.to_string())),
        }
    }
}

/// Draws the bar until every sender is dropped.
pub fn spawn_progress(
    n_workers: NonZero<usize>,
    rx: Receiver<LogEvent>,
) -> JoinHandle<std::result::Result<(), IoError>> {
    thread::spawn(move || {
        let mut pbar = ProgressBar::new_stderr(n_workers)?;
        loop {
            match rx.recv_timeout(REFRESH) {
                Ok(event) => pbar.log(event)?,
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
            pbar.update()?;
        }
        Ok(())
    })
}

pub fn channel() -> (Sender<LogEvent>, Receiver<LogEvent>) {
    mpsc::channel()
}
