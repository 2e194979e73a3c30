//! Progress reporting as an independent subscriber.
//!
//! The aggregator publishes a [`ProgressEvent`] after every received result.
//! Events travel over a channel to a dedicated thread that drives a
//! [`ProgressObserver`], so a slow or failing display never holds up
//! aggregation.

use std::io::{self, IsTerminal, Write};
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;

/// Snapshot published after each result is aggregated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressEvent {
    pub processed: usize,
    pub total: usize,
    pub with_findings: usize,
}

/// Receives progress snapshots on the subscriber thread.
pub trait ProgressObserver: Send {
    fn on_progress(&mut self, event: ProgressEvent);

    /// Called once after the last event, with that event if there was one.
    fn on_complete(&mut self, _last: Option<ProgressEvent>) {}
}

/// Handle to a running progress subscriber thread.
#[derive(Debug)]
pub struct ProgressSubscriber {
    sender: Sender<ProgressEvent>,
    handle: JoinHandle<()>,
}

impl ProgressSubscriber {
    /// Spawns the subscriber thread for `observer`.
    pub fn spawn(mut observer: Box<dyn ProgressObserver>) -> Self {
        let (sender, receiver) = mpsc::channel::<ProgressEvent>();
        let handle = std::thread::spawn(move || {
            let mut last = None;
            for event in receiver {
                observer.on_progress(event);
                last = Some(event);
            }
            observer.on_complete(last);
        });
        Self { sender, handle }
    }

    /// Sender for publishing events; the thread exits once every clone is dropped.
    pub fn sender(&self) -> Sender<ProgressEvent> {
        self.sender.clone()
    }

    /// Closes this handle's sender and waits for the observer to finish.
    pub fn finish(self) {
        drop(self.sender);
        if self.handle.join().is_err() {
            tracing::warn!("progress display thread panicked");
        }
    }
}

const CLEAR_LINE: &[u8] = b"\r\x1b[2K";

/// Shared state of a status line drawn in place on a terminal.
///
/// Every write to the stream carrying the line goes through the same lock,
/// so other output (log records) first erases the line instead of being
/// spliced into it.
#[derive(Debug, Clone, Default)]
pub struct StatusLine {
    drawn: Arc<Mutex<bool>>,
}

impl StatusLine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes `buf` to `out`, erasing the status line first if it is drawn.
    pub fn write_above<W: Write>(&self, out: &mut W, buf: &[u8]) -> io::Result<()> {
        let mut drawn = self.lock();
        if *drawn {
            out.write_all(CLEAR_LINE)?;
            *drawn = false;
        }
        out.write_all(buf)?;
        out.flush()
    }

    fn draw<W: Write>(&self, out: &mut W, text: &str) -> io::Result<()> {
        let mut drawn = self.lock();
        out.write_all(CLEAR_LINE)?;
        out.write_all(text.as_bytes())?;
        out.flush()?;
        *drawn = true;
        Ok(())
    }

    /// Moves past a drawn line so later output starts on a fresh line.
    fn release<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let mut drawn = self.lock();
        if *drawn {
            writeln!(out)?;
            out.flush()?;
            *drawn = false;
        }
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, bool> {
        self.drawn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// [`Write`] adapter that keeps output clear of a [`StatusLine`].
#[derive(Debug)]
pub struct StatusAwareWriter<W: Write> {
    line: StatusLine,
    out: W,
}

impl<W: Write> StatusAwareWriter<W> {
    pub fn new(line: StatusLine, out: W) -> Self {
        Self { line, out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Write for StatusAwareWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.line.write_above(&mut self.out, buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

/// Single-line status display:
/// `<processed>/<total> files validated, with <n> files with errors`.
///
/// The line is only drawn on a terminal and is left in place, followed by a
/// newline, when the run completes. Totals are reported by the caller.
pub struct TerminalProgress<W: Write + Send> {
    out: W,
    interactive: bool,
    line: StatusLine,
}

impl TerminalProgress<io::Stderr> {
    /// Writes to stderr, drawing only when stderr is a terminal.
    pub fn stderr() -> Self {
        let out = io::stderr();
        let interactive = out.is_terminal();
        Self::new(out, interactive)
    }
}

impl<W: Write + Send> TerminalProgress<W> {
    pub fn new(out: W, interactive: bool) -> Self {
        Self {
            out,
            interactive,
            line: StatusLine::new(),
        }
    }

    /// Shares `line` with other writers of the same stream.
    pub fn with_status_line(mut self, line: StatusLine) -> Self {
        self.line = line;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> ProgressObserver for TerminalProgress<W> {
    fn on_progress(&mut self, event: ProgressEvent) {
        if !self.interactive {
            return;
        }
        let text = format!(
            "{}/{} files validated, with {} files with errors",
            event.processed, event.total, event.with_findings
        );
        let _ = self.line.draw(&mut self.out, &text);
    }

    fn on_complete(&mut self, _last: Option<ProgressEvent>) {
        let _ = self.line.release(&mut self.out);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[derive(Clone, Default)]
    struct Recorder(Arc<Mutex<Vec<ProgressEvent>>>);

    impl ProgressObserver for Recorder {
        fn on_progress(&mut self, event: ProgressEvent) {
            self.0.lock().unwrap().push(event);
        }
    }

    #[test]
    fn test_subscriber_receives_events_in_order() {
        let recorder = Recorder::default();
        let subscriber = ProgressSubscriber::spawn(Box::new(recorder.clone()));
        let sender = subscriber.sender();
        for processed in 1..=3 {
            sender
                .send(ProgressEvent {
                    processed,
                    total: 3,
                    with_findings: processed / 2,
                })
                .unwrap();
        }
        drop(sender);
        subscriber.finish();

        let events = recorder.0.lock().unwrap();
        let processed: Vec<usize> = events.iter().map(|e| e.processed).collect();
        assert_eq!(processed, vec![1, 2, 3]);
    }

    #[test]
    fn test_terminal_progress_non_interactive_writes_nothing() {
        let mut progress = TerminalProgress::new(Vec::new(), false);
        let event = ProgressEvent {
            processed: 4,
            total: 4,
            with_findings: 1,
        };
        progress.on_progress(event);
        progress.on_complete(Some(event));

        assert!(progress.into_inner().is_empty());
    }

    #[test]
    fn test_terminal_progress_interactive_redraws_line() {
        let mut progress = TerminalProgress::new(Vec::new(), true);
        progress.on_progress(ProgressEvent {
            processed: 1,
            total: 2,
            with_findings: 0,
        });
        let text = String::from_utf8(progress.into_inner()).unwrap();
        assert!(text.starts_with('\r'));
        assert!(text.ends_with("1/2 files validated, with 0 files with errors"));
    }

    #[test]
    fn test_terminal_progress_completion_only_ends_the_line() {
        let mut progress = TerminalProgress::new(Vec::new(), true);
        let event = ProgressEvent {
            processed: 2,
            total: 2,
            with_findings: 1,
        };
        progress.on_progress(event);
        progress.on_complete(Some(event));

        let text = String::from_utf8(progress.into_inner()).unwrap();
        assert!(text.ends_with("2/2 files validated, with 1 files with errors\n"));
        assert!(!text.contains("errors found"));
    }

    #[test]
    fn test_log_output_erases_drawn_status_line() {
        let line = StatusLine::new();
        let mut out = Vec::new();
        line.draw(&mut out, "1/2 files validated, with 0 files with errors")
            .unwrap();

        let mut log = StatusAwareWriter::new(line.clone(), out);
        log.write_all(b"WARN failed to load specification\n").unwrap();
        log.write_all(b"WARN second\n").unwrap();
        let out = log.into_inner();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "\r\x1b[2K1/2 files validated, with 0 files with errors\
             \r\x1b[2KWARN failed to load specification\n\
             WARN second\n"
        );
    }
}
