//! Asynchronous queue of raw input units.
//!
//! The host pushes units through an [`EventSender`]; the session is the single
//! consumer of the paired [`EventSource`]. Units are delivered in push order
//! and each one exactly once.

use core::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver, UnboundedSender};
use tracing::trace;

use crate::decoder::Key;
use crate::error::Error;
use crate::utf8::{Utf8Decoder, Utf8DecoderStatus};

/// One unit of input
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum InputUnit {
    /// A raw code point as typed, including control codes and ESC
    Char(char),
    /// A key the host has already decoded (e.g. an on-screen button)
    Key(Key),
}

impl From<char> for InputUnit {
    fn from(c: char) -> Self {
        InputUnit::Char(c)
    }
}

impl From<Key> for InputUnit {
    fn from(key: Key) -> Self {
        InputUnit::Key(key)
    }
}

/// Result of waiting a bounded time for the next unit
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Next {
    Unit(InputUnit),
    TimedOut,
    Closed,
}

/// Create a connected sender/source pair
pub fn channel() -> (EventSender, EventSource) {
    let (tx, rx) = mpsc::unbounded_channel();

    (EventSender { tx }, EventSource { rx })
}

/// Producer half, cheap to clone and usable from any task or thread
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: UnboundedSender<InputUnit>,
}

impl EventSender {
    /// Queue one unit, waking the consumer if it is suspended
    pub fn push(&self, unit: impl Into<InputUnit>) -> Result<(), Error> {
        self.tx.send(unit.into()).map_err(|_| Error::Closed)
    }

    /// Queue every code point of `s` in order
    pub fn push_str(&self, s: &str) -> Result<(), Error> {
        s.chars().try_for_each(|c| self.push(c))
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Consumer half
#[derive(Debug)]
pub struct EventSource {
    rx: UnboundedReceiver<InputUnit>,
}

impl EventSource {
    /// Suspend until a unit is available. `None` once every sender is gone
    /// and the queue is drained.
    pub async fn next(&mut self) -> Option<InputUnit> {
        self.rx.recv().await
    }

    /// Dequeue without suspending
    pub fn try_next(&mut self) -> Option<InputUnit> {
        match self.rx.try_recv() {
            Ok(unit) => Some(unit),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Wait at most `timeout` for the next unit
    pub async fn next_within(&mut self, timeout: Duration) -> Next {
        match tokio::time::timeout(timeout, self.rx.recv()).await {
            Ok(Some(unit)) => Next::Unit(unit),
            Ok(None) => Next::Closed,
            Err(_) => Next::TimedOut,
        }
    }
}

/// Feed a byte stream into the event source until it ends.
///
/// Bytes are decoded as UTF-8; invalid sequences become U+FFFD. Returns when
/// the reader reaches end of file or the source has been dropped.
pub async fn pump<R: AsyncRead + Unpin>(mut reader: R, sender: EventSender) -> std::io::Result<()> {
    let mut decoder = Utf8Decoder::new();

    loop {
        let byte = match reader.read_u8().await {
            Ok(byte) => byte,
            Err(err) if err.kind() == std::io::ErrorKind::UnexpectedEof => {
                if decoder.is_pending() {
                    trace!("utf-8 sequence cut off by end of input");
                    let _ = sender.push(char::REPLACEMENT_CHARACTER);
                }
                return Ok(());
            }
            Err(err) => return Err(err),
        };

        let mut status = decoder.advance(byte);

        if status == (Utf8DecoderStatus::Error { retry: true }) {
            if sender.push(char::REPLACEMENT_CHARACTER).is_err() {
                return Ok(());
            }
            status = decoder.advance(byte);
        }

        let unit = match status {
            Utf8DecoderStatus::Continuation => continue,
            Utf8DecoderStatus::Done(c) => c,
            Utf8DecoderStatus::Error { .. } => {
                trace!(byte, "invalid utf-8 from host");
                char::REPLACEMENT_CHARACTER
            }
        };

        if sender.push(unit).is_err() {
            return Ok(());
        }
    }
}
