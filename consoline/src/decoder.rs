//! Escape-sequence decoding
//!
//! Turns raw input units into logical [`Key`] events. A lone ESC and the
//! start of a cursor-key sequence share the same leading code point, so the
//! decoder waits a bounded time after ESC before deciding which one it saw.

use core::time::Duration;

use num_enum::{IntoPrimitive, TryFromPrimitive};
use tracing::trace;

use crate::event_source::{EventSource, InputUnit, Next};

/// Logical key event
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum Key {
    Char(char),
    Enter,
    Tab,
    Backspace,
    CtrlC,
    CtrlL,
    Escape,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Home,
    End,
}

#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Eq, PartialEq, Copy, Clone, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum ControlCharacter {
    NUL = 0x0,
    CtrlA = 0x1,
    CtrlB = 0x2,
    CtrlC = 0x3,
    CtrlD = 0x4,
    CtrlE = 0x5,
    CtrlF = 0x6,
    CtrlG = 0x7,
    CtrlH = 0x8,
    Tab = 0x9,
    LineFeed = 0xA,
    CtrlK = 0xB,
    CtrlL = 0xC,
    CarriageReturn = 0xD,
    CtrlN = 0xE,
    CtrlO = 0xF,
    CtrlP = 0x10,
    CtrlQ = 0x11,
    CtrlR = 0x12,
    CtrlS = 0x13,
    CtrlT = 0x14,
    CtrlU = 0x15,
    CtrlV = 0x16,
    CtrlW = 0x17,
    CtrlX = 0x18,
    CtrlY = 0x19,
    CtrlZ = 0x1A,
    Escape = 0x1B,
    FS = 0x1C,
    GS = 0x1D,
    RS = 0x1E,
    US = 0x1F,
    Backspace = 0x7F,
}

impl ControlCharacter {
    fn from_char(c: char) -> Option<Self> {
        u8::try_from(u32::from(c))
            .ok()
            .and_then(|byte| Self::try_from(byte).ok())
    }

    fn key(self) -> Option<Key> {
        use ControlCharacter::*;

        Some(match self {
            CtrlA => Key::Home,
            CtrlB => Key::ArrowLeft,
            CtrlC => Key::CtrlC,
            CtrlE => Key::End,
            CtrlF => Key::ArrowRight,
            CtrlH | Backspace => Key::Backspace,
            Tab => Key::Tab,
            LineFeed | CarriageReturn => Key::Enter,
            CtrlL => Key::CtrlL,
            Escape => Key::Escape,
            _ => return None,
        })
    }
}

/// Final byte of a control sequence, with its first numeric parameter
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
enum CSI {
    CUU,
    CUD,
    CUF,
    CUB,
    Home,
    End,
    Unknown(char),
}

impl CSI {
    fn new(c: char, arg: Option<usize>) -> Self {
        match c {
            'A' => Self::CUU,
            'B' => Self::CUD,
            'C' => Self::CUF,
            'D' => Self::CUB,
            'H' => Self::Home,
            'F' => Self::End,
            '~' => match arg {
                Some(1) | Some(7) => Self::Home,
                Some(4) | Some(8) => Self::End,
                _ => Self::Unknown(c),
            },
            _ => Self::Unknown(c),
        }
    }

    fn key(self) -> Option<Key> {
        Some(match self {
            CSI::CUU => Key::ArrowUp,
            CSI::CUD => Key::ArrowDown,
            CSI::CUF => Key::ArrowRight,
            CSI::CUB => Key::ArrowLeft,
            CSI::Home => Key::Home,
            CSI::End => Key::End,
            CSI::Unknown(_) => return None,
        })
    }
}

/// Upper bound on parameter/intermediate code points in one sequence
const MAX_SEQUENCE_LEN: usize = 16;

enum Sequence {
    Key(Key),
    Discarded,
    /// A pre-decoded key interrupted the sequence
    Interrupted(Key),
    Closed,
}

/// Pulls units from an [`EventSource`] and yields keys
pub struct KeyDecoder {
    source: EventSource,
    escape_timeout: Duration,
    pending: Option<Key>,
}

impl KeyDecoder {
    pub fn new(source: EventSource, escape_timeout: Duration) -> Self {
        Self {
            source,
            escape_timeout,
            pending: None,
        }
    }

    /// Next logical key, or `None` once input is closed
    pub async fn next_key(&mut self) -> Option<Key> {
        if let Some(key) = self.pending.take() {
            return Some(key);
        }

        loop {
            let c = match self.source.next().await? {
                InputUnit::Key(key) => return Some(key),
                InputUnit::Char(c) => c,
            };

            if c == '\x1b' {
                match self.escape().await {
                    Sequence::Key(key) => return Some(key),
                    Sequence::Discarded => continue,
                    Sequence::Interrupted(key) => {
                        self.pending = Some(key);
                        return Some(Key::Escape);
                    }
                    Sequence::Closed => return Some(Key::Escape),
                }
            }

            if let Some(control) = ControlCharacter::from_char(c) {
                match control.key() {
                    Some(key) => return Some(key),
                    None => {
                        trace!(?control, "ignoring control character");
                        continue;
                    }
                }
            }

            if c.is_control() {
                trace!(codepoint = u32::from(c), "ignoring control character");
                continue;
            }

            return Some(Key::Char(c));
        }
    }

    async fn escape(&mut self) -> Sequence {
        match self.source.next_within(self.escape_timeout).await {
            Next::TimedOut | Next::Closed => Sequence::Key(Key::Escape),
            Next::Unit(InputUnit::Key(key)) => Sequence::Interrupted(key),
            Next::Unit(InputUnit::Char('[')) => self.csi().await,
            Next::Unit(InputUnit::Char('O')) => self.ss3().await,
            Next::Unit(InputUnit::Char(c)) => {
                trace!(?c, "discarding escape continuation");
                Sequence::Discarded
            }
        }
    }

    async fn csi(&mut self) -> Sequence {
        let mut arg: Option<usize> = None;
        let mut in_first_arg = true;

        for i in 0..MAX_SEQUENCE_LEN {
            let c = match self.source.next().await {
                Some(InputUnit::Char(c)) => c,
                Some(InputUnit::Key(key)) => return Sequence::Interrupted(key),
                None => return Sequence::Closed,
            };

            match c {
                // Linux console function keys, ESC [ [ A..E
                '[' if i == 0 => return self.discard_one().await,
                '0'..='9' if in_first_arg => {
                    let digit = (c as u8 - b'0') as usize;
                    arg = Some(arg.unwrap_or(0).saturating_mul(10).saturating_add(digit));
                }
                ';' => in_first_arg = false,
                '\x40'..='\x7e' => {
                    let csi = CSI::new(c, arg);

                    return match csi.key() {
                        Some(key) => Sequence::Key(key),
                        None => {
                            trace!(?csi, "discarding unknown control sequence");
                            Sequence::Discarded
                        }
                    };
                }
                _ => (),
            }
        }

        trace!("discarding overlong control sequence");
        Sequence::Discarded
    }

    async fn discard_one(&mut self) -> Sequence {
        match self.source.next().await {
            Some(InputUnit::Char(c)) => {
                trace!(?c, "discarding console function key");
                Sequence::Discarded
            }
            Some(InputUnit::Key(key)) => Sequence::Interrupted(key),
            None => Sequence::Closed,
        }
    }

    async fn ss3(&mut self) -> Sequence {
        match self.source.next().await {
            Some(InputUnit::Char(c)) => match CSI::new(c, None).key() {
                Some(key) => Sequence::Key(key),
                None => {
                    trace!(?c, "discarding unknown SS3 sequence");
                    Sequence::Discarded
                }
            },
            Some(InputUnit::Key(key)) => Sequence::Interrupted(key),
            None => Sequence::Closed,
        }
    }
}
