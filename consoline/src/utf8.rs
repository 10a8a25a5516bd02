//! Incremental UTF-8 decoding for byte-oriented hosts.
//!
//! The event source carries code points; hosts that only have a byte stream
//! (a tty, a socket) feed it through [`Utf8Decoder`] first.

enum Utf8ByteType {
    SingleByte,
    StartTwoByte,
    StartThreeByte,
    StartFourByte,
    Continuation,
    Invalid,
}

trait Utf8Byte {
    fn utf8_byte_type(&self) -> Utf8ByteType;
}

impl Utf8Byte for u8 {
    fn utf8_byte_type(&self) -> Utf8ByteType {
        let byte = *self;

        if byte & 0b1000_0000 == 0 {
            Utf8ByteType::SingleByte
        } else if byte & 0b1100_0000 == 0b1000_0000 {
            Utf8ByteType::Continuation
        } else if byte & 0b1110_0000 == 0b1100_0000 {
            Utf8ByteType::StartTwoByte
        } else if byte & 0b1111_0000 == 0b1110_0000 {
            Utf8ByteType::StartThreeByte
        } else if byte & 0b1111_1000 == 0b1111_0000 {
            Utf8ByteType::StartFourByte
        } else {
            Utf8ByteType::Invalid
        }
    }
}

#[derive(Debug, Eq, PartialEq)]
pub enum Utf8DecoderStatus {
    /// More bytes are needed
    Continuation,
    /// A complete code point
    Done(char),
    /// The bytes seen so far can never form a code point. The decoder has
    /// been reset; if `retry` is set the offending byte started a new
    /// sequence and must be fed again.
    Error { retry: bool },
}

/// Byte-at-a-time UTF-8 decoder
///
/// Unlike [`core::str::from_utf8`], partial sequences are carried across
/// calls, so bytes may arrive one by one from an async reader.
#[derive(Debug, Default, Eq, PartialEq)]
pub struct Utf8Decoder {
    codepoint: u32,
    remaining: u8,
}

impl Utf8Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while a multi-byte sequence is partially decoded
    pub fn is_pending(&self) -> bool {
        self.remaining > 0
    }

    fn start(&mut self, bits: u32, remaining: u8) -> Utf8DecoderStatus {
        self.codepoint = bits;
        self.remaining = remaining;
        Utf8DecoderStatus::Continuation
    }

    fn reset(&mut self) {
        self.codepoint = 0;
        self.remaining = 0;
    }

    pub fn advance(&mut self, byte: u8) -> Utf8DecoderStatus {
        if self.remaining == 0 {
            return match byte.utf8_byte_type() {
                Utf8ByteType::SingleByte => Utf8DecoderStatus::Done(byte as char),
                Utf8ByteType::StartTwoByte => self.start((byte & 0x1f) as u32, 1),
                Utf8ByteType::StartThreeByte => self.start((byte & 0x0f) as u32, 2),
                Utf8ByteType::StartFourByte => self.start((byte & 0x07) as u32, 3),
                Utf8ByteType::Continuation | Utf8ByteType::Invalid => {
                    Utf8DecoderStatus::Error { retry: false }
                }
            };
        }

        match byte.utf8_byte_type() {
            Utf8ByteType::Continuation => {
                self.codepoint = (self.codepoint << 6) | (byte & 0x3f) as u32;
                self.remaining -= 1;

                if self.remaining > 0 {
                    return Utf8DecoderStatus::Continuation;
                }

                let codepoint = self.codepoint;
                self.reset();

                match char::from_u32(codepoint) {
                    Some(c) => Utf8DecoderStatus::Done(c),
                    None => Utf8DecoderStatus::Error { retry: false },
                }
            }
            _ => {
                self.reset();
                Utf8DecoderStatus::Error { retry: true }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_all(bytes: &[u8]) -> Vec<Utf8DecoderStatus> {
        let mut decoder = Utf8Decoder::new();

        bytes.iter().map(|&b| decoder.advance(b)).collect()
    }

    #[test]
    fn ascii() {
        let mut decoder = Utf8Decoder::new();

        assert_eq!(decoder.advance(b'a'), Utf8DecoderStatus::Done('a'));
        assert_eq!(decoder.advance(b'b'), Utf8DecoderStatus::Done('b'));
        assert!(!decoder.is_pending());
    }

    #[test]
    fn twobyte() {
        assert_eq!(
            decode_all("æ".as_bytes()),
            [Utf8DecoderStatus::Continuation, Utf8DecoderStatus::Done('æ')]
        );
    }

    #[test]
    fn threebyte() {
        assert_eq!(
            decode_all("€".as_bytes()),
            [
                Utf8DecoderStatus::Continuation,
                Utf8DecoderStatus::Continuation,
                Utf8DecoderStatus::Done('€')
            ]
        );
    }

    #[test]
    fn fourbyte() {
        let statuses = decode_all("😂".as_bytes());

        assert_eq!(statuses.last(), Some(&Utf8DecoderStatus::Done('😂')));
    }

    #[test]
    fn invalid_start() {
        let mut decoder = Utf8Decoder::new();

        assert_eq!(
            decoder.advance(0b1000_0000),
            Utf8DecoderStatus::Error { retry: false }
        );
        assert_eq!(decoder.advance(b'a'), Utf8DecoderStatus::Done('a'));
    }

    #[test]
    fn interrupted_sequence() {
        let mut decoder = Utf8Decoder::new();

        assert_eq!(decoder.advance(0b1100_0011), Utf8DecoderStatus::Continuation);
        assert_eq!(decoder.advance(b'a'), Utf8DecoderStatus::Error { retry: true });
        assert!(!decoder.is_pending());
        assert_eq!(decoder.advance(b'a'), Utf8DecoderStatus::Done('a'));
    }
}
