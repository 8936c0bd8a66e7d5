//! Single-byte character sets: ASCII, Latin-1 and Latin-9

use textcodec_core::engine::{encode_replacement, MappingStep, Step};
use textcodec_core::prelude::*;

/// Bytes of ISO-8859-15 that differ from ISO-8859-1, with their characters
const LATIN9_OVERRIDES: [(u8, char); 8] = [
    (0xa4, '\u{20ac}'),
    (0xa6, '\u{0160}'),
    (0xa8, '\u{0161}'),
    (0xb4, '\u{017d}'),
    (0xb8, '\u{017e}'),
    (0xbc, '\u{0152}'),
    (0xbd, '\u{0153}'),
    (0xbe, '\u{0178}'),
];

/// A single-byte character set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Charset {
    Ascii,
    Latin1,
    Latin9,
}

impl Charset {
    /// Canonical codec name
    pub fn name(self) -> &'static str {
        match self {
            Charset::Ascii => "ascii",
            Charset::Latin1 => "latin-1",
            Charset::Latin9 => "iso-8859-15",
        }
    }

    fn reason(self) -> &'static str {
        match self {
            Charset::Ascii => "ordinal not in range(128)",
            Charset::Latin1 => "ordinal not in range(256)",
            Charset::Latin9 => "character maps to <undefined>",
        }
    }

    /// Byte for `c`, if the charset has one
    pub fn encode_char(self, c: char) -> Option<u8> {
        match self {
            Charset::Ascii => c.is_ascii().then_some(c as u8),
            Charset::Latin1 => u8::try_from(c as u32).ok(),
            Charset::Latin9 => {
                if let Some(&(byte, _)) = LATIN9_OVERRIDES.iter().find(|&&(_, ch)| ch == c) {
                    return Some(byte);
                }
                let byte = u8::try_from(c as u32).ok()?;
                let replaced = LATIN9_OVERRIDES.iter().any(|&(b, _)| b == byte);
                (!replaced).then_some(byte)
            }
        }
    }

    /// Character for `byte`, if the charset defines one
    pub fn decode_byte(self, byte: u8) -> Option<char> {
        match self {
            Charset::Ascii => byte.is_ascii().then_some(byte as char),
            Charset::Latin1 => Some(byte as char),
            Charset::Latin9 => Some(
                LATIN9_OVERRIDES
                    .iter()
                    .find(|&&(b, _)| b == byte)
                    .map_or(byte as char, |&(_, c)| c),
            ),
        }
    }
}

/// Encoding step for a [`Charset`]
pub struct SingleByteEncoder(pub Charset);

impl MappingStep for SingleByteEncoder {
    type Unit = char;
    type Output = Vec<u8>;
    const OPERATION: Operation = Operation::Encode;

    fn encoding(&self) -> &str {
        self.0.name()
    }

    fn map(&self, input: &[char], pos: usize, out: &mut Vec<u8>) -> Result<Step> {
        match self.0.encode_char(input[pos]) {
            Some(byte) => {
                out.push(byte);
                Ok(Step::mapped(1))
            }
            None => Ok(Step::rejected(1, self.0.reason())),
        }
    }

    fn splice(&self, replacement: &str, out: &mut Vec<u8>) -> Result<bool> {
        encode_replacement(self, replacement, out)
    }
}

/// Decoding step for a [`Charset`]; reports each undefined byte on its own
pub struct SingleByteDecoder(pub Charset);

impl MappingStep for SingleByteDecoder {
    type Unit = u8;
    type Output = String;
    const OPERATION: Operation = Operation::Decode;

    fn encoding(&self) -> &str {
        self.0.name()
    }

    fn map(&self, input: &[u8], pos: usize, out: &mut String) -> Result<Step> {
        match self.0.decode_byte(input[pos]) {
            Some(c) => {
                out.push(c);
                Ok(Step::mapped(1))
            }
            None => Ok(Step::rejected(1, self.0.reason())),
        }
    }

    fn splice(&self, replacement: &str, out: &mut String) -> Result<bool> {
        out.push_str(replacement);
        Ok(true)
    }

    fn coalesces(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    #[test]
    fn test_latin9_overrides() {
        assert_eq!(Charset::Latin9.encode_char('\u{20ac}'), Some(0xa4));
        assert_eq!(Charset::Latin9.encode_char('\u{a4}'), None);
        assert_eq!(Charset::Latin9.encode_char('\u{e4}'), Some(0xe4));
        assert_eq!(Charset::Latin9.decode_byte(0xa4), Some('\u{20ac}'));
        assert_eq!(Charset::Latin1.decode_byte(0xa4), Some('\u{a4}'));
    }

    #[test]
    fn test_ascii_bounds() {
        assert_eq!(Charset::Ascii.encode_char('\u{7f}'), Some(0x7f));
        assert_eq!(Charset::Ascii.encode_char('\u{80}'), None);
        assert_eq!(Charset::Ascii.decode_byte(0x80), None);
        assert_eq!(Charset::Latin1.encode_char('\u{100}'), None);
    }

    #[quickcheck]
    fn prop_single_byte_charsets_round_trip(byte: u8) -> bool {
        [Charset::Latin1, Charset::Latin9].into_iter().all(|charset| {
            charset
                .decode_byte(byte)
                .and_then(|c| charset.encode_char(c))
                == Some(byte)
        })
    }
}
