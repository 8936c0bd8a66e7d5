//! UTF-8

use textcodec_core::engine::{encode_replacement, MappingStep, Step};
use textcodec_core::prelude::*;

const INVALID_START: &str = "invalid start byte";
const INVALID_CONTINUATION: &str = "invalid continuation byte";
const UNEXPECTED_END: &str = "unexpected end of data";

/// UTF-8 encoding step. Every `char` is encodable.
pub struct Utf8Encoder;

impl MappingStep for Utf8Encoder {
    type Unit = char;
    type Output = Vec<u8>;
    const OPERATION: Operation = Operation::Encode;

    fn encoding(&self) -> &str {
        "utf-8"
    }

    fn map(&self, input: &[char], pos: usize, out: &mut Vec<u8>) -> Result<Step> {
        let mut buf = [0u8; 4];
        out.extend_from_slice(input[pos].encode_utf8(&mut buf).as_bytes());
        Ok(Step::mapped(1))
    }

    fn splice(&self, replacement: &str, out: &mut Vec<u8>) -> Result<bool> {
        encode_replacement(self, replacement, out)
    }
}

/// UTF-8 decoding step.
///
/// A malformed sequence is reported as its maximal invalid prefix: a bad lead
/// byte alone, or the lead byte plus the valid continuation bytes before the
/// first bad one.
pub struct Utf8Decoder;

/// Continuation bytes needed after `lead`, and the allowed range of the first
fn sequence_shape(lead: u8) -> Option<(usize, u8, u8)> {
    match lead {
        0xc2..=0xdf => Some((1, 0x80, 0xbf)),
        0xe0 => Some((2, 0xa0, 0xbf)),
        0xe1..=0xec | 0xee..=0xef => Some((2, 0x80, 0xbf)),
        0xed => Some((2, 0x80, 0x9f)),
        0xf0 => Some((3, 0x90, 0xbf)),
        0xf1..=0xf3 => Some((3, 0x80, 0xbf)),
        0xf4 => Some((3, 0x80, 0x8f)),
        _ => None,
    }
}

impl MappingStep for Utf8Decoder {
    type Unit = u8;
    type Output = String;
    const OPERATION: Operation = Operation::Decode;

    fn encoding(&self) -> &str {
        "utf-8"
    }

    fn map(&self, input: &[u8], pos: usize, out: &mut String) -> Result<Step> {
        let lead = input[pos];
        if lead.is_ascii() {
            out.push(lead as char);
            return Ok(Step::mapped(1));
        }
        let Some((needed, low, high)) = sequence_shape(lead) else {
            return Ok(Step::rejected(1, INVALID_START));
        };

        for i in 1..=needed {
            let Some(&byte) = input.get(pos + i) else {
                return Ok(Step::rejected(i, UNEXPECTED_END));
            };
            let (lo, hi) = if i == 1 { (low, high) } else { (0x80, 0xbf) };
            if !(lo..=hi).contains(&byte) {
                return Ok(Step::rejected(i, INVALID_CONTINUATION));
            }
        }

        let sequence = &input[pos..=pos + needed];
        match std::str::from_utf8(sequence) {
            Ok(s) => {
                out.push_str(s);
                Ok(Step::mapped(needed + 1))
            }
            Err(_) => Ok(Step::rejected(1, INVALID_START)),
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

    fn step(input: &[u8]) -> Step {
        let mut out = String::new();
        Utf8Decoder.map(input, 0, &mut out).unwrap()
    }

    #[test]
    fn test_error_spans() {
        assert_eq!(step(b"\xc0\x80"), Step::rejected(1, INVALID_START));
        assert_eq!(step(b"\xff"), Step::rejected(1, INVALID_START));
        assert_eq!(step(b"\xe2\x82"), Step::rejected(2, UNEXPECTED_END));
        assert_eq!(step(b"\xe2\x82x"), Step::rejected(2, INVALID_CONTINUATION));
        assert_eq!(step(b"\xed\xa0\x80"), Step::rejected(1, INVALID_CONTINUATION));
        assert_eq!(step(b"\xf0\x9f\x98"), Step::rejected(3, UNEXPECTED_END));
        assert_eq!(step(b"\xe2\x82\xac"), Step::mapped(3));
    }

    #[quickcheck]
    fn prop_valid_text_decodes_unchanged(text: String) -> bool {
        let bytes = text.as_bytes();
        let mut out = String::new();
        let mut pos = 0;
        while pos < bytes.len() {
            match Utf8Decoder.map(bytes, pos, &mut out) {
                Ok(Step::Mapped { consumed }) => pos += consumed,
                _ => return false,
            }
        }
        out == text
    }
}
