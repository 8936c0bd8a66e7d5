//! Charmap codecs: encoding, decoding and translation through a
//! caller-supplied code point table

use std::collections::{BTreeMap, HashMap};
use textcodec_core::engine::{encode_replacement, Engine, MappingStep, Step};
use textcodec_core::handlers::STRICT;
use textcodec_core::prelude::*;

const UNDEFINED: &str = "character maps to <undefined>";
const MAX_CODE_POINT: u32 = 0x10ffff;

/// Value a charmap holds for one code point
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapEntry {
    /// A single code point (or byte, when encoding)
    Code(u32),
    /// Replacement characters
    Text(String),
    /// Replacement bytes
    Bytes(Vec<u8>),
    /// Present in the table but explicitly unmapped
    Undefined,
}

/// A code point table.
///
/// `Ok(None)` means the key is absent. An `Err` is a failure of the table
/// itself and aborts the operation unchanged.
pub trait CharMap {
    fn lookup(&self, code: u32) -> Result<Option<MapEntry>>;
}

impl CharMap for HashMap<u32, MapEntry> {
    fn lookup(&self, code: u32) -> Result<Option<MapEntry>> {
        Ok(self.get(&code).cloned())
    }
}

impl CharMap for BTreeMap<u32, MapEntry> {
    fn lookup(&self, code: u32) -> Result<Option<MapEntry>> {
        Ok(self.get(&code).cloned())
    }
}

fn code_point(value: u32) -> Result<Option<char>> {
    if value > MAX_CODE_POINT {
        return Err(CodecError::MappingRange {
            value,
            limit: MAX_CODE_POINT + 1,
        });
    }
    Ok(char::from_u32(value))
}

/// Encoding step over a charmap
pub struct CharmapEncoder<'m, M: ?Sized> {
    map: &'m M,
}

impl<'m, M: CharMap + ?Sized> CharmapEncoder<'m, M> {
    pub fn new(map: &'m M) -> Self {
        Self { map }
    }
}

impl<M: CharMap + ?Sized> MappingStep for CharmapEncoder<'_, M> {
    type Unit = char;
    type Output = Vec<u8>;
    const OPERATION: Operation = Operation::Encode;

    fn encoding(&self) -> &str {
        "charmap"
    }

    fn map(&self, input: &[char], pos: usize, out: &mut Vec<u8>) -> Result<Step> {
        match self.map.lookup(input[pos] as u32)? {
            None | Some(MapEntry::Undefined) => return Ok(Step::rejected(1, UNDEFINED)),
            Some(MapEntry::Code(value)) => {
                let byte = u8::try_from(value)
                    .map_err(|_| CodecError::MappingRange { value, limit: 256 })?;
                out.push(byte);
            }
            Some(MapEntry::Bytes(bytes)) => out.extend_from_slice(&bytes),
            Some(MapEntry::Text(_)) => {
                return Err(CodecError::MappingType {
                    expected: "an integer, bytes or None",
                })
            }
        }
        Ok(Step::mapped(1))
    }

    fn splice(&self, replacement: &str, out: &mut Vec<u8>) -> Result<bool> {
        encode_replacement(self, replacement, out)
    }
}

/// Decoding step over a charmap
pub struct CharmapDecoder<'m, M: ?Sized> {
    map: &'m M,
}

impl<'m, M: CharMap + ?Sized> CharmapDecoder<'m, M> {
    pub fn new(map: &'m M) -> Self {
        Self { map }
    }
}

impl<M: CharMap + ?Sized> MappingStep for CharmapDecoder<'_, M> {
    type Unit = u8;
    type Output = String;
    const OPERATION: Operation = Operation::Decode;

    fn encoding(&self) -> &str {
        "charmap"
    }

    fn map(&self, input: &[u8], pos: usize, out: &mut String) -> Result<Step> {
        match self.map.lookup(u32::from(input[pos]))? {
            None | Some(MapEntry::Undefined) => return Ok(Step::rejected(1, UNDEFINED)),
            Some(MapEntry::Code(0xfffe)) => return Ok(Step::rejected(1, UNDEFINED)),
            Some(MapEntry::Code(value)) => match code_point(value)? {
                Some(c) => out.push(c),
                None => return Ok(Step::rejected(1, UNDEFINED)),
            },
            Some(MapEntry::Text(text)) => out.push_str(&text),
            Some(MapEntry::Bytes(_)) => {
                return Err(CodecError::MappingType {
                    expected: "an integer, str or None",
                })
            }
        }
        Ok(Step::mapped(1))
    }

    fn splice(&self, replacement: &str, out: &mut String) -> Result<bool> {
        out.push_str(replacement);
        Ok(true)
    }

    fn coalesces(&self) -> bool {
        false
    }
}

/// Translation step: absent keys pass through, `Undefined` deletes.
pub struct Translator<'m, M: ?Sized> {
    map: &'m M,
}

impl<'m, M: CharMap + ?Sized> Translator<'m, M> {
    pub fn new(map: &'m M) -> Self {
        Self { map }
    }
}

impl<M: CharMap + ?Sized> MappingStep for Translator<'_, M> {
    type Unit = char;
    type Output = String;
    const OPERATION: Operation = Operation::Translate;

    fn encoding(&self) -> &str {
        "translate"
    }

    fn map(&self, input: &[char], pos: usize, out: &mut String) -> Result<Step> {
        let c = input[pos];
        match self.map.lookup(c as u32)? {
            None => out.push(c),
            Some(MapEntry::Undefined) => {}
            Some(MapEntry::Code(value)) => match code_point(value)? {
                Some(mapped) => out.push(mapped),
                None => return Ok(Step::rejected(1, "character maps to a surrogate")),
            },
            Some(MapEntry::Text(text)) => out.push_str(&text),
            Some(MapEntry::Bytes(_)) => {
                return Err(CodecError::MappingType {
                    expected: "an integer, str or None",
                })
            }
        }
        Ok(Step::mapped(1))
    }

    fn splice(&self, replacement: &str, out: &mut String) -> Result<bool> {
        out.push_str(replacement);
        Ok(true)
    }
}

/// Encode `text` through `map`, recovering with the handler named `errors`
pub fn charmap_encode<M: CharMap + ?Sized>(text: &str, errors: &str, map: &M) -> Result<Vec<u8>> {
    let chars: Vec<char> = text.chars().collect();
    Engine::global().run(&CharmapEncoder::new(map), &chars, errors)
}

/// Decode `bytes` through `map`, recovering with the handler named `errors`
pub fn charmap_decode<M: CharMap + ?Sized>(bytes: &[u8], errors: &str, map: &M) -> Result<String> {
    Engine::global().run(&CharmapDecoder::new(map), bytes, errors)
}

/// Translate `text` through `map`.
///
/// Translation takes no handler name; characters that map to something
/// unrepresentable fail strictly.
pub fn translate<M: CharMap + ?Sized>(text: &str, map: &M) -> Result<String> {
    let chars: Vec<char> = text.chars().collect();
    Engine::global().run_with(&Translator::new(map), &chars, STRICT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::sync::Arc;

    /// A table whose every lookup fails
    struct Broken;

    impl CharMap for Broken {
        fn lookup(&self, _code: u32) -> Result<Option<MapEntry>> {
            Err(CodecError::MappingLookup {
                msg: "lookup refused".to_string(),
            })
        }
    }

    fn doubled_letters() -> HashMap<u32, MapEntry> {
        "abcdefgh"
            .chars()
            .map(|c| {
                let upper = c.to_ascii_uppercase() as u8;
                (c as u32, MapEntry::Bytes(vec![upper, upper]))
            })
            .collect()
    }

    fn ff_map(entry: MapEntry) -> HashMap<u32, MapEntry> {
        HashMap::from([(0xff, entry)])
    }

    #[test]
    fn test_charmap_encode() {
        let mut map = doubled_letters();
        assert_eq!(charmap_encode("abc", "strict", &map).unwrap(), b"AABBCC");

        let err = charmap_encode("abcA", "strict", &map).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unicode);

        map.insert('?' as u32, MapEntry::Bytes(b"XYZ".to_vec()));
        assert_eq!(
            charmap_encode("abcDEF", "replace", &map).unwrap(),
            b"AABBCCXYZXYZXYZ"
        );

        map.insert('?' as u32, MapEntry::Text("XYZ".into()));
        let err = charmap_encode("abcDEF", "replace", &map).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Type);
    }

    #[test]
    fn test_charmap_encode_failures_per_handler() {
        let position_handler = {
            let pos = Arc::new(AtomicI64::new(0));
            ErrorHandler::new(move |ctx| {
                let old = pos.load(Ordering::SeqCst);
                if old <= ctx.start()? as i64 {
                    pos.store(ctx.object()?.len() as i64, Ordering::SeqCst);
                }
                Ok(Reply::pair("<?>", old))
            })
        };
        register_error("test.charmap.posreturn", position_handler).unwrap();

        for errors in [
            "strict",
            "replace",
            "xmlcharrefreplace",
            "backslashreplace",
            "test.charmap.posreturn",
        ] {
            let err = charmap_encode("\u{ff}", errors, &ff_map(MapEntry::Undefined)).unwrap_err();
            assert!(matches!(err, CodecError::Encode(_)), "{}: {:?}", errors, err);

            let err = charmap_encode("\u{ff}", errors, &Broken).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Mapping, "{}", errors);

            let err = charmap_encode("\u{ff}", errors, &ff_map(MapEntry::Code(300))).unwrap_err();
            assert_eq!(err, CodecError::MappingRange { value: 300, limit: 256 });
        }
    }

    #[test]
    fn test_charmap_decode() {
        let map = HashMap::from([('a' as u32, MapEntry::Text("z".into()))]);
        register_error(
            "test.charmap.brackets",
            ErrorHandler::new(|ctx| {
                let codes: String = ctx.failed_bytes()?.iter().map(|b| format!("<{}>", b)).collect();
                Ok(Reply::pair(format!("[{}]", codes), ctx.end()? as i64))
            }),
        )
        .unwrap();
        assert_eq!(
            charmap_decode(b"abc", "test.charmap.brackets", &map).unwrap(),
            "z[<98>][<99>]"
        );
    }

    #[test]
    fn test_charmap_decode_failures() {
        let err = charmap_decode(b"\xff", "strict", &ff_map(MapEntry::Undefined)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unicode);

        let err = charmap_decode(b"\xff", "strict", &Broken).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Mapping);

        let err = charmap_decode(b"\xff", "strict", &ff_map(MapEntry::Code(0x110000))).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Type);

        let out = charmap_decode(b"\xff", "replace", &ff_map(MapEntry::Code(0xd800))).unwrap();
        assert_eq!(out, "\u{FFFD}");
    }

    #[test]
    fn test_translate() {
        let map: BTreeMap<u32, MapEntry> = BTreeMap::from([
            ('&' as u32, MapEntry::Text("&amp;".into())),
            ('<' as u32, MapEntry::Text("&lt;".into())),
            ('>' as u32, MapEntry::Text("&gt;".into())),
            ('"' as u32, MapEntry::Text("&quot;".into())),
        ]);
        for n in [1, 10, 100] {
            let text = "abc<def>ghi".repeat(n);
            let expected = "abc&lt;def&gt;ghi".repeat(n);
            assert_eq!(translate(&text, &map).unwrap(), expected);
        }
    }

    #[test]
    fn test_translate_entries() {
        let map = HashMap::from([
            ('a' as u32, MapEntry::Code('b' as u32)),
            ('x' as u32, MapEntry::Undefined),
        ]);
        assert_eq!(translate("axya", &map).unwrap(), "byb");
    }

    #[test]
    fn test_translate_failures() {
        let err = translate("\u{ff}", &Broken).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Mapping);

        let err = translate("\u{ff}", &ff_map(MapEntry::Code(0x110000))).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Type);

        let err = translate("\u{ff}", &ff_map(MapEntry::Bytes(Vec::new()))).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Type);

        let err = translate("a\u{ff}\u{ff}b", &ff_map(MapEntry::Code(0xdc00))).unwrap_err();
        match err {
            CodecError::Translate(ctx) => assert_eq!((ctx.start(), ctx.end()), (Ok(1), Ok(3))),
            other => panic!("expected a translate error, got {:?}", other),
        }
    }
}
