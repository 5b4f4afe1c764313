//! Text encodings used between the host and the working tree.
//!
//! The host reads and writes Windows-1252; pulled files on disk are UTF-8.
//! Windows-1252 leaves five bytes undefined (`0x81 0x8D 0x8F 0x90 0x9D`);
//! decoding them is an error rather than a silent substitution.

use std::path::Path;

use crate::error::{text_io_err, TextError};

/// `0x80..=0x9F`; every other byte maps to the code point of the same value.
const WINDOWS_1252_HIGH: [Option<char>; 32] = [
    Some('\u{20AC}'),
    None,
    Some('\u{201A}'),
    Some('\u{0192}'),
    Some('\u{201E}'),
    Some('\u{2026}'),
    Some('\u{2020}'),
    Some('\u{2021}'),
    Some('\u{02C6}'),
    Some('\u{2030}'),
    Some('\u{0160}'),
    Some('\u{2039}'),
    Some('\u{0152}'),
    None,
    Some('\u{017D}'),
    None,
    None,
    Some('\u{2018}'),
    Some('\u{2019}'),
    Some('\u{201C}'),
    Some('\u{201D}'),
    Some('\u{2022}'),
    Some('\u{2013}'),
    Some('\u{2014}'),
    Some('\u{02DC}'),
    Some('\u{2122}'),
    Some('\u{0161}'),
    Some('\u{203A}'),
    Some('\u{0153}'),
    None,
    Some('\u{017E}'),
    Some('\u{0178}'),
];

/// Encodings understood when reading text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Utf8,
    Windows1252,
}

/// Position of the first byte that could not be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Undecodable {
    pub offset: usize,
    pub byte: u8,
}

impl Encoding {
    pub fn label(self) -> &'static str {
        match self {
            Encoding::Utf8 => "UTF-8",
            Encoding::Windows1252 => "Windows-1252",
        }
    }

    pub fn decode(self, bytes: &[u8]) -> Result<String, Undecodable> {
        match self {
            Encoding::Utf8 => match std::str::from_utf8(bytes) {
                Ok(text) => Ok(text.strip_prefix('\u{FEFF}').unwrap_or(text).to_owned()),
                Err(err) => {
                    let offset = err.valid_up_to();
                    Err(Undecodable {
                        offset,
                        byte: bytes[offset],
                    })
                }
            },
            Encoding::Windows1252 => decode_windows_1252(bytes),
        }
    }
}

fn decode_windows_1252(bytes: &[u8]) -> Result<String, Undecodable> {
    let mut out = String::with_capacity(bytes.len());
    for (offset, &byte) in bytes.iter().enumerate() {
        let ch = match byte {
            0x80..=0x9F => WINDOWS_1252_HIGH[usize::from(byte - 0x80)]
                .ok_or(Undecodable { offset, byte })?,
            _ => char::from(byte),
        };
        out.push(ch);
    }
    Ok(out)
}

/// Encode `text` as Windows-1252, returning the first unmappable character.
pub fn encode_windows_1252(text: &str) -> Result<Vec<u8>, char> {
    let mut out = Vec::with_capacity(text.len());
    for ch in text.chars() {
        let code = u32::from(ch);
        let byte = if code < 0x80 || (0xA0..=0xFF).contains(&code) {
            code as u8
        } else {
            WINDOWS_1252_HIGH
                .iter()
                .position(|mapped| *mapped == Some(ch))
                .map(|idx| 0x80 + idx as u8)
                .ok_or(ch)?
        };
        out.push(byte);
    }
    Ok(out)
}

/// Read `path` and decode it with `encoding`.
pub fn read_text(path: &Path, encoding: Encoding) -> Result<String, TextError> {
    let bytes = std::fs::read(path).map_err(|e| text_io_err(path, e))?;
    decode_file(path, &bytes, encoding)
}

/// Decode already-read bytes, attributing failures to `path`.
pub fn decode_file(path: &Path, bytes: &[u8], encoding: Encoding) -> Result<String, TextError> {
    encoding.decode(bytes).map_err(|err| TextError::Decode {
        path: path.to_path_buf(),
        encoding: encoding.label(),
        byte: err.byte,
        offset: err.offset,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_and_latin1_decode_identically() {
        let bytes = b"Dim x As String ' \xE4\xF6\xFC\xDF";
        let text = Encoding::Windows1252.decode(bytes).expect("decode");
        assert_eq!(text, "Dim x As String ' äöüß");
    }

    #[test]
    fn high_range_uses_windows_table() {
        let text = Encoding::Windows1252.decode(b"\x80 \x93quoted\x94").expect("decode");
        assert_eq!(text, "€ \u{201C}quoted\u{201D}");
    }

    #[test]
    fn undefined_bytes_are_reported() {
        let err = Encoding::Windows1252.decode(b"ok\x81").unwrap_err();
        assert_eq!(err, Undecodable { offset: 2, byte: 0x81 });
    }

    #[test]
    fn encode_roundtrips_table_characters() {
        let source = "€ Größe – “x”";
        let bytes = encode_windows_1252(source).expect("encode");
        assert_eq!(Encoding::Windows1252.decode(&bytes).expect("decode"), source);
    }

    #[test]
    fn encode_rejects_characters_outside_code_page() {
        assert_eq!(encode_windows_1252("x = \"日本\"").unwrap_err(), '日');
    }

    #[test]
    fn invalid_utf8_reports_first_bad_byte() {
        let err = Encoding::Utf8.decode(b"Sub A()\r\n\xE4").unwrap_err();
        assert_eq!(err.offset, 9);
        assert_eq!(err.byte, 0xE4);
    }

    #[test]
    fn utf8_bom_is_dropped() {
        let text = Encoding::Utf8.decode(b"\xEF\xBB\xBFSub A()").expect("decode");
        assert_eq!(text, "Sub A()");
    }
}
