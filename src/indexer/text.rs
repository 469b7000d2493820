//! Reading text files for content indexing
//!
//! Encoding is picked from a byte-order mark when one is present and falls
//! back to UTF-8. Invalid sequences become U+FFFD.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Text encodings recognised from a byte-order mark
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    Utf16Le,
    Utf16Be,
    Utf32Le,
    Utf32Be,
}

impl TextEncoding {
    /// Detect the encoding from the leading bytes, returning it with the BOM length
    pub fn detect(bytes: &[u8]) -> (Self, usize) {
        match bytes {
            [0xFF, 0xFE, 0x00, 0x00, ..] => (TextEncoding::Utf32Le, 4),
            [0x00, 0x00, 0xFE, 0xFF, ..] => (TextEncoding::Utf32Be, 4),
            [0xEF, 0xBB, 0xBF, ..] => (TextEncoding::Utf8, 3),
            [0xFF, 0xFE, ..] => (TextEncoding::Utf16Le, 2),
            [0xFE, 0xFF, ..] => (TextEncoding::Utf16Be, 2),
            _ => (TextEncoding::Utf8, 0),
        }
    }
}

/// Decode raw file bytes into text
pub fn decode(bytes: &[u8]) -> String {
    let (encoding, bom_len) = TextEncoding::detect(bytes);
    let body = &bytes[bom_len..];

    match encoding {
        TextEncoding::Utf8 => String::from_utf8_lossy(body).into_owned(),
        TextEncoding::Utf16Le => decode_utf16(body, u16::from_le_bytes),
        TextEncoding::Utf16Be => decode_utf16(body, u16::from_be_bytes),
        TextEncoding::Utf32Le => decode_utf32(body, u32::from_le_bytes),
        TextEncoding::Utf32Be => decode_utf32(body, u32::from_be_bytes),
    }
}

fn decode_utf16(body: &[u8], to_unit: fn([u8; 2]) -> u16) -> String {
    let units = body.chunks_exact(2).map(|pair| to_unit([pair[0], pair[1]]));
    char::decode_utf16(units)
        .map(|unit| unit.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

fn decode_utf32(body: &[u8], to_scalar: fn([u8; 4]) -> u32) -> String {
    body.chunks_exact(4)
        .map(|quad| to_scalar([quad[0], quad[1], quad[2], quad[3]]))
        .map(|scalar| char::from_u32(scalar).unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

/// Split text into lines. `\r\n`, `\n` and a lone `\r` all end a line, and a
/// trailing terminator does not produce an extra empty line.
pub fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut rest = text;

    while !rest.is_empty() {
        match rest.find(['\r', '\n']) {
            Some(pos) => {
                lines.push(&rest[..pos]);
                let skip = if rest[pos..].starts_with("\r\n") { 2 } else { 1 };
                rest = &rest[pos + skip..];
            }
            None => {
                lines.push(rest);
                break;
            }
        }
    }

    lines
}

/// Read a file and return its decoded contents. The file is opened read-only.
pub fn read_text(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;
    Ok(decode(&bytes))
}
