//! Per-font string decoding through `ToUnicode` CMaps
//!
//! Composite (`Type0`) fonts show multi-byte glyph codes that only the
//! font's `ToUnicode` CMap can turn back into text. Simple fonts fall back
//! to one character per byte when they carry no CMap or a code is missing.

use std::collections::HashMap;

use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use tracing::debug;

use crate::text::decode_pdf_string;

/// Font resource name → decoder, for one page
pub type FontMap = HashMap<Vec<u8>, FontDecoder>;

/// Widest `bfrange` expanded, in codes
const MAX_RANGE_SPAN: u32 = 0xFFFF;

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Hex(Vec<u8>),
    ArrayOpen,
    ArrayClose,
    Word(String),
}

fn is_delimiter(byte: u8) -> bool {
    byte.is_ascii_whitespace() || b"<>[]()/%".contains(&byte)
}

fn tokenize(data: &[u8]) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < data.len() {
        match data[i] {
            b'<' | b'>' if data.get(i + 1) == Some(&data[i]) => {
                i += 2;
            }
            b'<' => {
                let end = data[i + 1..]
                    .iter()
                    .position(|&b| b == b'>')
                    .map_or(data.len(), |p| i + 1 + p);
                tokens.push(Token::Hex(hex_bytes(&data[i + 1..end])));
                i = end + 1;
            }
            b'[' => {
                tokens.push(Token::ArrayOpen);
                i += 1;
            }
            b']' => {
                tokens.push(Token::ArrayClose);
                i += 1;
            }
            b'%' => {
                while i < data.len() && data[i] != b'\n' && data[i] != b'\r' {
                    i += 1;
                }
            }
            b'(' => {
                let mut depth = 0usize;
                while i < data.len() {
                    match data[i] {
                        b'\\' => i += 1,
                        b'(' => depth += 1,
                        b')' => {
                            depth -= 1;
                            if depth == 0 {
                                break;
                            }
                        }
                        _ => {}
                    }
                    i += 1;
                }
                i += 1;
            }
            byte if byte.is_ascii_whitespace() => i += 1,
            _ => {
                let start = i;
                i += 1;
                while i < data.len() && !is_delimiter(data[i]) {
                    i += 1;
                }
                tokens.push(Token::Word(
                    String::from_utf8_lossy(&data[start..i]).into_owned(),
                ));
            }
        }
    }

    tokens
}

fn hex_bytes(digits: &[u8]) -> Vec<u8> {
    let nibbles: Vec<u8> = digits
        .iter()
        .filter_map(|&d| char::from(d).to_digit(16))
        .map(|n| n as u8)
        .collect();
    nibbles
        .chunks(2)
        .map(|pair| (pair[0] << 4) | pair.get(1).copied().unwrap_or(0))
        .collect()
}

fn code_value(bytes: &[u8]) -> u32 {
    bytes.iter().fold(0u32, |acc, &b| (acc << 8) | u32::from(b))
}

fn utf16_units(bytes: &[u8]) -> Vec<u16> {
    bytes
        .chunks(2)
        .map(|pair| match pair {
            [hi, lo] => u16::from_be_bytes([*hi, *lo]),
            [single] => u16::from(*single),
            _ => 0,
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Other,
    Codespace,
    Char,
    Range,
}

impl Section {
    fn after(self, keyword: &str) -> Self {
        match keyword {
            "begincodespacerange" => Section::Codespace,
            "beginbfchar" => Section::Char,
            "beginbfrange" => Section::Range,
            "endcodespacerange" | "endbfchar" | "endbfrange" => Section::Other,
            _ => self,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Codespace {
    len: usize,
    low: u32,
    high: u32,
}

/// Parsed `ToUnicode` CMap: codespace ranges plus code → text entries
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToUnicodeMap {
    codespaces: Vec<Codespace>,
    /// Keyed by (code length in bytes, code)
    entries: HashMap<(usize, u32), String>,
}

impl ToUnicodeMap {
    pub fn parse(data: &[u8]) -> Self {
        let tokens = tokenize(data);
        let mut cmap = Self::default();
        let mut section = Section::Other;
        let mut rest = tokens.as_slice();

        loop {
            rest = match (section, rest) {
                (_, []) => break,
                (_, [Token::Word(word), tail @ ..]) => {
                    section = section.after(word);
                    tail
                }
                (Section::Codespace, [Token::Hex(low), Token::Hex(high), tail @ ..]) => {
                    cmap.codespaces.push(Codespace {
                        len: low.len(),
                        low: code_value(low),
                        high: code_value(high),
                    });
                    tail
                }
                (Section::Char, [Token::Hex(src), Token::Hex(dst), tail @ ..]) => {
                    let text = String::from_utf16_lossy(&utf16_units(dst));
                    cmap.entries.insert((src.len(), code_value(src)), text);
                    tail
                }
                (Section::Range, [Token::Hex(low), Token::Hex(high), Token::Hex(dst), tail @ ..]) => {
                    cmap.insert_incrementing(low, code_value(high), dst);
                    tail
                }
                (Section::Range, [Token::Hex(low), Token::Hex(high), Token::ArrayOpen, tail @ ..]) => {
                    let close = tail
                        .iter()
                        .position(|t| *t == Token::ArrayClose)
                        .unwrap_or(tail.len());
                    let start = code_value(low);
                    let high = code_value(high);
                    for (offset, token) in tail[..close].iter().enumerate() {
                        let code = start.saturating_add(offset as u32);
                        if let (Token::Hex(dst), true) = (token, code <= high) {
                            let text = String::from_utf16_lossy(&utf16_units(dst));
                            cmap.entries.insert((low.len(), code), text);
                        }
                    }
                    tail.get(close + 1..).unwrap_or_default()
                }
                (_, [_, tail @ ..]) => tail,
            };
        }

        cmap
    }

    /// `bfrange` with a single destination: the last UTF-16 unit counts up
    fn insert_incrementing(&mut self, low: &[u8], high: u32, dst: &[u8]) {
        let start = code_value(low);
        if high < start || high - start > MAX_RANGE_SPAN {
            debug!(start, high, "Skipping unusable bfrange");
            return;
        }
        let base = utf16_units(dst);
        for offset in 0..=(high - start) {
            let mut units = base.clone();
            if let Some(last) = units.last_mut() {
                *last = last.wrapping_add(offset as u16);
            }
            self.entries.insert(
                (low.len(), start + offset),
                String::from_utf16_lossy(&units),
            );
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Byte length of the code starting `bytes`
    fn code_len(&self, bytes: &[u8], default_len: usize) -> usize {
        self.codespaces
            .iter()
            .find(|space| {
                bytes.len() >= space.len && {
                    let code = code_value(&bytes[..space.len]);
                    space.low <= code && code <= space.high
                }
            })
            .map_or(default_len, |space| space.len)
            .clamp(1, bytes.len().max(1))
    }

    /// Decode shown bytes. Unmapped one-byte codes read as Latin-1, wider
    /// ones as U+FFFD.
    pub fn decode(&self, bytes: &[u8], default_len: usize) -> String {
        let mut out = String::new();
        let mut rest = bytes;

        while !rest.is_empty() {
            let len = self.code_len(rest, default_len).min(rest.len());
            let (code, tail) = rest.split_at(len);
            match self.entries.get(&(len, code_value(code))) {
                Some(text) => out.push_str(text),
                None if len == 1 => out.push(char::from(code[0])),
                None => out.push(char::REPLACEMENT_CHARACTER),
            }
            rest = tail;
        }

        out
    }
}

/// How one font's shown strings turn into text
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FontDecoder {
    composite: bool,
    to_unicode: Option<ToUnicodeMap>,
}

impl FontDecoder {
    pub fn new(composite: bool, to_unicode: Option<ToUnicodeMap>) -> Self {
        Self {
            composite,
            to_unicode,
        }
    }

    pub fn from_font(doc: &Document, font: &Dictionary) -> Self {
        let composite = font
            .get(b"Subtype")
            .and_then(Object::as_name)
            .is_ok_and(|subtype| subtype == b"Type0");

        let to_unicode = font
            .get(b"ToUnicode")
            .ok()
            .and_then(|object| match object {
                Object::Reference(id) => doc.get_object(*id).ok(),
                other => Some(other),
            })
            .and_then(|object| object.as_stream().ok())
            .map(|stream| ToUnicodeMap::parse(&stream_bytes(stream)))
            .filter(|cmap| !cmap.is_empty());

        if composite && to_unicode.is_none() {
            debug!("Composite font without ToUnicode, glyphs will not decode");
        }
        Self::new(composite, to_unicode)
    }

    pub fn decode(&self, bytes: &[u8]) -> String {
        let default_len = if self.composite { 2 } else { 1 };
        match &self.to_unicode {
            Some(cmap) => cmap.decode(bytes, default_len),
            None if self.composite => ToUnicodeMap::default().decode(bytes, default_len),
            None => decode_pdf_string(bytes),
        }
    }
}

fn stream_bytes(stream: &Stream) -> Vec<u8> {
    if stream.dict.get(b"Filter").is_ok() {
        stream
            .decompressed_content()
            .unwrap_or_else(|_| stream.content.clone())
    } else {
        stream.content.clone()
    }
}

/// Decoders for every font a page can select with `Tf`
pub fn page_fonts(doc: &Document, page_id: ObjectId) -> FontMap {
    doc.get_page_fonts(page_id)
        .into_iter()
        .map(|(name, font)| (name, FontDecoder::from_font(doc, font)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const IDENTITY_CMAP: &[u8] = b"/CIDInit /ProcSet findresource begin
12 dict begin
begincmap
/CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def
/CMapName /Adobe-Identity-UCS def
1 begincodespacerange
<0000> <FFFF>
endcodespacerange
2 beginbfchar
<0003> <0020>
<0014> <0031>
endbfchar
2 beginbfrange
<0024> <0026> <0041>
<0044> <0046> [<0061> <0062> <0063>]
endbfrange
endcmap";

    #[test]
    fn test_parse_bfchar_and_bfrange() {
        let cmap = ToUnicodeMap::parse(IDENTITY_CMAP);

        assert_eq!(
            cmap.decode(&[0x00, 0x14, 0x00, 0x03, 0x00, 0x24, 0x00, 0x26], 2),
            "1 AC"
        );
        assert_eq!(cmap.decode(&[0x00, 0x44, 0x00, 0x46], 2), "ac");
    }

    #[test]
    fn test_unmapped_codes() {
        let cmap = ToUnicodeMap::parse(IDENTITY_CMAP);
        assert_eq!(cmap.decode(&[0x01, 0x00], 2), "\u{FFFD}");

        let empty = ToUnicodeMap::default();
        assert_eq!(empty.decode(b"Hi", 1), "Hi");
    }

    #[test]
    fn test_one_byte_codespace() {
        let data = b"1 begincodespacerange <00> <FF> endcodespacerange
1 beginbfchar <41> <00C9> endbfchar";
        let cmap = ToUnicodeMap::parse(data);

        assert_eq!(cmap.decode(b"AB", 1), "\u{C9}B");
    }

    #[test]
    fn test_ligature_destination() {
        let data = b"1 beginbfchar <0059> <00660069> endbfchar";
        let cmap = ToUnicodeMap::parse(data);

        assert_eq!(cmap.decode(&[0x00, 0x59], 2), "fi");
    }

    #[test]
    fn test_font_decoder_fallbacks() {
        assert_eq!(FontDecoder::default().decode(b"Caf\xe9"), "Café");
        assert_eq!(
            FontDecoder::new(true, None).decode(&[0x00, 0x24]),
            "\u{FFFD}"
        );
    }
}
