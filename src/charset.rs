//! Text decoding by font charset and markup-safe sanitizing

use encoding_rs::{
    Encoding, BIG5, EUC_KR, GBK, MACINTOSH, SHIFT_JIS, WINDOWS_1250, WINDOWS_1251, WINDOWS_1252,
    WINDOWS_1253, WINDOWS_1254, WINDOWS_1255, WINDOWS_1256, WINDOWS_1257, WINDOWS_1258,
    WINDOWS_874,
};
use log::trace;

pub const ANSI_CHARSET: u8 = 0;
pub const DEFAULT_CHARSET: u8 = 1;
pub const SYMBOL_CHARSET: u8 = 2;
pub const MAC_CHARSET: u8 = 77;
pub const SHIFTJIS_CHARSET: u8 = 128;
pub const HANGUL_CHARSET: u8 = 129;
pub const JOHAB_CHARSET: u8 = 130;
pub const GB2312_CHARSET: u8 = 134;
pub const CHINESEBIG5_CHARSET: u8 = 136;
pub const GREEK_CHARSET: u8 = 161;
pub const TURKISH_CHARSET: u8 = 162;
pub const VIETNAMESE_CHARSET: u8 = 163;
pub const HEBREW_CHARSET: u8 = 177;
pub const ARABIC_CHARSET: u8 = 178;
pub const BALTIC_CHARSET: u8 = 186;
pub const RUSSIAN_CHARSET: u8 = 204;
pub const THAI_CHARSET: u8 = 222;
pub const EASTEUROPE_CHARSET: u8 = 238;

/// Encoding used for byte strings written with a font of `charset`
pub fn encoding_for_charset(charset: u8) -> &'static Encoding {
    match charset {
        MAC_CHARSET => MACINTOSH,
        SHIFTJIS_CHARSET => SHIFT_JIS,
        HANGUL_CHARSET | JOHAB_CHARSET => EUC_KR,
        GB2312_CHARSET => GBK,
        CHINESEBIG5_CHARSET => BIG5,
        GREEK_CHARSET => WINDOWS_1253,
        TURKISH_CHARSET => WINDOWS_1254,
        VIETNAMESE_CHARSET => WINDOWS_1258,
        HEBREW_CHARSET => WINDOWS_1255,
        ARABIC_CHARSET => WINDOWS_1256,
        BALTIC_CHARSET => WINDOWS_1257,
        RUSSIAN_CHARSET => WINDOWS_1251,
        THAI_CHARSET => WINDOWS_874,
        EASTEUROPE_CHARSET => WINDOWS_1250,
        _ => WINDOWS_1252,
    }
}

/// Decode a record string, dropping NULs and control characters.
pub fn decode_text(bytes: &[u8], charset: u8) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    let bytes = &bytes[..end];

    let decoded = if charset == SYMBOL_CHARSET {
        bytes.iter().map(|&b| symbol_char(b)).collect::<String>()
    } else {
        let encoding = encoding_for_charset(charset);
        let (text, had_errors) = encoding.decode_without_bom_handling(bytes);
        if had_errors {
            trace!("Replacement characters while decoding text as {}", encoding.name());
        }
        text.into_owned()
    };

    strip_control(&decoded)
}

/// Symbol font letters map onto Greek; everything else reads as Latin-1.
fn symbol_char(byte: u8) -> char {
    const UPPER: &str = "ΑΒΧΔΕΦΓΗΙϑΚΛΜΝΟΠΘΡΣΤΥςΩΞΨΖ";
    const LOWER: &str = "αβχδεφγηιϕκλμνοπθρστυϖωξψζ";
    match byte {
        b'A'..=b'Z' => UPPER.chars().nth((byte - b'A') as usize).unwrap_or('?'),
        b'a'..=b'z' => LOWER.chars().nth((byte - b'a') as usize).unwrap_or('?'),
        _ => byte as char,
    }
}

pub fn strip_control(text: &str) -> String {
    text.chars().filter(|c| !c.is_control()).collect()
}

/// Remove characters that cannot appear inside a quoted attribute value.
pub fn sanitize_attribute(value: &str) -> String {
    value
        .chars()
        .filter(|c| !c.is_control() && !matches!(c, '\'' | '"' | '<' | '>' | '&'))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Generic CSS family for the pitch-and-family byte
pub fn generic_family(pitch_and_family: u8) -> Option<&'static str> {
    match pitch_and_family & 0xF0 {
        0x10 => Some("serif"),
        0x20 => Some("sans-serif"),
        0x30 => Some("monospace"),
        0x40 => Some("cursive"),
        0x50 => Some("fantasy"),
        _ if pitch_and_family & 0x03 == 0x01 => Some("monospace"),
        _ => None,
    }
}
