//! WMF header parsing: optional placeable header plus the core META_HEADER

use crate::cursor::ByteCursor;
use crate::error::{ConversionError, ConversionResult};
use log::{debug, warn};

/// Placeable header key (stored as D7 CD C6 9A)
pub const PLACEABLE_KEY: u32 = 0x9AC6CDD7;
pub const PLACEABLE_HEADER_SIZE: usize = 22;
pub const META_HEADER_SIZE: usize = 18;

const META_HEADER_WORDS: u16 = 9;
const METAVERSION100: u16 = 0x0100;
const METAVERSION300: u16 = 0x0300;

/// Bounding box as stored in the placeable header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BoundingBox {
    pub left: i16,
    pub top: i16,
    pub right: i16,
    pub bottom: i16,
}

impl BoundingBox {
    pub fn width(&self) -> i32 {
        self.right as i32 - self.left as i32
    }

    pub fn height(&self) -> i32 {
        self.bottom as i32 - self.top as i32
    }
}

/// Aldus placeable header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceableHeader {
    pub handle: u16,
    pub bounds: BoundingBox,
    pub units_per_inch: u16,
    pub checksum: u16,
    pub checksum_valid: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetafileType {
    Memory,
    Disk,
}

/// Core metafile header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaHeader {
    pub file_type: MetafileType,
    pub header_words: u16,
    pub version: u16,
    pub size_words: u32,
    pub object_count: u16,
    pub max_record_words: u32,
    pub member_count: u16,
}

/// Parsed headers plus the offset of the first record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WmfHeader {
    pub placeable: Option<PlaceableHeader>,
    pub meta: MetaHeader,
    pub records_offset: usize,
}

/// Check if data is WMF format
pub fn is_wmf_format(data: &[u8]) -> bool {
    if data.len() >= 4 {
        let key = u32::from_le_bytes([data[0], data[1], data[2], data[3]]);
        if key == PLACEABLE_KEY {
            return true;
        }
    }

    // Standard WMF: type 1 or 2 followed by a nine word header size
    if data.len() >= 6 {
        let file_type = u16::from_le_bytes([data[0], data[1]]);
        let header_words = u16::from_le_bytes([data[2], data[3]]);
        let version = u16::from_le_bytes([data[4], data[5]]);
        return matches!(file_type, 1 | 2)
            && header_words == META_HEADER_WORDS
            && matches!(version, METAVERSION100 | METAVERSION300);
    }

    false
}

impl WmfHeader {
    /// Parse the placeable header (when present) and the core header.
    pub fn parse(data: &[u8]) -> ConversionResult<Self> {
        let mut cursor = ByteCursor::new(data);

        let placeable = if data.len() >= 4
            && u32::from_le_bytes([data[0], data[1], data[2], data[3]]) == PLACEABLE_KEY
        {
            Some(parse_placeable(&mut cursor, data)?)
        } else {
            None
        };

        let meta_start = cursor.offset();
        if cursor.remaining() < META_HEADER_SIZE {
            return Err(ConversionError::truncated(
                meta_start,
                format!(
                    "metafile header needs {} bytes, {} available",
                    META_HEADER_SIZE,
                    cursor.remaining()
                ),
            ));
        }

        let raw_type = cursor.read_u16()?;
        let file_type = match raw_type {
            1 => MetafileType::Memory,
            2 => MetafileType::Disk,
            other => {
                return Err(ConversionError::invalid_header(
                    meta_start,
                    format!("unsupported metafile type {}", other),
                ))
            }
        };
        let header_words = cursor.read_u16()?;
        if header_words != META_HEADER_WORDS {
            return Err(ConversionError::invalid_header(
                meta_start + 2,
                format!("header size {} words, expected 9", header_words),
            ));
        }
        let version = cursor.read_u16()?;
        if version != METAVERSION100 && version != METAVERSION300 {
            return Err(ConversionError::invalid_header(
                meta_start + 4,
                format!("unsupported metafile version 0x{:04X}", version),
            ));
        }
        let size_words = cursor.read_u32()?;
        let object_count = cursor.read_u16()?;
        let max_record_words = cursor.read_u32()?;
        let member_count = cursor.read_u16()?;

        let meta = MetaHeader {
            file_type,
            header_words,
            version,
            size_words,
            object_count,
            max_record_words,
            member_count,
        };
        debug!(
            "WMF header - version 0x{:04X}, {} words, {} objects, max record {} words",
            meta.version, meta.size_words, meta.object_count, meta.max_record_words
        );

        Ok(Self {
            placeable,
            meta,
            records_offset: cursor.offset(),
        })
    }

    /// Non-fatal inconsistencies between the header and the buffer.
    pub fn validate(&self, data_len: usize) -> Vec<ConversionError> {
        let mut warnings = Vec::new();

        if let Some(placeable) = &self.placeable {
            if !placeable.checksum_valid {
                warn!(
                    "WMF Placeable Header - checksum 0x{:04X} does not match",
                    placeable.checksum
                );
                warnings.push(ConversionError::record(
                    20,
                    format!("placeable checksum 0x{:04X} does not match", placeable.checksum),
                ));
            }
        }

        let placeable_len = if self.placeable.is_some() {
            PLACEABLE_HEADER_SIZE
        } else {
            0
        };
        let declared = self.meta.size_words as u64 * 2;
        let actual = data_len.saturating_sub(placeable_len) as u64;
        if declared != actual {
            warn!(
                "WMF header declares {} bytes but {} are present",
                declared, actual
            );
            warnings.push(ConversionError::record(
                placeable_len + 6,
                format!(
                    "declared size {} bytes differs from buffer length {}",
                    declared, actual
                ),
            ));
        }

        warnings
    }

    /// Size in pixels from the placeable bounding box at `dpi`.
    ///
    /// Without units-per-inch the bounding box is taken as pixels.
    pub fn size_in_pixels(&self, dpi: f64) -> Option<(f64, f64)> {
        let placeable = self.placeable.as_ref()?;
        let width_logical = placeable.bounds.width().abs() as f64;
        let height_logical = placeable.bounds.height().abs() as f64;
        if width_logical <= 0.0 || height_logical <= 0.0 {
            return None;
        }

        if placeable.units_per_inch > 0 {
            let logical_to_px = dpi / placeable.units_per_inch as f64;
            let width_px = width_logical * logical_to_px;
            let height_px = height_logical * logical_to_px;
            debug!(
                "WMF Placeable Header - BoundingBox: {}x{} logical units, {} units/inch -> {:.2}px x {:.2}px",
                width_logical, height_logical, placeable.units_per_inch, width_px, height_px
            );
            Some((width_px, height_px))
        } else {
            Some((width_logical, height_logical))
        }
    }
}

fn parse_placeable(cursor: &mut ByteCursor<'_>, data: &[u8]) -> ConversionResult<PlaceableHeader> {
    if data.len() < PLACEABLE_HEADER_SIZE {
        return Err(ConversionError::truncated(
            0,
            format!("placeable header needs 22 bytes, {} available", data.len()),
        ));
    }

    let _key = cursor.read_u32()?;
    let handle = cursor.read_u16()?;
    let bounds = BoundingBox {
        left: cursor.read_i16()?,
        top: cursor.read_i16()?,
        right: cursor.read_i16()?,
        bottom: cursor.read_i16()?,
    };
    let units_per_inch = cursor.read_u16()?;
    let _reserved = cursor.read_u32()?;
    let checksum = cursor.read_u16()?;

    let computed = data[..20]
        .chunks_exact(2)
        .fold(0u16, |acc, word| acc ^ u16::from_le_bytes([word[0], word[1]]));

    Ok(PlaceableHeader {
        handle,
        bounds,
        units_per_inch,
        checksum,
        checksum_valid: computed == checksum,
    })
}

/// Clamp a pixel dimension to a sane integer size
pub fn normalize_dimension(value: f64) -> u32 {
    if value.is_finite() && value > 0.0 && value < 20000.0 {
        value.ceil() as u32
    } else {
        800
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn meta_header(size_words: u32) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&9u16.to_le_bytes());
        out.extend_from_slice(&0x0300u16.to_le_bytes());
        out.extend_from_slice(&size_words.to_le_bytes());
        out.extend_from_slice(&4u16.to_le_bytes());
        out.extend_from_slice(&3u32.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out
    }

    fn placeable(left: i16, top: i16, right: i16, bottom: i16, inch: u16) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&PLACEABLE_KEY.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        for v in [left, top, right, bottom] {
            out.extend_from_slice(&v.to_le_bytes());
        }
        out.extend_from_slice(&inch.to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());
        let checksum = out
            .chunks_exact(2)
            .fold(0u16, |acc, w| acc ^ u16::from_le_bytes([w[0], w[1]]));
        out.extend_from_slice(&checksum.to_le_bytes());
        out
    }

    #[test]
    fn test_is_wmf_format() {
        assert!(is_wmf_format(&[0xD7, 0xCD, 0xC6, 0x9A]));
        assert!(is_wmf_format(&meta_header(9)));
        assert!(!is_wmf_format(&[0x01, 0x00, 0x00, 0x00, 0x00, 0x00]));
        assert!(!is_wmf_format(&[]));
    }

    #[test]
    fn test_parse_plain_header() {
        let data = meta_header(9);
        let header = WmfHeader::parse(&data).unwrap();
        assert!(header.placeable.is_none());
        assert_eq!(header.meta.file_type, MetafileType::Memory);
        assert_eq!(header.meta.object_count, 4);
        assert_eq!(header.records_offset, 18);
        assert!(header.validate(data.len()).is_empty());
    }

    #[test]
    fn test_parse_placeable_header() {
        let mut data = placeable(0, 0, 1440, 720, 1440);
        data.extend(meta_header(9));
        let header = WmfHeader::parse(&data).unwrap();
        let placeable = header.placeable.as_ref().unwrap();
        assert!(placeable.checksum_valid);
        assert_eq!(placeable.bounds.width(), 1440);
        assert_eq!(header.records_offset, 40);
        assert_eq!(header.size_in_pixels(96.0), Some((96.0, 48.0)));
        assert!(header.validate(data.len()).is_empty());
    }

    #[test]
    fn test_bad_checksum_is_warning() {
        let mut data = placeable(0, 0, 100, 100, 96);
        data[20] ^= 0xFF;
        data.extend(meta_header(9));
        let header = WmfHeader::parse(&data).unwrap();
        let warnings = header.validate(data.len());
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, ErrorKind::RecordError);
        assert_eq!(warnings[0].offset, 20);
    }

    #[test]
    fn test_size_mismatch_is_warning() {
        let data = meta_header(100);
        let header = WmfHeader::parse(&data).unwrap();
        let warnings = header.validate(data.len());
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, ErrorKind::RecordError);
    }

    #[test]
    fn test_invalid_header() {
        let mut data = meta_header(9);
        data[2] = 7;
        let err = WmfHeader::parse(&data).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidHeader);

        let mut data = meta_header(9);
        data[0] = 5;
        assert_eq!(WmfHeader::parse(&data).unwrap_err().kind, ErrorKind::InvalidHeader);
    }

    #[test]
    fn test_short_header_is_truncated() {
        let data = meta_header(9);
        let err = WmfHeader::parse(&data[..10]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TruncatedInput);

        let data = placeable(0, 0, 10, 10, 96);
        let err = WmfHeader::parse(&data[..12]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TruncatedInput);
    }

    #[test]
    fn test_normalize_dimension() {
        assert_eq!(normalize_dimension(10.2), 11);
        assert_eq!(normalize_dimension(f64::NAN), 800);
        assert_eq!(normalize_dimension(-4.0), 800);
    }
}
