//! WMF record functions and the lazy record iterator

use crate::error::{ConversionError, ConversionResult};
use byteorder::{ByteOrder, LittleEndian};

/// Size of the record prefix: size (u32) + function (u16)
pub const RECORD_PREFIX_SIZE: usize = 6;

macro_rules! record_types {
    ($($name:ident = $value:literal,)*) => {
        /// Record functions understood by the decoder
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[allow(non_camel_case_types)]
        pub enum RecordType {
            $($name,)*
        }

        impl RecordType {
            pub fn from_u16(function: u16) -> Option<Self> {
                match function {
                    $($value => Some(RecordType::$name),)*
                    _ => None,
                }
            }

            pub fn function(self) -> u16 {
                match self {
                    $(RecordType::$name => $value,)*
                }
            }

            pub fn name(self) -> &'static str {
                match self {
                    $(RecordType::$name => concat!("META_", stringify!($name)),)*
                }
            }
        }
    };
}

record_types! {
    EOF = 0x0000,
    REALIZEPALETTE = 0x0035,
    SETPALENTRIES = 0x0037,
    SETBKMODE = 0x0102,
    SETMAPMODE = 0x0103,
    SETROP2 = 0x0104,
    SETRELABS = 0x0105,
    SETPOLYFILLMODE = 0x0106,
    SETSTRETCHBLTMODE = 0x0107,
    SETTEXTCHAREXTRA = 0x0108,
    RESTOREDC = 0x0127,
    RESIZEPALETTE = 0x0139,
    DIBCREATEPATTERNBRUSH = 0x0142,
    SETLAYOUT = 0x0149,
    SETBKCOLOR = 0x0201,
    SETTEXTCOLOR = 0x0209,
    OFFSETVIEWPORTORG = 0x0211,
    LINETO = 0x0213,
    MOVETO = 0x0214,
    OFFSETCLIPRGN = 0x0220,
    FILLREGION = 0x0228,
    SETMAPPERFLAGS = 0x0231,
    SELECTPALETTE = 0x0234,
    POLYGON = 0x0324,
    POLYLINE = 0x0325,
    SETTEXTJUSTIFICATION = 0x020A,
    SETWINDOWORG = 0x020B,
    SETWINDOWEXT = 0x020C,
    SETVIEWPORTORG = 0x020D,
    SETVIEWPORTEXT = 0x020E,
    OFFSETWINDOWORG = 0x020F,
    SCALEWINDOWEXT = 0x0410,
    SCALEVIEWPORTEXT = 0x0412,
    EXCLUDECLIPRECT = 0x0415,
    INTERSECTCLIPRECT = 0x0416,
    ELLIPSE = 0x0418,
    FLOODFILL = 0x0419,
    FRAMEREGION = 0x0429,
    ANIMATEPALETTE = 0x0436,
    TEXTOUT = 0x0521,
    POLYPOLYGON = 0x0538,
    EXTFLOODFILL = 0x0548,
    RECTANGLE = 0x041B,
    SETPIXEL = 0x041F,
    ROUNDRECT = 0x061C,
    PATBLT = 0x061D,
    SAVEDC = 0x001E,
    PIE = 0x081A,
    STRETCHBLT = 0x0B23,
    ESCAPE = 0x0626,
    INVERTREGION = 0x012A,
    PAINTREGION = 0x012B,
    SELECTCLIPREGION = 0x012C,
    SELECTOBJECT = 0x012D,
    SETTEXTALIGN = 0x012E,
    ARC = 0x0817,
    CHORD = 0x0830,
    BITBLT = 0x0922,
    EXTTEXTOUT = 0x0A32,
    SETDIBTODEV = 0x0D33,
    DIBBITBLT = 0x0940,
    DIBSTRETCHBLT = 0x0B41,
    STRETCHDIB = 0x0F43,
    DELETEOBJECT = 0x01F0,
    CREATEPALETTE = 0x00F7,
    CREATEPATTERNBRUSH = 0x01F9,
    CREATEPENINDIRECT = 0x02FA,
    CREATEFONTINDIRECT = 0x02FB,
    CREATEBRUSHINDIRECT = 0x02FC,
    CREATEREGION = 0x06FF,
}

/// One undecoded record borrowed from the input buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawRecord<'a> {
    /// Absolute offset of the record prefix
    pub offset: usize,
    pub size_words: u32,
    pub function: u16,
    pub payload: &'a [u8],
}

impl<'a> RawRecord<'a> {
    pub fn record_type(&self) -> Option<RecordType> {
        RecordType::from_u16(self.function)
    }

    /// Absolute offset of the first payload byte
    pub fn payload_offset(&self) -> usize {
        self.offset + RECORD_PREFIX_SIZE
    }
}

/// Lazy iterator over the record stream.
///
/// Yields the EOF record and then stops. A record overrunning the buffer
/// yields `TruncatedInput`; a record smaller than its own prefix yields a
/// `RecordError`. Both end the iteration.
pub struct RecordIter<'a> {
    data: &'a [u8],
    pos: usize,
    done: bool,
}

impl<'a> RecordIter<'a> {
    pub fn new(data: &'a [u8], start: usize) -> Self {
        Self {
            data,
            pos: start.min(data.len()),
            done: false,
        }
    }

    fn next_record(&mut self) -> ConversionResult<RawRecord<'a>> {
        let offset = self.pos;
        let remaining = self.data.len() - offset;
        if remaining < RECORD_PREFIX_SIZE {
            return Err(ConversionError::truncated(
                offset,
                format!("{} trailing bytes do not hold a record header", remaining),
            ));
        }

        let size_words = LittleEndian::read_u32(&self.data[offset..offset + 4]);
        let function = LittleEndian::read_u16(&self.data[offset + 4..offset + 6]);

        if (size_words as usize) < RECORD_PREFIX_SIZE / 2 {
            return Err(ConversionError::record(
                offset,
                format!(
                    "record 0x{:04X} declares {} words, below the 3 word minimum",
                    function, size_words
                ),
            ));
        }

        let byte_len = (size_words as usize)
            .checked_mul(2)
            .filter(|len| *len <= remaining)
            .ok_or_else(|| {
                ConversionError::truncated(
                    offset,
                    format!(
                        "record 0x{:04X} declares {} words but only {} bytes remain",
                        function, size_words, remaining
                    ),
                )
            })?;

        self.pos += byte_len;
        Ok(RawRecord {
            offset,
            size_words,
            function,
            payload: &self.data[offset + RECORD_PREFIX_SIZE..offset + byte_len],
        })
    }
}

impl<'a> Iterator for RecordIter<'a> {
    type Item = ConversionResult<RawRecord<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.pos >= self.data.len() {
            self.done = true;
            return None;
        }

        let result = self.next_record();
        match &result {
            Ok(record) if record.function == RecordType::EOF.function() => self.done = true,
            Ok(_) => {}
            Err(_) => self.done = true,
        }
        Some(result)
    }
}
