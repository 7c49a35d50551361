//! Conversion driver: header, record stream, playback, serialization

use crate::error::{ConversionError, ConversionResult};
use crate::header::{normalize_dimension, WmfHeader};
use crate::instruction::Instruction;
use crate::mapper::DEFAULT_DPI;
use crate::player::Player;
use crate::records::RecordIter;
use crate::svg_writer::Emitted;
use crate::types::Rect;
use log::{debug, info, warn};

/// Conversion settings
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertOptions {
    /// Output pixels per inch for physical mapping modes and the placeable size
    pub dpi: f64,
    /// Stamp `id="elemN"` on each element, N being the source record index
    pub element_ids: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            dpi: DEFAULT_DPI,
            element_ids: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Init,
    HeaderParsed,
    Streaming,
    Finalized,
    Failed,
}

/// Successful conversion with everything the caller may want to inspect
#[derive(Debug, Clone)]
pub struct Conversion {
    pub svg: String,
    /// Output elements in paint order
    pub elements: Vec<Emitted>,
    /// Recoverable problems, in input order
    pub warnings: Vec<ConversionError>,
    pub header: WmfHeader,
}

/// One conversion over an in-memory buffer
pub struct Converter<'a> {
    data: &'a [u8],
    options: ConvertOptions,
    state: DriverState,
}

impl<'a> Converter<'a> {
    pub fn new(data: &'a [u8], options: ConvertOptions) -> Self {
        Self {
            data,
            options,
            state: DriverState::Init,
        }
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    /// Run the conversion. Fatal errors leave the driver in `Failed` and
    /// return no document.
    pub fn run(&mut self) -> ConversionResult<Conversion> {
        let result = self.drive();
        self.state = match result {
            Ok(_) => DriverState::Finalized,
            Err(ref err) => {
                warn!("WMF conversion failed: {}", err);
                DriverState::Failed
            }
        };
        result
    }

    fn drive(&mut self) -> ConversionResult<Conversion> {
        let header = WmfHeader::parse(self.data)?;
        self.state = DriverState::HeaderParsed;

        let mut player = Player::new(header.meta.object_count, &self.options);
        for warning in header.validate(self.data.len()) {
            player.add_warning(warning);
        }

        self.state = DriverState::Streaming;
        let mut saw_eof = false;
        for (index, record) in RecordIter::new(self.data, header.records_offset).enumerate() {
            let record = match record {
                Ok(record) => record,
                Err(err) if err.kind.is_fatal() => return Err(err),
                Err(err) => {
                    // the stream cannot be resynchronised past this record
                    player.add_warning(err);
                    break;
                }
            };

            match Instruction::decode(&record) {
                Ok(Instruction::Eof) => {
                    saw_eof = true;
                    player.execute(index, record.offset, Instruction::Eof);
                }
                Ok(instruction) => player.execute(index, record.offset, instruction),
                Err(err) => player.add_warning(err),
            }
        }
        if !saw_eof {
            info!("WMF record stream ended without an EOF record");
        }

        let playback = player.finish();
        let view_box = playback
            .window_frame
            .or_else(|| placeable_frame(&header))
            .or_else(|| playback.writer.content_bounds());
        let size = header
            .size_in_pixels(self.options.dpi)
            .map(|(w, h)| (normalize_dimension(w), normalize_dimension(h)));

        let svg = playback.writer.finish(view_box, size);
        debug!(
            "WMF converted: {} elements, {} warnings",
            playback.writer.elements().len(),
            playback.warnings.len()
        );

        Ok(Conversion {
            svg,
            elements: playback.writer.into_elements(),
            warnings: playback.warnings,
            header,
        })
    }
}

fn placeable_frame(header: &WmfHeader) -> Option<Rect> {
    let bounds = header.placeable.as_ref()?.bounds;
    let rect = Rect::from_corners(
        crate::types::Point::new(bounds.left as f64, bounds.top as f64),
        crate::types::Point::new(bounds.right as f64, bounds.bottom as f64),
    );
    (!rect.is_empty()).then_some(rect)
}

/// Decode every record into instructions without playing them back.
///
/// Stops at the first error of any kind.
pub fn decode_instructions(data: &[u8]) -> ConversionResult<Vec<Instruction>> {
    let header = WmfHeader::parse(data)?;
    RecordIter::new(data, header.records_offset)
        .map(|record| Instruction::decode(&record?))
        .collect()
}
