//! Record payload decoding into `Instruction` values
//!
//! WMF stores most parameters in reverse order (y before x, bottom/right
//! before top/left). Every decoder here reads the payload slice only, so a
//! short payload becomes a recoverable `RecordError`.

use crate::bitmap::{bitmap16_to_image, dib_to_image, EmbeddedImage};
use crate::cursor::ByteCursor;
use crate::error::{ConversionError, ConversionResult};
use crate::objects::{Brush, Font, HatchStyle, Palette, PaletteEntry, Pen, Region};
use crate::records::{RawRecord, RecordType};
use crate::types::{ColorRef, PointS, RectS};
use log::debug;
use std::rc::Rc;

pub const ETO_OPAQUE: u16 = 0x0002;
pub const ETO_CLIPPED: u16 = 0x0004;

/// Destination or source rectangle of a blit, in logical units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BlitRect {
    pub x: i16,
    pub y: i16,
    pub width: i16,
    pub height: i16,
}

/// Any of the bitmap transfer records
#[derive(Debug, Clone, PartialEq)]
pub struct Blit {
    pub record: RecordType,
    pub raster_op: u32,
    pub dest: BlitRect,
    pub src: BlitRect,
    /// Decoded source bitmap; `None` for pattern-only operations
    pub image: Option<Rc<EmbeddedImage>>,
    /// A bitmap was present but could not be converted
    pub unsupported_bitmap: bool,
}

/// Decoded record
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    Eof,

    // state
    SaveDc,
    RestoreDc(i16),
    SetBkColor(ColorRef),
    SetBkMode(u16),
    SetMapMode(u16),
    SetRop2(u16),
    SetRelabs(u16),
    SetPolyFillMode(u16),
    SetStretchBltMode(u16),
    SetTextCharExtra(i16),
    SetTextAlign(u16),
    SetTextColor(ColorRef),
    SetTextJustification { break_extra: i16, break_count: i16 },
    SetMapperFlags(u32),
    SetLayout(u16),

    // mapping
    SetWindowOrg { x: i16, y: i16 },
    SetWindowExt { x: i16, y: i16 },
    SetViewportOrg { x: i16, y: i16 },
    SetViewportExt { x: i16, y: i16 },
    OffsetWindowOrg { dx: i16, dy: i16 },
    OffsetViewportOrg { dx: i16, dy: i16 },
    ScaleWindowExt { x_num: i16, x_denom: i16, y_num: i16, y_denom: i16 },
    ScaleViewportExt { x_num: i16, x_denom: i16, y_num: i16, y_denom: i16 },

    // drawing
    MoveTo(PointS),
    LineTo(PointS),
    Polyline(Vec<PointS>),
    Polygon(Vec<PointS>),
    PolyPolygon(Vec<Vec<PointS>>),
    Rectangle(RectS),
    RoundRect { rect: RectS, width: i16, height: i16 },
    Ellipse(RectS),
    Arc { rect: RectS, start: PointS, end: PointS },
    Pie { rect: RectS, start: PointS, end: PointS },
    Chord { rect: RectS, start: PointS, end: PointS },
    SetPixel { point: PointS, color: ColorRef },
    TextOut { point: PointS, text: Vec<u8> },
    ExtTextOut {
        point: PointS,
        options: u16,
        rect: Option<RectS>,
        text: Vec<u8>,
        dx: Vec<i16>,
    },
    PatBlt { dest: BlitRect, raster_op: u32 },
    Blit(Blit),
    FillRegion { region: u16, brush: u16 },
    FrameRegion { region: u16, brush: u16, width: i16, height: i16 },
    PaintRegion(u16),
    InvertRegion(u16),
    FloodFill { point: PointS, color: ColorRef },
    ExtFloodFill { point: PointS, color: ColorRef, mode: u16 },

    // objects
    CreatePen(Pen),
    CreateBrush(Brush),
    CreateFont(Font),
    CreatePalette(Palette),
    CreateRegion(Region),
    SelectObject(u16),
    SelectPalette(u16),
    DeleteObject(u16),
    RealizePalette,
    SetPalEntries { start: u16, entries: Vec<PaletteEntry> },
    AnimatePalette { start: u16, entries: Vec<PaletteEntry> },
    ResizePalette(u16),

    // clipping
    SelectClipRegion(u16),
    IntersectClipRect(RectS),
    ExcludeClipRect(RectS),
    OffsetClipRgn { dx: i16, dy: i16 },

    Escape { function: u16, data: Vec<u8> },
    Unknown { function: u16 },
}

impl Instruction {
    /// Decode one record. Unknown functions decode to `Instruction::Unknown`.
    pub fn decode(record: &RawRecord<'_>) -> ConversionResult<Instruction> {
        let Some(record_type) = record.record_type() else {
            return Ok(Instruction::Unknown {
                function: record.function,
            });
        };
        let mut c = ByteCursor::with_base(record.payload, record.payload_offset());
        decode_payload(record_type, record, &mut c).map_err(ConversionError::into_record_error)
    }
}

fn decode_payload(
    record_type: RecordType,
    record: &RawRecord<'_>,
    c: &mut ByteCursor<'_>,
) -> ConversionResult<Instruction> {
    use Instruction as I;
    use RecordType as R;

    let instruction = match record_type {
        R::EOF => I::Eof,
        R::SAVEDC => I::SaveDc,
        R::RESTOREDC => I::RestoreDc(c.read_i16()?),
        R::SETBKCOLOR => I::SetBkColor(read_color(c)?),
        R::SETTEXTCOLOR => I::SetTextColor(read_color(c)?),
        R::SETBKMODE => I::SetBkMode(c.read_u16()?),
        R::SETMAPMODE => I::SetMapMode(c.read_u16()?),
        R::SETROP2 => I::SetRop2(c.read_u16()?),
        R::SETRELABS => I::SetRelabs(c.read_u16()?),
        R::SETPOLYFILLMODE => I::SetPolyFillMode(c.read_u16()?),
        R::SETSTRETCHBLTMODE => I::SetStretchBltMode(c.read_u16()?),
        R::SETTEXTCHAREXTRA => I::SetTextCharExtra(c.read_i16()?),
        R::SETTEXTALIGN => I::SetTextAlign(c.read_u16()?),
        R::SETTEXTJUSTIFICATION => {
            let break_count = c.read_i16()?;
            let break_extra = c.read_i16()?;
            I::SetTextJustification {
                break_extra,
                break_count,
            }
        }
        R::SETMAPPERFLAGS => I::SetMapperFlags(c.read_u32()?),
        R::SETLAYOUT => I::SetLayout(c.read_u16()?),

        R::SETWINDOWORG => {
            let (x, y) = read_yx(c)?;
            I::SetWindowOrg { x, y }
        }
        R::SETWINDOWEXT => {
            let (x, y) = read_yx(c)?;
            I::SetWindowExt { x, y }
        }
        R::SETVIEWPORTORG => {
            let (x, y) = read_yx(c)?;
            I::SetViewportOrg { x, y }
        }
        R::SETVIEWPORTEXT => {
            let (x, y) = read_yx(c)?;
            I::SetViewportExt { x, y }
        }
        R::OFFSETWINDOWORG => {
            let (dx, dy) = read_yx(c)?;
            I::OffsetWindowOrg { dx, dy }
        }
        R::OFFSETVIEWPORTORG => {
            let (dx, dy) = read_yx(c)?;
            I::OffsetViewportOrg { dx, dy }
        }
        R::SCALEWINDOWEXT | R::SCALEVIEWPORTEXT => {
            let y_denom = c.read_i16()?;
            let y_num = c.read_i16()?;
            let x_denom = c.read_i16()?;
            let x_num = c.read_i16()?;
            if record_type == R::SCALEWINDOWEXT {
                I::ScaleWindowExt {
                    x_num,
                    x_denom,
                    y_num,
                    y_denom,
                }
            } else {
                I::ScaleViewportExt {
                    x_num,
                    x_denom,
                    y_num,
                    y_denom,
                }
            }
        }

        R::MOVETO => I::MoveTo(read_point_yx(c)?),
        R::LINETO => I::LineTo(read_point_yx(c)?),
        R::POLYLINE => I::Polyline(read_points(c)?),
        R::POLYGON => I::Polygon(read_points(c)?),
        R::POLYPOLYGON => {
            let count = c.read_u16()? as usize;
            let mut counts = Vec::with_capacity(count.min(c.remaining() / 2));
            for _ in 0..count {
                counts.push(c.read_u16()? as usize);
            }
            let mut polygons = Vec::with_capacity(counts.len());
            for n in counts {
                polygons.push(read_n_points(c, n)?);
            }
            I::PolyPolygon(polygons)
        }
        R::RECTANGLE => I::Rectangle(read_rect_reversed(c)?),
        R::ELLIPSE => I::Ellipse(read_rect_reversed(c)?),
        R::ROUNDRECT => {
            let height = c.read_i16()?;
            let width = c.read_i16()?;
            let rect = read_rect_reversed(c)?;
            I::RoundRect {
                rect,
                width,
                height,
            }
        }
        R::ARC | R::PIE | R::CHORD => {
            let end = read_point_yx(c)?;
            let start = read_point_yx(c)?;
            let rect = read_rect_reversed(c)?;
            match record_type {
                R::ARC => I::Arc { rect, start, end },
                R::PIE => I::Pie { rect, start, end },
                _ => I::Chord { rect, start, end },
            }
        }
        R::SETPIXEL => {
            let color = read_color(c)?;
            I::SetPixel {
                point: read_point_yx(c)?,
                color,
            }
        }
        R::TEXTOUT => {
            let len = c.read_i16()?.max(0) as usize;
            let text = c.read_bytes(len)?.to_vec();
            if len % 2 == 1 {
                c.skip(1)?;
            }
            I::TextOut {
                point: read_point_yx(c)?,
                text,
            }
        }
        R::EXTTEXTOUT => decode_ext_text_out(c)?,
        R::PATBLT => {
            let raster_op = c.read_u32()?;
            let height = c.read_i16()?;
            let width = c.read_i16()?;
            let y = c.read_i16()?;
            let x = c.read_i16()?;
            I::PatBlt {
                dest: BlitRect {
                    x,
                    y,
                    width,
                    height,
                },
                raster_op,
            }
        }
        R::BITBLT | R::STRETCHBLT | R::DIBBITBLT | R::DIBSTRETCHBLT => {
            I::Blit(decode_blit(record_type, record, c)?)
        }
        R::STRETCHDIB => {
            let raster_op = c.read_u32()?;
            let _color_usage = c.read_u16()?;
            let src_height = c.read_i16()?;
            let src_width = c.read_i16()?;
            let src_y = c.read_i16()?;
            let src_x = c.read_i16()?;
            let dest = read_dest(c)?;
            let (image, unsupported_bitmap) = dib_image(c.read_rest());
            I::Blit(Blit {
                record: record_type,
                raster_op,
                dest,
                src: BlitRect {
                    x: src_x,
                    y: src_y,
                    width: src_width,
                    height: src_height,
                },
                image,
                unsupported_bitmap,
            })
        }
        R::SETDIBTODEV => {
            let _color_usage = c.read_u16()?;
            let _scan_count = c.read_u16()?;
            let _start_scan = c.read_u16()?;
            let src_y = c.read_i16()?;
            let src_x = c.read_i16()?;
            let height = c.read_i16()?;
            let width = c.read_i16()?;
            let dest_y = c.read_i16()?;
            let dest_x = c.read_i16()?;
            let (image, unsupported_bitmap) = dib_image(c.read_rest());
            I::Blit(Blit {
                record: record_type,
                raster_op: SRCCOPY,
                dest: BlitRect {
                    x: dest_x,
                    y: dest_y,
                    width,
                    height,
                },
                src: BlitRect {
                    x: src_x,
                    y: src_y,
                    width,
                    height,
                },
                image,
                unsupported_bitmap,
            })
        }
        R::FILLREGION => {
            let region = c.read_u16()?;
            let brush = c.read_u16()?;
            I::FillRegion { region, brush }
        }
        R::FRAMEREGION => {
            let region = c.read_u16()?;
            let brush = c.read_u16()?;
            let height = c.read_i16()?;
            let width = c.read_i16()?;
            I::FrameRegion {
                region,
                brush,
                width,
                height,
            }
        }
        R::PAINTREGION => I::PaintRegion(c.read_u16()?),
        R::INVERTREGION => I::InvertRegion(c.read_u16()?),
        R::FLOODFILL => {
            let color = read_color(c)?;
            I::FloodFill {
                point: read_point_yx(c)?,
                color,
            }
        }
        R::EXTFLOODFILL => {
            let mode = c.read_u16()?;
            let color = read_color(c)?;
            I::ExtFloodFill {
                point: read_point_yx(c)?,
                color,
                mode,
            }
        }

        R::CREATEPENINDIRECT => {
            let style = c.read_u16()?;
            let width = c.read_i16()?;
            let _width_y = c.read_i16()?;
            let color = read_color(c)?;
            I::CreatePen(Pen::from_style_bits(style, width, color))
        }
        R::CREATEBRUSHINDIRECT => {
            let style = c.read_u16()?;
            let color = read_color(c)?;
            let hatch = c.read_u16()?;
            I::CreateBrush(brush_from_log(style, color, hatch))
        }
        R::DIBCREATEPATTERNBRUSH => {
            let style = c.read_u16()?;
            let _color_usage = c.read_u16()?;
            let dib = c.read_rest();
            // BS_PATTERN here carries a Bitmap16 instead of a DIB
            let image = if style == BS_PATTERN {
                read_bitmap16(&mut ByteCursor::new(dib))?
            } else {
                dib_to_image(dib)
            };
            I::CreateBrush(Brush::Pattern(image.map(Rc::new)))
        }
        R::CREATEPATTERNBRUSH => {
            let header = read_bitmap16_header(c)?;
            let _bits_pointer = c.read_u32()?;
            c.skip(18)?;
            let image = bitmap16_to_image(
                header.width,
                header.height,
                header.width_bytes,
                header.planes,
                header.bits_pixel,
                c.read_rest(),
            );
            I::CreateBrush(Brush::Pattern(image.map(Rc::new)))
        }
        R::CREATEFONTINDIRECT => I::CreateFont(decode_font(c)?),
        R::CREATEPALETTE => {
            let _start = c.read_u16()?;
            I::CreatePalette(Palette {
                entries: read_palette_entries(c)?,
            })
        }
        R::CREATEREGION => I::CreateRegion(decode_region(c)?),
        R::SELECTOBJECT => I::SelectObject(c.read_u16()?),
        R::SELECTPALETTE => I::SelectPalette(c.read_u16()?),
        R::DELETEOBJECT => I::DeleteObject(c.read_u16()?),
        R::REALIZEPALETTE => I::RealizePalette,
        R::SETPALENTRIES | R::ANIMATEPALETTE => {
            let start = c.read_u16()?;
            let entries = read_palette_entries(c)?;
            if record_type == R::SETPALENTRIES {
                I::SetPalEntries { start, entries }
            } else {
                I::AnimatePalette { start, entries }
            }
        }
        R::RESIZEPALETTE => I::ResizePalette(c.read_u16()?),

        R::SELECTCLIPREGION => I::SelectClipRegion(c.read_u16()?),
        R::INTERSECTCLIPRECT => I::IntersectClipRect(read_rect_reversed(c)?),
        R::EXCLUDECLIPRECT => I::ExcludeClipRect(read_rect_reversed(c)?),
        R::OFFSETCLIPRGN => {
            let (dx, dy) = read_yx(c)?;
            I::OffsetClipRgn { dx, dy }
        }

        R::ESCAPE => {
            let function = c.read_u16()?;
            let count = c.read_u16()? as usize;
            let data = c.read_bytes(count)?.to_vec();
            I::Escape { function, data }
        }
    };

    Ok(instruction)
}

const SRCCOPY: u32 = 0x00CC_0020;
const BS_SOLID: u16 = 0;
const BS_NULL: u16 = 1;
const BS_HATCHED: u16 = 2;
const BS_PATTERN: u16 = 3;

fn read_color(c: &mut ByteCursor<'_>) -> ConversionResult<ColorRef> {
    let bytes = c.read_bytes(4)?;
    Ok(ColorRef::from_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

/// Pair stored as (y, x); returned as (x, y).
fn read_yx(c: &mut ByteCursor<'_>) -> ConversionResult<(i16, i16)> {
    let y = c.read_i16()?;
    let x = c.read_i16()?;
    Ok((x, y))
}

fn read_point_yx(c: &mut ByteCursor<'_>) -> ConversionResult<PointS> {
    let (x, y) = read_yx(c)?;
    Ok(PointS::new(x, y))
}

/// Rectangle stored as bottom, right, top, left
fn read_rect_reversed(c: &mut ByteCursor<'_>) -> ConversionResult<RectS> {
    let bottom = c.read_i16()?;
    let right = c.read_i16()?;
    let top = c.read_i16()?;
    let left = c.read_i16()?;
    Ok(RectS::new(left, top, right, bottom))
}

/// Rectangle stored as left, top, right, bottom
fn read_rect(c: &mut ByteCursor<'_>) -> ConversionResult<RectS> {
    let left = c.read_i16()?;
    let top = c.read_i16()?;
    let right = c.read_i16()?;
    let bottom = c.read_i16()?;
    Ok(RectS::new(left, top, right, bottom))
}

fn read_points(c: &mut ByteCursor<'_>) -> ConversionResult<Vec<PointS>> {
    let count = c.read_i16()?.max(0) as usize;
    read_n_points(c, count)
}

fn read_n_points(c: &mut ByteCursor<'_>, count: usize) -> ConversionResult<Vec<PointS>> {
    if count * 4 > c.remaining() {
        return Err(ConversionError::record(
            c.offset(),
            format!("{} points need {} bytes, {} remain", count, count * 4, c.remaining()),
        ));
    }
    let mut points = Vec::with_capacity(count);
    for _ in 0..count {
        let x = c.read_i16()?;
        let y = c.read_i16()?;
        points.push(PointS::new(x, y));
    }
    Ok(points)
}

fn read_dest(c: &mut ByteCursor<'_>) -> ConversionResult<BlitRect> {
    let height = c.read_i16()?;
    let width = c.read_i16()?;
    let y = c.read_i16()?;
    let x = c.read_i16()?;
    Ok(BlitRect {
        x,
        y,
        width,
        height,
    })
}

fn read_palette_entries(c: &mut ByteCursor<'_>) -> ConversionResult<Vec<PaletteEntry>> {
    let count = c.read_u16()? as usize;
    if count * 4 > c.remaining() {
        return Err(ConversionError::record(
            c.offset(),
            format!("{} palette entries exceed the record", count),
        ));
    }
    let mut entries = Vec::with_capacity(count);
    for _ in 0..count {
        let bytes = c.read_bytes(4)?;
        entries.push(PaletteEntry {
            red: bytes[0],
            green: bytes[1],
            blue: bytes[2],
            flags: bytes[3],
        });
    }
    Ok(entries)
}

fn brush_from_log(style: u16, color: ColorRef, hatch: u16) -> Brush {
    match style {
        BS_SOLID => Brush::Solid(color),
        BS_NULL => Brush::Null,
        BS_HATCHED => Brush::Hatched {
            color,
            hatch: HatchStyle::from_u16(hatch),
        },
        // pattern brushes cannot be created indirectly
        other => {
            debug!("Brush style {} created indirectly, using solid color", other);
            Brush::Solid(color)
        }
    }
}

fn decode_ext_text_out(c: &mut ByteCursor<'_>) -> ConversionResult<Instruction> {
    let point = read_point_yx(c)?;
    let len = c.read_i16()?.max(0) as usize;
    let options = c.read_u16()?;
    let rect = if options & (ETO_OPAQUE | ETO_CLIPPED) != 0 {
        Some(read_rect(c)?)
    } else {
        None
    };
    let text = c.read_bytes(len)?.to_vec();
    if len % 2 == 1 && c.remaining() > 0 {
        c.skip(1)?;
    }
    let mut dx = Vec::new();
    if c.remaining() >= len * 2 {
        dx.reserve(len);
        for _ in 0..len {
            dx.push(c.read_i16()?);
        }
    }
    Ok(Instruction::ExtTextOut {
        point,
        options,
        rect,
        text,
        dx,
    })
}

fn decode_blit(
    record_type: RecordType,
    record: &RawRecord<'_>,
    c: &mut ByteCursor<'_>,
) -> ConversionResult<Blit> {
    use RecordType as R;

    let has_bitmap = record.size_words != (record.function as u32 >> 8) + 3;
    let stretch = matches!(record_type, R::STRETCHBLT | R::DIBSTRETCHBLT);

    let raster_op = c.read_u32()?;
    let (src_width, src_height) = if stretch {
        let h = c.read_i16()?;
        let w = c.read_i16()?;
        (Some(w), Some(h))
    } else {
        (None, None)
    };
    let src_y = c.read_i16()?;
    let src_x = c.read_i16()?;
    if !has_bitmap {
        let _reserved = c.read_u16()?;
    }
    let dest = read_dest(c)?;
    let src = BlitRect {
        x: src_x,
        y: src_y,
        width: src_width.unwrap_or(dest.width),
        height: src_height.unwrap_or(dest.height),
    };

    let (image, unsupported_bitmap) = if !has_bitmap {
        (None, false)
    } else if matches!(record_type, R::DIBBITBLT | R::DIBSTRETCHBLT) {
        dib_image(c.read_rest())
    } else {
        let image = read_bitmap16(c)?;
        let unsupported = image.is_none();
        (image.map(Rc::new), unsupported)
    };

    Ok(Blit {
        record: record_type,
        raster_op,
        dest,
        src,
        image,
        unsupported_bitmap,
    })
}

fn dib_image(dib: &[u8]) -> (Option<Rc<EmbeddedImage>>, bool) {
    match dib_to_image(dib) {
        Some(image) => (Some(Rc::new(image)), false),
        None => (None, true),
    }
}

struct Bitmap16Header {
    width: i16,
    height: i16,
    width_bytes: i16,
    planes: u8,
    bits_pixel: u8,
}

fn read_bitmap16_header(c: &mut ByteCursor<'_>) -> ConversionResult<Bitmap16Header> {
    let _kind = c.read_i16()?;
    Ok(Bitmap16Header {
        width: c.read_i16()?,
        height: c.read_i16()?,
        width_bytes: c.read_i16()?,
        planes: c.read_u8()?,
        bits_pixel: c.read_u8()?,
    })
}

fn read_bitmap16(c: &mut ByteCursor<'_>) -> ConversionResult<Option<EmbeddedImage>> {
    let header = read_bitmap16_header(c)?;
    Ok(bitmap16_to_image(
        header.width,
        header.height,
        header.width_bytes,
        header.planes,
        header.bits_pixel,
        c.read_rest(),
    ))
}

fn decode_font(c: &mut ByteCursor<'_>) -> ConversionResult<Font> {
    let height = c.read_i16()?;
    let width = c.read_i16()?;
    let escapement = c.read_i16()?;
    let orientation = c.read_i16()?;
    let weight = c.read_i16()?;
    let italic = c.read_u8()? != 0;
    let underline = c.read_u8()? != 0;
    let strike_out = c.read_u8()? != 0;
    let charset = c.read_u8()?;
    let out_precision = c.read_u8()?;
    let clip_precision = c.read_u8()?;
    let quality = c.read_u8()?;
    let pitch_and_family = c.read_u8()?;

    // face name: up to 32 bytes, NUL terminated, often cut short
    let name_len = c.remaining().min(32);
    let raw = c.read_bytes(name_len)?;
    let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
    let face = crate::charset::decode_text(&raw[..end], charset);

    Ok(Font {
        height,
        width,
        escapement,
        orientation,
        weight,
        italic,
        underline,
        strike_out,
        charset,
        out_precision,
        clip_precision,
        quality,
        pitch_and_family,
        face,
    })
}

fn decode_region(c: &mut ByteCursor<'_>) -> ConversionResult<Region> {
    let _next_in_chain = c.read_u16()?;
    let _object_type = c.read_i16()?;
    let _object_count = c.read_u32()?;
    let _region_size = c.read_i16()?;
    let scan_count = c.read_i16()?.max(0);
    let _max_scan = c.read_i16()?;
    let bounds = read_rect(c)?;

    let mut rects = Vec::new();
    for _ in 0..scan_count {
        let count = c.read_u16()? as usize;
        let top = c.read_u16()? as i16;
        let bottom = c.read_u16()? as i16;
        for _ in 0..count / 2 {
            let left = c.read_u16()? as i16;
            let right = c.read_u16()? as i16;
            if left != right && top != bottom {
                rects.push(RectS::new(left, top, right, bottom));
            }
        }
        let _count2 = c.read_u16()?;
    }

    if rects.is_empty() && scan_count == 0 && !bounds.is_empty() {
        rects.push(bounds);
    }

    Ok(Region { bounds, rects })
}
