//! Synthetic metafile builder shared by the integration tests

#![allow(dead_code)]

use wmf_converter::types::{ColorRef, PointS, RectS};
use wmf_converter::Instruction;

pub const EOF: u16 = 0x0000;
pub const SAVEDC: u16 = 0x001E;
pub const RESTOREDC: u16 = 0x0127;
pub const SETTEXTCOLOR: u16 = 0x0209;
pub const SETWINDOWORG: u16 = 0x020B;
pub const SETWINDOWEXT: u16 = 0x020C;
pub const SETVIEWPORTEXT: u16 = 0x020E;
pub const OFFSETWINDOWORG: u16 = 0x020F;
pub const OFFSETVIEWPORTORG: u16 = 0x0211;
pub const SCALEWINDOWEXT: u16 = 0x0410;
pub const SCALEVIEWPORTEXT: u16 = 0x0412;
pub const BITBLT: u16 = 0x0922;
pub const DIBBITBLT: u16 = 0x0940;
pub const CREATEPATTERNBRUSH: u16 = 0x01F9;
pub const LINETO: u16 = 0x0213;
pub const MOVETO: u16 = 0x0214;
pub const POLYGON: u16 = 0x0324;
pub const POLYLINE: u16 = 0x0325;
pub const ELLIPSE: u16 = 0x0418;
pub const RECTANGLE: u16 = 0x041B;
pub const TEXTOUT: u16 = 0x0521;
pub const SELECTOBJECT: u16 = 0x012D;
pub const DELETEOBJECT: u16 = 0x01F0;
pub const CREATEPENINDIRECT: u16 = 0x02FA;
pub const CREATEBRUSHINDIRECT: u16 = 0x02FC;

/// Builds a standard (optionally placeable) metafile record by record
#[derive(Default)]
pub struct MetafileBuilder {
    body: Vec<u8>,
    placeable: Option<([i16; 4], u16)>,
    object_count: u16,
}

impl MetafileBuilder {
    pub fn new() -> Self {
        Self {
            object_count: 8,
            ..Self::default()
        }
    }

    /// Prefix a placeable header with bounds (left, top, right, bottom).
    pub fn placeable(mut self, bounds: [i16; 4], units_per_inch: u16) -> Self {
        self.placeable = Some((bounds, units_per_inch));
        self
    }

    /// Append a record whose payload is 16-bit words, already in file order.
    pub fn words(self, function: u16, words: &[i16]) -> Self {
        let payload: Vec<u8> = words.iter().flat_map(|w| w.to_le_bytes()).collect();
        self.raw(function, &payload)
    }

    /// Append a record with an arbitrary payload, padded to whole words.
    pub fn raw(mut self, function: u16, payload: &[u8]) -> Self {
        let mut payload = payload.to_vec();
        if payload.len() % 2 == 1 {
            payload.push(0);
        }
        let size_words = 3 + payload.len() as u32 / 2;
        self.body.extend_from_slice(&size_words.to_le_bytes());
        self.body.extend_from_slice(&function.to_le_bytes());
        self.body.extend_from_slice(&payload);
        self
    }

    pub fn instruction(self, instruction: &Instruction) -> Self {
        let (function, payload) = encode(instruction);
        self.raw(function, &payload)
    }

    pub fn eof(self) -> Self {
        self.raw(EOF, &[])
    }

    pub fn build(self) -> Vec<u8> {
        let mut out = Vec::new();
        if let Some((bounds, units_per_inch)) = self.placeable {
            let mut placeable = Vec::with_capacity(22);
            placeable.extend_from_slice(&0x9AC6_CDD7u32.to_le_bytes());
            placeable.extend_from_slice(&0u16.to_le_bytes());
            for value in bounds {
                placeable.extend_from_slice(&value.to_le_bytes());
            }
            placeable.extend_from_slice(&units_per_inch.to_le_bytes());
            placeable.extend_from_slice(&0u32.to_le_bytes());
            let checksum = placeable
                .chunks_exact(2)
                .fold(0u16, |acc, w| acc ^ u16::from_le_bytes([w[0], w[1]]));
            placeable.extend_from_slice(&checksum.to_le_bytes());
            out.extend(placeable);
        }

        let size_words = (18 + self.body.len()) as u32 / 2;
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&9u16.to_le_bytes());
        out.extend_from_slice(&0x0300u16.to_le_bytes());
        out.extend_from_slice(&size_words.to_le_bytes());
        out.extend_from_slice(&self.object_count.to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend(self.body);
        out
    }
}

fn push_i16(out: &mut Vec<u8>, value: i16) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn push_yx(out: &mut Vec<u8>, point: PointS) {
    push_i16(out, point.y);
    push_i16(out, point.x);
}

fn push_rect_reversed(out: &mut Vec<u8>, rect: RectS) {
    for value in [rect.bottom, rect.right, rect.top, rect.left] {
        push_i16(out, value);
    }
}

fn push_points(out: &mut Vec<u8>, points: &[PointS]) {
    push_i16(out, points.len() as i16);
    for point in points {
        push_i16(out, point.x);
        push_i16(out, point.y);
    }
}

fn push_color(out: &mut Vec<u8>, color: ColorRef) {
    match color {
        ColorRef::Rgb(c) => out.extend_from_slice(&[c.r, c.g, c.b, 0]),
        ColorRef::PaletteIndex(i) => {
            out.extend_from_slice(&i.to_le_bytes());
            out.extend_from_slice(&[0, 1]);
        }
        ColorRef::PaletteRgb(c) => out.extend_from_slice(&[c.r, c.g, c.b, 2]),
    }
}

/// Encode the instructions the tests build streams from.
pub fn encode(instruction: &Instruction) -> (u16, Vec<u8>) {
    let mut out = Vec::new();
    let function = match instruction {
        Instruction::Eof => EOF,
        Instruction::SaveDc => SAVEDC,
        Instruction::RestoreDc(n) => {
            push_i16(&mut out, *n);
            RESTOREDC
        }
        Instruction::SetTextColor(color) => {
            push_color(&mut out, *color);
            SETTEXTCOLOR
        }
        Instruction::SetWindowOrg { x, y } => {
            push_yx(&mut out, PointS::new(*x, *y));
            SETWINDOWORG
        }
        Instruction::SetWindowExt { x, y } => {
            push_yx(&mut out, PointS::new(*x, *y));
            SETWINDOWEXT
        }
        Instruction::SetViewportExt { x, y } => {
            push_yx(&mut out, PointS::new(*x, *y));
            SETVIEWPORTEXT
        }
        Instruction::MoveTo(point) => {
            push_yx(&mut out, *point);
            MOVETO
        }
        Instruction::LineTo(point) => {
            push_yx(&mut out, *point);
            LINETO
        }
        Instruction::Polygon(points) => {
            push_points(&mut out, points);
            POLYGON
        }
        Instruction::Polyline(points) => {
            push_points(&mut out, points);
            POLYLINE
        }
        Instruction::Rectangle(rect) => {
            push_rect_reversed(&mut out, *rect);
            RECTANGLE
        }
        Instruction::Ellipse(rect) => {
            push_rect_reversed(&mut out, *rect);
            ELLIPSE
        }
        Instruction::TextOut { point, text } => {
            push_i16(&mut out, text.len() as i16);
            out.extend_from_slice(text);
            if text.len() % 2 == 1 {
                out.push(0);
            }
            push_yx(&mut out, *point);
            TEXTOUT
        }
        Instruction::SelectObject(handle) => {
            out.extend_from_slice(&handle.to_le_bytes());
            SELECTOBJECT
        }
        Instruction::DeleteObject(handle) => {
            out.extend_from_slice(&handle.to_le_bytes());
            DELETEOBJECT
        }
        other => panic!("no test encoding for {:?}", other),
    };
    (function, out)
}

/// CreatePenIndirect payload: style, width, unused height, color
pub fn pen_payload(style: u16, width: i16, rgb: [u8; 3]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&style.to_le_bytes());
    push_i16(&mut out, width);
    push_i16(&mut out, 0);
    out.extend_from_slice(&[rgb[0], rgb[1], rgb[2], 0]);
    out
}

/// CreateBrushIndirect payload: style, color, hatch
pub fn brush_payload(style: u16, rgb: [u8; 3], hatch: u16) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&style.to_le_bytes());
    out.extend_from_slice(&[rgb[0], rgb[1], rgb[2], 0]);
    out.extend_from_slice(&hatch.to_le_bytes());
    out
}

/// Bitmap16 header followed by its bits
pub fn bitmap16_payload(width: i16, height: i16, width_bytes: i16, bits_pixel: u8, bits: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    for value in [0, width, height, width_bytes] {
        push_i16(&mut out, value);
    }
    out.extend_from_slice(&[1, bits_pixel]);
    out.extend_from_slice(bits);
    out
}

/// Blit payload up to the bitmap: raster op, source origin, destination
pub fn blit_prefix(raster_op: u32, dest: [i16; 4]) -> Vec<u8> {
    let mut out = raster_op.to_le_bytes().to_vec();
    push_i16(&mut out, 0);
    push_i16(&mut out, 0);
    let [x, y, width, height] = dest;
    for value in [height, width, y, x] {
        push_i16(&mut out, value);
    }
    out
}

pub fn parse(svg: &str) -> roxmltree::Document<'_> {
    roxmltree::Document::parse(svg).expect("well-formed SVG")
}

/// Drawable elements in document order, with clip groups flattened
pub fn drawn<'a, 'input>(doc: &'a roxmltree::Document<'input>) -> Vec<roxmltree::Node<'a, 'input>> {
    doc.root_element()
        .descendants()
        .filter(|n| {
            n.is_element()
                && matches!(
                    n.tag_name().name(),
                    "path" | "rect" | "ellipse" | "polygon" | "text" | "image"
                )
                && !n.ancestors().any(|a| {
                    matches!(a.tag_name().name(), "defs" | "clipPath" | "pattern")
                })
        })
        .collect()
}
