//! Playback: applies decoded instructions to the device context and emits
//! output elements

use crate::charset::{decode_text, generic_family};
use crate::converter::ConvertOptions;
use crate::device_context::{
    horizontal_align, vertical_align, DcStack, DeviceContext, HorizontalAlign, VerticalAlign,
    OPAQUE, TA_UPDATECP, WINDING,
};
use crate::error::ConversionError;
use crate::instruction::{Blit, BlitRect, Instruction, ETO_CLIPPED, ETO_OPAQUE};
use crate::mapper::MapMode;
use crate::objects::{
    Brush, DeleteOutcome, GraphicsObject, LineCap, LineJoin, ObjectTable, Palette, PenStyle,
    Region,
};
use crate::records::RecordType;
use crate::svg_writer::{
    GroupBoundary, OutputElement, Paint, PathData, Stroke, Style, SvgWriter, TextRun,
};
use crate::types::{Color, Point, PointS, Rect, RectS};
use log::{debug, info, trace, warn};
use std::collections::HashSet;
use std::f64::consts::PI;

const PATCOPY: u32 = 0x00F0_0021;
const BLACKNESS: u32 = 0x0000_0042;
const WHITENESS: u32 = 0x00FF_0062;

/// Stand-in for "everything" when excluding from an unclipped state
const UNIVERSE: Rect = Rect {
    x: -1.0e6,
    y: -1.0e6,
    width: 2.0e6,
    height: 2.0e6,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArcKind {
    Arc,
    Chord,
    Pie,
}

/// Everything playback produced, handed to the driver for serialization
pub struct Playback {
    pub writer: SvgWriter,
    pub warnings: Vec<ConversionError>,
    /// Last window rectangle set by the metafile, in output space
    pub window_frame: Option<Rect>,
}

/// Metafile player
pub struct Player {
    objects: ObjectTable,
    dc: DcStack,
    writer: SvgWriter,
    warnings: Vec<ConversionError>,
    open_clip: Option<Vec<Rect>>,
    window_frame: Option<Rect>,
    logged: HashSet<RecordType>,
    record: usize,
    offset: usize,
}

impl Player {
    pub fn new(object_hint: u16, options: &ConvertOptions) -> Self {
        Self {
            objects: ObjectTable::new(object_hint),
            dc: DcStack::new(DeviceContext::with_dpi(options.dpi)),
            writer: SvgWriter::new(options.element_ids),
            warnings: Vec::new(),
            open_clip: None,
            window_frame: None,
            logged: HashSet::new(),
            record: 0,
            offset: 0,
        }
    }

    pub fn device_context(&self) -> &DcStack {
        &self.dc
    }

    pub fn objects(&self) -> &ObjectTable {
        &self.objects
    }

    pub fn warnings(&self) -> &[ConversionError] {
        &self.warnings
    }

    /// Record a recoverable problem found outside playback (decode errors).
    pub fn add_warning(&mut self, error: ConversionError) {
        warn!("{}", error);
        self.warnings.push(error);
    }

    pub fn finish(mut self) -> Playback {
        if self.open_clip.take().is_some() {
            self.writer
                .push(OutputElement::GroupBoundary(GroupBoundary::End), self.record);
        }
        Playback {
            writer: self.writer,
            warnings: self.warnings,
            window_frame: self.window_frame,
        }
    }

    /// Apply one instruction. `record` is the record's index in the stream
    /// and `offset` its byte offset, both used for diagnostics.
    pub fn execute(&mut self, record: usize, offset: usize, instruction: Instruction) {
        self.record = record;
        self.offset = offset;
        trace!("Record {} at {}: {:?}", record, offset, instruction);

        use Instruction as I;
        match instruction {
            I::Eof => {}

            I::SaveDc => self.dc.save(),
            I::RestoreDc(n) => {
                if let Err(err) = self.dc.restore(n) {
                    self.add_warning(ConversionError::record(offset, err.to_string()));
                }
                self.collect_pending();
                self.update_window_frame();
            }
            I::SetBkColor(color) => self.dc.current.bk_color = color,
            I::SetTextColor(color) => self.dc.current.text_color = color,
            I::SetBkMode(mode) => self.dc.current.bk_mode = mode,
            I::SetMapMode(mode) => match MapMode::from_u16(mode) {
                Some(mode) => {
                    self.dc.current.mapping.mode = mode;
                    self.update_window_frame();
                }
                None => self.add_warning(ConversionError::record(
                    offset,
                    format!("unknown mapping mode {}", mode),
                )),
            },
            I::SetRop2(rop) => self.dc.current.rop2 = rop,
            I::SetPolyFillMode(mode) => self.dc.current.poly_fill_mode = mode,
            I::SetStretchBltMode(mode) => self.dc.current.stretch_mode = mode,
            I::SetTextCharExtra(extra) => self.dc.current.char_extra = extra,
            I::SetTextAlign(align) => self.dc.current.text_align = align,
            I::SetRelabs(_) => self.note_ignored(RecordType::SETRELABS),
            I::SetTextJustification { .. } => self.note_ignored(RecordType::SETTEXTJUSTIFICATION),
            I::SetMapperFlags(_) => self.note_ignored(RecordType::SETMAPPERFLAGS),
            I::SetLayout(_) => self.note_ignored(RecordType::SETLAYOUT),

            I::SetWindowOrg { x, y } => {
                self.dc.current.mapping.window_org = (x as i32, y as i32);
                self.update_window_frame();
            }
            I::SetWindowExt { x, y } => {
                self.dc.current.mapping.set_window_ext(x as i32, y as i32);
                self.update_window_frame();
            }
            I::SetViewportOrg { x, y } => {
                self.dc.current.mapping.viewport_org = (x as i32, y as i32);
                self.update_window_frame();
            }
            I::SetViewportExt { x, y } => {
                self.dc.current.mapping.set_viewport_ext(x as i32, y as i32);
                self.update_window_frame();
            }
            I::OffsetWindowOrg { dx, dy } => {
                let org = &mut self.dc.current.mapping.window_org;
                *org = (org.0.saturating_add(dx as i32), org.1.saturating_add(dy as i32));
                self.update_window_frame();
            }
            I::OffsetViewportOrg { dx, dy } => {
                let org = &mut self.dc.current.mapping.viewport_org;
                *org = (org.0.saturating_add(dx as i32), org.1.saturating_add(dy as i32));
                self.update_window_frame();
            }
            I::ScaleWindowExt {
                x_num,
                x_denom,
                y_num,
                y_denom,
            } => {
                self.dc
                    .current
                    .mapping
                    .scale_window_ext(x_num, x_denom, y_num, y_denom);
                self.update_window_frame();
            }
            I::ScaleViewportExt {
                x_num,
                x_denom,
                y_num,
                y_denom,
            } => {
                self.dc
                    .current
                    .mapping
                    .scale_viewport_ext(x_num, x_denom, y_num, y_denom);
                self.update_window_frame();
            }

            I::MoveTo(point) => self.dc.current.position = point,
            I::LineTo(point) => self.line_to(point),
            I::Polyline(points) => self.polyline(&points),
            I::Polygon(points) => self.polygon(&points),
            I::PolyPolygon(polygons) => self.poly_polygon(&polygons),
            I::Rectangle(rect) => self.rectangle(rect, 0, 0),
            I::RoundRect {
                rect,
                width,
                height,
            } => self.rectangle(rect, width, height),
            I::Ellipse(rect) => self.ellipse(rect),
            I::Arc { rect, start, end } => self.arc(rect, start, end, ArcKind::Arc),
            I::Chord { rect, start, end } => self.arc(rect, start, end, ArcKind::Chord),
            I::Pie { rect, start, end } => self.arc(rect, start, end, ArcKind::Pie),
            I::SetPixel { point, color } => self.set_pixel(point, color),
            I::TextOut { point, text } => self.text_out(point, &text, 0, None, &[]),
            I::ExtTextOut {
                point,
                options,
                rect,
                text,
                dx,
            } => self.text_out(point, &text, options, rect, &dx),
            I::PatBlt { dest, raster_op } => self.pattern_fill(dest, raster_op, RecordType::PATBLT),
            I::Blit(blit) => self.blit(blit),
            I::FillRegion { region, brush } => self.fill_region(region, Some(brush)),
            I::PaintRegion(region) => self.fill_region(region, None),
            I::FrameRegion {
                region,
                brush,
                width,
                height,
            } => self.frame_region(region, brush, width, height),
            I::InvertRegion(_) => self.note_ignored(RecordType::INVERTREGION),
            I::FloodFill { .. } => self.note_ignored(RecordType::FLOODFILL),
            I::ExtFloodFill { .. } => self.note_ignored(RecordType::EXTFLOODFILL),

            I::CreatePen(pen) => self.create(GraphicsObject::Pen(pen)),
            I::CreateBrush(brush) => self.create(GraphicsObject::Brush(brush)),
            I::CreateFont(font) => self.create(GraphicsObject::Font(font)),
            I::CreatePalette(palette) => self.create(GraphicsObject::Palette(palette)),
            I::CreateRegion(region) => self.create(GraphicsObject::Region(region)),
            I::SelectObject(handle) => self.select_object(handle),
            I::SelectPalette(handle) => self.select_palette(handle),
            I::DeleteObject(handle) => self.delete_object(handle),
            I::RealizePalette => self.note_ignored(RecordType::REALIZEPALETTE),
            I::SetPalEntries { start, entries } | I::AnimatePalette { start, entries } => {
                self.update_palette(|palette| palette.set_entries(start, &entries))
            }
            I::ResizePalette(count) => self.update_palette(|palette| palette.resize(count)),

            I::SelectClipRegion(handle) => self.select_clip_region(handle),
            I::IntersectClipRect(rect) => {
                let rect = self.map_rect(rect);
                let clip = match self.dc.current.clip.take() {
                    None => vec![rect],
                    Some(rects) => rects.iter().filter_map(|r| r.intersect(&rect)).collect(),
                };
                self.dc.current.clip = Some(clip);
            }
            I::ExcludeClipRect(rect) => {
                let hole = self.map_rect(rect);
                let base = self.dc.current.clip.take().unwrap_or_else(|| vec![UNIVERSE]);
                let clip = base.iter().flat_map(|r| r.subtract(&hole)).collect();
                self.dc.current.clip = Some(clip);
            }
            I::OffsetClipRgn { dx, dy } => {
                let (dx, dy) = self.dc.current.mapping.map_delta(dx as f64, dy as f64);
                if let Some(rects) = self.dc.current.clip.as_mut() {
                    for rect in rects.iter_mut() {
                        *rect = rect.translate(dx, dy);
                    }
                }
            }

            I::Escape { function, data } => {
                debug!("Escape function {} with {} bytes skipped", function, data.len())
            }
            I::Unknown { function } => {
                self.add_warning(ConversionError::unknown_opcode(offset, function))
            }
        }
    }

    fn note_ignored(&mut self, record: RecordType) {
        if self.logged.insert(record) {
            info!("{} is recognized but has no SVG rendering", record.name());
        }
    }

    fn update_window_frame(&mut self) {
        if let Some(frame) = self.dc.current.mapping.window_frame() {
            self.window_frame = Some(frame);
        }
    }

    fn collect_pending(&mut self) {
        let dc = &self.dc;
        self.objects.collect_pending(|handle| dc.references(handle));
    }

    // ---- objects -------------------------------------------------------

    fn create(&mut self, object: GraphicsObject) {
        if let Err(err) = self.objects.create(object, self.offset) {
            self.add_warning(err);
        }
    }

    fn select_object(&mut self, handle: u16) {
        let Some(object) = self.objects.get(handle).cloned() else {
            self.add_warning(ConversionError::invalid_handle(self.offset, handle));
            return;
        };

        let dc = &mut self.dc.current;
        match object {
            GraphicsObject::Pen(pen) => {
                dc.pen = pen;
                dc.pen_handle = Some(handle);
            }
            GraphicsObject::Brush(brush) => {
                dc.brush = brush;
                dc.brush_handle = Some(handle);
            }
            GraphicsObject::Font(font) => {
                dc.font = font;
                dc.font_handle = Some(handle);
            }
            GraphicsObject::Palette(palette) => {
                dc.palette = Some(palette);
                dc.palette_handle = Some(handle);
            }
            GraphicsObject::Region(region) => {
                let clip = self.region_rects(&region);
                self.dc.current.clip = Some(clip);
            }
        }
        self.collect_pending();
    }

    fn select_palette(&mut self, handle: u16) {
        match self.objects.get(handle) {
            Some(GraphicsObject::Palette(palette)) => {
                self.dc.current.palette = Some(palette.clone());
                self.dc.current.palette_handle = Some(handle);
                self.collect_pending();
            }
            _ => self.add_warning(ConversionError::invalid_handle(self.offset, handle)),
        }
    }

    fn delete_object(&mut self, handle: u16) {
        let dc = &self.dc;
        let outcome = self.objects.delete(handle, |h| dc.references(h));
        if outcome == DeleteOutcome::Missing {
            self.add_warning(ConversionError::invalid_handle(self.offset, handle));
        }
    }

    /// Apply a palette edit to the selected palette and its table entry.
    fn update_palette(&mut self, edit: impl Fn(&mut Palette)) {
        let dc = &mut self.dc.current;
        let Some(palette) = dc.palette.as_mut() else {
            debug!("Palette record without a selected palette");
            return;
        };
        edit(palette);
        if let Some(handle) = dc.palette_handle {
            if let Some(GraphicsObject::Palette(stored)) = self.objects.get_mut(handle) {
                edit(stored);
            }
        }
    }

    fn select_clip_region(&mut self, handle: u16) {
        match self.objects.get(handle) {
            Some(GraphicsObject::Region(region)) => {
                let region = region.clone();
                self.dc.current.clip = Some(self.region_rects(&region));
            }
            Some(other) => {
                let kind = other.kind_name();
                self.add_warning(ConversionError::record(
                    self.offset,
                    format!("SelectClipRegion on a {} handle {}", kind, handle),
                ));
            }
            None => {
                debug!("SelectClipRegion({}) without a region, clip reset", handle);
                self.dc.current.clip = None;
            }
        }
    }

    // ---- style resolution ---------------------------------------------

    fn color(&self, color: crate::types::ColorRef) -> String {
        self.dc.current.resolve_color(color).to_svg()
    }

    fn stroke(&self) -> Option<Stroke> {
        let dc = &self.dc.current;
        let pen = &dc.pen;
        if pen.style == PenStyle::Null {
            return None;
        }

        let width = if pen.width <= 0 {
            1.0
        } else {
            dc.mapping.len_x(pen.width as f64)
        };
        let unit = width.max(1.0);
        let dash = match pen.style {
            PenStyle::Dash => Some(vec![3.0 * unit, unit]),
            PenStyle::Dot => Some(vec![unit, unit]),
            PenStyle::DashDot => Some(vec![3.0 * unit, unit, unit, unit]),
            PenStyle::DashDotDot => Some(vec![3.0 * unit, unit, unit, unit, unit, unit]),
            PenStyle::Alternate => Some(vec![1.0, 1.0]),
            _ => None,
        };

        Some(Stroke {
            color: self.color(pen.color),
            width,
            dash,
            linecap: match pen.cap {
                LineCap::Round => "round",
                LineCap::Square => "square",
                LineCap::Flat => "butt",
            },
            linejoin: match pen.join {
                LineJoin::Round => "round",
                LineJoin::Bevel => "bevel",
                LineJoin::Miter => "miter",
            },
        })
    }

    fn brush_paint(&self, brush: &Brush) -> Paint {
        let dc = &self.dc.current;
        match brush {
            Brush::Solid(color) => Paint::Color(self.color(*color)),
            Brush::Null => Paint::None,
            Brush::Hatched { color, hatch } => Paint::Hatch {
                hatch: *hatch,
                color: self.color(*color),
                background: (dc.bk_mode == OPAQUE).then(|| self.color(dc.bk_color)),
            },
            Brush::Pattern(Some(image)) => Paint::Image {
                href: image.data_url(),
                width: image.width.unsigned_abs().max(1) as f64,
                height: image.height.unsigned_abs().max(1) as f64,
            },
            Brush::Pattern(None) => Paint::None,
        }
    }

    fn shape_style(&self) -> Style {
        Style {
            fill: self.brush_paint(&self.dc.current.brush),
            stroke: self.stroke(),
            fill_rule: None,
        }
    }

    fn polygon_style(&self) -> Style {
        let rule = if self.dc.current.poly_fill_mode == WINDING {
            "nonzero"
        } else {
            "evenodd"
        };
        Style {
            fill_rule: Some(rule),
            ..self.shape_style()
        }
    }

    // ---- geometry ------------------------------------------------------

    fn map(&self, point: PointS) -> Point {
        self.dc.current.mapping.map_i16(point.x, point.y)
    }

    fn map_rect(&self, rect: RectS) -> Rect {
        let mapping = &self.dc.current.mapping;
        Rect::from_corners(
            mapping.map_i16(rect.left, rect.top),
            mapping.map_i16(rect.right, rect.bottom),
        )
    }

    fn map_blit_rect(&self, rect: BlitRect) -> Rect {
        let mapping = &self.dc.current.mapping;
        Rect::from_corners(
            mapping.map_i16(rect.x, rect.y),
            mapping.map(
                rect.x as f64 + rect.width as f64,
                rect.y as f64 + rect.height as f64,
            ),
        )
    }

    fn region_rects(&self, region: &Region) -> Vec<Rect> {
        region.rects.iter().map(|r| self.map_rect(*r)).collect()
    }

    // ---- emission ------------------------------------------------------

    /// Open or close clip groups so the emitter matches the DC clip.
    fn sync_clip(&mut self) {
        if self.dc.current.clip == self.open_clip {
            return;
        }
        if self.open_clip.is_some() {
            self.writer
                .push(OutputElement::GroupBoundary(GroupBoundary::End), self.record);
        }
        self.open_clip = self.dc.current.clip.clone();
        if let Some(clip) = &self.open_clip {
            self.writer.push(
                OutputElement::GroupBoundary(GroupBoundary::Begin { clip: clip.clone() }),
                self.record,
            );
        }
    }

    fn emit(&mut self, element: OutputElement) {
        self.sync_clip();
        self.writer.push(element, self.record);
    }

    fn line_to(&mut self, point: PointS) {
        let from = self.map(self.dc.current.position);
        let to = self.map(point);
        self.dc.current.position = point;
        if let Some(stroke) = self.stroke() {
            let mut d = PathData::new();
            d.move_to(from).line_to(to);
            self.emit(OutputElement::Path {
                d: d.finish(),
                style: Style::stroke_only(Some(stroke)),
            });
        }
    }

    fn polyline(&mut self, points: &[PointS]) {
        if points.len() < 2 {
            debug!("Polyline with {} points skipped", points.len());
            return;
        }
        let Some(stroke) = self.stroke() else {
            return;
        };
        let mut d = PathData::new();
        d.move_to(self.map(points[0]));
        for point in &points[1..] {
            d.line_to(self.map(*point));
        }
        self.emit(OutputElement::Path {
            d: d.finish(),
            style: Style::stroke_only(Some(stroke)),
        });
    }

    fn polygon(&mut self, points: &[PointS]) {
        if points.len() < 2 {
            debug!("Polygon with {} points skipped", points.len());
            return;
        }
        let style = self.polygon_style();
        if style.is_invisible() {
            return;
        }
        let points = points.iter().map(|p| self.map(*p)).collect();
        self.emit(OutputElement::Polygon { points, style });
    }

    fn poly_polygon(&mut self, polygons: &[Vec<PointS>]) {
        let mut d = PathData::new();
        for polygon in polygons.iter().filter(|p| p.len() >= 2) {
            d.move_to(self.map(polygon[0]));
            for point in &polygon[1..] {
                d.line_to(self.map(*point));
            }
            d.close();
        }
        let style = self.polygon_style();
        if d.is_empty() || style.is_invisible() {
            return;
        }
        self.emit(OutputElement::Path {
            d: d.finish(),
            style,
        });
    }

    fn rectangle(&mut self, rect: RectS, corner_width: i16, corner_height: i16) {
        let style = self.shape_style();
        if style.is_invisible() {
            return;
        }
        let mapping = &self.dc.current.mapping;
        let rx = mapping.len_x(corner_width.unsigned_abs() as f64) / 2.0;
        let ry = mapping.len_y(corner_height.unsigned_abs() as f64) / 2.0;
        let rect = self.map_rect(rect);
        self.emit(OutputElement::Rect { rect, rx, ry, style });
    }

    fn ellipse(&mut self, rect: RectS) {
        let style = self.shape_style();
        if style.is_invisible() {
            return;
        }
        let bounds = self.map_rect(rect);
        self.emit(OutputElement::Ellipse {
            center: Point::new(
                bounds.x + bounds.width / 2.0,
                bounds.y + bounds.height / 2.0,
            ),
            rx: bounds.width / 2.0,
            ry: bounds.height / 2.0,
            style,
        });
    }

    /// Arcs run counterclockwise on the output surface from the ray through
    /// `start` to the ray through `end`.
    fn arc(&mut self, rect: RectS, start: PointS, end: PointS, kind: ArcKind) {
        let bounds = self.map_rect(rect);
        let (rx, ry) = (bounds.width / 2.0, bounds.height / 2.0);
        if rx <= 0.0 || ry <= 0.0 {
            debug!("Degenerate {:?} skipped", kind);
            return;
        }
        let center = Point::new(bounds.x + rx, bounds.y + ry);
        let p0 = ellipse_point(center, rx, ry, self.map(start));
        let p1 = ellipse_point(center, rx, ry, self.map(end));

        let a0 = (p0.y - center.y).atan2(p0.x - center.x);
        let a1 = (p1.y - center.y).atan2(p1.x - center.x);
        let sweep = (a0 - a1).rem_euclid(2.0 * PI);

        let mut d = PathData::new();
        if kind == ArcKind::Pie {
            d.move_to(center).line_to(p0);
        } else {
            d.move_to(p0);
        }
        if sweep < 1e-9 {
            // start and end coincide: full ellipse
            let opposite = Point::new(2.0 * center.x - p0.x, 2.0 * center.y - p0.y);
            d.arc_to(rx, ry, false, false, opposite)
                .arc_to(rx, ry, false, false, p0);
        } else {
            d.arc_to(rx, ry, sweep > PI, false, p1);
        }

        let style = if kind == ArcKind::Arc {
            Style::stroke_only(self.stroke())
        } else {
            d.close();
            self.shape_style()
        };
        if style.is_invisible() {
            return;
        }
        self.emit(OutputElement::Path {
            d: d.finish(),
            style,
        });
    }

    fn set_pixel(&mut self, point: PointS, color: crate::types::ColorRef) {
        let mapping = &self.dc.current.mapping;
        let a = mapping.map_i16(point.x, point.y);
        let b = mapping.map(point.x as f64 + 1.0, point.y as f64 + 1.0);
        let rect = Rect::from_corners(a, b);
        let fill = Paint::Color(self.color(color));
        self.emit(OutputElement::Rect {
            rect,
            rx: 0.0,
            ry: 0.0,
            style: Style::fill_only(fill),
        });
    }

    fn text_out(
        &mut self,
        point: PointS,
        bytes: &[u8],
        options: u16,
        rect: Option<RectS>,
        dx: &[i16],
    ) {
        let dc = &self.dc.current;
        let font = dc.font.clone();
        let mapping = dc.mapping;
        let update_cp = dc.text_align & TA_UPDATECP != 0;
        let origin = if update_cp { dc.position } else { point };
        let text = decode_text(bytes, font.charset);
        let char_count = text.chars().count();

        let out_rect = rect.map(|r| self.map_rect(r));
        if let Some(background) = out_rect.filter(|_| options & ETO_OPAQUE != 0) {
            let fill = Paint::Color(self.color(self.dc.current.bk_color));
            self.emit(OutputElement::Rect {
                rect: background,
                rx: 0.0,
                ry: 0.0,
                style: Style::fill_only(fill),
            });
        }

        let logical_height = if font.height == 0 {
            12.0
        } else {
            font.height.unsigned_abs() as f64
        };

        if update_cp {
            let advance = if dx.is_empty() {
                (char_count as f64 * logical_height * 0.5).round() as i32
            } else {
                dx.iter().map(|&v| v as i32).sum()
            };
            let x = (origin.x as i32)
                .saturating_add(advance)
                .clamp(i16::MIN as i32, i16::MAX as i32);
            self.dc.current.position = PointS::new(x as i16, origin.y);
        }

        if text.is_empty() {
            return;
        }

        let anchor = mapping.map_i16(origin.x, origin.y);
        let positions = (dx.len() == char_count && char_count > 1).then(|| {
            let mut x = origin.x as f64;
            dx.iter()
                .map(|&step| {
                    let mapped = mapping.map(x, origin.y as f64).x;
                    x += step as f64;
                    mapped
                })
                .collect::<Vec<f64>>()
        });

        let family = match generic_family(font.pitch_and_family) {
            Some(generic) if !font.face.is_empty() => format!("{}, {}", font.face, generic),
            Some(generic) => generic.to_string(),
            None => font.face.clone(),
        };
        let align = self.dc.current.text_align;
        let run = TextRun {
            x: anchor.x,
            y: anchor.y,
            positions,
            text,
            font_family: family,
            font_size: mapping.len_y(logical_height),
            font_weight: (font.weight != 0 && font.weight != 400).then_some(font.weight),
            italic: font.italic,
            underline: font.underline,
            strike_out: font.strike_out,
            color: self.color(self.dc.current.text_color),
            anchor: match horizontal_align(align) {
                HorizontalAlign::Left => "start",
                HorizontalAlign::Center => "middle",
                HorizontalAlign::Right => "end",
            },
            baseline: match vertical_align(align) {
                VerticalAlign::Top => Some("text-before-edge"),
                VerticalAlign::Bottom => Some("text-after-edge"),
                VerticalAlign::Baseline => None,
            },
            rotation: (font.escapement != 0).then(|| -(font.escapement as f64) / 10.0),
            letter_spacing: (self.dc.current.char_extra != 0)
                .then(|| mapping.len_x(self.dc.current.char_extra as f64)),
        };

        match out_rect.filter(|_| options & ETO_CLIPPED != 0) {
            Some(clip) => {
                self.sync_clip();
                self.writer.push(
                    OutputElement::GroupBoundary(GroupBoundary::Begin { clip: vec![clip] }),
                    self.record,
                );
                self.writer.push(OutputElement::Text(run), self.record);
                self.writer
                    .push(OutputElement::GroupBoundary(GroupBoundary::End), self.record);
            }
            None => self.emit(OutputElement::Text(run)),
        }
    }

    /// Brush, black or white fill for blits without a source bitmap.
    fn pattern_fill(&mut self, dest: BlitRect, raster_op: u32, record: RecordType) {
        let fill = match raster_op {
            PATCOPY => self.brush_paint(&self.dc.current.brush.clone()),
            BLACKNESS => Paint::Color(Color::black().to_svg()),
            WHITENESS => Paint::Color(Color::white().to_svg()),
            other => {
                debug!("{} raster op 0x{:08X} not rendered", record.name(), other);
                self.note_ignored(record);
                return;
            }
        };
        if fill == Paint::None {
            return;
        }
        let rect = self.map_blit_rect(dest);
        self.emit(OutputElement::Rect {
            rect,
            rx: 0.0,
            ry: 0.0,
            style: Style::fill_only(fill),
        });
    }

    fn blit(&mut self, blit: Blit) {
        match blit.image {
            Some(image) => {
                let rect = self.map_blit_rect(blit.dest);
                self.emit(OutputElement::Image {
                    rect,
                    href: image.data_url(),
                });
            }
            None if blit.unsupported_bitmap => {
                debug!("{} bitmap could not be converted", blit.record.name());
                self.note_ignored(blit.record);
            }
            None => self.pattern_fill(blit.dest, blit.raster_op, blit.record),
        }
    }

    fn lookup_region(&mut self, handle: u16) -> Option<Region> {
        match self.objects.get(handle) {
            Some(GraphicsObject::Region(region)) => Some(region.clone()),
            _ => {
                self.add_warning(ConversionError::invalid_handle(self.offset, handle));
                None
            }
        }
    }

    fn region_path(&self, region: &Region) -> PathData {
        let mut d = PathData::new();
        for rect in self.region_rects(region) {
            d.move_to(Point::new(rect.x, rect.y))
                .line_to(Point::new(rect.right(), rect.y))
                .line_to(Point::new(rect.right(), rect.bottom()))
                .line_to(Point::new(rect.x, rect.bottom()))
                .close();
        }
        d
    }

    fn fill_region(&mut self, region: u16, brush: Option<u16>) {
        let Some(region) = self.lookup_region(region) else {
            return;
        };
        let brush = match brush {
            None => self.dc.current.brush.clone(),
            Some(handle) => match self.objects.get(handle) {
                Some(GraphicsObject::Brush(brush)) => brush.clone(),
                _ => {
                    self.add_warning(ConversionError::invalid_handle(self.offset, handle));
                    return;
                }
            },
        };
        let fill = self.brush_paint(&brush);
        let d = self.region_path(&region);
        if d.is_empty() || fill == Paint::None {
            return;
        }
        self.emit(OutputElement::Path {
            d: d.finish(),
            style: Style::fill_only(fill),
        });
    }

    fn frame_region(&mut self, region: u16, brush: u16, width: i16, _height: i16) {
        let Some(region) = self.lookup_region(region) else {
            return;
        };
        let color = match self.objects.get(brush) {
            Some(GraphicsObject::Brush(Brush::Solid(color)))
            | Some(GraphicsObject::Brush(Brush::Hatched { color, .. })) => self.color(*color),
            Some(GraphicsObject::Brush(_)) => return,
            _ => {
                self.add_warning(ConversionError::invalid_handle(self.offset, brush));
                return;
            }
        };
        let d = self.region_path(&region);
        if d.is_empty() {
            return;
        }
        let stroke = Stroke {
            color,
            width: self.dc.current.mapping.len_x(width.max(1) as f64),
            dash: None,
            linecap: "butt",
            linejoin: "miter",
        };
        self.emit(OutputElement::Path {
            d: d.finish(),
            style: Style::stroke_only(Some(stroke)),
        });
    }
}

/// Where the ray from `center` through `toward` meets the ellipse.
fn ellipse_point(center: Point, rx: f64, ry: f64, toward: Point) -> Point {
    let dx = toward.x - center.x;
    let dy = toward.y - center.y;
    if dx == 0.0 && dy == 0.0 {
        return Point::new(center.x + rx, center.y);
    }
    let k = 1.0 / ((dx / rx).powi(2) + (dy / ry).powi(2)).sqrt();
    Point::new(center.x + k * dx, center.y + k * dy)
}
