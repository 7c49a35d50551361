//! Graphics objects and the handle table that owns them
//!
//! Handles are small integers assigned lowest-free-first. An object deleted
//! while a device context (current or saved) still selects it is kept as
//! pending and released once nothing references it.

use crate::bitmap::EmbeddedImage;
use crate::error::{ConversionError, ConversionResult};
use crate::types::{ColorRef, RectS};
use log::{debug, warn};
use std::collections::BTreeSet;
use std::rc::Rc;

/// Upper bound on table size: handles are 16 bit
pub const MAX_HANDLES: usize = 1 << 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PenStyle {
    Solid,
    Dash,
    Dot,
    DashDot,
    DashDotDot,
    Null,
    InsideFrame,
    UserStyle,
    Alternate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineCap {
    Round,
    Square,
    Flat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineJoin {
    Round,
    Bevel,
    Miter,
}

/// Pen representation
#[derive(Debug, Clone, PartialEq)]
pub struct Pen {
    pub style: PenStyle,
    pub cap: LineCap,
    pub join: LineJoin,
    /// Width in logical units; 0 means one device pixel
    pub width: i16,
    pub color: ColorRef,
}

impl Pen {
    pub fn from_style_bits(style: u16, width: i16, color: ColorRef) -> Self {
        let pen_style = match style & 0x000F {
            0 => PenStyle::Solid,
            1 => PenStyle::Dash,
            2 => PenStyle::Dot,
            3 => PenStyle::DashDot,
            4 => PenStyle::DashDotDot,
            5 => PenStyle::Null,
            6 => PenStyle::InsideFrame,
            7 => PenStyle::UserStyle,
            8 => PenStyle::Alternate,
            _ => PenStyle::Solid,
        };
        let cap = match style & 0x0F00 {
            0x0100 => LineCap::Square,
            0x0200 => LineCap::Flat,
            _ => LineCap::Round,
        };
        let join = match style & 0xF000 {
            0x1000 => LineJoin::Bevel,
            0x2000 => LineJoin::Miter,
            _ => LineJoin::Round,
        };
        Self {
            style: pen_style,
            cap,
            join,
            width,
            color,
        }
    }
}

impl Default for Pen {
    fn default() -> Self {
        Self {
            style: PenStyle::Solid,
            cap: LineCap::Round,
            join: LineJoin::Round,
            width: 0,
            color: ColorRef::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HatchStyle {
    Horizontal,
    Vertical,
    ForwardDiagonal,
    BackwardDiagonal,
    Cross,
    DiagonalCross,
}

impl HatchStyle {
    pub fn from_u16(value: u16) -> Self {
        match value {
            1 => HatchStyle::Vertical,
            2 => HatchStyle::ForwardDiagonal,
            3 => HatchStyle::BackwardDiagonal,
            4 => HatchStyle::Cross,
            5 => HatchStyle::DiagonalCross,
            _ => HatchStyle::Horizontal,
        }
    }
}

/// Brush representation
#[derive(Debug, Clone, PartialEq)]
pub enum Brush {
    Solid(ColorRef),
    Null,
    Hatched { color: ColorRef, hatch: HatchStyle },
    Pattern(Option<Rc<EmbeddedImage>>),
}

impl Default for Brush {
    fn default() -> Self {
        Brush::Solid(ColorRef::Rgb(crate::types::Color::white()))
    }
}

/// Logical font
#[derive(Debug, Clone, PartialEq)]
pub struct Font {
    pub height: i16,
    pub width: i16,
    pub escapement: i16,
    pub orientation: i16,
    pub weight: i16,
    pub italic: bool,
    pub underline: bool,
    pub strike_out: bool,
    pub charset: u8,
    pub out_precision: u8,
    pub clip_precision: u8,
    pub quality: u8,
    pub pitch_and_family: u8,
    pub face: String,
}

impl Default for Font {
    fn default() -> Self {
        Self {
            height: 12,
            width: 0,
            escapement: 0,
            orientation: 0,
            weight: 400,
            italic: false,
            underline: false,
            strike_out: false,
            charset: 0,
            out_precision: 0,
            clip_precision: 0,
            quality: 0,
            pitch_and_family: 0,
            face: "System".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PaletteEntry {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub flags: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Palette {
    pub entries: Vec<PaletteEntry>,
}

impl Palette {
    /// Overwrite entries starting at `start`, growing the palette if needed.
    pub fn set_entries(&mut self, start: u16, entries: &[PaletteEntry]) {
        let start = start as usize;
        let end = start + entries.len();
        if self.entries.len() < end {
            self.entries.resize(end, PaletteEntry::default());
        }
        self.entries[start..end].copy_from_slice(entries);
    }

    pub fn resize(&mut self, count: u16) {
        self.entries.resize(count as usize, PaletteEntry::default());
    }
}

/// Region as a set of logical rectangles
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Region {
    pub bounds: RectS,
    pub rects: Vec<RectS>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GraphicsObject {
    Pen(Pen),
    Brush(Brush),
    Font(Font),
    Palette(Palette),
    Region(Region),
}

impl GraphicsObject {
    pub fn kind_name(&self) -> &'static str {
        match self {
            GraphicsObject::Pen(_) => "pen",
            GraphicsObject::Brush(_) => "brush",
            GraphicsObject::Font(_) => "font",
            GraphicsObject::Palette(_) => "palette",
            GraphicsObject::Region(_) => "region",
        }
    }
}

#[derive(Debug, Clone)]
struct Slot {
    object: GraphicsObject,
    pending_delete: bool,
}

/// Outcome of a delete request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Freed,
    Pending,
    Missing,
}

/// Slot table keyed by handle with an explicit free list
#[derive(Debug, Clone)]
pub struct ObjectTable {
    slots: Vec<Option<Slot>>,
    free: BTreeSet<u16>,
    capacity_hint: usize,
    grew: bool,
}

impl ObjectTable {
    pub fn new(capacity_hint: u16) -> Self {
        let capacity_hint = capacity_hint as usize;
        Self {
            slots: vec![None; capacity_hint],
            free: (0..capacity_hint as u32).map(|h| h as u16).collect(),
            capacity_hint,
            grew: false,
        }
    }

    /// Store an object under the lowest free handle.
    pub fn create(&mut self, object: GraphicsObject, offset: usize) -> ConversionResult<u16> {
        let handle = match self.free.pop_first() {
            Some(handle) => handle,
            None => {
                if self.slots.len() >= MAX_HANDLES {
                    return Err(ConversionError::record(
                        offset,
                        format!("object table exhausted ({} handles)", MAX_HANDLES),
                    ));
                }
                if !self.grew {
                    warn!(
                        "Object table grows past the header hint of {} objects",
                        self.capacity_hint
                    );
                    self.grew = true;
                }
                self.slots.push(None);
                (self.slots.len() - 1) as u16
            }
        };

        debug!("Created {} with handle {}", object.kind_name(), handle);
        self.slots[handle as usize] = Some(Slot {
            object,
            pending_delete: false,
        });
        Ok(handle)
    }

    /// Live object for `handle`; pending deletions are no longer addressable.
    pub fn get(&self, handle: u16) -> Option<&GraphicsObject> {
        match self.slots.get(handle as usize) {
            Some(Some(slot)) if !slot.pending_delete => Some(&slot.object),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, handle: u16) -> Option<&mut GraphicsObject> {
        match self.slots.get_mut(handle as usize) {
            Some(Some(slot)) if !slot.pending_delete => Some(&mut slot.object),
            _ => None,
        }
    }

    /// Delete `handle`, deferring release while `in_use` reports a reference.
    pub fn delete(&mut self, handle: u16, in_use: impl Fn(u16) -> bool) -> DeleteOutcome {
        let Some(Some(slot)) = self.slots.get_mut(handle as usize) else {
            return DeleteOutcome::Missing;
        };
        if slot.pending_delete {
            return DeleteOutcome::Missing;
        }
        if in_use(handle) {
            slot.pending_delete = true;
            debug!("Object {} still selected, deletion deferred", handle);
            DeleteOutcome::Pending
        } else {
            self.release(handle);
            DeleteOutcome::Freed
        }
    }

    /// Release pending objects that are no longer referenced.
    pub fn collect_pending(&mut self, in_use: impl Fn(u16) -> bool) {
        let pending: Vec<u16> = self
            .slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| match slot {
                Some(slot) if slot.pending_delete => Some(index as u16),
                _ => None,
            })
            .collect();
        for handle in pending {
            if !in_use(handle) {
                debug!("Releasing deferred object {}", handle);
                self.release(handle);
            }
        }
    }

    fn release(&mut self, handle: u16) {
        self.slots[handle as usize] = None;
        self.free.insert(handle);
    }

    /// Objects still occupying a slot (pending ones included)
    pub fn occupied(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_pending(&self, handle: u16) -> bool {
        matches!(self.slots.get(handle as usize), Some(Some(slot)) if slot.pending_delete)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Color;

    fn pen() -> GraphicsObject {
        GraphicsObject::Pen(Pen::default())
    }

    #[test]
    fn test_lowest_free_handle_reused() {
        let mut table = ObjectTable::new(4);
        assert_eq!(table.create(pen(), 0).unwrap(), 0);
        assert_eq!(table.create(pen(), 0).unwrap(), 1);
        assert_eq!(table.create(pen(), 0).unwrap(), 2);
        assert_eq!(table.delete(1, |_| false), DeleteOutcome::Freed);
        assert_eq!(table.delete(0, |_| false), DeleteOutcome::Freed);
        assert_eq!(table.create(pen(), 0).unwrap(), 0);
        assert_eq!(table.create(pen(), 0).unwrap(), 1);
        assert_eq!(table.create(pen(), 0).unwrap(), 3);
    }

    #[test]
    fn test_grows_past_hint() {
        let mut table = ObjectTable::new(1);
        assert_eq!(table.create(pen(), 0).unwrap(), 0);
        assert_eq!(table.create(pen(), 0).unwrap(), 1);
        assert_eq!(table.occupied(), 2);

        let mut table = ObjectTable::new(0);
        assert_eq!(table.create(pen(), 0).unwrap(), 0);
    }

    #[test]
    fn test_get_and_delete_missing() {
        let mut table = ObjectTable::new(2);
        assert!(table.get(0).is_none());
        assert!(table.get(500).is_none());
        assert_eq!(table.delete(7, |_| false), DeleteOutcome::Missing);

        let handle = table
            .create(GraphicsObject::Brush(Brush::Solid(ColorRef::Rgb(Color::black()))), 0)
            .unwrap();
        assert!(matches!(table.get(handle), Some(GraphicsObject::Brush(_))));
    }

    #[test]
    fn test_pending_delete_released_when_unreferenced() {
        let mut table = ObjectTable::new(2);
        let handle = table.create(pen(), 0).unwrap();
        assert_eq!(table.delete(handle, |h| h == handle), DeleteOutcome::Pending);
        assert!(table.is_pending(handle));
        assert!(table.get(handle).is_none());
        // the handle is not reusable while pending
        assert_eq!(table.create(pen(), 0).unwrap(), 1);

        table.collect_pending(|h| h == handle);
        assert!(table.is_pending(handle));
        table.collect_pending(|_| false);
        assert!(!table.is_pending(handle));
        assert_eq!(table.create(pen(), 0).unwrap(), handle);
    }

    #[test]
    fn test_pen_style_bits() {
        let pen = Pen::from_style_bits(0x2201, 3, ColorRef::default());
        assert_eq!(pen.style, PenStyle::Dash);
        assert_eq!(pen.cap, LineCap::Flat);
        assert_eq!(pen.join, LineJoin::Miter);

        let pen = Pen::from_style_bits(0x1105, 0, ColorRef::default());
        assert_eq!(pen.style, PenStyle::Null);
        assert_eq!(pen.cap, LineCap::Square);
        assert_eq!(pen.join, LineJoin::Bevel);
    }

    #[test]
    fn test_palette_set_entries_grows() {
        let mut palette = Palette::default();
        let entry = PaletteEntry {
            red: 1,
            green: 2,
            blue: 3,
            flags: 0,
        };
        palette.set_entries(2, &[entry]);
        assert_eq!(palette.entries.len(), 3);
        assert_eq!(palette.entries[2], entry);
        palette.resize(1);
        assert_eq!(palette.entries.len(), 1);
    }
}
