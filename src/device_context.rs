//! Device context state and the save/restore stack

use crate::mapper::Mapping;
use crate::objects::{Brush, Font, Palette, Pen};
use crate::types::{Color, ColorRef, PointS, Rect};
use log::warn;
use thiserror::Error;

pub const TRANSPARENT: u16 = 1;
pub const OPAQUE: u16 = 2;

pub const ALTERNATE: u16 = 1;
pub const WINDING: u16 = 2;

pub const TA_UPDATECP: u16 = 0x0001;
pub const TA_RIGHT: u16 = 0x0002;
pub const TA_CENTER: u16 = 0x0006;
pub const TA_BOTTOM: u16 = 0x0008;
pub const TA_BASELINE: u16 = 0x0018;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HorizontalAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalAlign {
    Top,
    Baseline,
    Bottom,
}

pub fn horizontal_align(align: u16) -> HorizontalAlign {
    match align & TA_CENTER {
        TA_CENTER => HorizontalAlign::Center,
        TA_RIGHT => HorizontalAlign::Right,
        _ => HorizontalAlign::Left,
    }
}

pub fn vertical_align(align: u16) -> VerticalAlign {
    match align & TA_BASELINE {
        TA_BASELINE => VerticalAlign::Baseline,
        TA_BOTTOM => VerticalAlign::Bottom,
        _ => VerticalAlign::Top,
    }
}

/// Graphics state for playback
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceContext {
    pub pen: Pen,
    pub pen_handle: Option<u16>,
    pub brush: Brush,
    pub brush_handle: Option<u16>,
    pub font: Font,
    pub font_handle: Option<u16>,
    pub palette: Option<Palette>,
    pub palette_handle: Option<u16>,
    pub mapping: Mapping,
    pub bk_mode: u16,
    pub bk_color: ColorRef,
    pub text_color: ColorRef,
    pub poly_fill_mode: u16,
    pub rop2: u16,
    pub stretch_mode: u16,
    /// Current position in logical units
    pub position: PointS,
    /// Clip rectangles in output space; `None` means unclipped
    pub clip: Option<Vec<Rect>>,
    pub text_align: u16,
    pub char_extra: i16,
}

impl DeviceContext {
    pub fn with_dpi(dpi: f64) -> Self {
        Self {
            pen: Pen::default(),
            pen_handle: None,
            brush: Brush::default(),
            brush_handle: None,
            font: Font::default(),
            font_handle: None,
            palette: None,
            palette_handle: None,
            mapping: Mapping::with_dpi(dpi),
            bk_mode: OPAQUE,
            bk_color: ColorRef::Rgb(Color::white()),
            text_color: ColorRef::Rgb(Color::black()),
            poly_fill_mode: ALTERNATE,
            rop2: 13, // R2_COPYPEN
            stretch_mode: 1,
            position: PointS::default(),
            clip: None,
            text_align: 0,
            char_extra: 0,
        }
    }

    /// True if this state selects the object `handle`.
    pub fn references(&self, handle: u16) -> bool {
        [
            self.pen_handle,
            self.brush_handle,
            self.font_handle,
            self.palette_handle,
        ]
        .contains(&Some(handle))
    }

    /// Resolve a color reference against the selected palette.
    pub fn resolve_color(&self, color: ColorRef) -> Color {
        match color {
            ColorRef::Rgb(c) | ColorRef::PaletteRgb(c) => c,
            ColorRef::PaletteIndex(index) => self
                .palette
                .as_ref()
                .and_then(|palette| palette.entries.get(index as usize))
                .map(|e| Color::rgb(e.red, e.green, e.blue))
                .unwrap_or_else(Color::black),
        }
    }
}

impl Default for DeviceContext {
    fn default() -> Self {
        Self::with_dpi(crate::mapper::DEFAULT_DPI)
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreError {
    #[error("RestoreDC with an empty state stack")]
    EmptyStack,
    #[error("RestoreDC(0) names no saved state")]
    ZeroIndex,
    #[error("RestoreDC({requested}) beyond the {depth} saved states")]
    BeyondDepth { requested: i16, depth: usize },
}

/// Current state plus a LIFO stack of saved snapshots
#[derive(Debug, Clone, PartialEq)]
pub struct DcStack {
    pub current: DeviceContext,
    saved: Vec<DeviceContext>,
}

impl DcStack {
    pub fn new(current: DeviceContext) -> Self {
        Self {
            current,
            saved: Vec::new(),
        }
    }

    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    pub fn save(&mut self) {
        self.saved.push(self.current.clone());
    }

    /// Restore a saved state.
    ///
    /// Negative `n` is relative to the top (-1 is the last save); asking for
    /// more levels than exist restores the oldest snapshot. Positive `n` is
    /// the 1-based absolute depth. Rejected requests leave the state as is.
    pub fn restore(&mut self, n: i16) -> Result<(), RestoreError> {
        let depth = self.saved.len();
        if depth == 0 {
            return Err(RestoreError::EmptyStack);
        }

        let index = match n {
            0 => return Err(RestoreError::ZeroIndex),
            n if n < 0 => {
                let levels = n.unsigned_abs() as usize;
                if levels > depth {
                    warn!(
                        "RestoreDC({}) with {} saved states, restoring the oldest",
                        n, depth
                    );
                    0
                } else {
                    depth - levels
                }
            }
            n => {
                let requested = n as usize;
                if requested > depth {
                    return Err(RestoreError::BeyondDepth {
                        requested: n,
                        depth,
                    });
                }
                requested - 1
            }
        };

        self.saved.truncate(index + 1);
        if let Some(state) = self.saved.pop() {
            self.current = state;
        }
        Ok(())
    }

    /// True if the current or any saved state selects `handle`.
    pub fn references(&self, handle: u16) -> bool {
        self.current.references(handle) || self.saved.iter().any(|dc| dc.references(handle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::PaletteEntry;

    fn stack() -> DcStack {
        DcStack::new(DeviceContext::default())
    }

    #[test]
    fn test_defaults() {
        let dc = DeviceContext::default();
        assert_eq!(dc.bk_mode, OPAQUE);
        assert_eq!(dc.poly_fill_mode, ALTERNATE);
        assert_eq!(dc.font.face, "System");
        assert_eq!(dc.brush, Brush::Solid(ColorRef::Rgb(Color::white())));
        assert!(dc.clip.is_none());
    }

    #[test]
    fn test_save_restore_nested() {
        let mut dcs = stack();
        let original = dcs.clone();
        for i in 0..5 {
            dcs.save();
            dcs.current.text_align = i + 1;
            dcs.current.position = PointS::new(i as i16, 0);
        }
        for _ in 0..5 {
            dcs.restore(-1).unwrap();
        }
        assert_eq!(dcs, original);
    }

    #[test]
    fn test_restore_relative_overshoot_takes_oldest() {
        let mut dcs = stack();
        dcs.current.char_extra = 1;
        dcs.save();
        dcs.current.char_extra = 2;
        dcs.save();
        dcs.current.char_extra = 3;
        dcs.restore(-10).unwrap();
        assert_eq!(dcs.current.char_extra, 1);
        assert_eq!(dcs.depth(), 0);
    }

    #[test]
    fn test_restore_absolute() {
        let mut dcs = stack();
        for i in 1..=3 {
            dcs.current.char_extra = i;
            dcs.save();
        }
        dcs.current.char_extra = 99;
        dcs.restore(2).unwrap();
        assert_eq!(dcs.current.char_extra, 2);
        assert_eq!(dcs.depth(), 1);
    }

    #[test]
    fn test_restore_rejections_leave_state() {
        let mut dcs = stack();
        assert_eq!(dcs.restore(-1), Err(RestoreError::EmptyStack));

        dcs.save();
        dcs.current.char_extra = 5;
        let before = dcs.clone();
        assert_eq!(dcs.restore(0), Err(RestoreError::ZeroIndex));
        assert_eq!(
            dcs.restore(4),
            Err(RestoreError::BeyondDepth {
                requested: 4,
                depth: 1
            })
        );
        assert_eq!(dcs, before);
    }

    #[test]
    fn test_references_include_saved_states() {
        let mut dcs = stack();
        dcs.current.pen_handle = Some(3);
        dcs.save();
        dcs.current.pen_handle = None;
        assert!(dcs.references(3));
        assert!(!dcs.current.references(3));
        dcs.restore(-1).unwrap();
        assert!(dcs.current.references(3));
    }

    #[test]
    fn test_text_align_bits() {
        assert_eq!(horizontal_align(TA_CENTER), HorizontalAlign::Center);
        assert_eq!(horizontal_align(TA_RIGHT | TA_UPDATECP), HorizontalAlign::Right);
        assert_eq!(horizontal_align(0), HorizontalAlign::Left);
        assert_eq!(vertical_align(TA_BASELINE), VerticalAlign::Baseline);
        assert_eq!(vertical_align(TA_BOTTOM), VerticalAlign::Bottom);
        assert_eq!(vertical_align(0), VerticalAlign::Top);
    }

    #[test]
    fn test_palette_index_resolution() {
        let mut dc = DeviceContext::default();
        assert_eq!(dc.resolve_color(ColorRef::PaletteIndex(1)), Color::black());
        dc.palette = Some(Palette {
            entries: vec![
                PaletteEntry::default(),
                PaletteEntry {
                    red: 10,
                    green: 20,
                    blue: 30,
                    flags: 0,
                },
            ],
        });
        assert_eq!(
            dc.resolve_color(ColorRef::PaletteIndex(1)),
            Color::rgb(10, 20, 30)
        );
    }
}
