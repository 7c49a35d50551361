//! Logical to output coordinate mapping

use crate::types::{Point, Rect};

pub const DEFAULT_DPI: f64 = 96.0;

/// Mapping modes (MM_*)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapMode {
    Text,
    LoMetric,
    HiMetric,
    LoEnglish,
    HiEnglish,
    Twips,
    Isotropic,
    Anisotropic,
}

impl MapMode {
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            1 => Some(MapMode::Text),
            2 => Some(MapMode::LoMetric),
            3 => Some(MapMode::HiMetric),
            4 => Some(MapMode::LoEnglish),
            5 => Some(MapMode::HiEnglish),
            6 => Some(MapMode::Twips),
            7 => Some(MapMode::Isotropic),
            8 => Some(MapMode::Anisotropic),
            _ => None,
        }
    }

    /// Logical units per inch for the fixed-scale modes
    pub fn units_per_inch(self) -> Option<f64> {
        match self {
            MapMode::LoMetric => Some(254.0),
            MapMode::HiMetric => Some(2540.0),
            MapMode::LoEnglish => Some(100.0),
            MapMode::HiEnglish => Some(1000.0),
            MapMode::Twips => Some(1440.0),
            _ => None,
        }
    }
}

/// Window and viewport transformation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mapping {
    pub mode: MapMode,
    pub window_org: (i32, i32),
    pub window_ext: (i32, i32),
    pub viewport_org: (i32, i32),
    /// `None` until a viewport extent is set
    pub viewport_ext: Option<(i32, i32)>,
    pub window_ext_set: bool,
    pub dpi: f64,
}

impl Default for Mapping {
    fn default() -> Self {
        Self::with_dpi(DEFAULT_DPI)
    }
}

impl Mapping {
    pub fn with_dpi(dpi: f64) -> Self {
        Self {
            mode: MapMode::Text,
            window_org: (0, 0),
            window_ext: (1, 1),
            viewport_org: (0, 0),
            viewport_ext: None,
            window_ext_set: false,
            dpi,
        }
    }

    pub fn set_window_ext(&mut self, x: i32, y: i32) {
        self.window_ext = (x, y);
        self.window_ext_set = true;
    }

    pub fn set_viewport_ext(&mut self, x: i32, y: i32) {
        self.viewport_ext = Some((x, y));
    }

    /// ScaleWindowExt: ext = ext * num / denom, zero denominators ignored.
    pub fn scale_window_ext(&mut self, x_num: i16, x_denom: i16, y_num: i16, y_denom: i16) {
        let (x, y) = self.window_ext;
        self.set_window_ext(scale_extent(x, x_num, x_denom), scale_extent(y, y_num, y_denom));
    }

    pub fn scale_viewport_ext(&mut self, x_num: i16, x_denom: i16, y_num: i16, y_denom: i16) {
        let (x, y) = self.effective_viewport_ext();
        self.set_viewport_ext(scale_extent(x, x_num, x_denom), scale_extent(y, y_num, y_denom));
    }

    fn effective_viewport_ext(&self) -> (i32, i32) {
        self.viewport_ext
            .unwrap_or((self.window_ext.0.abs(), self.window_ext.1.abs()))
    }

    /// Per-axis scale factors from logical to output units.
    pub fn scale(&self) -> (f64, f64) {
        if let Some(units_per_inch) = self.mode.units_per_inch() {
            let s = self.dpi / units_per_inch;
            return (s, -s);
        }

        let (wx, wy) = self.window_ext;
        let (vx, vy) = self.effective_viewport_ext();
        let sx = axis_scale(vx, wx);
        let sy = axis_scale(vy, wy);

        if self.mode == MapMode::Isotropic {
            let m = sx.abs().min(sy.abs());
            (m.copysign(sx), m.copysign(sy))
        } else {
            (sx, sy)
        }
    }

    pub fn map(&self, x: f64, y: f64) -> Point {
        let (sx, sy) = self.scale();
        Point::new(
            self.viewport_org.0 as f64 + (x - self.window_org.0 as f64) * sx,
            self.viewport_org.1 as f64 + (y - self.window_org.1 as f64) * sy,
        )
    }

    pub fn map_i16(&self, x: i16, y: i16) -> Point {
        self.map(x as f64, y as f64)
    }

    /// Horizontal length in output units
    pub fn len_x(&self, len: f64) -> f64 {
        len * self.scale().0.abs()
    }

    /// Vertical length in output units
    pub fn len_y(&self, len: f64) -> f64 {
        len * self.scale().1.abs()
    }

    /// Relative offset (no origin) in output units
    pub fn map_delta(&self, dx: f64, dy: f64) -> (f64, f64) {
        let (sx, sy) = self.scale();
        (dx * sx, dy * sy)
    }

    /// The window rectangle mapped to output space, when one was set
    pub fn window_frame(&self) -> Option<Rect> {
        if !self.window_ext_set || self.mode.units_per_inch().is_some() {
            return None;
        }
        let (ox, oy) = self.window_org;
        let (ex, ey) = self.window_ext;
        if ex == 0 || ey == 0 {
            return None;
        }
        let a = self.map(ox as f64, oy as f64);
        let b = self.map(ox as f64 + ex as f64, oy as f64 + ey as f64);
        Some(Rect::from_corners(a, b))
    }
}

fn axis_scale(viewport: i32, window: i32) -> f64 {
    if window == 0 || viewport == 0 {
        1.0
    } else {
        viewport as f64 / window as f64
    }
}

fn scale_extent(ext: i32, num: i16, denom: i16) -> i32 {
    if denom == 0 {
        ext
    } else {
        ((ext as i64 * num as i64) / denom as i64).clamp(i32::MIN as i64, i32::MAX as i64) as i32
    }
}

/// Round to two decimals, half to even, and print without trailing zeros.
pub fn format_coord(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    let rounded = (value * 100.0).round_ties_even() / 100.0;
    if rounded == 0.0 {
        // avoid "-0"
        return "0".to_string();
    }
    format!("{}", rounded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_identity() {
        let mapping = Mapping::default();
        assert_eq!(mapping.map(12.0, -5.0), Point::new(12.0, -5.0));
        assert_eq!(mapping.window_frame(), None);
    }

    #[test]
    fn test_window_viewport_scaling() {
        let mut mapping = Mapping::default();
        mapping.set_window_ext(100, 100);
        mapping.set_viewport_ext(200, 200);
        assert_eq!(mapping.map(50.0, 50.0), Point::new(100.0, 100.0));
    }

    #[test]
    fn test_unset_viewport_keeps_window_units() {
        let mut mapping = Mapping::default();
        mapping.mode = MapMode::Anisotropic;
        mapping.window_org = (100, 100);
        mapping.set_window_ext(1000, -1000);
        assert_eq!(mapping.scale(), (1.0, -1.0));
        assert_eq!(mapping.map(200.0, 300.0), Point::new(100.0, -200.0));
    }

    #[test]
    fn test_isotropic_uses_smaller_scale() {
        let mut mapping = Mapping::default();
        mapping.mode = MapMode::Isotropic;
        mapping.set_window_ext(100, -50);
        mapping.set_viewport_ext(400, 100);
        assert_eq!(mapping.scale(), (2.0, -2.0));
    }

    #[test]
    fn test_twips_flip_y() {
        let mut mapping = Mapping::default();
        mapping.mode = MapMode::Twips;
        let p = mapping.map(1440.0, 1440.0);
        assert!((p.x - 96.0).abs() < 1e-9);
        assert!((p.y + 96.0).abs() < 1e-9);
        assert_eq!(format_coord(mapping.len_x(15.0)), "1");
    }

    #[test]
    fn test_zero_extent_falls_back_to_unit_scale() {
        let mut mapping = Mapping::default();
        mapping.mode = MapMode::Anisotropic;
        mapping.set_window_ext(0, 10);
        mapping.set_viewport_ext(50, 0);
        assert_eq!(mapping.scale(), (1.0, 1.0));
        assert!(mapping.map(3.0, 4.0).x.is_finite());
    }

    #[test]
    fn test_mapping_is_affine() {
        let mut mapping = Mapping::default();
        mapping.mode = MapMode::Anisotropic;
        mapping.window_org = (-7, 13);
        mapping.viewport_org = (5, 9);
        mapping.set_window_ext(37, -91);
        mapping.set_viewport_ext(120, 240);

        let (x1, y1, x2, y2) = (3.0, -40.0, 250.0, 17.0);
        for t in [0.0, 0.25, 0.5, 0.9, 1.0] {
            let mixed = mapping.map(x1 + t * (x2 - x1), y1 + t * (y2 - y1));
            let a = mapping.map(x1, y1);
            let b = mapping.map(x2, y2);
            let expected = Point::new(a.x + t * (b.x - a.x), a.y + t * (b.y - a.y));
            assert!((mixed.x - expected.x).abs() < 1e-9);
            assert!((mixed.y - expected.y).abs() < 1e-9);
        }
    }

    #[test]
    fn test_scale_extents() {
        let mut mapping = Mapping::default();
        mapping.set_window_ext(100, 200);
        mapping.scale_window_ext(3, 2, 1, 0);
        assert_eq!(mapping.window_ext, (150, 200));

        mapping.scale_viewport_ext(1, 2, 1, 4);
        assert_eq!(mapping.viewport_ext, Some((75, 50)));
    }

    #[test]
    fn test_window_frame() {
        let mut mapping = Mapping::default();
        mapping.window_org = (10, 20);
        mapping.set_window_ext(100, -50);
        // the window origin lands on the viewport origin
        let frame = mapping.window_frame().unwrap();
        assert_eq!(frame, Rect::new(0.0, 0.0, 100.0, 50.0));
    }

    #[test]
    fn test_window_frame_at_extreme_origin() {
        let mut mapping = Mapping::default();
        mapping.window_org = (i32::MAX, i32::MIN);
        mapping.set_window_ext(32767, -32768);
        let frame = mapping.window_frame().unwrap();
        assert_eq!(frame.width, 32767.0);
        assert_eq!(frame.height, 32768.0);
    }

    #[test]
    fn test_format_coord_rounds_half_even() {
        assert_eq!(format_coord(0.125), "0.12");
        assert_eq!(format_coord(0.375), "0.38");
        assert_eq!(format_coord(100.0), "100");
        assert_eq!(format_coord(-0.001), "0");
        assert_eq!(format_coord(1.5), "1.5");
        assert_eq!(format_coord(f64::NAN), "0");
    }
}
