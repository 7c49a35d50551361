//! Type definitions shared by the decoder, device context and emitter

/// Color representation (RGB 0-255)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn black() -> Self {
        Self::rgb(0, 0, 0)
    }

    pub fn white() -> Self {
        Self::rgb(255, 255, 255)
    }

    pub fn to_svg(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Color as stored in records: explicit RGB or a palette reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorRef {
    Rgb(Color),
    /// PALETTEINDEX: index into the selected palette
    PaletteIndex(u16),
    /// PALETTERGB: nearest palette match, rendered as the given color
    PaletteRgb(Color),
}

impl ColorRef {
    /// Decode a COLORREF from its four bytes (red, green, blue, flags).
    pub fn from_bytes(bytes: [u8; 4]) -> Self {
        let [r, g, b, flags] = bytes;
        match flags {
            0x01 => ColorRef::PaletteIndex(u16::from_le_bytes([r, g])),
            0x02 => ColorRef::PaletteRgb(Color::rgb(r, g, b)),
            _ => ColorRef::Rgb(Color::rgb(r, g, b)),
        }
    }
}

impl Default for ColorRef {
    fn default() -> Self {
        ColorRef::Rgb(Color::black())
    }
}

/// Logical point as stored in records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PointS {
    pub x: i16,
    pub y: i16,
}

impl PointS {
    pub fn new(x: i16, y: i16) -> Self {
        Self { x, y }
    }
}

/// Logical rectangle as stored in records (edges, not normalized)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RectS {
    pub left: i16,
    pub top: i16,
    pub right: i16,
    pub bottom: i16,
}

impl RectS {
    pub fn new(left: i16, top: i16, right: i16, bottom: i16) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.left == self.right || self.top == self.bottom
    }
}

/// Point in output space
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Rectangle with position and size in output space
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle spanning two corners in any order
    pub fn from_corners(a: Point, b: Point) -> Self {
        let x = a.x.min(b.x);
        let y = a.y.min(b.y);
        Self::new(x, y, (a.x - b.x).abs(), (a.y - b.y).abs())
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        let rect = Rect::new(x, y, right - x, bottom - y);
        if rect.is_empty() {
            None
        } else {
            Some(rect)
        }
    }

    /// Parts of `self` not covered by `hole` (at most four bands).
    pub fn subtract(&self, hole: &Rect) -> Vec<Rect> {
        let Some(overlap) = self.intersect(hole) else {
            return vec![*self];
        };

        let mut pieces = Vec::with_capacity(4);
        // above and below span the full width
        if overlap.y > self.y {
            pieces.push(Rect::new(self.x, self.y, self.width, overlap.y - self.y));
        }
        if overlap.bottom() < self.bottom() {
            pieces.push(Rect::new(
                self.x,
                overlap.bottom(),
                self.width,
                self.bottom() - overlap.bottom(),
            ));
        }
        if overlap.x > self.x {
            pieces.push(Rect::new(self.x, overlap.y, overlap.x - self.x, overlap.height));
        }
        if overlap.right() < self.right() {
            pieces.push(Rect::new(
                overlap.right(),
                overlap.y,
                self.right() - overlap.right(),
                overlap.height,
            ));
        }
        pieces
    }

    pub fn translate(&self, dx: f64, dy: f64) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.width, self.height)
    }
}
