//! SVG writer: ordered output elements serialized with the `svg` crate

use crate::charset::sanitize_attribute;
use crate::mapper::format_coord;
use crate::objects::HatchStyle;
use crate::types::{Point, Rect};
use svg::node::element::{
    ClipPath, Definitions, Ellipse as EllipseNode, Group, Image as ImageNode, Path as PathNode,
    Pattern, Polygon as PolygonNode, Rectangle, Text as TextNode,
};
use svg::node::Text as TextContent;
use svg::Document;

const DEFAULT_VIEWBOX: Rect = Rect {
    x: 0.0,
    y: 0.0,
    width: 800.0,
    height: 600.0,
};
const HATCH_SIZE: f64 = 8.0;

/// Stroke attributes resolved from a pen
#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    pub color: String,
    pub width: f64,
    pub dash: Option<Vec<f64>>,
    pub linecap: &'static str,
    pub linejoin: &'static str,
}

/// Fill resolved from a brush
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    None,
    Color(String),
    Hatch {
        hatch: HatchStyle,
        color: String,
        background: Option<String>,
    },
    Image {
        href: String,
        width: f64,
        height: f64,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    pub fill: Paint,
    pub stroke: Option<Stroke>,
    pub fill_rule: Option<&'static str>,
}

impl Style {
    pub fn stroke_only(stroke: Option<Stroke>) -> Self {
        Self {
            fill: Paint::None,
            stroke,
            fill_rule: None,
        }
    }

    pub fn fill_only(fill: Paint) -> Self {
        Self {
            fill,
            stroke: None,
            fill_rule: None,
        }
    }

    /// Nothing visible would be painted
    pub fn is_invisible(&self) -> bool {
        self.fill == Paint::None && self.stroke.is_none()
    }
}

/// A positioned run of text
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub x: f64,
    pub y: f64,
    /// Per-character x positions from an ExtTextOut dx array
    pub positions: Option<Vec<f64>>,
    pub text: String,
    pub font_family: String,
    pub font_size: f64,
    pub font_weight: Option<i16>,
    pub italic: bool,
    pub underline: bool,
    pub strike_out: bool,
    pub color: String,
    pub anchor: &'static str,
    pub baseline: Option<&'static str>,
    /// Clockwise rotation in degrees about (x, y)
    pub rotation: Option<f64>,
    pub letter_spacing: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GroupBoundary {
    Begin { clip: Vec<Rect> },
    End,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OutputElement {
    Path {
        d: String,
        style: Style,
    },
    Rect {
        rect: Rect,
        rx: f64,
        ry: f64,
        style: Style,
    },
    Ellipse {
        center: Point,
        rx: f64,
        ry: f64,
        style: Style,
    },
    Polygon {
        points: Vec<Point>,
        style: Style,
    },
    Text(TextRun),
    Image {
        rect: Rect,
        href: String,
    },
    GroupBoundary(GroupBoundary),
}

/// Element plus the index of the record that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct Emitted {
    pub element: OutputElement,
    pub record: usize,
}

/// Path data builder in absolute coordinates
#[derive(Debug, Default, Clone)]
pub struct PathData {
    d: String,
}

impl PathData {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, command: &str) {
        if !self.d.is_empty() {
            self.d.push(' ');
        }
        self.d.push_str(command);
    }

    pub fn move_to(&mut self, p: Point) -> &mut Self {
        self.push(&format!("M {} {}", format_coord(p.x), format_coord(p.y)));
        self
    }

    pub fn line_to(&mut self, p: Point) -> &mut Self {
        self.push(&format!("L {} {}", format_coord(p.x), format_coord(p.y)));
        self
    }

    pub fn arc_to(&mut self, rx: f64, ry: f64, large_arc: bool, sweep: bool, p: Point) -> &mut Self {
        self.push(&format!(
            "A {} {} 0 {} {} {} {}",
            format_coord(rx),
            format_coord(ry),
            large_arc as u8,
            sweep as u8,
            format_coord(p.x),
            format_coord(p.y)
        ));
        self
    }

    pub fn close(&mut self) -> &mut Self {
        self.push("Z");
        self
    }

    pub fn is_empty(&self) -> bool {
        self.d.is_empty()
    }

    pub fn finish(&self) -> String {
        self.d.clone()
    }
}

/// SVG writer for building SVG documents
pub struct SvgWriter {
    elements: Vec<Emitted>,
    element_ids: bool,
    min_x: f64,
    min_y: f64,
    max_x: f64,
    max_y: f64,
}

impl SvgWriter {
    pub fn new(element_ids: bool) -> Self {
        Self {
            elements: Vec::new(),
            element_ids,
            min_x: f64::MAX,
            min_y: f64::MAX,
            max_x: f64::MIN,
            max_y: f64::MIN,
        }
    }

    fn update_bounds(&mut self, x: f64, y: f64) {
        if x.is_finite() && y.is_finite() {
            self.min_x = self.min_x.min(x);
            self.min_y = self.min_y.min(y);
            self.max_x = self.max_x.max(x);
            self.max_y = self.max_y.max(y);
        }
    }

    fn update_rect(&mut self, rect: &Rect) {
        self.update_bounds(rect.x, rect.y);
        self.update_bounds(rect.right(), rect.bottom());
    }

    /// Append an element; paint order is append order.
    pub fn push(&mut self, element: OutputElement, record: usize) {
        match &element {
            OutputElement::Path { d, .. } => {
                for (x, y) in path_points(d) {
                    self.update_bounds(x, y);
                }
            }
            OutputElement::Rect { rect, .. } | OutputElement::Image { rect, .. } => {
                self.update_rect(rect)
            }
            OutputElement::Ellipse { center, rx, ry, .. } => {
                self.update_bounds(center.x - rx, center.y - ry);
                self.update_bounds(center.x + rx, center.y + ry);
            }
            OutputElement::Polygon { points, .. } => {
                for p in points {
                    self.update_bounds(p.x, p.y);
                }
            }
            OutputElement::Text(run) => self.update_bounds(run.x, run.y),
            OutputElement::GroupBoundary(_) => {}
        }
        self.elements.push(Emitted { element, record });
    }

    pub fn elements(&self) -> &[Emitted] {
        &self.elements
    }

    pub fn into_elements(self) -> Vec<Emitted> {
        self.elements
    }

    /// Bounds of everything drawn so far
    pub fn content_bounds(&self) -> Option<Rect> {
        if self.min_x <= self.max_x && self.min_y <= self.max_y {
            Some(Rect::new(
                self.min_x,
                self.min_y,
                self.max_x - self.min_x,
                self.max_y - self.min_y,
            ))
        } else {
            None
        }
    }

    /// Serialize the document.
    ///
    /// `view_box` falls back to the content bounds, then 800x600. `size`
    /// defaults to the view box dimensions.
    pub fn finish(&self, view_box: Option<Rect>, size: Option<(u32, u32)>) -> String {
        let view_box = view_box
            .filter(|r| !r.is_empty())
            .or_else(|| self.content_bounds().filter(|r| !r.is_empty()))
            .unwrap_or(DEFAULT_VIEWBOX);
        let (width, height) = size.unwrap_or((
            crate::header::normalize_dimension(view_box.width),
            crate::header::normalize_dimension(view_box.height),
        ));

        let mut defs = DefsBuilder::default();
        let mut stack: Vec<Group> = Vec::new();
        let mut top: Vec<Box<dyn svg::Node>> = Vec::new();

        for emitted in &self.elements {
            let node: Box<dyn svg::Node> = match &emitted.element {
                OutputElement::GroupBoundary(GroupBoundary::Begin { clip }) => {
                    let id = defs.clip_path(clip);
                    stack.push(Group::new().set("clip-path", format!("url(#{})", id)));
                    continue;
                }
                OutputElement::GroupBoundary(GroupBoundary::End) => match stack.pop() {
                    Some(group) => Box::new(group),
                    None => continue,
                },
                element => self.render(element, emitted.record, &mut defs),
            };
            match stack.pop() {
                Some(parent) => stack.push(parent.add(node)),
                None => top.push(node),
            }
        }
        // unbalanced groups are closed at the end
        while let Some(group) = stack.pop() {
            match stack.pop() {
                Some(parent) => stack.push(parent.add(group)),
                None => top.push(Box::new(group)),
            }
        }

        let mut document = Document::new()
            .set("width", width)
            .set("height", height)
            .set(
                "viewBox",
                format!(
                    "{} {} {} {}",
                    format_coord(view_box.x),
                    format_coord(view_box.y),
                    format_coord(view_box.width),
                    format_coord(view_box.height)
                ),
            )
            .set("preserveAspectRatio", "none");

        if let Some(definitions) = defs.finish() {
            document = document.add(definitions);
        }
        for node in top {
            document = document.add(node);
        }

        document.to_string()
    }

    fn render(&self, element: &OutputElement, record: usize, defs: &mut DefsBuilder) -> Box<dyn svg::Node> {
        let id = self.element_ids.then(|| format!("elem{}", record));
        match element {
            OutputElement::Path { d, style } => {
                let node = PathNode::new().set("d", d.as_str());
                Box::new(with_id(apply_style(node, style, defs), id))
            }
            OutputElement::Rect { rect, rx, ry, style } => {
                let mut node = Rectangle::new()
                    .set("x", format_coord(rect.x))
                    .set("y", format_coord(rect.y))
                    .set("width", format_coord(rect.width))
                    .set("height", format_coord(rect.height));
                if *rx > 0.0 || *ry > 0.0 {
                    node = node.set("rx", format_coord(*rx)).set("ry", format_coord(*ry));
                }
                Box::new(with_id(apply_style(node, style, defs), id))
            }
            OutputElement::Ellipse { center, rx, ry, style } => {
                let node = EllipseNode::new()
                    .set("cx", format_coord(center.x))
                    .set("cy", format_coord(center.y))
                    .set("rx", format_coord(*rx))
                    .set("ry", format_coord(*ry));
                Box::new(with_id(apply_style(node, style, defs), id))
            }
            OutputElement::Polygon { points, style } => {
                let node = PolygonNode::new().set("points", format_points(points));
                Box::new(with_id(apply_style(node, style, defs), id))
            }
            OutputElement::Text(run) => Box::new(with_id(render_text(run), id)),
            OutputElement::Image { rect, href } => {
                let node = ImageNode::new()
                    .set("x", format_coord(rect.x))
                    .set("y", format_coord(rect.y))
                    .set("width", format_coord(rect.width))
                    .set("height", format_coord(rect.height))
                    .set("preserveAspectRatio", "none")
                    .set("href", href.as_str());
                Box::new(with_id(node, id))
            }
            OutputElement::GroupBoundary(_) => Box::new(Group::new()),
        }
    }
}

trait Styled: svg::Node + Sized {
    fn attr(self, name: &str, value: String) -> Self;
}

macro_rules! styled {
    ($($node:ty),*) => {
        $(impl Styled for $node {
            fn attr(self, name: &str, value: String) -> Self {
                self.set(name, value)
            }
        })*
    };
}

styled!(PathNode, Rectangle, EllipseNode, PolygonNode, TextNode, ImageNode);

fn with_id<T: Styled>(node: T, id: Option<String>) -> T {
    match id {
        Some(id) => node.attr("id", id),
        None => node,
    }
}

fn apply_style<T: Styled>(mut node: T, style: &Style, defs: &mut DefsBuilder) -> T {
    let fill = match &style.fill {
        Paint::None => "none".to_string(),
        Paint::Color(color) => color.clone(),
        paint => format!("url(#{})", defs.pattern(paint)),
    };
    node = node.attr("fill", fill);
    if let Some(rule) = style.fill_rule {
        node = node.attr("fill-rule", rule.to_string());
    }

    match &style.stroke {
        Some(stroke) => {
            node = node
                .attr("stroke", stroke.color.clone())
                .attr("stroke-width", format_coord(stroke.width))
                .attr("stroke-linecap", stroke.linecap.to_string())
                .attr("stroke-linejoin", stroke.linejoin.to_string());
            if let Some(dash) = &stroke.dash {
                let pattern: Vec<String> = dash.iter().map(|v| format_coord(*v)).collect();
                node = node.attr("stroke-dasharray", pattern.join(" "));
            }
        }
        None => node = node.attr("stroke", "none".to_string()),
    }
    node
}

fn render_text(run: &TextRun) -> TextNode {
    let x = match &run.positions {
        Some(positions) if !positions.is_empty() => positions
            .iter()
            .map(|v| format_coord(*v))
            .collect::<Vec<_>>()
            .join(" "),
        _ => format_coord(run.x),
    };

    let mut family = sanitize_attribute(&run.font_family);
    if family.is_empty() {
        family = "serif".to_string();
    }

    let mut node = TextNode::new()
        .set("x", x)
        .set("y", format_coord(run.y))
        .set("font-family", family)
        .set("font-size", format_coord(run.font_size))
        .set("fill", run.color.as_str())
        .set("xml:space", "preserve");

    if let Some(weight) = run.font_weight {
        node = node.set("font-weight", weight.to_string());
    }
    if run.italic {
        node = node.set("font-style", "italic");
    }
    let decoration = match (run.underline, run.strike_out) {
        (true, true) => Some("underline line-through"),
        (true, false) => Some("underline"),
        (false, true) => Some("line-through"),
        (false, false) => None,
    };
    if let Some(decoration) = decoration {
        node = node.set("text-decoration", decoration);
    }
    if run.anchor != "start" {
        node = node.set("text-anchor", run.anchor);
    }
    if let Some(baseline) = run.baseline {
        node = node.set("dominant-baseline", baseline);
    }
    if let Some(spacing) = run.letter_spacing {
        node = node.set("letter-spacing", format_coord(spacing));
    }
    if let Some(angle) = run.rotation {
        node = node.set(
            "transform",
            format!(
                "rotate({} {} {})",
                format_coord(angle),
                format_coord(run.x),
                format_coord(run.y)
            ),
        );
    }

    node.add(TextContent::new(run.text.as_str()))
}

fn format_points(points: &[Point]) -> String {
    points
        .iter()
        .map(|p| format!("{},{}", format_coord(p.x), format_coord(p.y)))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Coordinates of every M/L/A endpoint in an absolute path string
fn path_points(d: &str) -> Vec<(f64, f64)> {
    let parts: Vec<&str> = d.split_whitespace().collect();
    let mut coords = Vec::new();
    let mut i = 0;
    while i < parts.len() {
        let (skip, arity) = match parts[i] {
            "M" | "L" => (0, 2),
            "A" => (5, 7),
            _ => {
                i += 1;
                continue;
            }
        };
        if i + arity < parts.len() {
            if let (Ok(x), Ok(y)) = (
                parts[i + skip + 1].parse::<f64>(),
                parts[i + skip + 2].parse::<f64>(),
            ) {
                coords.push((x, y));
            }
        }
        i += arity + 1;
    }
    coords
}

/// Deduplicated `<defs>` content: clip paths and fill patterns
#[derive(Default)]
struct DefsBuilder {
    clips: Vec<(String, ClipPath)>,
    patterns: Vec<(String, Pattern)>,
    pattern_keys: Vec<String>,
}

impl DefsBuilder {
    fn clip_path(&mut self, rects: &[Rect]) -> String {
        let id = format!("clip{}", self.clips.len() + 1);
        let mut clip = ClipPath::new().set("id", id.as_str());
        for rect in rects {
            clip = clip.add(
                Rectangle::new()
                    .set("x", format_coord(rect.x))
                    .set("y", format_coord(rect.y))
                    .set("width", format_coord(rect.width))
                    .set("height", format_coord(rect.height)),
            );
        }
        self.clips.push((id.clone(), clip));
        id
    }

    fn pattern(&mut self, paint: &Paint) -> String {
        let key = format!("{:?}", paint);
        if let Some(index) = self.pattern_keys.iter().position(|k| *k == key) {
            return self.patterns[index].0.clone();
        }

        let id = format!("pattern{}", self.patterns.len() + 1);
        let pattern = match paint {
            Paint::Hatch {
                hatch,
                color,
                background,
            } => hatch_pattern(&id, *hatch, color, background.as_deref()),
            Paint::Image {
                href,
                width,
                height,
            } => Pattern::new()
                .set("id", id.as_str())
                .set("patternUnits", "userSpaceOnUse")
                .set("width", format_coord(*width))
                .set("height", format_coord(*height))
                .add(
                    ImageNode::new()
                        .set("width", format_coord(*width))
                        .set("height", format_coord(*height))
                        .set("href", href.as_str()),
                ),
            Paint::None | Paint::Color(_) => Pattern::new().set("id", id.as_str()),
        };
        self.pattern_keys.push(key);
        self.patterns.push((id.clone(), pattern));
        id
    }

    fn finish(self) -> Option<Definitions> {
        if self.clips.is_empty() && self.patterns.is_empty() {
            return None;
        }
        let mut defs = Definitions::new();
        for (_, clip) in self.clips {
            defs = defs.add(clip);
        }
        for (_, pattern) in self.patterns {
            defs = defs.add(pattern);
        }
        Some(defs)
    }
}

fn hatch_pattern(id: &str, hatch: HatchStyle, color: &str, background: Option<&str>) -> Pattern {
    let s = HATCH_SIZE;
    let half = s / 2.0;
    let lines: Vec<(f64, f64, f64, f64)> = match hatch {
        HatchStyle::Horizontal => vec![(0.0, half, s, half)],
        HatchStyle::Vertical => vec![(half, 0.0, half, s)],
        HatchStyle::ForwardDiagonal => vec![(0.0, 0.0, s, s)],
        HatchStyle::BackwardDiagonal => vec![(0.0, s, s, 0.0)],
        HatchStyle::Cross => vec![(0.0, half, s, half), (half, 0.0, half, s)],
        HatchStyle::DiagonalCross => vec![(0.0, 0.0, s, s), (0.0, s, s, 0.0)],
    };

    let mut pattern = Pattern::new()
        .set("id", id)
        .set("patternUnits", "userSpaceOnUse")
        .set("width", format_coord(s))
        .set("height", format_coord(s));
    if let Some(background) = background {
        pattern = pattern.add(
            Rectangle::new()
                .set("width", format_coord(s))
                .set("height", format_coord(s))
                .set("fill", background),
        );
    }
    let mut d = PathData::new();
    for (x1, y1, x2, y2) in lines {
        d.move_to(Point::new(x1, y1)).line_to(Point::new(x2, y2));
    }
    pattern.add(
        PathNode::new()
            .set("d", d.finish())
            .set("stroke", color)
            .set("stroke-width", "1")
            .set("fill", "none"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(color: &str) -> Style {
        Style::fill_only(Paint::Color(color.to_string()))
    }

    fn parse(svg: &str) -> roxmltree::Document<'_> {
        roxmltree::Document::parse(svg).expect("well-formed SVG")
    }

    #[test]
    fn test_path_data() {
        let mut d = PathData::new();
        d.move_to(Point::new(0.125, 1.0))
            .line_to(Point::new(10.0, -2.5))
            .arc_to(5.0, 5.0, true, false, Point::new(3.0, 4.0))
            .close();
        assert_eq!(d.finish(), "M 0.12 1 L 10 -2.5 A 5 5 0 1 0 3 4 Z");
        assert_eq!(
            path_points(&d.finish()),
            vec![(0.12, 1.0), (10.0, -2.5), (3.0, 4.0)]
        );
    }

    #[test]
    fn test_empty_document() {
        let writer = SvgWriter::new(false);
        let svg = writer.finish(None, None);
        let doc = parse(&svg);
        let root = doc.root_element();
        assert_eq!(root.tag_name().name(), "svg");
        assert_eq!(root.attribute("viewBox"), Some("0 0 800 600"));
        assert_eq!(root.children().filter(|n| n.is_element()).count(), 0);
    }

    #[test]
    fn test_paint_order_and_bounds() {
        let mut writer = SvgWriter::new(true);
        writer.push(
            OutputElement::Rect {
                rect: Rect::new(10.0, 10.0, 20.0, 20.0),
                rx: 0.0,
                ry: 0.0,
                style: solid("#ff0000"),
            },
            3,
        );
        writer.push(
            OutputElement::Ellipse {
                center: Point::new(50.0, 50.0),
                rx: 10.0,
                ry: 5.0,
                style: solid("#00ff00"),
            },
            4,
        );
        assert_eq!(
            writer.content_bounds(),
            Some(Rect::new(10.0, 10.0, 50.0, 45.0))
        );

        let svg = writer.finish(None, None);
        let doc = parse(&svg);
        let names: Vec<_> = doc
            .root_element()
            .children()
            .filter(|n| n.is_element())
            .map(|n| (n.tag_name().name().to_string(), n.attribute("id").map(String::from)))
            .collect();
        assert_eq!(
            names,
            vec![
                ("rect".to_string(), Some("elem3".to_string())),
                ("ellipse".to_string(), Some("elem4".to_string())),
            ]
        );
    }

    #[test]
    fn test_clip_groups_nest_elements() {
        let mut writer = SvgWriter::new(false);
        writer.push(
            OutputElement::GroupBoundary(GroupBoundary::Begin {
                clip: vec![Rect::new(0.0, 0.0, 5.0, 5.0)],
            }),
            0,
        );
        writer.push(
            OutputElement::Path {
                d: "M 0 0 L 10 10".to_string(),
                style: Style::stroke_only(None),
            },
            1,
        );
        // left open on purpose: finish closes it
        let svg = writer.finish(None, Some((10, 10)));
        let doc = parse(&svg);
        let group = doc
            .descendants()
            .find(|n| n.tag_name().name() == "g")
            .unwrap();
        assert_eq!(group.attribute("clip-path"), Some("url(#clip1)"));
        assert_eq!(
            group.children().filter(|n| n.is_element()).count(),
            1
        );
        assert!(doc
            .descendants()
            .any(|n| n.tag_name().name() == "clipPath" && n.attribute("id") == Some("clip1")));
    }

    #[test]
    fn test_hatch_patterns_deduplicated() {
        let mut writer = SvgWriter::new(false);
        let hatch = Paint::Hatch {
            hatch: HatchStyle::Cross,
            color: "#000000".to_string(),
            background: None,
        };
        for i in 0..2 {
            writer.push(
                OutputElement::Rect {
                    rect: Rect::new(0.0, 0.0, 4.0, 4.0),
                    rx: 0.0,
                    ry: 0.0,
                    style: Style::fill_only(hatch.clone()),
                },
                i,
            );
        }
        let svg = writer.finish(None, None);
        let doc = parse(&svg);
        let patterns = doc
            .descendants()
            .filter(|n| n.tag_name().name() == "pattern")
            .count();
        assert_eq!(patterns, 1);
        assert!(doc
            .descendants()
            .filter(|n| n.tag_name().name() == "rect" && n.attribute("fill") == Some("url(#pattern1)"))
            .count()
            == 2);
    }

    #[test]
    fn test_text_run_attributes() {
        let mut writer = SvgWriter::new(false);
        writer.push(
            OutputElement::Text(TextRun {
                x: 10.0,
                y: 20.0,
                positions: Some(vec![10.0, 15.5]),
                text: "ab".to_string(),
                font_family: "\"Arial\", sans-serif".to_string(),
                font_size: 12.0,
                font_weight: Some(700),
                italic: true,
                underline: true,
                strike_out: false,
                color: "#112233".to_string(),
                anchor: "middle",
                baseline: None,
                rotation: Some(-45.0),
                letter_spacing: None,
            }),
            0,
        );
        let svg = writer.finish(None, None);
        let doc = parse(&svg);
        let text = doc
            .descendants()
            .find(|n| n.tag_name().name() == "text")
            .unwrap();
        assert_eq!(text.attribute("x"), Some("10 15.5"));
        assert_eq!(text.attribute("font-family"), Some("Arial, sans-serif"));
        assert_eq!(text.attribute("font-weight"), Some("700"));
        assert_eq!(text.attribute("text-anchor"), Some("middle"));
        assert_eq!(text.attribute("transform"), Some("rotate(-45 10 20)"));
        assert_eq!(text.text().map(str::trim), Some("ab"));
    }

    #[test]
    fn test_view_box_and_size() {
        let writer = SvgWriter::new(false);
        let svg = writer.finish(Some(Rect::new(-5.0, 0.0, 100.5, 50.0)), Some((200, 100)));
        let doc = parse(&svg);
        let root = doc.root_element();
        assert_eq!(root.attribute("viewBox"), Some("-5 0 100.5 50"));
        assert_eq!(root.attribute("width"), Some("200"));
        assert_eq!(root.attribute("height"), Some("100"));
    }
}
