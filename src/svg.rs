//! The drawing model: an ordered list of styled SVG elements with a
//! bounding-box tracker, serialized to XML on demand.

use std::fmt;

pub const CANVAS_SIZE: f64 = 1000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };
    pub const WHITE: Rgb = Rgb {
        r: 255,
        g: 255,
        b: 255,
    };
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({},{},{})", self.r, self.g, self.b)
    }
}

/// Per-side margins applied around the drawn bounds, CSS-style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Margins {
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
    pub left: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    pub stroke: Rgb,
    pub stroke_width: f64,
    pub stroke_opacity: f64,
    pub fill: Rgb,
    pub fill_opacity: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        style: Style,
    },
    Circle {
        cx: f64,
        cy: f64,
        r: f64,
        style: Style,
    },
    Ellipse {
        cx: f64,
        cy: f64,
        rx: f64,
        ry: f64,
        style: Style,
    },
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        corner_radius: f64,
        style: Style,
    },
    Text {
        x: f64,
        y: f64,
        content: String,
        font_size: f64,
        angle: f64,
    },
    /// A quadratic curve; control and end offsets are relative to the
    /// start point.
    Quadratic {
        x: f64,
        y: f64,
        control_dx: f64,
        control_dy: f64,
        end_dx: f64,
        end_dy: f64,
        style: Style,
    },
}

#[derive(Debug, Clone, Copy)]
struct Bounds {
    min_x: f64,
    min_y: f64,
    max_x: f64,
    max_y: f64,
}

impl Bounds {
    fn cover(&mut self, x: f64, y: f64) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }
}

#[derive(Debug)]
pub struct SvgDocument {
    elements: Vec<Element>,
    background: Rgb,
    bounds: Option<Bounds>,
}

impl Default for SvgDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl SvgDocument {
    pub fn new() -> Self {
        Self {
            elements: Vec::new(),
            background: Rgb::WHITE,
            bounds: None,
        }
    }

    pub fn clear(&mut self) {
        self.elements.clear();
        self.bounds = None;
    }

    pub fn set_background(&mut self, color: Rgb) {
        self.background = color;
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn push(&mut self, element: Element) {
        for (x, y) in element_extent(&element) {
            match &mut self.bounds {
                Some(bounds) => bounds.cover(x, y),
                None => {
                    self.bounds = Some(Bounds {
                        min_x: x,
                        min_y: y,
                        max_x: x,
                        max_y: y,
                    });
                }
            }
        }
        self.elements.push(element);
    }

    /// Serialize. Without margins the canvas is a fixed 1000×1000 square;
    /// with margins the viewBox is fitted to the drawn bounds expanded by
    /// the per-side margins.
    pub fn to_xml(&self, margins: Option<Margins>) -> String {
        let (x, y, width, height) = match (margins, self.bounds) {
            (Some(m), Some(b)) => (
                b.min_x - f64::from(m.left),
                b.min_y - f64::from(m.top),
                (b.max_x - b.min_x) + f64::from(m.left) + f64::from(m.right),
                (b.max_y - b.min_y) + f64::from(m.top) + f64::from(m.bottom),
            ),
            _ => (0.0, 0.0, CANVAS_SIZE, CANVAS_SIZE),
        };

        let mut xml = String::new();
        xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        xml.push_str(&format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{}\" height=\"{}\" viewBox=\"{} {} {} {}\">\n",
            width, height, x, y, width, height
        ));
        xml.push_str(&format!(
            "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\" fill-opacity=\"1\"/>\n",
            x, y, width, height, self.background
        ));
        for element in &self.elements {
            xml.push_str("  ");
            xml.push_str(&element_xml(element));
            xml.push('\n');
        }
        xml.push_str("</svg>\n");
        xml
    }
}

/// Points covered by an element, for bounds tracking.
fn element_extent(element: &Element) -> Vec<(f64, f64)> {
    match element {
        Element::Line { x1, y1, x2, y2, .. } => vec![(*x1, *y1), (*x2, *y2)],
        Element::Circle { cx, cy, r, .. } => {
            vec![(cx + r, cy + r), (cx - r, cy - r)]
        }
        Element::Ellipse { cx, cy, rx, ry, .. } => {
            vec![(cx + rx, cy + ry), (cx - rx, cy - ry)]
        }
        Element::Rect {
            x, y, width, height, ..
        } => vec![(*x, *y), (x + width, y + height)],
        Element::Text {
            x,
            y,
            content,
            font_size,
            angle,
        } => {
            let (sin, cos) = (angle.to_radians().sin(), angle.to_radians().cos());
            let length = content.chars().count() as f64 * 0.6 * font_size;
            let height = 0.75 * font_size;
            vec![
                (*x, *y),
                (x + cos * length, y + sin * length),
                (x - sin * height, y + cos * height),
                (x + cos * length - sin * height, y + sin * length + cos * height),
            ]
        }
        Element::Quadratic {
            x,
            y,
            control_dx,
            control_dy,
            end_dx,
            end_dy,
            ..
        } => vec![
            (*x, *y),
            (x + control_dx, y + control_dy),
            (x + end_dx, y + end_dy),
        ],
    }
}

fn stroke_attrs(style: &Style) -> String {
    format!(
        "stroke=\"{}\" stroke-width=\"{}\" stroke-opacity=\"{}\"",
        style.stroke, style.stroke_width, style.stroke_opacity
    )
}

fn fill_attrs(style: &Style) -> String {
    format!(
        "fill=\"{}\" fill-opacity=\"{}\"",
        style.fill, style.fill_opacity
    )
}

fn element_xml(element: &Element) -> String {
    match element {
        Element::Line {
            x1,
            y1,
            x2,
            y2,
            style,
        } => format!(
            "<line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" {} stroke-linecap=\"round\"/>",
            x1,
            y1,
            x2,
            y2,
            stroke_attrs(style)
        ),
        Element::Circle { cx, cy, r, style } => format!(
            "<circle cx=\"{}\" cy=\"{}\" r=\"{}\" {} {}/>",
            cx,
            cy,
            r,
            fill_attrs(style),
            stroke_attrs(style)
        ),
        Element::Ellipse {
            cx,
            cy,
            rx,
            ry,
            style,
        } => format!(
            "<ellipse cx=\"{}\" cy=\"{}\" rx=\"{}\" ry=\"{}\" {} {}/>",
            cx,
            cy,
            rx,
            ry,
            fill_attrs(style),
            stroke_attrs(style)
        ),
        Element::Rect {
            x,
            y,
            width,
            height,
            corner_radius,
            style,
        } => format!(
            "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" rx=\"{}\" ry=\"{}\" {} {}/>",
            x,
            y,
            width,
            height,
            corner_radius,
            corner_radius,
            fill_attrs(style),
            stroke_attrs(style)
        ),
        Element::Text {
            x,
            y,
            content,
            font_size,
            angle,
        } => format!(
            "<text x=\"{}\" y=\"{}\" font-family=\"Courier New\" font-size=\"{}\" transform=\"rotate({},{},{})\">{}</text>",
            x,
            y,
            font_size,
            angle,
            x,
            y,
            escape_xml(content)
        ),
        Element::Quadratic {
            x,
            y,
            control_dx,
            control_dy,
            end_dx,
            end_dy,
            style,
        } => format!(
            "<path d=\"M {} {} q {} {} {} {}\" {} {}/>",
            x,
            y,
            control_dx,
            control_dy,
            end_dx,
            end_dy,
            fill_attrs(style),
            stroke_attrs(style)
        ),
    }
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
