//! The pen state machine. Coordinates live on a mathematical plane
//! centered at the origin with y growing upward; heading 0 points up and
//! turns clockwise. Geometry is transformed into SVG space on emission.

use crate::svg::{Element, Margins, Rgb, Style, SvgDocument, CANVAS_SIZE};

#[derive(Debug)]
pub struct Turtle {
    x: f64,
    y: f64,
    heading: f64,
    pen_down: bool,
    stroke: Rgb,
    fill: Rgb,
    stroke_width: f64,
    stroke_opacity: f64,
    fill_opacity: f64,
    font_size: f64,
    doc: SvgDocument,
}

impl Turtle {
    pub fn new() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            heading: 0.0,
            pen_down: true,
            stroke: Rgb::BLACK,
            fill: Rgb::BLACK,
            stroke_width: 1.0,
            stroke_opacity: 1.0,
            fill_opacity: 0.0,
            font_size: 20.0,
            doc: SvgDocument::new(),
        }
    }

    fn tx(x: f64) -> f64 {
        x + CANVAS_SIZE / 2.0
    }

    fn ty(y: f64) -> f64 {
        CANVAS_SIZE / 2.0 - y
    }

    fn style(&self) -> Style {
        Style {
            stroke: self.stroke,
            stroke_width: self.stroke_width,
            stroke_opacity: self.stroke_opacity,
            fill: self.fill,
            fill_opacity: self.fill_opacity,
        }
    }

    pub fn position(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    pub fn heading(&self) -> f64 {
        self.heading
    }

    pub fn forward(&mut self, step: f64) {
        let radians = self.heading.to_radians();
        self.set_xy(
            self.x + step * radians.sin(),
            self.y + step * radians.cos(),
        );
    }

    pub fn back(&mut self, step: f64) {
        let radians = self.heading.to_radians();
        self.set_xy(
            self.x - step * radians.sin(),
            self.y - step * radians.cos(),
        );
    }

    pub fn turn_right(&mut self, degrees: f64) {
        self.heading += degrees;
    }

    pub fn turn_left(&mut self, degrees: f64) {
        self.heading -= degrees;
    }

    pub fn pen_up(&mut self) {
        self.pen_down = false;
    }

    pub fn pen_down(&mut self) {
        self.pen_down = true;
    }

    /// Return to the origin, drawing on the way if the pen is down.
    pub fn home(&mut self) {
        self.set_xy(0.0, 0.0);
        self.set_heading(0.0);
    }

    /// Re-home and discard everything drawn so far.
    pub fn clear_screen(&mut self) {
        self.x = 0.0;
        self.y = 0.0;
        self.heading = 0.0;
        self.doc.clear();
    }

    pub fn set_x(&mut self, x: f64) {
        self.set_xy(x, self.y);
    }

    pub fn set_y(&mut self, y: f64) {
        self.set_xy(self.x, y);
    }

    pub fn set_heading(&mut self, degrees: f64) {
        self.heading = degrees;
    }

    pub fn set_xy(&mut self, x: f64, y: f64) {
        if self.pen_down {
            self.doc.push(Element::Line {
                x1: Self::tx(self.x),
                y1: Self::ty(self.y),
                x2: Self::tx(x),
                y2: Self::ty(y),
                style: self.style(),
            });
        }
        self.x = x;
        self.y = y;
    }

    /// Place text at the current position, rotated with the heading.
    pub fn text(&mut self, content: &str) {
        self.doc.push(Element::Text {
            x: Self::tx(self.x),
            y: Self::ty(self.y),
            content: content.to_string(),
            font_size: self.font_size,
            angle: self.heading,
        });
    }

    pub fn circle(&mut self, r: f64) {
        self.doc.push(Element::Circle {
            cx: Self::tx(self.x),
            cy: Self::ty(self.y),
            r,
            style: self.style(),
        });
    }

    pub fn ellipse(&mut self, rx: f64, ry: f64) {
        self.doc.push(Element::Ellipse {
            cx: Self::tx(self.x),
            cy: Self::ty(self.y),
            rx,
            ry,
            style: self.style(),
        });
    }

    pub fn rect(&mut self, width: f64, height: f64, corner_radius: f64) {
        self.doc.push(Element::Rect {
            x: Self::tx(self.x),
            y: Self::ty(self.y),
            width,
            height,
            corner_radius,
            style: self.style(),
        });
    }

    /// Quadratic curve with control and end offsets relative to the
    /// current position (y offsets in turtle orientation).
    pub fn bezier(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
        self.doc.push(Element::Quadratic {
            x: Self::tx(self.x),
            y: Self::ty(self.y),
            control_dx: x1,
            control_dy: -y1,
            end_dx: x2,
            end_dy: -y2,
            style: self.style(),
        });
        self.x = x2;
        self.y = y2;
    }

    pub fn set_stroke_color(&mut self, color: Rgb) {
        self.stroke = color;
    }

    pub fn set_fill_color(&mut self, color: Rgb) {
        self.fill = color;
    }

    pub fn set_background(&mut self, color: Rgb) {
        self.doc.set_background(color);
    }

    pub fn set_stroke_width(&mut self, width: f64) {
        self.stroke_width = width;
    }

    pub fn set_stroke_opacity(&mut self, opacity: f64) {
        self.stroke_opacity = opacity;
    }

    pub fn set_fill_opacity(&mut self, opacity: f64) {
        self.fill_opacity = opacity;
    }

    pub fn set_font_size(&mut self, size: f64) {
        self.font_size = size;
    }

    pub fn to_svg(&self, margins: Option<Margins>) -> String {
        self.doc.to_xml(margins)
    }

    pub fn document(&self) -> &SvgDocument {
        &self.doc
    }
}

impl Default for Turtle {
    fn default() -> Self {
        Self::new()
    }
}
