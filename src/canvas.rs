//! Binds the drawing command set to an interpreter. Each command
//! validates its already-evaluated arguments and forwards to the shared
//! turtle; validation failures travel back through the command-error
//! channel and are reported as recoverable faults.

use std::cell::RefCell;
use std::rc::Rc;

use crate::interpreter::{CommandError, Interpreter, RegistryError};
use crate::svg::{Margins, Rgb};
use crate::turtle::Turtle;
use crate::value::Value;

pub struct Canvas {
    turtle: Rc<RefCell<Turtle>>,
}

impl Canvas {
    pub fn new() -> Self {
        Self {
            turtle: Rc::new(RefCell::new(Turtle::new())),
        }
    }

    pub fn to_svg(&self, margins: Option<Margins>) -> String {
        self.turtle.borrow().to_svg(margins)
    }

    fn with_turtle<F>(&self, body: F) -> impl 'static + Fn(&[Value]) -> Result<(), CommandError>
    where
        F: Fn(&mut Turtle, &[Value]) -> Result<(), CommandError> + 'static,
    {
        let turtle = Rc::clone(&self.turtle);
        move |args: &[Value]| body(&mut turtle.borrow_mut(), args)
    }

    /// Register the full drawing command set on an interpreter.
    pub fn install(&self, interpreter: &mut Interpreter) -> Result<(), RegistryError> {
        interpreter.register(
            "fd",
            1,
            self.with_turtle(|turtle, args| {
                turtle.forward(finite(args, 0, "invalid number")?);
                Ok(())
            }),
        )?;
        interpreter.register(
            "bk",
            1,
            self.with_turtle(|turtle, args| {
                turtle.back(finite(args, 0, "invalid number")?);
                Ok(())
            }),
        )?;
        interpreter.register(
            "rt",
            1,
            self.with_turtle(|turtle, args| {
                turtle.turn_right(finite(args, 0, "invalid number for degree")?);
                Ok(())
            }),
        )?;
        interpreter.register(
            "lt",
            1,
            self.with_turtle(|turtle, args| {
                turtle.turn_left(finite(args, 0, "invalid number for degree")?);
                Ok(())
            }),
        )?;
        interpreter.register(
            "pu",
            0,
            self.with_turtle(|turtle, _| {
                turtle.pen_up();
                Ok(())
            }),
        )?;
        interpreter.register(
            "pd",
            0,
            self.with_turtle(|turtle, _| {
                turtle.pen_down();
                Ok(())
            }),
        )?;
        interpreter.register(
            "home",
            0,
            self.with_turtle(|turtle, _| {
                turtle.home();
                Ok(())
            }),
        )?;
        interpreter.register(
            "cs",
            0,
            self.with_turtle(|turtle, _| {
                turtle.clear_screen();
                Ok(())
            }),
        )?;
        interpreter.register(
            "setx",
            1,
            self.with_turtle(|turtle, args| {
                turtle.set_x(finite(args, 0, "invalid number for X")?);
                Ok(())
            }),
        )?;
        interpreter.register(
            "sety",
            1,
            self.with_turtle(|turtle, args| {
                turtle.set_y(finite(args, 0, "invalid number for Y")?);
                Ok(())
            }),
        )?;
        interpreter.register(
            "setxy",
            2,
            self.with_turtle(|turtle, args| {
                let x = finite(args, 0, "invalid number for X")?;
                let y = finite(args, 1, "invalid number for Y")?;
                turtle.set_xy(x, y);
                Ok(())
            }),
        )?;
        interpreter.register(
            "seth",
            1,
            self.with_turtle(|turtle, args| {
                turtle.set_heading(finite(args, 0, "invalid degree for H")?);
                Ok(())
            }),
        )?;
        interpreter.register(
            "print",
            1,
            self.with_turtle(|turtle, args| {
                let text = match &args[0] {
                    Value::Double { value, .. } => format_number(*value),
                    Value::Text { value, .. } => value.clone(),
                };
                turtle.text(&text);
                Ok(())
            }),
        )?;
        interpreter.register(
            "circle",
            1,
            self.with_turtle(|turtle, args| {
                let radius = finite(args, 0, "invalid number for radius")?;
                if radius < 0.0 {
                    return Err(CommandError::new("invalid number for radius"));
                }
                turtle.circle(radius);
                Ok(())
            }),
        )?;
        interpreter.register(
            "ellipse",
            2,
            self.with_turtle(|turtle, args| {
                let rx = finite(args, 0, "invalid number for major axis")?;
                let ry = finite(args, 1, "invalid number for minor axis")?;
                if rx < 0.0 {
                    return Err(CommandError::new("invalid number for major axis"));
                }
                if ry < 0.0 {
                    return Err(CommandError::new("invalid number for minor axis"));
                }
                turtle.ellipse(rx, ry);
                Ok(())
            }),
        )?;
        interpreter.register(
            "rect",
            3,
            self.with_turtle(|turtle, args| {
                let width = finite(args, 0, "invalid number for width")?;
                let height = finite(args, 1, "invalid number for height")?;
                let radius = finite(args, 2, "invalid number for corner radius")?;
                if width < 0.0 {
                    return Err(CommandError::new("invalid number for width"));
                }
                if height < 0.0 {
                    return Err(CommandError::new("invalid number for height"));
                }
                if radius < 0.0 {
                    return Err(CommandError::new("invalid number for corner radius"));
                }
                if radius * 2.0 > width.min(height) {
                    return Err(CommandError::new("corner radius too large"));
                }
                turtle.rect(width, height, radius);
                Ok(())
            }),
        )?;
        interpreter.register(
            "bezier",
            4,
            self.with_turtle(|turtle, args| {
                const NAMES: [&str; 4] =
                    ["middle point X", "middle point Y", "end point X", "end point Y"];
                let mut points = [0.0f64; 4];
                for (i, point) in points.iter_mut().enumerate() {
                    *point = match args[i].as_double() {
                        Some(value) => value,
                        None => {
                            return Err(CommandError::new(format!(
                                "invalid {} value",
                                NAMES[i]
                            )));
                        }
                    };
                }
                turtle.bezier(points[0], points[1], points[2], points[3]);
                Ok(())
            }),
        )?;
        interpreter.register(
            "color",
            3,
            self.with_turtle(|turtle, args| {
                turtle.set_stroke_color(rgb(args)?);
                Ok(())
            }),
        )?;
        interpreter.register(
            "fill",
            3,
            self.with_turtle(|turtle, args| {
                turtle.set_fill_color(rgb(args)?);
                Ok(())
            }),
        )?;
        interpreter.register(
            "background",
            3,
            self.with_turtle(|turtle, args| {
                turtle.set_background(rgb(args)?);
                Ok(())
            }),
        )?;
        interpreter.register(
            "stroke",
            1,
            self.with_turtle(|turtle, args| {
                let width = finite(args, 0, "invalid width for stroke")?;
                if !(1.0..=20.0).contains(&width) {
                    return Err(CommandError::new("stroke should range from 1 to 20"));
                }
                turtle.set_stroke_width(width);
                Ok(())
            }),
        )?;
        interpreter.register(
            "fontsize",
            1,
            self.with_turtle(|turtle, args| {
                let size = finite(args, 0, "invalid font size")?;
                if !(1.0..=72.0).contains(&size) {
                    return Err(CommandError::new("font size should range from 1 to 72"));
                }
                turtle.set_font_size(size.round());
                Ok(())
            }),
        )?;
        interpreter.register(
            "fillopacity",
            1,
            self.with_turtle(|turtle, args| {
                let opacity = finite(args, 0, "invalid opacity value")?;
                if !(0.0..=1.0).contains(&opacity) {
                    return Err(CommandError::new("opacity should range from 0 to 1"));
                }
                turtle.set_fill_opacity(opacity);
                Ok(())
            }),
        )?;
        interpreter.register(
            "opacity",
            1,
            self.with_turtle(|turtle, args| {
                let opacity = finite(args, 0, "invalid opacity value")?;
                if !(0.0..=1.0).contains(&opacity) {
                    return Err(CommandError::new("opacity should range from 0 to 1"));
                }
                turtle.set_stroke_opacity(opacity);
                Ok(())
            }),
        )?;
        Ok(())
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new()
    }
}

fn finite(args: &[Value], index: usize, message: &str) -> Result<f64, CommandError> {
    match args[index].as_double() {
        Some(value) if value.is_finite() => Ok(value),
        _ => Err(CommandError::new(message)),
    }
}

fn rgb(args: &[Value]) -> Result<Rgb, CommandError> {
    const NAMES: [char; 3] = ['R', 'G', 'B'];
    let mut parts = [0u8; 3];
    for (i, part) in parts.iter_mut().enumerate() {
        let value = match args[i].as_double() {
            Some(value) => value,
            None => {
                return Err(CommandError::new(format!(
                    "invalid {} value for RGB",
                    NAMES[i]
                )));
            }
        };
        if !(0.0..=255.0).contains(&value) {
            return Err(CommandError::new(format!(
                "{} should range from 0 to 255 in RGB",
                NAMES[i]
            )));
        }
        *part = value.round() as u8;
    }
    Ok(Rgb {
        r: parts[0],
        g: parts[1],
        b: parts[2],
    })
}

/// Numbers print truncated to four decimals, trailing zeros stripped.
fn format_number(value: f64) -> String {
    let truncated = (value * 10000.0).trunc() / 10000.0;
    let formatted = format!("{:.4}", truncated);
    formatted
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(10.0), "10");
        assert_eq!(format_number(3.14159), "3.1415");
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(format_number(0.0), "0");
    }

    #[test]
    fn test_rgb_validation() {
        let ok = rgb(&[
            Value::double("arg0", 10.0),
            Value::double("arg1", 20.0),
            Value::double("arg2", 255.0),
        ])
        .expect("valid rgb");
        assert_eq!(ok, Rgb { r: 10, g: 20, b: 255 });

        let err = rgb(&[
            Value::double("arg0", 300.0),
            Value::double("arg1", 0.0),
            Value::double("arg2", 0.0),
        ])
        .expect_err("out of range");
        assert_eq!(err.message, "R should range from 0 to 255 in RGB");

        let err = rgb(&[
            Value::text("arg0", "red"),
            Value::double("arg1", 0.0),
            Value::double("arg2", 0.0),
        ])
        .expect_err("wrong type");
        assert_eq!(err.message, "invalid R value for RGB");
    }

    #[test]
    fn test_finite_rejects_text() {
        assert!(finite(&[Value::text("arg0", "x")], 0, "invalid number").is_err());
    }
}
