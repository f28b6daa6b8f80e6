//! Drawing surfaces the card renderers paint on.
//!
//! Renderers only ever talk to the [`Surface`] trait, in logical card units. The production
//! surface rasterizes with cairo; [`RecordingSurface`] keeps a display list instead.

mod cairo_surface;
mod record;

pub use self::cairo_surface::CairoSurface;
pub use self::record::{DrawOp, RecordingSurface};

use crate::error::Result;
use crate::image::{Color, Picture, SampleRect};

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    pub const fn square(size: f64) -> Self {
        Self::new(0.0, 0.0, size, size)
    }

    /// Shrinks the rectangle by `d` on every side (grows it for negative `d`).
    pub fn inset(&self, d: f64) -> Self {
        Self::new(self.x + d, self.y + d, self.w - 2.0 * d, self.h - 2.0 * d)
    }

    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
}

/// Which part of the text box sits on the anchor's `y`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Baseline {
    Top,
    Middle,
}

/// A blurred copy of the text drawn underneath it, like a canvas `shadowBlur`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Shadow {
    pub blur: f64,
    pub color: Color,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle<'a> {
    pub family: &'a str,
    pub size: f64,
    pub bold: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextRun<'a> {
    pub text: &'a str,
    pub style: TextStyle<'a>,
    pub color: Color,
    pub anchor: Point,
    pub align: Align,
    pub baseline: Baseline,
    /// Wraps onto several lines at this width.
    pub wrap: Option<f64>,
    pub shadow: Option<Shadow>,
}

impl<'a> TextRun<'a> {
    /// A single centered line, vertically centered on `anchor`.
    pub fn centered(text: &'a str, style: TextStyle<'a>, color: Color, anchor: Point) -> Self {
        Self {
            text,
            style,
            color,
            anchor,
            align: Align::Center,
            baseline: Baseline::Middle,
            wrap: None,
            shadow: None,
        }
    }
}

/// Primitives needed to draw a card face. Coordinates are logical card units; the surface
/// maps them to device pixels. Drawing order is significant: later calls cover earlier ones.
pub trait Surface {
    /// Logical edge length of the square canvas.
    fn size(&self) -> f64;

    fn save(&mut self) -> Result<()>;
    fn restore(&mut self) -> Result<()>;

    /// Intersects the current clip with a rounded rectangle.
    fn clip_rounded_rect(&mut self, rect: Rect, radius: f64) -> Result<()>;

    fn fill_rect(&mut self, rect: Rect, color: Color) -> Result<()>;
    fn fill_rounded_rect(&mut self, rect: Rect, radius: f64, color: Color) -> Result<()>;
    fn stroke_rounded_rect(&mut self, rect: Rect, radius: f64, width: f64, color: Color)
        -> Result<()>;

    fn fill_circle(&mut self, center: Point, radius: f64, color: Color) -> Result<()>;
    fn stroke_circle(&mut self, center: Point, radius: f64, width: f64, color: Color)
        -> Result<()>;

    /// Scales the `src` region of `picture` into `dst`.
    fn draw_picture(&mut self, picture: &Picture, src: SampleRect, dst: Rect) -> Result<()>;

    /// Width of `text` laid out on a single line.
    fn measure_text(&mut self, text: &str, style: TextStyle) -> Result<f64>;

    fn fill_text(&mut self, run: &TextRun) -> Result<()>;
}

/// Largest size not above `size` (and not below `min`) at which `text` fits in `max_width`.
pub fn fit_text_size<S: Surface + ?Sized>(
    surface: &mut S,
    text: &str,
    style: TextStyle,
    max_width: f64,
    min: f64,
) -> Result<f64> {
    let mut size = style.size;
    while size > min {
        let width = surface.measure_text(text, TextStyle { size, ..style })?;
        if width <= max_width {
            break;
        }
        size = (size - 1.0).max(min);
    }
    Ok(size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_helpers() {
        let r = Rect::new(10.0, 20.0, 100.0, 50.0);
        assert_eq!(r.inset(5.0), Rect::new(15.0, 25.0, 90.0, 40.0));
        assert_eq!(r.inset(-4.0), Rect::new(6.0, 16.0, 108.0, 58.0));
        assert_eq!(r.center(), Point::new(60.0, 45.0));
        assert_eq!((r.right(), r.bottom()), (110.0, 70.0));
    }

    #[test]
    fn long_text_shrinks_down_to_the_minimum() {
        let mut surface = RecordingSurface::new(360.0);
        let style = TextStyle { family: "Sans", size: 32.0, bold: true };
        let short = fit_text_size(&mut surface, "Jo", style, 320.0, 18.0).unwrap();
        assert_eq!(short, 32.0);
        let long = "Great-Great-Grandmother Wilhelmina";
        let shrunk = fit_text_size(&mut surface, long, style, 320.0, 18.0).unwrap();
        assert!(shrunk < 32.0 && shrunk >= 18.0);
        let huge = "x".repeat(500);
        assert_eq!(fit_text_size(&mut surface, &huge, style, 320.0, 18.0).unwrap(), 18.0);
    }
}
