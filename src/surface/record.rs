//! A surface that records draw calls instead of rasterizing them.

use crate::error::Result;
use crate::image::{Color, Picture, SampleRect};
use crate::surface::{Point, Rect, Shadow, Surface, TextRun, TextStyle};

/// Average advance of a glyph, relative to the font size, used to fake text metrics.
const GLYPH_ADVANCE: f64 = 0.55;

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Save,
    Restore,
    ClipRoundedRect { rect: Rect, radius: f64 },
    FillRect { rect: Rect, color: Color },
    FillRoundedRect { rect: Rect, radius: f64, color: Color },
    StrokeRoundedRect { rect: Rect, radius: f64, width: f64, color: Color },
    FillCircle { center: Point, radius: f64, color: Color },
    StrokeCircle { center: Point, radius: f64, width: f64, color: Color },
    DrawPicture { width: u32, height: u32, src: SampleRect, dst: Rect },
    FillText {
        text: String,
        family: String,
        size: f64,
        color: Color,
        anchor: Point,
        wrap: Option<f64>,
        shadow: Option<Shadow>,
    },
}

/// Display list of everything drawn on a face, in drawing order.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    size: f64,
    ops: Vec<DrawOp>,
}

impl RecordingSurface {
    pub fn new(size: f64) -> Self {
        Self { size, ops: Vec::new() }
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<DrawOp> {
        self.ops
    }

    /// Text of every `FillText`, in drawing order.
    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::FillText { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    fn push(&mut self, op: DrawOp) -> Result<()> {
        self.ops.push(op);
        Ok(())
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> f64 {
        self.size
    }

    fn save(&mut self) -> Result<()> {
        self.push(DrawOp::Save)
    }

    fn restore(&mut self) -> Result<()> {
        self.push(DrawOp::Restore)
    }

    fn clip_rounded_rect(&mut self, rect: Rect, radius: f64) -> Result<()> {
        self.push(DrawOp::ClipRoundedRect { rect, radius })
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) -> Result<()> {
        self.push(DrawOp::FillRect { rect, color })
    }

    fn fill_rounded_rect(&mut self, rect: Rect, radius: f64, color: Color) -> Result<()> {
        self.push(DrawOp::FillRoundedRect { rect, radius, color })
    }

    fn stroke_rounded_rect(
        &mut self,
        rect: Rect,
        radius: f64,
        width: f64,
        color: Color,
    ) -> Result<()> {
        self.push(DrawOp::StrokeRoundedRect { rect, radius, width, color })
    }

    fn fill_circle(&mut self, center: Point, radius: f64, color: Color) -> Result<()> {
        self.push(DrawOp::FillCircle { center, radius, color })
    }

    fn stroke_circle(&mut self, center: Point, radius: f64, width: f64, color: Color) -> Result<()> {
        self.push(DrawOp::StrokeCircle { center, radius, width, color })
    }

    fn draw_picture(&mut self, picture: &Picture, src: SampleRect, dst: Rect) -> Result<()> {
        self.push(DrawOp::DrawPicture {
            width: picture.width,
            height: picture.height,
            src,
            dst,
        })
    }

    fn measure_text(&mut self, text: &str, style: TextStyle) -> Result<f64> {
        Ok(text.chars().count() as f64 * style.size * GLYPH_ADVANCE)
    }

    fn fill_text(&mut self, run: &TextRun) -> Result<()> {
        self.push(DrawOp::FillText {
            text: run.text.to_string(),
            family: run.style.family.to_string(),
            size: run.style.size,
            color: run.color,
            anchor: run.anchor,
            wrap: run.wrap,
            shadow: run.shadow,
        })
    }
}
