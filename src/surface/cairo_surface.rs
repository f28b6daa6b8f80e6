//! Cairo + pango implementation of [`Surface`].

use crate::error::{Error, Result};
use crate::image::{Color, ImgBackend, Picture, SampleRect};
use crate::surface::{Align, Baseline, Point, Rect, Shadow, Surface, TextRun, TextStyle};

use cairo::{Context, Extend, Filter, Format, ImageSurface, SurfacePattern};
use pango::prelude::FontMapExt;
use std::f64::consts::PI;
use std::io::Cursor;

/// Square ARGB canvas of `size` logical units, backed by `size * scale` device pixels.
pub struct CairoSurface<'b> {
    backend: &'b ImgBackend,
    surface: ImageSurface,
    cr: Context,
    pango: pango::Context,
    size: f64,
    scale: f64,
}

impl<'b> CairoSurface<'b> {
    pub fn new(backend: &'b ImgBackend, size: f64, scale: f64) -> Result<Self> {
        let px = device_pixels(size, scale);
        if px <= 0 {
            return Err(Error::surface(format!("invalid canvas size {size} at scale {scale}")));
        }
        let surface = ImageSurface::create(Format::ARgb32, px, px).map_err(Error::surface)?;
        let cr = Context::new(&surface).map_err(Error::surface)?;
        cr.scale(scale, scale);

        let mut options = cairo::FontOptions::new().map_err(Error::surface)?;
        options.set_antialias(cairo::Antialias::Good);
        let pango = pangocairo::FontMap::new().create_context();
        pangocairo::functions::context_set_font_options(&pango, Some(&options));
        pangocairo::functions::update_context(&cr, &pango);

        Ok(Self { backend, surface, cr, pango, size, scale })
    }

    /// Edge length of the canvas in device pixels.
    pub fn pixel_size(&self) -> i32 {
        device_pixels(self.size, self.scale)
    }

    fn rounded_rect_path(&self, rect: Rect, radius: f64) {
        let Rect { x, y, w, h } = rect;
        let r = radius.min(w / 2.0).min(h / 2.0).max(0.0);
        let (right, bottom) = (x + w, y + h);
        self.cr.new_sub_path();
        self.cr.arc(x + r, y + r, r, PI, 1.5 * PI);
        self.cr.arc(right - r, y + r, r, 1.5 * PI, 0.0);
        self.cr.arc(right - r, bottom - r, r, 0.0, 0.5 * PI);
        self.cr.arc(x + r, bottom - r, r, 0.5 * PI, PI);
        self.cr.close_path();
    }

    fn set_color(&self, color: Color) {
        let (r, g, b, a) = color.rgba();
        self.cr.set_source_rgba(r, g, b, a);
    }

    fn layout(&self, text: &str, style: TextStyle) -> pango::Layout {
        let layout = pango::Layout::new(&self.pango);
        let mut desc = pango::FontDescription::new();
        desc.set_family(style.family);
        desc.set_absolute_size(style.size * pango::SCALE as f64);
        if style.bold {
            desc.set_weight(pango::Weight::Bold);
        }
        layout.set_font_description(Some(&desc));
        layout.set_text(text);
        layout
    }

    fn run_layout(&self, run: &TextRun) -> pango::Layout {
        let layout = self.layout(run.text, run.style);
        if let Some(wrap) = run.wrap {
            layout.set_width((wrap * pango::SCALE as f64) as i32);
            layout.set_wrap(pango::WrapMode::WordChar);
            layout.set_alignment(match run.align {
                Align::Left => pango::Alignment::Left,
                Align::Center => pango::Alignment::Center,
            });
        }
        layout
    }

    fn text_origin(run: &TextRun, layout: &pango::Layout) -> Point {
        let (w, h) = layout.size();
        let (w, h) = (w as f64 / pango::SCALE as f64, h as f64 / pango::SCALE as f64);
        let box_width = run.wrap.unwrap_or(w);
        let x = match run.align {
            Align::Left => run.anchor.x,
            Align::Center => run.anchor.x - box_width / 2.0,
        };
        let y = match run.baseline {
            Baseline::Top => run.anchor.y,
            Baseline::Middle => run.anchor.y - h / 2.0,
        };
        Point::new(x, y)
    }

    /// Renders the layout into a mask, blurs it with libvips and paints the result.
    fn paint_shadow(&mut self, layout: &pango::Layout, at: Point, shadow: Shadow) -> Result<()> {
        let px = self.pixel_size();
        let mask = ImageSurface::create(Format::ARgb32, px, px)?;
        {
            let mcr = Context::new(&mask)?;
            mcr.scale(self.scale, self.scale);
            mcr.set_source_rgba(0.0, 0.0, 0.0, 1.0);
            mcr.move_to(at.x, at.y);
            pangocairo::functions::update_layout(&mcr, layout);
            pangocairo::functions::show_layout(&mcr, layout);
        }
        let mut mask_png = Vec::new();
        mask.write_to_png(&mut mask_png)?;

        let glow_png = self
            .backend
            .glow(&mask_png, shadow.color, shadow.blur * self.scale / 2.0)?;
        let glow = ImageSurface::create_from_png(&mut Cursor::new(glow_png))?;

        self.cr.save()?;
        self.cr.identity_matrix();
        self.cr.set_source_surface(&glow, 0.0, 0.0)?;
        self.cr.paint()?;
        self.cr.restore()?;
        pangocairo::functions::update_layout(&self.cr, layout);
        Ok(())
    }

    /// Encodes the canvas as an RGBA PNG at the highest compression level.
    pub fn encode(self) -> Result<Vec<u8>> {
        let Self { mut surface, cr, pango, .. } = self;
        drop(cr);
        drop(pango);
        surface.flush();

        let (w, h) = (surface.width() as usize, surface.height() as usize);
        let stride = surface.stride() as usize;
        let mut rgba = Vec::with_capacity(w * h * 4);
        {
            let data = surface.data()?;
            for row in data.chunks(stride).take(h) {
                for px in row[..w * 4].chunks_exact(4) {
                    let argb = u32::from_ne_bytes([px[0], px[1], px[2], px[3]]);
                    rgba.extend_from_slice(&unpremultiply(argb));
                }
            }
        }

        let mut png_bytes = Vec::new();
        let mut encoder = png::Encoder::new(&mut png_bytes, w as u32, h as u32);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_compression(png::Compression::Best);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(&rgba)?;
        writer.finish()?;
        Ok(png_bytes)
    }
}

fn device_pixels(size: f64, scale: f64) -> i32 {
    (size * scale).round() as i32
}

/// Cairo stores premultiplied, native-endian ARGB; PNG wants straight RGBA.
fn unpremultiply(argb: u32) -> [u8; 4] {
    let a = (argb >> 24) & 0xFF;
    if a == 0 {
        return [0, 0, 0, 0];
    }
    let channel = |shift: u32| (((argb >> shift) & 0xFF) * 255 + a / 2) / a;
    [channel(16) as u8, channel(8) as u8, channel(0) as u8, a as u8]
}

impl Surface for CairoSurface<'_> {
    fn size(&self) -> f64 {
        self.size
    }

    fn save(&mut self) -> Result<()> {
        Ok(self.cr.save()?)
    }

    fn restore(&mut self) -> Result<()> {
        Ok(self.cr.restore()?)
    }

    fn clip_rounded_rect(&mut self, rect: Rect, radius: f64) -> Result<()> {
        self.cr.new_path();
        self.rounded_rect_path(rect, radius);
        self.cr.clip();
        Ok(())
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) -> Result<()> {
        self.cr.new_path();
        self.cr.rectangle(rect.x, rect.y, rect.w, rect.h);
        self.set_color(color);
        Ok(self.cr.fill()?)
    }

    fn fill_rounded_rect(&mut self, rect: Rect, radius: f64, color: Color) -> Result<()> {
        self.cr.new_path();
        self.rounded_rect_path(rect, radius);
        self.set_color(color);
        Ok(self.cr.fill()?)
    }

    fn stroke_rounded_rect(
        &mut self,
        rect: Rect,
        radius: f64,
        width: f64,
        color: Color,
    ) -> Result<()> {
        self.cr.new_path();
        self.rounded_rect_path(rect, radius);
        self.cr.set_line_width(width);
        self.set_color(color);
        Ok(self.cr.stroke()?)
    }

    fn fill_circle(&mut self, center: Point, radius: f64, color: Color) -> Result<()> {
        self.cr.new_path();
        self.cr.arc(center.x, center.y, radius, 0.0, 2.0 * PI);
        self.set_color(color);
        Ok(self.cr.fill()?)
    }

    fn stroke_circle(&mut self, center: Point, radius: f64, width: f64, color: Color) -> Result<()> {
        self.cr.new_path();
        self.cr.arc(center.x, center.y, radius, 0.0, 2.0 * PI);
        self.cr.set_line_width(width);
        self.set_color(color);
        Ok(self.cr.stroke()?)
    }

    fn draw_picture(&mut self, picture: &Picture, src: SampleRect, dst: Rect) -> Result<()> {
        if src.width <= 0.0 || src.height <= 0.0 {
            return Ok(());
        }
        let img = ImageSurface::create_from_png(&mut Cursor::new(&picture.png))?;
        let pattern = SurfacePattern::create(&img);
        pattern.set_filter(Filter::Good);
        pattern.set_extend(Extend::Pad);

        self.cr.save()?;
        self.cr.new_path();
        self.cr.rectangle(dst.x, dst.y, dst.w, dst.h);
        self.cr.clip();
        self.cr.translate(dst.x, dst.y);
        self.cr.scale(dst.w / src.width, dst.h / src.height);
        self.cr.translate(-src.x, -src.y);
        self.cr.set_source(&pattern)?;
        self.cr.paint()?;
        self.cr.restore()?;
        Ok(())
    }

    fn measure_text(&mut self, text: &str, style: TextStyle) -> Result<f64> {
        let (w, _) = self.layout(text, style).size();
        Ok(w as f64 / pango::SCALE as f64)
    }

    fn fill_text(&mut self, run: &TextRun) -> Result<()> {
        let layout = self.run_layout(run);
        let at = Self::text_origin(run, &layout);
        if let Some(shadow) = run.shadow {
            self.paint_shadow(&layout, at, shadow)?;
        }
        self.cr.save()?;
        self.set_color(run.color);
        self.cr.move_to(at.x, at.y);
        pangocairo::functions::show_layout(&self.cr, &layout);
        self.cr.restore()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unpremultiplies_cairo_pixels() {
        assert_eq!(unpremultiply(0x00000000), [0, 0, 0, 0]);
        assert_eq!(unpremultiply(0xFFFF8000), [255, 128, 0, 255]);
        // half-transparent white is stored as 0x80808080
        assert_eq!(unpremultiply(0x80808080), [255, 255, 255, 128]);
    }
}
