//! Image decoding and pixel effects backed by libvips.

mod color;
pub mod palette;
pub mod position;

pub use crate::image::color::Color;
pub use crate::image::palette::{resolve_color, FALLBACK_COLOR};
pub use crate::image::position::{cover_rect, sample_rect, ImagePosition, SampleRect};

use crate::error::{Error, Result};

use libvips::{ops, VipsApp, VipsImage};

/// A decoded image, normalized to 8-bit sRGB with alpha and stored as PNG.
#[derive(Debug, Clone)]
pub struct Picture {
    pub width: u32,
    pub height: u32,
    pub png: Vec<u8>,
}

/// Process-wide libvips handle. Create one and share it; dropping it shuts libvips down.
pub struct ImgBackend {
    vips_app: VipsApp,
}

impl ImgBackend {
    pub fn new() -> Result<Self> {
        Ok(Self {
            vips_app: VipsApp::default("kindred").map_err(|e| Error::Vips(e.to_string()))?,
        })
    }

    pub fn err(&self, e: libvips::error::Error) -> Error {
        Error::Vips(format!(
            "{e}\n{}",
            self.vips_app.error_buffer().unwrap_or_default()
        ))
    }

    fn reinterpret(&self, img: &VipsImage) -> Result<VipsImage> {
        let srgb;
        let img = if img.get_bands() < 3 {
            srgb = ops::colourspace(img, ops::Interpretation::Srgb).map_err(|e| self.err(e))?;
            &srgb
        } else {
            img
        };
        let img = ops::cast(img, ops::BandFormat::Uchar).map_err(|e| self.err(e))?;
        let img = ops::copy_with_opts(
            &img,
            &ops::CopyOptions {
                interpretation: ops::Interpretation::Srgb,
                width: img.get_width(),
                height: img.get_height(),
                bands: img.get_bands(),
                format: ops::BandFormat::Uchar,
                ..Default::default()
            },
        )
        .map_err(|e| self.err(e))?;
        if img.get_bands() == 3 {
            ops::bandjoin_const(&img, &mut [255.0]).map_err(|e| self.err(e))
        } else {
            Ok(img)
        }
    }

    fn to_picture(&self, img: &VipsImage) -> Result<Picture> {
        let png = ops::pngsave_buffer(img).map_err(|e| self.err(e))?;
        Ok(Picture {
            width: img.get_width() as u32,
            height: img.get_height() as u32,
            png,
        })
    }

    /// Brings an arbitrary photo to upright 8-bit sRGB: applies the EXIF orientation, then
    /// converts CMYK, grey, 16-bit and other encodings with `colourspace`.
    fn normalize(&self, img: &VipsImage) -> Result<VipsImage> {
        let img = ops::autorot(img).map_err(|e| self.err(e))?;
        let interpretation = img.get_interpretation().map_err(|e| self.err(e))?;
        let format = img.get_format().map_err(|e| self.err(e))?;
        let is_srgb8 = matches!(interpretation, ops::Interpretation::Srgb)
            && matches!(format, ops::BandFormat::Uchar);
        if is_srgb8 {
            return Ok(img);
        }

        // 16-bit data tagged as 8-bit colour would saturate instead of being rescaled
        let wide = matches!(format, ops::BandFormat::Ushort)
            && !matches!(
                interpretation,
                ops::Interpretation::Rgb16 | ops::Interpretation::Grey16
            );
        let img = if wide {
            let tagged = if img.get_bands() < 3 {
                ops::Interpretation::Grey16
            } else {
                ops::Interpretation::Rgb16
            };
            let options = ops::CopyOptions {
                interpretation: tagged,
                width: img.get_width(),
                height: img.get_height(),
                bands: img.get_bands(),
                format: ops::BandFormat::Ushort,
                ..Default::default()
            };
            ops::copy_with_opts(&img, &options).map_err(|e| self.err(e))?
        } else {
            img
        };
        ops::colourspace(&img, ops::Interpretation::Srgb).map_err(|e| self.err(e))
    }

    /// Decodes any format libvips understands (PNG, JPEG, WebP, HEIF, ...) into a [`Picture`].
    pub fn decode(&self, bytes: &[u8]) -> Result<Picture> {
        let img = VipsImage::new_from_buffer(bytes, "").map_err(|e| self.err(e))?;
        let img = self.normalize(&img)?;
        let img = self.reinterpret(&img)?;
        if img.get_width() == 0 || img.get_height() == 0 {
            return Err(Error::Vips("decoded image is empty".into()));
        }
        self.to_picture(&img)
    }

    /// Turns the alpha of `mask_png` into a gaussian-blurred glow of a single `color`.
    ///
    /// `sigma` is in device pixels; a canvas `shadowBlur` of `b` corresponds to `b / 2`.
    pub fn glow(&self, mask_png: &[u8], color: Color, sigma: f64) -> Result<Vec<u8>> {
        let img = VipsImage::new_from_buffer(mask_png, "").map_err(|e| self.err(e))?;
        let img = self.reinterpret(&img)?;
        let alpha = ops::extract_band(&img, 3).map_err(|e| self.err(e))?;
        let alpha = if sigma > 0.0 {
            ops::gaussblur(&alpha, sigma).map_err(|e| self.err(e))?
        } else {
            alpha
        };
        let alpha = match color.a {
            Some(a) => {
                let k = VipsImage::new_from_image1(&alpha, a).map_err(|e| self.err(e))?;
                ops::multiply(&alpha, &k).map_err(|e| self.err(e))?
            }
            None => alpha,
        };
        let (r, g, b) = color.scaled_rgb();
        let rgb = VipsImage::new_from_image(&alpha, &[r, g, b]).map_err(|e| self.err(e))?;
        let glow = ops::bandjoin(&mut [rgb, alpha]).map_err(|e| self.err(e))?;
        let glow = self.reinterpret(&glow)?;
        ops::pngsave_buffer(&glow).map_err(|e| self.err(e))
    }
}
