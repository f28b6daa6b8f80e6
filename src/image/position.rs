//! Photo pan/zoom to source-rectangle conversion.
//!
//! The live card preview positions photos with CSS `background-position` and
//! `background-size`; these functions pick the source pixels that reproduce it.

/// Converts a pixel drag offset of the preview into `background-position` percent units.
/// Calibrated against the 360px preview card: one percent per 3.6px at scale 1.
pub const DRAG_CALIBRATION: f64 = 3.6;

pub const MIN_SCALE: f64 = 0.3;
pub const MAX_SCALE: f64 = 3.0;

/// User-chosen pan (`x`, `y`) and zoom (`scale`) of a card photo.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ImagePosition {
    pub x: f64,
    pub y: f64,
    pub scale: f64,
}

impl Default for ImagePosition {
    fn default() -> Self {
        Self { x: 0.0, y: 0.0, scale: 1.0 }
    }
}

impl ImagePosition {
    /// Creates a position, clamping `scale` into `[MIN_SCALE, MAX_SCALE]`.
    /// A non-finite scale is treated as no zoom.
    pub fn new(x: f64, y: f64, scale: f64) -> Self {
        let scale = if scale.is_finite() { scale.clamp(MIN_SCALE, MAX_SCALE) } else { 1.0 };
        let x = if x.is_finite() { x } else { 0.0 };
        let y = if y.is_finite() { y } else { 0.0 };
        Self { x, y, scale }
    }
}

/// Region of a source image, in source pixels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SampleRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Source region of a `photo_w` × `photo_h` photo that the preview shows for `position`.
pub fn sample_rect(photo_w: f64, photo_h: f64, position: ImagePosition) -> SampleRect {
    let ImagePosition { x, y, scale } = position;
    let (x, width) = sample_axis(photo_w, x, scale);
    let (y, height) = sample_axis(photo_h, y, scale);
    SampleRect { x, y, width, height }
}

fn sample_axis(extent: f64, offset: f64, scale: f64) -> (f64, f64) {
    let scaled = extent / scale;
    let percent = 50.0 + offset / (DRAG_CALIBRATION * scale);
    let start = ((extent - scaled) * percent / 100.0).max(0.0);
    // drags past the far edge leave less (or nothing) to sample
    let size = scaled.min(extent - start);
    (start, size)
}

/// Centered crop of an image so that it covers a `dst_w` × `dst_h` box without distortion.
pub fn cover_rect(img_w: f64, img_h: f64, dst_w: f64, dst_h: f64) -> SampleRect {
    let s = (dst_w / img_w).max(dst_h / img_h);
    let (width, height) = (dst_w / s, dst_h / s);
    SampleRect {
        x: (img_w - width) / 2.0,
        y: (img_h - height) / 2.0,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn identity_samples_the_whole_photo() {
        for (w, h) in [(1.0, 1.0), (640.0, 480.0), (3024.0, 4032.0), (17.0, 9999.0)] {
            let r = sample_rect(w, h, ImagePosition::default());
            assert_eq!(r, SampleRect { x: 0.0, y: 0.0, width: w, height: h });
        }
    }

    #[test]
    fn zoom_samples_a_centered_smaller_region() {
        let r = sample_rect(1000.0, 800.0, ImagePosition::new(0.0, 0.0, 2.0));
        assert!(close(r.width, 500.0) && close(r.height, 400.0));
        assert!(close(r.x, 250.0) && close(r.y, 200.0));
    }

    #[test]
    fn pan_shifts_the_region_by_calibrated_percent() {
        // +36px at scale 2 is +5%: 55% of the 500px slack
        let r = sample_rect(1000.0, 1000.0, ImagePosition::new(36.0, -36.0, 2.0));
        assert!(close(r.x, 275.0));
        assert!(close(r.y, 225.0));
        assert!(close(r.width, 500.0));
    }

    #[test]
    fn pan_past_the_edge_shrinks_the_region() {
        // 125%: the window starts at 625 and only 375px remain
        let r = sample_rect(1000.0, 1000.0, ImagePosition::new(540.0, 0.0, 2.0));
        assert!(close(r.x, 625.0) && close(r.width, 375.0));
        assert!(close(r.y, 250.0) && close(r.height, 500.0));

        let r = sample_rect(1000.0, 1000.0, ImagePosition::new(10_000.0, -10_000.0, 3.0));
        assert!(r.width <= 0.0);
        assert!(close(r.y, 0.0) && close(r.height, 1000.0 / 3.0));
    }

    #[test]
    fn zoomed_out_pan_offsets_into_the_photo() {
        // -50% of a negative slack: 450px in, 450px left
        let r = sample_rect(900.0, 900.0, ImagePosition::new(-180.0, 0.0, 0.5));
        assert!(close(r.x, 450.0) && close(r.width, 450.0));
        assert!(close(r.y, 0.0) && close(r.height, 900.0));
    }

    #[test]
    fn scale_is_clamped() {
        assert_eq!(ImagePosition::new(0.0, 0.0, 10.0).scale, MAX_SCALE);
        assert_eq!(ImagePosition::new(0.0, 0.0, 0.0).scale, MIN_SCALE);
        assert_eq!(ImagePosition::new(0.0, 0.0, f64::NAN).scale, 1.0);
    }

    #[test]
    fn cover_crops_the_long_side() {
        let r = cover_rect(2000.0, 1000.0, 360.0, 360.0);
        assert!(close(r.width, 1000.0) && close(r.height, 1000.0));
        assert!(close(r.x, 500.0) && close(r.y, 0.0));
    }
}
