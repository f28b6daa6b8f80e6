//! Turns a [`Card`] into front and back PNG images.
//!
//! Both faces are laid out on a square grid of [`CARD_SIZE`] logical units and rasterized at
//! `RenderOptions::size * RenderOptions::scale` device pixels.

mod back;
mod front;

pub use back::{render_back, truncate_fun_fact, BackLayout, Cell, BACK_BORDER, FUN_FACT_LIMIT};
pub use front::{photo_area, render_front, PhotoState, FRONT_BORDER};

use crate::assets::{
    fetch_with_timeout, resolve_background, AssetProvider, ImageRef, Theme, DEFAULT_LOAD_TIMEOUT,
};
use crate::data::{Card, DeckStyle};
use crate::error::Result;
use crate::image::{cover_rect, Color, ImgBackend, Picture};
use crate::surface::{CairoSurface, Rect, Surface};
use crate::text::FontRegistry;

use serde::Deserialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Edge of the layout grid every face is drawn on.
pub const CARD_SIZE: f64 = 360.0;
pub const DEFAULT_SCALE: f64 = 2.0;

const CARD_RADIUS: f64 = 20.0;
const BORDER_WIDTH: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Logical edge of the card.
    pub size: f64,
    /// Device pixels per logical unit.
    pub scale: f64,
    /// Upper bound for fetching one photo or background.
    #[serde(rename = "timeout", deserialize_with = "seconds::deserialize")]
    pub load_timeout: Duration,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            size: CARD_SIZE,
            scale: DEFAULT_SCALE,
            load_timeout: DEFAULT_LOAD_TIMEOUT,
        }
    }
}

impl RenderOptions {
    /// Device pixels per layout-grid unit.
    pub fn device_scale(&self) -> f64 {
        self.scale * self.size / CARD_SIZE
    }

    /// Edge of a rendered artifact, in pixels.
    pub fn pixel_size(&self) -> u32 {
        (self.size * self.scale).round() as u32
    }
}

mod seconds {
    use serde::{Deserialize, Deserializer};
    use std::time::Duration;

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Side {
    Front,
    Back,
}

impl Side {
    pub fn id(self) -> &'static str {
        match self {
            Side::Front => "front",
            Side::Back => "back",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// One encoded face. Always square.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    pub side: Side,
    pub width: u32,
    pub height: u32,
    pub png: Vec<u8>,
}

/// Result of one [`Rasterizer::generate`] call. A `None` face failed to render.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Artifacts {
    pub front: Option<Artifact>,
    pub back: Option<Artifact>,
}

impl Artifacts {
    pub fn is_complete(&self) -> bool {
        self.front.is_some() && self.back.is_some()
    }

    pub fn missing(&self) -> Vec<Side> {
        let mut sides = Vec::new();
        if self.front.is_none() {
            sides.push(Side::Front);
        }
        if self.back.is_none() {
            sides.push(Side::Back);
        }
        sides
    }

    pub fn faces(self) -> impl Iterator<Item = Artifact> {
        self.front.into_iter().chain(self.back)
    }
}

/// Deck-wide inputs shared by both face renderers.
#[derive(Debug, Clone, Copy)]
pub struct FaceContext<'a> {
    pub family: &'a str,
    pub theme: Option<Theme>,
    pub background: Option<&'a Picture>,
}

/// Clips to the card outline, paints the background and the accent border.
fn draw_frame<S: Surface + ?Sized>(s: &mut S, ctx: &FaceContext, border: Color) -> Result<()> {
    let card = Rect::square(s.size());
    s.clip_rounded_rect(card, CARD_RADIUS)?;
    match ctx.background {
        Some(bg) => {
            let src = cover_rect(bg.width as f64, bg.height as f64, card.w, card.h);
            s.draw_picture(bg, src, card)?;
        }
        None => s.fill_rect(card, Color::WHITE)?,
    }
    if ctx.theme != Some(Theme::Rainbow) {
        s.stroke_rounded_rect(
            card.inset(BORDER_WIDTH / 2.0),
            CARD_RADIUS,
            BORDER_WIDTH,
            border,
        )?;
    }
    Ok(())
}

/// Runs both face renders. A failed face is logged and left out; when the first one cannot
/// even get a drawing surface, the second is not attempted.
fn collect_faces<F, B>(front: F, back: B) -> Artifacts
where
    F: FnOnce() -> Result<Artifact>,
    B: FnOnce() -> Result<Artifact>,
{
    let front = match front() {
        Ok(artifact) => Some(artifact),
        Err(e) if e.is_surface_unavailable() => {
            tracing::warn!("no drawing surface, skipping card: {e}");
            return Artifacts::default();
        }
        Err(e) => {
            tracing::warn!("front face failed: {e}");
            None
        }
    };
    let back = back().map_err(|e| tracing::warn!("back face failed: {e}")).ok();
    Artifacts { front, back }
}

/// Renders cards. Holds no per-card state: every call draws both faces from scratch.
#[derive(Clone)]
pub struct Rasterizer {
    backend: Arc<ImgBackend>,
    fonts: Arc<FontRegistry>,
    assets: Arc<dyn AssetProvider>,
    options: RenderOptions,
}

impl Rasterizer {
    pub fn new(
        backend: Arc<ImgBackend>,
        fonts: Arc<FontRegistry>,
        assets: Arc<dyn AssetProvider>,
    ) -> Self {
        Self {
            backend,
            fonts,
            assets,
            options: RenderOptions::default(),
        }
    }

    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Renders both faces of `card`. Faces fail independently; failures are logged and come
    /// back as `None`.
    pub fn generate(&self, card: &Card, style: &DeckStyle) -> Artifacts {
        let span = tracing::info_span!("generate", card = %card.name.trim());
        let _enter = span.enter();

        let font = self.fonts.ensure_loaded(style.font);
        let background = resolve_background(style.theme).and_then(|bg| {
            self.load_picture(&bg)
                .map_err(|e| tracing::warn!("background unavailable, using white: {e}"))
                .ok()
        });
        let ctx = FaceContext {
            family: &font.family,
            theme: style.theme,
            background: background.as_ref(),
        };

        let photo = self.photo(card);
        collect_faces(
            || self.face(Side::Front, |s| render_front(s, card, &ctx, &photo)),
            || self.face(Side::Back, |s| render_back(s, card, &ctx)),
        )
    }

    fn face<F>(&self, side: Side, draw: F) -> Result<Artifact>
    where
        F: FnOnce(&mut CairoSurface) -> Result<()>,
    {
        let mut surface = CairoSurface::new(&self.backend, CARD_SIZE, self.options.device_scale())?;
        draw(&mut surface)?;
        let px = surface.pixel_size() as u32;
        let png = surface.encode()?;
        tracing::debug!("{side} face encoded, {} bytes", png.len());
        Ok(Artifact {
            side,
            width: px,
            height: px,
            png,
        })
    }

    fn load_picture(&self, image: &ImageRef) -> Result<Picture> {
        let bytes = fetch_with_timeout(&self.assets, image, self.options.load_timeout)?;
        self.backend.decode(&bytes)
    }

    fn photo(&self, card: &Card) -> PhotoState {
        match &card.photo {
            None => PhotoState::Missing,
            Some(image) => match self.load_picture(image) {
                Ok(picture) => PhotoState::Loaded(picture),
                Err(e) => {
                    tracing::warn!("photo {image} unavailable, drawing placeholder: {e}");
                    PhotoState::Failed
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{DrawOp, RecordingSurface};

    fn ctx(theme: Option<Theme>) -> FaceContext<'static> {
        FaceContext { family: "Sans", theme, background: None }
    }

    #[test]
    fn options_scale_to_pixels() {
        let options = RenderOptions::default();
        assert_eq!(options.pixel_size(), 720);
        assert_eq!(options.device_scale(), 2.0);
        let options = RenderOptions { size: 540.0, scale: 1.0, ..Default::default() };
        assert_eq!(options.pixel_size(), 540);
        assert_eq!(options.device_scale(), 1.5);
    }

    #[test]
    fn frame_without_theme_is_white_with_border() {
        let mut s = RecordingSurface::new(CARD_SIZE);
        draw_frame(&mut s, &ctx(None), FRONT_BORDER).unwrap();
        assert!(matches!(s.ops()[0], DrawOp::ClipRoundedRect { .. }));
        assert_eq!(
            s.ops()[1],
            DrawOp::FillRect { rect: Rect::square(CARD_SIZE), color: Color::WHITE }
        );
        assert!(matches!(s.ops()[2], DrawOp::StrokeRoundedRect { color, .. } if color == FRONT_BORDER));
    }

    #[test]
    fn rainbow_frame_has_no_border() {
        for theme in Theme::ALL {
            let mut s = RecordingSurface::new(CARD_SIZE);
            draw_frame(&mut s, &ctx(Some(theme)), BACK_BORDER).unwrap();
            let borders = s
                .ops()
                .iter()
                .filter(|op| matches!(op, DrawOp::StrokeRoundedRect { .. }))
                .count();
            assert_eq!(borders, usize::from(theme != Theme::Rainbow), "{theme}");
        }
    }

    #[test]
    fn background_is_cover_fit() {
        let bg = Picture { width: 800, height: 400, png: Vec::new() };
        let ctx = FaceContext { background: Some(&bg), ..ctx(Some(Theme::Space)) };
        let mut s = RecordingSurface::new(CARD_SIZE);
        draw_frame(&mut s, &ctx, FRONT_BORDER).unwrap();
        match &s.ops()[1] {
            DrawOp::DrawPicture { src, dst, .. } => {
                assert!((src.x - 200.0).abs() < 1e-9 && src.y.abs() < 1e-9);
                assert!((src.width - 400.0).abs() < 1e-9 && (src.height - 400.0).abs() < 1e-9);
                assert_eq!(*dst, Rect::square(CARD_SIZE));
            }
            op => panic!("unexpected {op:?}"),
        }
    }

    #[test]
    fn missing_sides() {
        let artifact = Artifact { side: Side::Back, width: 1, height: 1, png: vec![] };
        let artifacts = Artifacts { front: None, back: Some(artifact) };
        assert!(!artifacts.is_complete());
        assert_eq!(artifacts.missing(), vec![Side::Front]);
        assert_eq!(artifacts.faces().count(), 1);
    }

    fn face_ok(side: Side) -> Result<Artifact> {
        Ok(Artifact { side, width: 2, height: 2, png: vec![side as u8] })
    }

    fn face_broken() -> Result<Artifact> {
        Err(crate::Error::Vips("text layout failed".into()))
    }

    #[test]
    fn broken_front_keeps_back() {
        let artifacts = collect_faces(face_broken, || face_ok(Side::Back));
        assert_eq!(artifacts.front, None);
        assert_eq!(artifacts.back.map(|a| a.side), Some(Side::Back));
    }

    #[test]
    fn broken_back_keeps_front() {
        let artifacts = collect_faces(|| face_ok(Side::Front), face_broken);
        assert_eq!(artifacts.front.map(|a| a.side), Some(Side::Front));
        assert_eq!(artifacts.back, None);
    }

    #[test]
    fn no_surface_skips_the_back() {
        let mut back_drawn = false;
        let artifacts = collect_faces(
            || Err(crate::Error::SurfaceUnavailable("0x0".into())),
            || {
                back_drawn = true;
                face_ok(Side::Back)
            },
        );
        assert!(!back_drawn);
        assert_eq!(artifacts, Artifacts::default());
    }
}
