//! Front face: photo and glowing name.

use crate::data::Card;
use crate::error::Result;
use crate::image::{sample_rect, Color, ImagePosition, Picture};
use crate::render::{draw_frame, FaceContext};
use crate::surface::{fit_text_size, Point, Rect, Shadow, Surface, TextRun, TextStyle};

pub const FRONT_BORDER: Color = Color::from_rgb24(0x667eea).with_alpha(0.5);

const PHOTO_PADDING: f64 = 20.0;
const NAME_AREA: f64 = 70.0;
const FRAME_OUTSET: f64 = 4.0;
const FRAME_RADIUS: f64 = 16.0;
const PHOTO_RADIUS: f64 = 12.0;

const PLACEHOLDER_RADIUS: f64 = 50.0;
const PLACEHOLDER_GRAY: Color = Color::from_rgb24(0xe0e0e0);
const PLACEHOLDER_GLYPH: &str = "👤";
const FAILED_FILL: Color = Color::from_rgb24(0x667eea);
const FAILED_RING: f64 = 4.0;

const NAME_SIZE: f64 = 32.0;
const NAME_MIN_SIZE: f64 = 18.0;
/// Shadow blur of each glow pass, widest first.
const GLOW_PASSES: [f64; 3] = [20.0, 10.0, 5.0];
const GLOW: Color = Color::WHITE.with_alpha(0.8);

/// What the rasterizer managed to do with the card's photo reference.
#[derive(Debug, Clone)]
pub enum PhotoState {
    Missing,
    Loaded(Picture),
    Failed,
}

/// The photo window: inset by the padding on three sides, leaving the name area below.
pub fn photo_area(size: f64) -> Rect {
    Rect::new(
        PHOTO_PADDING,
        PHOTO_PADDING,
        size - 2.0 * PHOTO_PADDING,
        size - PHOTO_PADDING - NAME_AREA,
    )
}

pub fn render_front<S: Surface + ?Sized>(
    s: &mut S,
    card: &Card,
    ctx: &FaceContext,
    photo: &PhotoState,
) -> Result<()> {
    let size = s.size();
    draw_frame(s, ctx, FRONT_BORDER)?;

    let area = photo_area(size);
    match photo {
        PhotoState::Loaded(picture) => draw_photo(s, picture, card.image_position, area)?,
        PhotoState::Failed => {
            s.fill_circle(area.center(), PLACEHOLDER_RADIUS, FAILED_FILL)?;
            s.stroke_circle(area.center(), PLACEHOLDER_RADIUS, FAILED_RING, Color::WHITE)?;
        }
        PhotoState::Missing => {
            s.fill_circle(area.center(), PLACEHOLDER_RADIUS, PLACEHOLDER_GRAY)?;
            let style = TextStyle { family: ctx.family, size: PLACEHOLDER_RADIUS, bold: false };
            s.fill_text(&TextRun::centered(PLACEHOLDER_GLYPH, style, Color::WHITE, area.center()))?;
        }
    }

    let anchor = Point::new(size / 2.0, area.bottom() + NAME_AREA / 2.0);
    draw_name(s, card.name.trim(), ctx.family, anchor, size - 2.0 * PHOTO_PADDING)
}

fn draw_photo<S: Surface + ?Sized>(
    s: &mut S,
    picture: &Picture,
    position: ImagePosition,
    area: Rect,
) -> Result<()> {
    s.fill_rounded_rect(area.inset(-FRAME_OUTSET), FRAME_RADIUS, Color::WHITE)?;
    s.save()?;
    s.clip_rounded_rect(area, PHOTO_RADIUS)?;
    let src = sample_rect(picture.width as f64, picture.height as f64, position);
    s.draw_picture(picture, src, area)?;
    s.restore()
}

/// Translucent white glow passes under a solid black name.
fn draw_name<S: Surface + ?Sized>(
    s: &mut S,
    name: &str,
    family: &str,
    anchor: Point,
    max_width: f64,
) -> Result<()> {
    if name.is_empty() {
        return Ok(());
    }
    let base = TextStyle { family, size: NAME_SIZE, bold: true };
    let size = fit_text_size(s, name, base, max_width, NAME_MIN_SIZE)?;
    let style = TextStyle { size, ..base };

    for blur in GLOW_PASSES {
        s.fill_text(&TextRun {
            shadow: Some(Shadow { blur, color: GLOW }),
            ..TextRun::centered(name, style, GLOW, anchor)
        })?;
    }
    s.fill_text(&TextRun::centered(name, style, Color::BLACK, anchor))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::Theme;
    use crate::render::CARD_SIZE;
    use crate::surface::{DrawOp, RecordingSurface};

    fn render(card: &Card, photo: &PhotoState) -> RecordingSurface {
        let ctx = FaceContext { family: "Luckiest Guy", theme: Some(Theme::Geometric), background: None };
        let mut s = RecordingSurface::new(CARD_SIZE);
        render_front(&mut s, card, &ctx, photo).unwrap();
        s
    }

    fn name_passes(s: &RecordingSurface) -> Vec<(Option<Shadow>, Color)> {
        s.ops()
            .iter()
            .filter_map(|op| match op {
                DrawOp::FillText { text, shadow, color, .. } if text == "Uncle Mike" => {
                    Some((*shadow, *color))
                }
                _ => None,
            })
            .collect()
    }

    #[test]
    fn photo_area_leaves_room_for_the_name() {
        assert_eq!(photo_area(CARD_SIZE), Rect::new(20.0, 20.0, 320.0, 270.0));
    }

    #[test]
    fn name_glows_then_prints_black() {
        let s = render(&Card::new("Uncle Mike"), &PhotoState::Missing);
        let passes = name_passes(&s);
        assert_eq!(passes.len(), 4);

        let blurs: Vec<f64> = passes[..3].iter().map(|(sh, _)| sh.unwrap().blur).collect();
        assert!(blurs.windows(2).all(|w| w[0] > w[1]), "{blurs:?}");
        assert!(passes[..3].iter().all(|(_, c)| c.alpha() < 1.0));
        assert_eq!(passes[3], (None, Color::BLACK));
    }

    #[test]
    fn name_is_centered_in_the_name_area() {
        let s = render(&Card::new("Uncle Mike"), &PhotoState::Missing);
        let anchors: Vec<Point> = s
            .ops()
            .iter()
            .filter_map(|op| match op {
                DrawOp::FillText { text, anchor, family, .. } if text == "Uncle Mike" => {
                    assert_eq!(family, "Luckiest Guy");
                    Some(*anchor)
                }
                _ => None,
            })
            .collect();
        assert!(anchors.iter().all(|a| *a == Point::new(180.0, 325.0)));
    }

    #[test]
    fn blank_name_draws_no_text() {
        for name in ["", "   "] {
            let s = render(&Card::new(name), &PhotoState::Failed);
            assert!(s.texts().is_empty(), "{name:?}");
        }
    }

    #[test]
    fn missing_photo_draws_person_placeholder() {
        let s = render(&Card::new("A"), &PhotoState::Missing);
        let center = photo_area(CARD_SIZE).center();
        assert!(s.ops().contains(&DrawOp::FillCircle {
            center,
            radius: PLACEHOLDER_RADIUS,
            color: PLACEHOLDER_GRAY
        }));
        assert!(s.texts().contains(&PLACEHOLDER_GLYPH));
        assert!(!s.ops().iter().any(|op| matches!(op, DrawOp::DrawPicture { .. })));
    }

    #[test]
    fn failed_photo_draws_ringed_circle() {
        let s = render(&Card::new("A"), &PhotoState::Failed);
        let center = photo_area(CARD_SIZE).center();
        assert!(s.ops().contains(&DrawOp::FillCircle {
            center,
            radius: PLACEHOLDER_RADIUS,
            color: FAILED_FILL
        }));
        assert!(s.ops().contains(&DrawOp::StrokeCircle {
            center,
            radius: PLACEHOLDER_RADIUS,
            width: FAILED_RING,
            color: Color::WHITE
        }));
        assert!(!s.texts().contains(&PLACEHOLDER_GLYPH));
    }

    #[test]
    fn loaded_photo_is_framed_clipped_and_positioned() {
        let picture = Picture { width: 1000, height: 800, png: Vec::new() };
        let mut card = Card::new("A");
        card.image_position = ImagePosition::new(0.0, 0.0, 2.0);
        let s = render(&card, &PhotoState::Loaded(picture));
        let area = photo_area(CARD_SIZE);

        let ops = s.ops();
        let frame = ops
            .iter()
            .position(|op| matches!(op, DrawOp::FillRoundedRect { rect, .. } if *rect == area.inset(-4.0)))
            .unwrap();
        assert_eq!(ops[frame + 1], DrawOp::Save);
        assert_eq!(ops[frame + 2], DrawOp::ClipRoundedRect { rect: area, radius: PHOTO_RADIUS });
        match &ops[frame + 3] {
            DrawOp::DrawPicture { src, dst, .. } => {
                assert_eq!(*dst, area);
                assert_eq!((src.x, src.y, src.width, src.height), (250.0, 200.0, 500.0, 400.0));
            }
            op => panic!("unexpected {op:?}"),
        }
        assert_eq!(ops[frame + 4], DrawOp::Restore);
    }
}
