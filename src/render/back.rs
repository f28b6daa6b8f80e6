//! Back face: attribute grid and fun fact.

use crate::data::Card;
use crate::error::Result;
use crate::image::{resolve_color, Color};
use crate::render::{draw_frame, FaceContext};
use crate::surface::{fit_text_size, Align, Baseline, Point, Rect, Surface, TextRun, TextStyle};
use crate::text::format_birthday;

pub const BACK_BORDER: Color = Color::from_rgb24(0xf093fb).with_alpha(0.5);
/// Characters of the fun fact that make it onto the card. No ellipsis is added.
pub const FUN_FACT_LIMIT: usize = 40;

const PANEL_INSET: f64 = 16.0;
const PANEL_RADIUS: f64 = 14.0;
const PANEL_FILL: Color = Color::WHITE.with_alpha(0.88);

const COLUMNS: usize = 2;
const CELL_WIDTH: f64 = 152.0;
const ROW_HEIGHT: f64 = 78.0;
const GRID_PAD_X: f64 = 12.0;
const GRID_PAD_Y: f64 = 16.0;

const EMOJI_SIZE: f64 = 24.0;
const LABEL_SIZE: f64 = 12.0;
const VALUE_SIZE: f64 = 15.0;
const VALUE_MIN_SIZE: f64 = 10.0;

const CALLOUT_GAP: f64 = 10.0;
const CALLOUT_HEIGHT: f64 = 84.0;
const CALLOUT_RADIUS: f64 = 10.0;
const CALLOUT_FILL: Color = Color::from_rgb24(0xffc107).with_alpha(0.2);
const CALLOUT_LABEL: Color = Color::from_rgb24(0xe65100);
const FACT_SIZE: f64 = 14.0;

/// One entry of the attribute grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub emoji: &'static str,
    pub label: &'static str,
    pub label_color: Color,
    pub value: String,
}

impl Cell {
    fn new(emoji: &'static str, label: &'static str, label_color: Color, value: impl Into<String>) -> Self {
        Self { emoji, label, label_color, value: value.into() }
    }
}

/// What goes on the back of a card, before any pixels are involved.
///
/// Only present attributes get a cell, in a fixed order: location, birthday, favorite color,
/// first hobby. Cells fill the two-column grid row by row with no gaps.
#[derive(Debug, Clone, PartialEq)]
pub struct BackLayout {
    pub cells: Vec<Cell>,
    pub fun_fact: Option<String>,
}

impl BackLayout {
    pub fn compute(card: &Card) -> Self {
        let mut cells = Vec::with_capacity(4);
        if let Some(place) = card.lives_in() {
            cells.push(Cell::new("🏠", "Lives In", Color::from_rgb24(0x667eea), place));
        }
        if let Some(date) = card.date_of_birth() {
            let value = format_birthday(date).unwrap_or_else(|e| {
                tracing::debug!("{e}, printing it as written");
                date.to_string()
            });
            cells.push(Cell::new("🎂", "Birthday", Color::from_rgb24(0xf5576c), value));
        }
        if let Some(color) = card.favorite_color() {
            cells.push(Cell::new("🎨", "Favorite Color", resolve_color(color), color));
        }
        if let Some(hobby) = card.first_hobby() {
            cells.push(Cell::new("🌟", "Loves", Color::from_rgb24(0x43a047), hobby));
        }
        Self {
            cells,
            fun_fact: card.fun_fact().map(truncate_fun_fact),
        }
    }

    /// Grid cells plus the fun-fact callout.
    pub fn block_count(&self) -> usize {
        self.cells.len() + usize::from(self.fun_fact.is_some())
    }

    pub fn rows(&self) -> usize {
        self.cells.len().div_ceil(COLUMNS)
    }

    pub fn cell_rect(panel: Rect, index: usize) -> Rect {
        let (row, col) = (index / COLUMNS, index % COLUMNS);
        Rect::new(
            panel.x + GRID_PAD_X + col as f64 * CELL_WIDTH,
            panel.y + GRID_PAD_Y + row as f64 * ROW_HEIGHT,
            CELL_WIDTH,
            ROW_HEIGHT,
        )
    }

    /// The callout sits right under the last occupied row.
    pub fn callout_rect(&self, panel: Rect) -> Rect {
        let top = panel.y + GRID_PAD_Y + self.rows() as f64 * ROW_HEIGHT + CALLOUT_GAP;
        Rect::new(panel.x + GRID_PAD_X, top, panel.w - 2.0 * GRID_PAD_X, CALLOUT_HEIGHT)
    }
}

pub fn truncate_fun_fact(fact: &str) -> String {
    fact.chars().take(FUN_FACT_LIMIT).collect()
}

pub fn render_back<S: Surface + ?Sized>(s: &mut S, card: &Card, ctx: &FaceContext) -> Result<()> {
    draw_frame(s, ctx, BACK_BORDER)?;
    let panel = Rect::square(s.size()).inset(PANEL_INSET);
    s.fill_rounded_rect(panel, PANEL_RADIUS, PANEL_FILL)?;

    let layout = BackLayout::compute(card);
    for (i, cell) in layout.cells.iter().enumerate() {
        draw_cell(s, ctx.family, cell, BackLayout::cell_rect(panel, i))?;
    }
    if let Some(fact) = &layout.fun_fact {
        draw_fun_fact(s, ctx.family, fact, layout.callout_rect(panel))?;
    }
    Ok(())
}

fn draw_cell<S: Surface + ?Sized>(s: &mut S, family: &str, cell: &Cell, rect: Rect) -> Result<()> {
    let x = rect.center().x;
    let emoji = TextStyle { family, size: EMOJI_SIZE, bold: false };
    s.fill_text(&TextRun::centered(cell.emoji, emoji, Color::BLACK, Point::new(x, rect.y + 14.0)))?;

    let label = TextStyle { family, size: LABEL_SIZE, bold: true };
    s.fill_text(&TextRun::centered(cell.label, label, cell.label_color, Point::new(x, rect.y + 38.0)))?;

    let value = TextStyle { family, size: VALUE_SIZE, bold: false };
    let size = fit_text_size(s, &cell.value, value, rect.w - 8.0, VALUE_MIN_SIZE)?;
    let value = TextStyle { size, ..value };
    s.fill_text(&TextRun::centered(&cell.value, value, Color::BLACK, Point::new(x, rect.y + 58.0)))
}

fn draw_fun_fact<S: Surface + ?Sized>(s: &mut S, family: &str, fact: &str, rect: Rect) -> Result<()> {
    s.fill_rounded_rect(rect, CALLOUT_RADIUS, CALLOUT_FILL)?;

    let title_y = rect.y + 18.0;
    let glyph = TextStyle { family, size: 18.0, bold: false };
    s.fill_text(&TextRun {
        align: Align::Left,
        ..TextRun::centered("✨", glyph, Color::BLACK, Point::new(rect.x + 12.0, title_y))
    })?;
    let label = TextStyle { family, size: 13.0, bold: true };
    s.fill_text(&TextRun {
        align: Align::Left,
        ..TextRun::centered("Fun Fact", label, CALLOUT_LABEL, Point::new(rect.x + 38.0, title_y))
    })?;

    let body = TextStyle { family, size: FACT_SIZE, bold: false };
    s.fill_text(&TextRun {
        baseline: Baseline::Top,
        wrap: Some(rect.w - 24.0),
        ..TextRun::centered(fact, body, Color::BLACK, Point::new(rect.center().x, rect.y + 34.0))
    })
}
