//! Implements utilities to create color values.

use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: Option<f64>,
}

impl Color {
    pub const BLACK: Color = Color::from_rgb24(0x000000);
    pub const WHITE: Color = Color::from_rgb24(0xFFFFFF);

    /// Builds an opaque color from a `0xRRGGBB` literal.
    pub const fn from_rgb24(rgb: u32) -> Self {
        Self {
            r: ((rgb >> 16) & 0xFF) as f64 / 255.0,
            g: ((rgb >> 8) & 0xFF) as f64 / 255.0,
            b: (rgb & 0xFF) as f64 / 255.0,
            a: None,
        }
    }

    pub const fn with_alpha(self, a: f64) -> Self {
        Self { a: Some(a), ..self }
    }

    pub fn rgb(&self) -> (f64, f64, f64) {
        (self.r, self.g, self.b)
    }

    pub fn rgba(&self) -> (f64, f64, f64, f64) {
        (self.r, self.g, self.b, self.a.unwrap_or(1.0))
    }

    pub fn scaled_rgb(&self) -> (f64, f64, f64) {
        (self.r * 255.0, self.g * 255.0, self.b * 255.0)
    }

    pub fn alpha(&self) -> f64 {
        self.a.unwrap_or(1.0)
    }

    pub fn has_alpha(&self) -> bool {
        self.a.is_some()
    }
}

fn hex_pattern() -> &'static Regex {
    static HEX: OnceLock<Regex> = OnceLock::new();
    HEX.get_or_init(|| {
        Regex::new(r"^#([0-9a-fA-F]{2})([0-9a-fA-F]{2})([0-9a-fA-F]{2})([0-9a-fA-F]{2})?$")
            .expect("color pattern is valid")
    })
}

impl FromStr for Color {
    type Err = &'static str;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        const SHAPE: &str = "string not in form #RRGGBB or #RRGGBBAA";
        let captures = hex_pattern().captures(s).ok_or(SHAPE)?;
        let channel = |i: usize| -> Result<Option<f64>, Self::Err> {
            captures
                .get(i)
                .map(|m| u8::from_str_radix(m.as_str(), 16).map(|x| x as f64 / 255.0))
                .transpose()
                .map_err(|_| SHAPE)
        };
        let r = channel(1)?.unwrap_or(0.0);
        let g = channel(2)?.unwrap_or(0.0);
        let b = channel(3)?.unwrap_or(0.0);
        let a = channel(4)?;
        Ok(Color { r, g, b, a })
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self { r, g, b, a } = *self;
        let r = (r.clamp(0.0, 1.0) * 255.0).round() as u8;
        let g = (g.clamp(0.0, 1.0) * 255.0).round() as u8;
        let b = (b.clamp(0.0, 1.0) * 255.0).round() as u8;
        if let Some(a) = a {
            let a = (a.clamp(0.0, 1.0) * 255.0).round() as u8;
            write!(f, "#{:02X}{:02X}{:02X}{:02X}", r, g, b, a)
        } else {
            write!(f, "#{:02X}{:02X}{:02X}", r, g, b)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_prints_hex() {
        let c: Color = "#667EEA".parse().unwrap();
        assert_eq!(c, Color::from_rgb24(0x667EEA));
        assert_eq!(c.to_string(), "#667EEA");
        let c: Color = "#FFFFFF80".parse().unwrap();
        assert_eq!(c.to_string(), "#FFFFFF80");
    }

    #[test]
    fn rejects_other_shapes() {
        assert!("667EEA".parse::<Color>().is_err());
        assert!("#66".parse::<Color>().is_err());
    }
}
