//! Contains representations for card data.

use crate::assets::{ImageRef, Theme};
use crate::image::ImagePosition;
use crate::text::FontFace;

use serde::{Deserialize, Deserializer};
use std::fmt::Display;
use std::str::FromStr;

/// One person's profile, rendered as the front and back of a physical card.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Card {
    pub name: String,
    pub photo: Option<ImageRef>,
    pub image_position: ImagePosition,
    pub date_of_birth: Option<String>,
    pub favorite_color: Option<String>,
    pub hobbies: Option<String>,
    pub fun_fact: Option<String>,
    /// Where the person lives, or how they relate to the recipient.
    pub lives_in: Option<String>,
}

impl Card {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Default::default() }
    }

    /// A card whose name is empty or whitespace carries no data to print.
    pub fn is_blank(&self) -> bool {
        self.name.trim().is_empty()
    }

    pub fn lives_in(&self) -> Option<&str> {
        present(&self.lives_in)
    }

    pub fn date_of_birth(&self) -> Option<&str> {
        present(&self.date_of_birth)
    }

    pub fn favorite_color(&self) -> Option<&str> {
        present(&self.favorite_color)
    }

    pub fn fun_fact(&self) -> Option<&str> {
        present(&self.fun_fact)
    }

    /// The first non-empty entry of the comma-separated hobby list.
    pub fn first_hobby(&self) -> Option<&str> {
        present(&self.hobbies)?
            .split(',')
            .map(str::trim)
            .find(|h| !h.is_empty())
    }
}

fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Styling shared by every card of a deck.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct DeckStyle {
    #[serde(default, deserialize_with = "lenient")]
    pub theme: Option<Theme>,
    #[serde(default, deserialize_with = "lenient")]
    pub font: Option<FontFace>,
}

impl DeckStyle {
    pub fn new(theme: Option<Theme>, font: Option<FontFace>) -> Self {
        Self { theme, font }
    }
}

/// Deserializes an optional identifier, treating unknown or empty values as absent.
pub fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_lenient))
}

pub fn parse_lenient<T>(raw: &str) -> Option<T>
where
    T: FromStr,
    T::Err: Display,
{
    if raw.trim().is_empty() {
        return None;
    }
    raw.parse::<T>()
        .map_err(|e| tracing::warn!("{e}, ignoring it"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_names() {
        assert!(Card::new("").is_blank());
        assert!(Card::new(" \t ").is_blank());
        assert!(!Card::new("Uncle Mike").is_blank());
    }

    #[test]
    fn empty_attributes_are_absent() {
        let card = Card {
            favorite_color: Some("  ".into()),
            lives_in: Some(" Boston, MA ".into()),
            ..Card::new("A")
        };
        assert_eq!(card.favorite_color(), None);
        assert_eq!(card.lives_in(), Some("Boston, MA"));
        assert_eq!(card.date_of_birth(), None);
    }

    #[test]
    fn first_hobby_skips_empty_entries() {
        let mut card = Card::new("A");
        card.hobbies = Some("Guitar, Hiking".into());
        assert_eq!(card.first_hobby(), Some("Guitar"));
        card.hobbies = Some(" , Chess,".into());
        assert_eq!(card.first_hobby(), Some("Chess"));
        card.hobbies = Some(" , ".into());
        assert_eq!(card.first_hobby(), None);
    }

    #[test]
    #[cfg(feature = "cli")]
    fn deck_style_ignores_unknown_ids() {
        let style: DeckStyle = toml::from_str("theme = \"plaid\"\nfont = \"luckiest-guy\"").unwrap();
        assert_eq!(style, DeckStyle::new(None, Some(FontFace::LuckiestGuy)));
        let style: DeckStyle = toml::from_str("theme = \"geometric\"").unwrap();
        assert_eq!(style, DeckStyle::new(Some(Theme::Geometric), None));
    }
}
