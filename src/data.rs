//! Card data and where it comes from.

pub mod card;
pub mod source;

pub use card::{Card, DeckStyle};
pub use source::CardSource;
