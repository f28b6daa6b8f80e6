//! Fonts and text formatting for card faces.

pub mod date;
mod font;

pub use date::format_birthday;
pub use font::{FontFace, FontHandle, FontOrigin, FontRegistry, DEFAULT_FAMILY};
