//! # Kindred
//!
//! Renders family trading cards to print-ready images. Each [`data::Card`] becomes a front face
//! (photo and glowing name) and a back face (attribute grid and fun fact), both as PNG.
//!
//! Start from [`render::Rasterizer::generate`] for single cards, or [`pipeline::Pipeline`] to
//! render a whole deck.

pub mod assets;
#[cfg(feature = "cli")]
pub mod cli;
pub mod data;
pub mod error;
pub mod image;
#[cfg(feature = "cli")]
pub mod logs;
pub mod pipeline;
pub mod render;
pub mod surface;
pub mod text;

pub use error::{Error, Result};
