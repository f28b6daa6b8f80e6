//! Contains implementations for different card sources.

#[cfg(feature = "csv")]
mod csv;

#[cfg(feature = "csv")]
pub use crate::data::source::csv::{CardRecord, CsvSource, CsvSourceConfig};
use crate::data::Card;
use crate::error::Result;

/// Yields the cards of one deck, in deck order.
pub trait CardSource: Send {
    fn read(&mut self) -> Result<Box<dyn Iterator<Item = Result<Card>> + '_>>;
}

impl CardSource for Vec<Card> {
    fn read(&mut self) -> Result<Box<dyn Iterator<Item = Result<Card>> + '_>> {
        Ok(Box::new(self.drain(..).map(Ok)))
    }
}
