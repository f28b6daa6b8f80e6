//! Renders whole decks: one [`Rasterizer::generate`] call per card, artifacts handed to an
//! [`OutputMap`], progress reported to a [`Visitor`].

macro_rules! lock {
    ($T:literal $lock:expr) => {
        $lock.lock().map_err(|e| Error::mutex_lock($T, e))?
    };
}

mod parallel;
mod sequential;

pub use parallel::{ParallelismOptions, PipelineJoinHandle};

use crate::data::{Card, DeckStyle};
use crate::error::{Error, Result};
use crate::render::{Artifact, Rasterizer};

use std::sync::Mutex;

/// Receives every artifact the pipeline produces.
pub trait OutputMap: Send + Sync {
    /// `index` is the card's position in the source.
    fn write(&self, index: usize, card: &Card, artifact: &Artifact) -> Result<()>;
}

/// Hooks into the pipeline's progress. `worker` is 0 for the reading thread.
#[allow(unused_variables)]
pub trait Visitor: Send + Sync {
    fn on_start(&self, worker: usize) {}
    /// Return `false` to drop a record before it gets an index.
    fn on_read(&self, card: &Result<Card>) -> bool {
        true
    }
    fn on_read_err(&self, index: usize, e: &Error) {}
    fn on_skip(&self, index: usize, e: &Error) {}
    fn on_total(&self, total: usize) {}
    fn on_iter_start(&self, worker: usize, index: usize, card: &Card) {}
    fn on_iter_ok(&self, worker: usize, index: usize, card: &Card) {}
    fn on_iter_err(&self, worker: usize, index: usize, card: &Card, e: &Error) {}
    fn on_finish(&self, worker: usize, result: &Result<()>) {}
}

impl Visitor for () {}

/// A card that was rendered only partly, or not at all.
#[derive(Debug, Clone, PartialEq)]
pub struct FailedCard {
    pub index: usize,
    pub name: String,
    pub reason: String,
}

/// Outcome of a deck run. A deck can only be printed when [`DeckReport::is_complete`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeckReport {
    pub total: usize,
    pub rendered: Vec<usize>,
    pub failed: Vec<FailedCard>,
    /// Cards with a blank name.
    pub skipped: Vec<usize>,
    /// Records the source could not turn into cards.
    pub unreadable: Vec<usize>,
}

impl DeckReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty() && self.skipped.is_empty() && self.unreadable.is_empty()
    }

    fn sort(&mut self) {
        self.rendered.sort_unstable();
        self.failed.sort_by_key(|f| f.index);
        self.skipped.sort_unstable();
        self.unreadable.sort_unstable();
    }
}

pub struct Pipeline<O: OutputMap, V: Visitor = ()> {
    rasterizer: Rasterizer,
    style: DeckStyle,
    output: O,
    visitor: V,
}

impl<O: OutputMap, V: Visitor> Pipeline<O, V> {
    pub fn new(rasterizer: Rasterizer, style: DeckStyle, output: O, visitor: V) -> Self {
        Self { rasterizer, style, output, visitor }
    }

    pub fn visitor(&self) -> &V {
        &self.visitor
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    fn read_failed(&self, index: usize, e: Error, report: &Mutex<DeckReport>) -> Result<()> {
        self.visitor.on_read_err(index, &e);
        lock!("deck report" report).unreadable.push(index);
        Ok(())
    }

    fn render_card(
        &self,
        worker: usize,
        index: usize,
        card: Card,
        report: &Mutex<DeckReport>,
    ) -> Result<()> {
        if card.is_blank() {
            self.visitor.on_skip(index, &Error::BlankName(index));
            lock!("deck report" report).skipped.push(index);
            return Ok(());
        }
        self.visitor.on_iter_start(worker, index, &card);
        match self.process(index, &card) {
            Ok(()) => {
                self.visitor.on_iter_ok(worker, index, &card);
                lock!("deck report" report).rendered.push(index);
            }
            Err(e) => {
                self.visitor.on_iter_err(worker, index, &card, &e);
                lock!("deck report" report).failed.push(FailedCard {
                    index,
                    name: card.name.trim().to_string(),
                    reason: e.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Writes whatever faces were rendered, then reports any that are missing.
    fn process(&self, index: usize, card: &Card) -> Result<()> {
        let artifacts = self.rasterizer.generate(card, &self.style);
        let missing = artifacts.missing();
        for artifact in artifacts.faces() {
            self.output.write(index, card, &artifact)?;
        }
        let side = match missing.as_slice() {
            [] => return Ok(()),
            [side] => side.id(),
            _ => "front and back",
        };
        Err(Error::PartialRender(card.name.trim().to_string(), side))
    }
}
