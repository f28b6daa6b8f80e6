use crate::data::CardSource;
use crate::error::{Error, Result};
use crate::pipeline::{DeckReport, OutputMap, Pipeline, Visitor};

use std::sync::Mutex;

impl<O: OutputMap, V: Visitor> Pipeline<O, V> {
    /// Renders every card of `source` on the calling thread.
    pub fn run(&self, source: &mut dyn CardSource) -> Result<DeckReport> {
        let report = Mutex::new(DeckReport::default());
        let result = self.run_internal(source, &report);
        self.visitor.on_finish(0, &result);
        result?;
        let mut report = report.into_inner().map_err(|e| Error::mutex_lock("deck report", e))?;
        report.sort();
        Ok(report)
    }

    fn run_internal(&self, source: &mut dyn CardSource, report: &Mutex<DeckReport>) -> Result<()> {
        self.visitor.on_start(0);
        let mut total = 0;
        let cards = source
            .read()?
            .filter(|card_res| self.visitor.on_read(card_res))
            .enumerate();
        for (i, card) in cards {
            total += 1;
            match card {
                Ok(card) => self.render_card(0, i, card, report)?,
                Err(e) => self.read_failed(i, e, report)?,
            }
        }
        self.visitor.on_total(total);
        lock!("deck report" report).total = total;
        Ok(())
    }
}
