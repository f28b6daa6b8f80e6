use crate::data::{Card, CardSource};
use crate::error::{Error, Result};
use crate::pipeline::{DeckReport, OutputMap, Pipeline, Visitor};

use std::collections::VecDeque;
use std::num::NonZero;
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};

#[derive(Debug, Clone, Copy)]
pub struct ParallelismOptions {
    n_workers: usize,
    batch_size: usize,
}

impl ParallelismOptions {
    pub fn new(n_workers: NonZero<usize>) -> Self {
        let n_workers = Self::check_n_workers(n_workers);
        Self { n_workers, batch_size: n_workers * 2 }
    }

    pub fn n_workers(&self) -> usize {
        self.n_workers
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    fn check_n_workers(n_workers: NonZero<usize>) -> usize {
        let av_workers = thread::available_parallelism().unwrap_or(NonZero::<usize>::MIN);
        n_workers.min(av_workers).get()
    }

    pub fn set_batch_size(&mut self, batch_size: Option<NonZero<usize>>) {
        if let Some(batch_size) = batch_size {
            self.batch_size = batch_size.get();
        }
    }

    pub fn with_batch_size(mut self, batch_size: Option<NonZero<usize>>) -> Self {
        self.set_batch_size(batch_size);
        self
    }
}

impl<O, V> Pipeline<O, V>
where
    O: OutputMap + 'static,
    V: Visitor + 'static,
{
    /// Reads `source` on one thread and renders on `opt.n_workers()` others. Cards wait in a
    /// queue of at most `opt.batch_size()` entries.
    pub fn run_parallel(
        self,
        mut source: Box<dyn CardSource>,
        opt: ParallelismOptions,
    ) -> Result<PipelineJoinHandle<O, V>> {
        let pipeline = Arc::new(self);
        let report = Arc::new(Mutex::new(DeckReport::default()));
        let queue = Arc::new(CardQueue::new(opt.batch_size));

        let mut workers = Vec::with_capacity(opt.n_workers + 1);
        let reader = {
            let pipeline = pipeline.clone();
            let report = report.clone();
            let queue = queue.clone();
            let name = String::from("kindred-reader");
            thread::Builder::new()
                .name(name.clone())
                .spawn(move || {
                    pipeline.visitor.on_start(0);
                    let result = pipeline.feed(source.as_mut(), &queue, &report);
                    queue.done()?;
                    result
                })
                .map_err(|e| Error::thread_spawn(&name, e))?
        };
        workers.push(reader);

        for id in 1..=opt.n_workers {
            let pipeline = pipeline.clone();
            let report = report.clone();
            let queue = queue.clone();
            let name = format!("kindred-worker-{id}");
            let handle = thread::Builder::new()
                .name(name.clone())
                .spawn(move || {
                    pipeline.visitor.on_start(id);
                    let worker = Worker { id, queue, pipeline: &*pipeline, report: &*report };
                    let result = worker.run();
                    pipeline.visitor.on_finish(id, &result);
                    result
                })
                .map_err(|e| Error::thread_spawn(&name, e))?;
            workers.push(handle);
        }

        Ok(PipelineJoinHandle { pipeline, report, handles: workers })
    }

    fn feed(
        &self,
        source: &mut dyn CardSource,
        queue: &CardQueue,
        report: &Mutex<DeckReport>,
    ) -> Result<()> {
        let mut total = 0;
        let cards = source
            .read()?
            .filter(|card_res| self.visitor.on_read(card_res))
            .enumerate();
        for (i, card) in cards {
            total += 1;
            match card {
                Ok(card) => queue.push(i, card)?,
                Err(e) => self.read_failed(i, e, report)?,
            }
        }
        self.visitor.on_total(total);
        lock!("deck report" report).total = total;
        Ok(())
    }
}

pub struct PipelineJoinHandle<O: OutputMap, V: Visitor = ()> {
    pipeline: Arc<Pipeline<O, V>>,
    report: Arc<Mutex<DeckReport>>,
    handles: Vec<JoinHandle<Result<()>>>,
}

impl<O: OutputMap, V: Visitor> PipelineJoinHandle<O, V> {
    /// Waits for every thread. The reader's error wins over worker errors.
    pub fn join(self) -> Result<DeckReport> {
        let mut results = Vec::with_capacity(self.handles.len());
        for (i, handle) in self.handles.into_iter().enumerate() {
            results.push(handle.join().map_err(|_| Error::thread_join(i))?);
        }
        let base_result = results.into_iter().collect::<Result<()>>();
        self.pipeline.visitor.on_finish(0, &base_result);
        base_result?;

        let mut report = std::mem::take(&mut *lock!("deck report" self.report));
        report.sort();
        Ok(report)
    }
}

struct CardQueue {
    queue: Mutex<CardQueueState>,
    capacity: usize,
    cond: Condvar,
}

struct CardQueueState {
    queue: VecDeque<(usize, Card)>,
    done: bool,
}

impl CardQueueState {
    fn new(capacity: usize) -> Self {
        Self { queue: VecDeque::with_capacity(capacity), done: false }
    }
}

impl CardQueue {
    fn new(capacity: usize) -> Self {
        Self {
            queue: Mutex::new(CardQueueState::new(capacity)),
            capacity,
            cond: Condvar::new(),
        }
    }

    fn push(&self, index: usize, card: Card) -> Result<()> {
        let state = lock!("card queue" self.queue);
        let mut state = self
            .cond
            .wait_while(state, |s| s.queue.len() >= self.capacity)
            .map_err(|e| Error::mutex_lock("card queue", e))?;
        state.queue.push_back((index, card));
        self.cond.notify_all();
        Ok(())
    }

    fn pop(&self) -> Result<Option<(usize, Card)>> {
        let state = lock!("card queue" self.queue);
        let mut state = self
            .cond
            .wait_while(state, |s| s.queue.is_empty() && !s.done)
            .map_err(|e| Error::mutex_lock("card queue", e))?;
        let card = state.queue.pop_front();
        self.cond.notify_all();
        Ok(card)
    }

    fn done(&self) -> Result<()> {
        let mut state = lock!("card queue" self.queue);
        state.done = true;
        self.cond.notify_all();
        Ok(())
    }
}

struct Worker<'a, O: OutputMap, V: Visitor> {
    id: usize,
    queue: Arc<CardQueue>,
    pipeline: &'a Pipeline<O, V>,
    report: &'a Mutex<DeckReport>,
}

impl<O: OutputMap, V: Visitor> Worker<'_, O, V> {
    fn run(&self) -> Result<()> {
        while let Some((i, card)) = self.queue.pop()? {
            self.pipeline.render_card(self.id, i, card, self.report)?;
        }
        Ok(())
    }
}
