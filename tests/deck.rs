use kindred::assets::FsAssets;
use kindred::data::{Card, DeckStyle};
use kindred::image::ImgBackend;
use kindred::pipeline::{OutputMap, ParallelismOptions, Pipeline, Visitor};
use kindred::render::{Artifact, Rasterizer, RenderOptions, Side};
use kindred::text::FontRegistry;
use kindred::{Error, Result};

use std::num::NonZero;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock};

fn backend() -> Arc<ImgBackend> {
    static BACKEND: OnceLock<Arc<ImgBackend>> = OnceLock::new();
    BACKEND
        .get_or_init(|| Arc::new(ImgBackend::new().expect("libvips should start")))
        .clone()
}

fn rasterizer(options: RenderOptions) -> Rasterizer {
    let assets = Arc::new(FsAssets::new(std::env::temp_dir().join("kindred-no-assets")));
    Rasterizer::new(backend(), Arc::new(FontRegistry::new(None)), assets).with_options(options)
}

#[derive(Default)]
struct Memory(Mutex<Vec<(usize, Side, u32)>>);

impl OutputMap for Memory {
    fn write(&self, index: usize, _card: &Card, artifact: &Artifact) -> Result<()> {
        self.0.lock().unwrap().push((index, artifact.side, artifact.width));
        Ok(())
    }
}

impl Memory {
    fn written(&self) -> Vec<(usize, Side, u32)> {
        let mut written = self.0.lock().unwrap().clone();
        written.sort_by_key(|(i, side, _)| (*i, *side == Side::Back));
        written
    }
}

#[derive(Default)]
struct Counter {
    ok: AtomicUsize,
    failed: AtomicUsize,
    skipped: AtomicUsize,
    total: AtomicUsize,
}

impl Visitor for Counter {
    fn on_skip(&self, _index: usize, e: &Error) {
        assert!(matches!(e, Error::BlankName(_)));
        self.skipped.fetch_add(1, Ordering::SeqCst);
    }

    fn on_total(&self, total: usize) {
        self.total.store(total, Ordering::SeqCst);
    }

    fn on_iter_ok(&self, _worker: usize, _index: usize, _card: &Card) {
        self.ok.fetch_add(1, Ordering::SeqCst);
    }

    fn on_iter_err(&self, _worker: usize, _index: usize, _card: &Card, e: &Error) {
        assert!(matches!(e, Error::PartialRender(..)));
        self.failed.fetch_add(1, Ordering::SeqCst);
    }
}

fn deck() -> Vec<Card> {
    vec![
        Card { hobbies: Some("Chess".into()), ..Card::new("Aunt Jo") },
        Card::new("  "),
        Card { fun_fact: Some("Has a pet owl".into()), ..Card::new("Grandpa Joe") },
    ]
}

#[test]
fn sequential_run_renders_and_skips() {
    let options = RenderOptions { scale: 0.5, ..Default::default() };
    let pipeline = Pipeline::new(rasterizer(options), DeckStyle::default(), Memory::default(), Counter::default());
    let report = pipeline.run(&mut deck()).unwrap();

    assert_eq!(report.total, 3);
    assert_eq!(report.rendered, vec![0, 2]);
    assert_eq!(report.skipped, vec![1]);
    assert!(report.failed.is_empty());
    assert!(!report.is_complete());

    assert_eq!(
        pipeline.output().written(),
        vec![(0, Side::Front, 180), (0, Side::Back, 180), (2, Side::Front, 180), (2, Side::Back, 180)]
    );
    let counter = pipeline.visitor();
    assert_eq!(counter.ok.load(Ordering::SeqCst), 2);
    assert_eq!(counter.skipped.load(Ordering::SeqCst), 1);
    assert_eq!(counter.total.load(Ordering::SeqCst), 3);
}

#[test]
fn parallel_run_matches_sequential() {
    let options = RenderOptions { scale: 0.5, ..Default::default() };
    let mut cards = deck();
    cards.extend((0..5).map(|i| Card::new(format!("Cousin #{i}"))));
    let pipeline = Pipeline::new(rasterizer(options), DeckStyle::default(), Memory::default(), ());
    let opt = ParallelismOptions::new(NonZero::new(3).unwrap());
    let report = pipeline.run_parallel(Box::new(cards), opt).unwrap().join().unwrap();

    assert_eq!(report.total, 8);
    assert_eq!(report.rendered, vec![0, 2, 3, 4, 5, 6, 7]);
    assert_eq!(report.skipped, vec![1]);
}

#[test]
fn missing_faces_are_reported_not_ignored() {
    let options = RenderOptions { scale: 0.0, ..Default::default() };
    let pipeline = Pipeline::new(rasterizer(options), DeckStyle::default(), Memory::default(), Counter::default());
    let report = pipeline.run(&mut vec![Card::new("Uncle Mike")]).unwrap();

    assert!(report.rendered.is_empty());
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].name, "Uncle Mike");
    assert!(report.failed[0].reason.contains("front and back"));
    assert!(pipeline.output().written().is_empty());
    assert_eq!(pipeline.visitor().failed.load(Ordering::SeqCst), 1);
}

#[cfg(feature = "cli")]
#[test]
fn csv_deck_to_files() {
    use kindred::cli::FileOutput;
    use kindred::data::source::{CsvSource, CsvSourceConfig};

    let csv = "\
name,lives_in,date_of_birth,favorite_color,hobbies,fun_fact
Uncle Mike,\"Boston, MA\",1985-03-15,green,\"Guitar, Hiking\",Plays 5 instruments!
Grandma Rose,Ohio,not a date,sky blue,,
";
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("cards");
    let options = RenderOptions { scale: 0.5, ..Default::default() };
    let pipeline = Pipeline::new(
        rasterizer(options),
        DeckStyle::default(),
        FileOutput::new(&out, "{index}-{name}-{side}"),
        (),
    );
    let mut source = CsvSource::from_reader(CsvSourceConfig::default(), csv.as_bytes());
    let report = pipeline.run(&mut source).unwrap();
    assert!(report.is_complete());

    for name in [
        "001-uncle-mike-front.png",
        "001-uncle-mike-back.png",
        "002-grandma-rose-front.png",
        "002-grandma-rose-back.png",
    ] {
        let png = std::fs::read(out.join(name)).unwrap();
        let reader = png::Decoder::new(png.as_slice()).read_info().unwrap();
        assert_eq!((reader.info().width, reader.info().height), (180, 180));
    }
}
