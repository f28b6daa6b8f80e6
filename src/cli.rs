//! CLI implementation.
mod config;
mod output;
mod progress;

pub use crate::cli::config::Config;
pub use crate::cli::output::FileOutput;
use crate::cli::progress::{spawn_progress, ProgressVisitor};
use crate::assets::{AssetProvider, FsAssets};
use crate::data::source::CsvSource;
use crate::error::Result;
use crate::image::ImgBackend;
use crate::pipeline::{DeckReport, ParallelismOptions, Pipeline};
use crate::render::Rasterizer;
use crate::text::FontRegistry;

use clap::Parser;
use std::num::NonZero;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Render print-ready PNG images for every card of a deck
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[cfg(not(target_os = "windows"))]
    /// Deck name, corresponding to a folder in ~/.kindred,
    /// or the current folder if omitted.
    pub deck: Option<String>,

    #[cfg(target_os = "windows")]
    /// Deck name, corresponding to a folder in %APPDATA%/kindred,
    /// or the current folder if omitted.
    pub deck: Option<String>,

    /// CSV file with one card per row
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output images folder
    #[arg(short, long)]
    pub output: PathBuf,

    /// Number of worker threads
    #[arg(short, long, default_value = "4")]
    pub workers: NonZero<usize>,

    /// Device pixels per card unit, overriding deck.toml
    #[arg(long)]
    pub scale: Option<f64>,
}

macro_rules! error {
    ($res:expr) => {
        $res.unwrap_or_else(|e| panic!("{e}"))
    };
}

impl Cli {
    pub fn run() {
        std::panic::set_hook(Box::new(|panic_info| {
            if let Some(s) = panic_info.payload().downcast_ref::<String>() {
                eprintln!("{s}");
            } else {
                eprintln!("{panic_info}");
            }
        }));
        init_logging();

        let cli = Self::parse();
        let report = error!(cli.execute());
        for failed in &report.failed {
            eprintln!("card {} `{}`: {}", failed.index + 1, failed.name, failed.reason);
        }
        eprintln!(
            "{} of {} cards rendered, {} failed, {} skipped, {} unreadable",
            report.rendered.len(),
            report.total,
            report.failed.len(),
            report.skipped.len(),
            report.unreadable.len(),
        );
        if !report.is_complete() {
            std::process::exit(1);
        }
    }

    pub fn execute(&self) -> Result<DeckReport> {
        let (folder, mut config) = Config::find(self.deck.as_deref())?;
        if let Some(scale) = self.scale {
            config.render.scale = scale;
        }

        let backend = Arc::new(ImgBackend::new()?);
        let fonts = Arc::new(FontRegistry::new(Some(config.fonts_folder(&folder))));
        let assets = FsAssets::new(config.assets_folder(&folder)).with_timeout(config.render.load_timeout);
        let assets: Arc<dyn AssetProvider> = Arc::new(assets);
        let rasterizer = Rasterizer::new(backend, fonts, assets).with_options(config.render);

        let source = CsvSource::open(config.source.csv, &self.input)?;
        let output = FileOutput::new(&self.output, config.output.pattern.clone());
        let opt = ParallelismOptions::new(self.workers);

        let (tx, rx) = progress::channel();
        let n_workers = NonZero::new(opt.n_workers()).unwrap_or(NonZero::<usize>::MIN);
        let progress = spawn_progress(n_workers, rx);
        let visitor = ProgressVisitor::new(tx);

        let pipeline = Pipeline::new(rasterizer, config.deck.style, output, visitor);
        let report = pipeline.run_parallel(Box::new(source), opt)?.join();
        if let Ok(Err(e)) = progress.join() {
            tracing::debug!("progress bar unavailable: {e}");
        }
        report
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("logging unavailable: {e}");
    }
}
