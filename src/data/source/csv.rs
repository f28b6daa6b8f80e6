//! Contains implementation for CSV as card data source.

use crate::assets::ImageRef;
use crate::data::{Card, CardSource};
use crate::error::{Error, Result};
use crate::image::ImagePosition;

use itertools::Itertools;
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Deserialize, Copy, Clone)]
pub struct CsvSourceConfig {
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    #[serde(default = "default_header")]
    pub header: bool,
}

fn default_delimiter() -> char {
    ','
}

fn default_header() -> bool {
    true
}

impl Default for CsvSourceConfig {
    fn default() -> Self {
        CsvSourceConfig {
            delimiter: default_delimiter(),
            header: default_header(),
        }
    }
}

/// One CSV row. Columns may appear in any order; all but `name` may be missing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CardRecord {
    pub name: String,
    pub photo: Option<String>,
    pub image_x: Option<f64>,
    pub image_y: Option<f64>,
    pub image_scale: Option<f64>,
    pub date_of_birth: Option<String>,
    pub favorite_color: Option<String>,
    pub hobbies: Option<String>,
    pub fun_fact: Option<String>,
    pub lives_in: Option<String>,
}

impl From<CardRecord> for Card {
    fn from(r: CardRecord) -> Self {
        Card {
            name: r.name,
            photo: r
                .photo
                .filter(|p| !p.trim().is_empty())
                .map(|p| ImageRef::parse(&p)),
            image_position: ImagePosition::new(
                r.image_x.unwrap_or(0.0),
                r.image_y.unwrap_or(0.0),
                r.image_scale.unwrap_or(1.0),
            ),
            date_of_birth: r.date_of_birth,
            favorite_color: r.favorite_color,
            hobbies: r.hobbies,
            fun_fact: r.fun_fact,
            lives_in: r.lives_in,
        }
    }
}

pub struct CsvSource<R = File> {
    reader: csv::Reader<R>,
}

impl CsvSource<File> {
    pub fn open(config: CsvSourceConfig, path: &impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let reader = Self::builder(config)
            .from_path(path)
            .map_err(|e| Error::source_open(path, e))?;
        Ok(Self { reader })
    }
}

impl<R: Read> CsvSource<R> {
    pub fn from_reader(config: CsvSourceConfig, rdr: R) -> Self {
        Self { reader: Self::builder(config).from_reader(rdr) }
    }

    fn builder(config: CsvSourceConfig) -> csv::ReaderBuilder {
        let mut builder = csv::ReaderBuilder::new();
        builder
            .delimiter(config.delimiter as u8)
            .has_headers(config.header)
            .trim(csv::Trim::Headers);
        builder
    }
}

impl<R: Read + Send> CardSource for CsvSource<R> {
    fn read(&mut self) -> Result<Box<dyn Iterator<Item = Result<Card>> + '_>> {
        let iterator = self
            .reader
            .deserialize::<CardRecord>()
            .map(|r| r.map_err(Error::record_read))
            .map_ok(Card::from);
        Ok(Box::new(iterator))
    }
}
