//! Image references, theme backgrounds and the providers that fetch them.

use crate::error::{Error, Result};

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

/// Decorative backgrounds a deck can use.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Theme {
    Geometric,
    Organic,
    Rainbow,
    Mosaic,
    Space,
    Sports,
}

impl Theme {
    pub const ALL: [Theme; 6] = [
        Self::Geometric,
        Self::Organic,
        Self::Rainbow,
        Self::Mosaic,
        Self::Space,
        Self::Sports,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Self::Geometric => "geometric",
            Self::Organic => "organic",
            Self::Rainbow => "rainbow",
            Self::Mosaic => "mosaic",
            Self::Space => "space",
            Self::Sports => "sports",
        }
    }

    /// Background asset, relative to the asset root.
    pub fn background_path(self) -> &'static str {
        match self {
            Self::Geometric => "backgrounds/geometric.png",
            Self::Organic => "backgrounds/organic.png",
            Self::Rainbow => "backgrounds/rainbow.png",
            Self::Mosaic => "backgrounds/mosaic.png",
            Self::Space => "backgrounds/space.png",
            Self::Sports => "backgrounds/sports.png",
        }
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|t| t.id() == key)
            .ok_or_else(|| format!("unknown theme `{s}`"))
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Background image of a theme; `None` means a plain white card.
pub fn resolve_background(theme: Option<Theme>) -> Option<ImageRef> {
    theme.map(|t| ImageRef::Path(PathBuf::from(t.background_path())))
}

/// Something that can be turned into image bytes.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageRef {
    Bytes(Arc<[u8]>),
    Path(PathBuf),
    Url(String),
}

impl ImageRef {
    /// Interprets a stored photo reference: `http(s)://` URLs, `file://` URLs or plain paths.
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        if s.starts_with("http://") || s.starts_with("https://") {
            Self::Url(s.to_string())
        } else if let Some(path) = s.strip_prefix("file://") {
            Self::Path(PathBuf::from(path))
        } else {
            Self::Path(PathBuf::from(s))
        }
    }
}

impl From<Vec<u8>> for ImageRef {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes.into())
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bytes(b) => write!(f, "<{} bytes>", b.len()),
            Self::Path(p) => write!(f, "{}", p.display()),
            Self::Url(u) => f.write_str(u),
        }
    }
}

/// Fetches the bytes behind an [`ImageRef`].
pub trait AssetProvider: Send + Sync {
    fn fetch(&self, image: &ImageRef) -> Result<Vec<u8>>;
}

/// Reads paths relative to an asset root, and URLs when built with the `http` feature.
pub struct FsAssets {
    root: PathBuf,
    timeout: Duration,
    #[cfg(feature = "http")]
    client: Option<reqwest::blocking::Client>,
}

impl FsAssets {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            timeout: DEFAULT_LOAD_TIMEOUT,
            #[cfg(feature = "http")]
            client: http_client(DEFAULT_LOAD_TIMEOUT),
        }
    }

    /// Caps each URL request at `timeout`.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        Self {
            timeout,
            #[cfg(feature = "http")]
            client: http_client(timeout),
            ..self
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    #[cfg(feature = "http")]
    fn fetch_url(&self, url: &str) -> Result<Vec<u8>> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| Error::asset_open(url, "http client unavailable"))?;
        let response = client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| Error::asset_open(url, e))?;
        let bytes = response.bytes().map_err(|e| Error::asset_open(url, e))?;
        Ok(bytes.to_vec())
    }

    #[cfg(not(feature = "http"))]
    fn fetch_url(&self, url: &str) -> Result<Vec<u8>> {
        Err(Error::UnsupportedRef(format!("{url} (built without `http`)")))
    }
}

#[cfg(feature = "http")]
fn http_client(timeout: Duration) -> Option<reqwest::blocking::Client> {
    reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| tracing::warn!("http client unavailable: {e}"))
        .ok()
}

impl AssetProvider for FsAssets {
    fn fetch(&self, image: &ImageRef) -> Result<Vec<u8>> {
        match image {
            ImageRef::Bytes(bytes) => Ok(bytes.to_vec()),
            ImageRef::Path(path) => {
                let path = self.resolve(path);
                fs::read(&path).map_err(|e| Error::asset_open(path.display(), e))
            }
            ImageRef::Url(url) => self.fetch_url(url),
        }
    }
}

pub const DEFAULT_LOAD_TIMEOUT: Duration = Duration::from_secs(10);

/// Fetches `image` on a helper thread and gives up after `timeout`.
///
/// A fetch that times out keeps running in the background until the provider returns;
/// its result is discarded.
pub fn fetch_with_timeout(
    provider: &Arc<dyn AssetProvider>,
    image: &ImageRef,
    timeout: Duration,
) -> Result<Vec<u8>> {
    if let ImageRef::Bytes(bytes) = image {
        return Ok(bytes.to_vec());
    }
    let (tx, rx) = mpsc::channel();
    let provider = Arc::clone(provider);
    let target = image.clone();
    thread::Builder::new()
        .name("kindred-fetch".into())
        .spawn(move || {
            let _ = tx.send(provider.fetch(&target));
        })
        .map_err(|e| Error::asset_open(image, e))?;
    match rx.recv_timeout(timeout) {
        Ok(result) => result,
        Err(mpsc::RecvTimeoutError::Timeout) => Err(Error::LoadTimeout(image.to_string(), timeout)),
        Err(mpsc::RecvTimeoutError::Disconnected) => {
            Err(Error::asset_open(image, "loader thread exited"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Slow(Duration);

    impl AssetProvider for Slow {
        fn fetch(&self, _image: &ImageRef) -> Result<Vec<u8>> {
            thread::sleep(self.0);
            Ok(vec![1, 2, 3])
        }
    }

    #[test]
    fn every_theme_has_a_distinct_background() {
        let paths: std::collections::HashSet<_> =
            Theme::ALL.iter().map(|t| t.background_path()).collect();
        assert_eq!(paths.len(), 6);
        assert_eq!(
            resolve_background(Some(Theme::Space)),
            Some(ImageRef::Path("backgrounds/space.png".into()))
        );
        assert_eq!(resolve_background(None), None);
    }

    #[test]
    fn theme_names_parse_leniently() {
        assert_eq!(" Rainbow".parse::<Theme>().unwrap(), Theme::Rainbow);
        assert!("plaid".parse::<Theme>().is_err());
    }

    #[test]
    fn parses_references() {
        assert_eq!(ImageRef::parse("https://x.test/a.jpg"), ImageRef::Url("https://x.test/a.jpg".into()));
        assert_eq!(ImageRef::parse("file:///tmp/a.png"), ImageRef::Path("/tmp/a.png".into()));
        assert_eq!(ImageRef::parse(" photos/mike.jpg "), ImageRef::Path("photos/mike.jpg".into()));
    }

    #[test]
    fn reads_relative_paths_from_root() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.bin"), b"abc").unwrap();
        let assets = FsAssets::new(dir.path());
        assert_eq!(assets.fetch(&ImageRef::Path("a.bin".into())).unwrap(), b"abc");
        assert!(assets.fetch(&ImageRef::Path("missing.bin".into())).is_err());
    }

    #[test]
    fn request_timeout_follows_the_render_options() {
        let assets = FsAssets::new("assets");
        assert_eq!(assets.timeout(), DEFAULT_LOAD_TIMEOUT);
        let assets = assets.with_timeout(Duration::from_millis(2500));
        assert_eq!(assets.timeout(), Duration::from_millis(2500));
        assert_eq!(assets.root(), Path::new("assets"));
        #[cfg(feature = "http")]
        assert!(assets.client.is_some());
    }

    #[test]
    fn slow_fetches_time_out() {
        let provider: Arc<dyn AssetProvider> = Arc::new(Slow(Duration::from_millis(500)));
        let image = ImageRef::Path("slow.png".into());
        let result = fetch_with_timeout(&provider, &image, Duration::from_millis(20));
        assert!(matches!(result, Err(Error::LoadTimeout(..))));

        let provider: Arc<dyn AssetProvider> = Arc::new(Slow(Duration::ZERO));
        let result = fetch_with_timeout(&provider, &image, Duration::from_secs(5));
        assert_eq!(result.unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn inline_bytes_skip_the_provider() {
        let provider: Arc<dyn AssetProvider> = Arc::new(Slow(Duration::from_secs(60)));
        let image = ImageRef::from(vec![9, 9]);
        let result = fetch_with_timeout(&provider, &image, Duration::from_millis(1));
        assert_eq!(result.unwrap(), vec![9, 9]);
    }
}
