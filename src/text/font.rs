//! Display faces and the shared font registry.

use fontconfig::Fontconfig;
use fontconfig_sys::fontconfig as sys;
use std::collections::HashMap;
use std::ffi::CString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Mutex, PoisonError};

/// Family used when a deck has no face, or its face cannot be found anywhere.
pub const DEFAULT_FAMILY: &str = "Sans";

/// The display faces a deck can pick from.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FontFace {
    Bubblegum,
    LuckiestGuy,
    FredokaOne,
    Fredoka,
    ComicNeue,
    Kalam,
    Pangolin,
    Boogaloo,
}

impl FontFace {
    pub const ALL: [FontFace; 8] = [
        Self::Bubblegum,
        Self::LuckiestGuy,
        Self::FredokaOne,
        Self::Fredoka,
        Self::ComicNeue,
        Self::Kalam,
        Self::Pangolin,
        Self::Boogaloo,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Self::Bubblegum => "bubblegum",
            Self::LuckiestGuy => "luckiest-guy",
            Self::FredokaOne => "fredoka-one",
            Self::Fredoka => "fredoka",
            Self::ComicNeue => "comic-neue",
            Self::Kalam => "kalam",
            Self::Pangolin => "pangolin",
            Self::Boogaloo => "boogaloo",
        }
    }

    /// Family name as registered by the font file.
    pub fn family(self) -> &'static str {
        match self {
            Self::Bubblegum => "Bubblegum Sans",
            Self::LuckiestGuy => "Luckiest Guy",
            Self::FredokaOne => "Fredoka One",
            Self::Fredoka => "Fredoka",
            Self::ComicNeue => "Comic Neue",
            Self::Kalam => "Kalam",
            Self::Pangolin => "Pangolin",
            Self::Boogaloo => "Boogaloo",
        }
    }

    /// File name looked up in the fonts folder.
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Bubblegum => "BubblegumSans-Regular.ttf",
            Self::LuckiestGuy => "LuckiestGuy-Regular.ttf",
            Self::FredokaOne => "FredokaOne-Regular.ttf",
            Self::Fredoka => "Fredoka-Regular.ttf",
            Self::ComicNeue => "ComicNeue-Bold.ttf",
            Self::Kalam => "Kalam-Bold.ttf",
            Self::Pangolin => "Pangolin-Regular.ttf",
            Self::Boogaloo => "Boogaloo-Regular.ttf",
        }
    }
}

impl FromStr for FontFace {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|f| f.id() == key)
            .ok_or_else(|| format!("unknown font `{s}`"))
    }
}

impl fmt::Display for FontFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Where a [`FontHandle`] got its family from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontOrigin {
    File(PathBuf),
    System,
    Fallback,
}

/// A family name that is ready to be used for text layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontHandle {
    pub face: Option<FontFace>,
    pub family: String,
    pub origin: FontOrigin,
}

impl FontHandle {
    pub fn fallback(face: Option<FontFace>) -> Self {
        Self {
            face,
            family: DEFAULT_FAMILY.to_string(),
            origin: FontOrigin::Fallback,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.origin == FontOrigin::Fallback
    }
}

struct FontState {
    fc: Option<Fontconfig>,
    loaded: HashMap<FontFace, FontHandle>,
}

/// Registers deck faces with fontconfig, once per face and process.
///
/// Registration is additive: once a face is loaded every later caller, on any thread,
/// gets the same handle back without touching fontconfig again.
pub struct FontRegistry {
    folder: Option<PathBuf>,
    state: Mutex<FontState>,
}

impl FontRegistry {
    /// Creates a registry that looks for font files in `folder` before asking the system.
    pub fn new(folder: Option<PathBuf>) -> Self {
        let fc = Fontconfig::new();
        if fc.is_none() {
            tracing::warn!("fontconfig failed to initialise, all text uses {DEFAULT_FAMILY}");
        }
        Self {
            folder,
            state: Mutex::new(FontState { fc, loaded: HashMap::new() }),
        }
    }

    pub fn folder(&self) -> Option<&Path> {
        self.folder.as_deref()
    }

    /// Makes `face` available for layout and returns its handle. Never fails: a face that
    /// cannot be found resolves to [`DEFAULT_FAMILY`].
    pub fn ensure_loaded(&self, face: Option<FontFace>) -> FontHandle {
        let Some(face) = face else {
            return FontHandle::fallback(None);
        };
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = state.loaded.get(&face) {
            return handle.clone();
        }
        let handle = self.load(&state, face);
        state.loaded.insert(face, handle.clone());
        handle
    }

    fn load(&self, state: &FontState, face: FontFace) -> FontHandle {
        let Some(fc) = state.fc.as_ref() else {
            return FontHandle::fallback(Some(face));
        };
        let family = face.family();
        if let Some(path) = self.folder.as_ref().map(|f| f.join(face.file_name())) {
            if path.exists() {
                if Self::add_app_font(&path) && Self::resolves(fc, family) {
                    tracing::debug!(font = %face, path = %path.display(), "registered font file");
                    return FontHandle {
                        face: Some(face),
                        family: family.to_string(),
                        origin: FontOrigin::File(path),
                    };
                }
                tracing::warn!(font = %face, path = %path.display(), "failed to register font file");
            }
        }
        if Self::resolves(fc, family) {
            tracing::debug!(font = %face, "using installed font");
            return FontHandle {
                face: Some(face),
                family: family.to_string(),
                origin: FontOrigin::System,
            };
        }
        tracing::warn!(font = %face, "font not found, falling back to {DEFAULT_FAMILY}");
        FontHandle::fallback(Some(face))
    }

    fn resolves(fc: &Fontconfig, family: &str) -> bool {
        fc.find(family, None)
            .is_some_and(|font| font.name.eq_ignore_ascii_case(family))
    }

    fn add_app_font(path: &Path) -> bool {
        let Ok(c_fp) = CString::new(path.to_string_lossy().to_string()) else {
            return false;
        };
        // SAFETY: a null config means the current default config; the path outlives the call
        let status = unsafe {
            sys::FcConfigAppFontAddFile(std::ptr::null_mut(), c_fp.as_ptr() as *const sys::FcChar8)
        };
        status != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn face_ids_round_trip_through_from_str() {
        for face in FontFace::ALL {
            assert_eq!(face.id().parse::<FontFace>().unwrap(), face);
        }
        assert_eq!(" Luckiest-Guy ".parse::<FontFace>().unwrap(), FontFace::LuckiestGuy);
        assert!("papyrus".parse::<FontFace>().is_err());
    }

    #[test]
    fn absent_face_is_the_default_family() {
        let registry = FontRegistry::new(None);
        let handle = registry.ensure_loaded(None);
        assert_eq!(handle.family, DEFAULT_FAMILY);
        assert!(handle.is_fallback());
    }

    #[test]
    fn loads_are_memoized() {
        let dir = tempfile::tempdir().unwrap();
        let registry = FontRegistry::new(Some(dir.path().to_path_buf()));
        let first = registry.ensure_loaded(Some(FontFace::Kalam));
        let second = registry.ensure_loaded(Some(FontFace::Kalam));
        assert_eq!(first, second);
        assert!(!matches!(first.origin, FontOrigin::File(_)));
    }

    #[test]
    fn concurrent_callers_share_one_handle() {
        let registry = FontRegistry::new(None);
        let handles: Vec<FontHandle> = std::thread::scope(|s| {
            let workers: Vec<_> = (0..4)
                .map(|_| s.spawn(|| registry.ensure_loaded(Some(FontFace::Pangolin))))
                .collect();
            workers.into_iter().map(|w| w.join().unwrap()).collect()
        });
        assert!(handles.windows(2).all(|w| w[0] == w[1]));
    }
}
