use crate::data::Card;
use crate::error::{Error, Result};
use crate::pipeline::OutputMap;
use crate::render::Artifact;

use regex::{Captures, Regex};
use std::fs;
use std::path::PathBuf;
use std::sync::OnceLock;

/// Writes artifacts as `<prefix>/<pattern>.png`. Existing files are overwritten.
///
/// The pattern understands `{index}` (1-based, zero padded), `{name}` (slugified) and `{side}`.
#[derive(Debug, Clone)]
pub struct FileOutput {
    pub prefix: PathBuf,
    pub pattern: String,
}

fn placeholder() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| Regex::new(r"\{([^}]+)\}").expect("placeholder pattern is valid"))
}

impl FileOutput {
    pub fn new(prefix: impl Into<PathBuf>, pattern: impl Into<String>) -> Self {
        Self { prefix: prefix.into(), pattern: pattern.into() }
    }

    pub fn identify(&self, index: usize, card: &Card, artifact: &Artifact) -> String {
        placeholder()
            .replace_all(&self.pattern, |captures: &Captures| match &captures[1] {
                "index" => format!("{:03}", index + 1),
                "name" => slug(&card.name),
                "side" => artifact.side.to_string(),
                other => {
                    tracing::warn!("unknown placeholder `{{{other}}}` in output pattern");
                    String::new()
                }
            })
            .into_owned()
    }

    pub fn path(&self, index: usize, card: &Card, artifact: &Artifact) -> PathBuf {
        let mut path = self.prefix.join(self.identify(index, card, artifact));
        path.set_extension("png");
        path
    }
}

impl OutputMap for FileOutput {
    fn write(&self, index: usize, card: &Card, artifact: &Artifact) -> Result<()> {
        let path = self.path(index, card, artifact);
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| Error::output(dir, e))?;
        }
        fs::write(&path, &artifact.png).map_err(|e| Error::output(&path, e))?;
        tracing::debug!("wrote {}", path.display());
        Ok(())
    }
}

/// Lowercase letters and digits, runs of anything else collapsed into one `-`.
fn slug(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.trim().chars() {
        if c.is_alphanumeric() {
            out.extend(c.to_lowercase());
        } else if !out.is_empty() && !out.ends_with('-') {
            out.push('-');
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    if out.is_empty() {
        out.push_str("card");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Side;

    fn artifact(side: Side) -> Artifact {
        Artifact { side, width: 1, height: 1, png: vec![1, 2, 3] }
    }

    #[test]
    fn slugs() {
        assert_eq!(slug("Uncle Mike"), "uncle-mike");
        assert_eq!(slug("  O'Brien, Jr. "), "o-brien-jr");
        assert_eq!(slug("Zoë"), "zoë");
        assert_eq!(slug("!!!"), "card");
    }

    #[test]
    fn pattern_placeholders() {
        let out = FileOutput::new("out", "{index}-{name}-{side}");
        let card = Card::new("Uncle Mike");
        assert_eq!(out.identify(0, &card, &artifact(Side::Front)), "001-uncle-mike-front");
        assert_eq!(
            out.path(11, &card, &artifact(Side::Back)),
            PathBuf::from("out/012-uncle-mike-back.png")
        );
        let out = FileOutput::new("out", "{side}/{name}{nope}");
        assert_eq!(out.identify(0, &card, &artifact(Side::Back)), "back/uncle-mike");
    }

    #[test]
    fn writes_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let out = FileOutput::new(dir.path().join("deck"), "{name}-{side}");
        let card = Card::new("Aunt Jo");
        out.write(0, &card, &artifact(Side::Front)).unwrap();
        let again = Artifact { png: vec![9], ..artifact(Side::Front) };
        out.write(0, &card, &again).unwrap();
        let written = fs::read(dir.path().join("deck/aunt-jo-front.png")).unwrap();
        assert_eq!(written, vec![9]);
    }
}
