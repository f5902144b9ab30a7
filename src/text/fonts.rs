use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context;

use crate::{
    foundation::error::{PosterError, PosterResult},
    scene::model::{FontStyle, FontWeight},
};

/// System fallbacks tried after the configured fonts directory.
pub const DEFAULT_SYSTEM_FONT_DIRS: [&str; 2] = [
    "/usr/share/fonts/truetype/dejavu",
    "/usr/share/fonts/truetype/liberation",
];

/// Font file bytes plus the path they were read from.
#[derive(Clone, Debug)]
pub struct LoadedFont {
    /// Resolved file.
    pub path: PathBuf,
    /// Raw font data.
    pub bytes: Arc<Vec<u8>>,
}

/// Resolves `(family, weight, style)` to a font file and caches the bytes.
#[derive(Debug, Default)]
pub struct FontLibrary {
    fonts_dir: Option<PathBuf>,
    system_dirs: Vec<PathBuf>,
    loaded: HashMap<PathBuf, Arc<Vec<u8>>>,
}

/// File-name suffix for a variant.
pub fn variant_suffix(weight: FontWeight, style: FontStyle) -> &'static str {
    match (weight, style) {
        (FontWeight::Bold, FontStyle::Italic) => "-BoldItalic",
        (FontWeight::Bold, FontStyle::Normal) => "-Bold",
        (FontWeight::Normal, FontStyle::Italic) => "-Italic",
        (FontWeight::Normal, FontStyle::Normal) => "",
    }
}

impl FontLibrary {
    /// Library searching `fonts_dir` first, then the default system directories.
    pub fn new(fonts_dir: Option<PathBuf>) -> Self {
        Self::with_system_dirs(
            fonts_dir,
            DEFAULT_SYSTEM_FONT_DIRS.iter().map(PathBuf::from).collect(),
        )
    }

    /// Library with explicit system fallback directories.
    pub fn with_system_dirs(fonts_dir: Option<PathBuf>, system_dirs: Vec<PathBuf>) -> Self {
        Self {
            fonts_dir,
            system_dirs,
            loaded: HashMap::new(),
        }
    }

    /// Every path tried, in priority order.
    pub fn candidates(&self, family: &str, weight: FontWeight, style: FontStyle) -> Vec<PathBuf> {
        let suffix = variant_suffix(weight, style);
        let mut out = Vec::new();
        if let Some(dir) = &self.fonts_dir
            && is_plain_family(family)
        {
            let mut names = vec![format!("{family}{suffix}")];
            if !suffix.is_empty() {
                names.push(family.to_owned());
            }
            for name in names {
                out.push(dir.join(format!("{name}.ttf")));
                out.push(dir.join(format!("{name}.otf")));
            }
        }
        if let [dejavu, rest @ ..] = self.system_dirs.as_slice() {
            out.push(dejavu.join(format!("DejaVuSans{suffix}.ttf")));
            out.push(dejavu.join("DejaVuSans.ttf"));
            for dir in rest {
                out.push(dir.join("LiberationSans-Regular.ttf"));
            }
        }
        out.dedup();
        out
    }

    /// First existing candidate, else any font in the searched directories.
    pub fn resolve(&self, family: &str, weight: FontWeight, style: FontStyle) -> Option<PathBuf> {
        let found = self
            .candidates(family, weight, style)
            .into_iter()
            .find(|p| p.is_file());
        found.or_else(|| {
            let any = self.any_font();
            if let Some(path) = &any {
                tracing::debug!(family, fallback = %path.display(), "font family not found");
            }
            any
        })
    }

    /// Alphabetically first `.ttf`/`.otf` in `fonts_dir`, then in each system directory.
    pub fn any_font(&self) -> Option<PathBuf> {
        self.fonts_dir
            .iter()
            .chain(&self.system_dirs)
            .find_map(|dir| first_font_in(dir))
    }

    /// Resolve and read a font, reusing previously read bytes.
    pub fn load(
        &mut self,
        family: &str,
        weight: FontWeight,
        style: FontStyle,
    ) -> PosterResult<LoadedFont> {
        let path = self.resolve(family, weight, style).ok_or_else(|| {
            PosterError::render(format!("no font file found for family \"{family}\""))
        })?;
        if let Some(bytes) = self.loaded.get(&path) {
            return Ok(LoadedFont {
                path,
                bytes: Arc::clone(bytes),
            });
        }
        let bytes = Arc::new(read_font(&path)?);
        self.loaded.insert(path.clone(), Arc::clone(&bytes));
        Ok(LoadedFont { path, bytes })
    }
}

fn first_font_in(dir: &Path) -> Option<PathBuf> {
    let mut fonts: Vec<PathBuf> = std::fs::read_dir(dir)
        .ok()?
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && is_font_file(p))
        .collect();
    fonts.sort();
    fonts.into_iter().next()
}

fn is_font_file(path: &Path) -> bool {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
    ext.eq_ignore_ascii_case("ttf") || ext.eq_ignore_ascii_case("otf")
}

fn read_font(path: &Path) -> PosterResult<Vec<u8>> {
    std::fs::read(path)
        .with_context(|| format!("read font file '{}'", path.display()))
        .map_err(PosterError::from)
}

// Family names end up in file paths.
fn is_plain_family(family: &str) -> bool {
    !family.is_empty()
        && !family.contains(['/', '\\'])
        && !family.contains("..")
}

#[cfg(test)]
#[path = "../../tests/unit/text/fonts.rs"]
mod tests;
