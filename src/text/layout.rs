use std::{borrow::Cow, collections::HashMap, path::PathBuf};

use crate::{
    background::color::Color,
    foundation::error::{PosterError, PosterResult},
    text::{
        fonts::{FontLibrary, LoadedFont},
        measure::{FontSpec, TextMeasurer},
    },
};

/// Stateful helper for building Parley layouts from font files.
///
/// Each font file is registered once; later layouts refer to it by family name.
pub struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<Color>,
    families: HashMap<PathBuf, String>,
}

impl Default for TextLayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TextLayoutEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextLayoutEngine")
            .field("registered_fonts", &self.families.len())
            .finish()
    }
}

impl TextLayoutEngine {
    /// Construct a new layout engine with fresh Parley contexts.
    pub fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            families: HashMap::new(),
        }
    }

    fn family_for(&mut self, font: &LoadedFont) -> PosterResult<String> {
        if let Some(name) = self.families.get(&font.path) {
            return Ok(name.clone());
        }
        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font.bytes.as_ref().clone()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            PosterError::render(format!(
                "no font families registered from '{}'",
                font.path.display()
            ))
        })?;
        let name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| PosterError::render("registered font family has no name"))?
            .to_string();
        self.families.insert(font.path.clone(), name.clone());
        Ok(name)
    }

    /// Shape one unwrapped line.
    pub fn layout_line(
        &mut self,
        text: &str,
        font: &LoadedFont,
        size_px: f32,
        brush: Color,
    ) -> PosterResult<parley::Layout<Color>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(PosterError::validation(
                "text size_px must be finite and > 0",
            ));
        }
        let family_name = self.family_for(font)?;

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<Color> = builder.build(text);
        layout.break_all_lines(None);
        Ok(layout)
    }
}

/// [`TextMeasurer`] backed by real font files and Parley shaping.
#[derive(Debug, Default)]
pub struct ParleyTextMeasurer {
    fonts: FontLibrary,
    engine: TextLayoutEngine,
}

impl ParleyTextMeasurer {
    /// Measurer resolving fonts through `fonts`.
    pub fn new(fonts: FontLibrary) -> Self {
        Self {
            fonts,
            engine: TextLayoutEngine::new(),
        }
    }

    /// Font library and layout engine, for callers that also draw.
    pub fn parts_mut(&mut self) -> (&mut FontLibrary, &mut TextLayoutEngine) {
        (&mut self.fonts, &mut self.engine)
    }
}

impl TextMeasurer for ParleyTextMeasurer {
    fn line_width(&mut self, line: &str, font: &FontSpec) -> PosterResult<f64> {
        if line.is_empty() {
            return Ok(0.0);
        }
        let loaded = self.fonts.load(&font.family, font.weight, font.style)?;
        let layout = self
            .engine
            .layout_line(line, &loaded, font.size as f32, Color::WHITE)?;
        Ok(f64::from(layout.width()))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/layout.rs"]
mod tests;
