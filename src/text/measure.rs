use crate::{
    foundation::error::{PosterError, PosterResult},
    scene::model::{FontStyle, FontWeight, TextStyle},
};

/// Font selection used for measuring.
#[derive(Clone, Debug, PartialEq)]
pub struct FontSpec {
    /// Family name.
    pub family: String,
    /// Size in pixels.
    pub size: f64,
    /// Weight.
    pub weight: FontWeight,
    /// Slant.
    pub style: FontStyle,
}

impl FontSpec {
    /// Font of a text element, at the element's own size.
    pub fn from_style(style: &TextStyle) -> Self {
        Self {
            family: style.font_family.clone(),
            size: style.font_size,
            weight: style.weight,
            style: style.style,
        }
    }
}

/// Measures the advance width of a single line of text.
pub trait TextMeasurer {
    /// Width of `line` in pixels, unscaled by any element transform.
    fn line_width(&mut self, line: &str, font: &FontSpec) -> PosterResult<f64>;
}

/// Every character advances by `advance_em × size`; deterministic, needs no font files.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FixedAdvanceMeasurer {
    /// Advance per character, in ems.
    pub advance_em: f64,
}

impl Default for FixedAdvanceMeasurer {
    fn default() -> Self {
        Self { advance_em: 0.5 }
    }
}

impl TextMeasurer for FixedAdvanceMeasurer {
    fn line_width(&mut self, line: &str, font: &FontSpec) -> PosterResult<f64> {
        if !font.size.is_finite() || font.size <= 0.0 {
            return Err(PosterError::validation("font size must be finite and > 0"));
        }
        Ok(line.chars().count() as f64 * self.advance_em * font.size)
    }
}

/// Greedy word wrap at `wrap_width`; explicit `\n` always breaks.
///
/// A single word wider than the box keeps its own line. Non-positive or non-finite widths
/// disable wrapping.
pub fn wrap_lines(
    content: &str,
    wrap_width: f64,
    font: &FontSpec,
    measurer: &mut dyn TextMeasurer,
) -> PosterResult<Vec<String>> {
    let wrap = wrap_width.is_finite() && wrap_width > 0.0;
    let mut out = Vec::new();
    for paragraph in content.split('\n') {
        if !wrap {
            out.push(paragraph.to_owned());
            continue;
        }
        let mut current = String::new();
        for word in paragraph.split(' ').filter(|w| !w.is_empty()) {
            if current.is_empty() {
                current.push_str(word);
                continue;
            }
            let candidate = format!("{current} {word}");
            if measurer.line_width(&candidate, font)? <= wrap_width {
                current = candidate;
            } else {
                out.push(std::mem::replace(&mut current, word.to_owned()));
            }
        }
        out.push(current);
    }
    Ok(out)
}

/// Width of the widest line.
pub fn widest_line(
    lines: &[String],
    font: &FontSpec,
    measurer: &mut dyn TextMeasurer,
) -> PosterResult<f64> {
    let mut widest = 0.0f64;
    for line in lines {
        widest = widest.max(measurer.line_width(line, font)?);
    }
    Ok(widest)
}

#[cfg(test)]
#[path = "../../tests/unit/text/measure.rs"]
mod tests;
