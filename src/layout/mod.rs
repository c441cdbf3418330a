mod font;
mod wrap;

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};

pub use font::{EstimatedMetrics, FontMetrics, TextMeasure, load_font_metrics, resolve_font};

use wrap::{wrap_by_estimate, wrap_with_hyphenation};

/// Target area for a block of text, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConfig {
    pub max_font_size: u32,
    pub min_font_size: u32,
    /// Share of the rectangle width a line may use.
    pub fill_width: f32,
    /// Share of the rectangle height the block may use.
    pub fill_height: f32,
    /// Share of the width used when estimating characters per line.
    pub estimate_fraction: f32,
    pub line_spacing: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            max_font_size: 32,
            min_font_size: 12,
            fill_width: 0.95,
            fill_height: 0.95,
            estimate_fraction: 0.9,
            line_spacing: 4.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinePlacement {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutResult {
    pub font_size: f32,
    pub lines: Vec<String>,
    pub line_height: f32,
    pub block_height: f32,
    /// Offset of the block's top edge inside the rectangle.
    pub top: f32,
    pub placements: Vec<LinePlacement>,
    /// Set when even the smallest size does not fit.
    pub overflow: bool,
}

/// Fits `text` into `rect` at the largest font size that works.
///
/// Sizes are tried from `max_font_size` down to `min_font_size`. At each
/// size a character-count wrap is tried first, then a measured wrap that
/// hyphenates over-long words. If nothing fits, the measured wrap at the
/// minimum size is returned with `overflow` set.
pub fn layout_text<M: TextMeasure + ?Sized>(
    text: &str,
    rect: LayoutRect,
    metrics: &M,
    config: &LayoutConfig,
) -> Result<LayoutResult> {
    if !(rect.width > 0.0 && rect.height > 0.0) {
        return Err(Error::InvalidGeometry {
            width: rect.width,
            height: rect.height,
        });
    }
    let text = text.trim();
    if text.is_empty() {
        return Err(Error::EmptyText);
    }

    let max_width = rect.width * config.fill_width;
    let max_height = rect.height * config.fill_height;
    let min_size = config.min_font_size;
    let max_size = config.max_font_size.max(min_size);

    for size in (min_size..=max_size).rev() {
        let font_size = size as f32;
        let line_height = metrics.vertical_extent(font_size) + config.line_spacing;
        if let Some(lines) = fit_at_size(
            text,
            rect,
            font_size,
            line_height,
            max_width,
            max_height,
            metrics,
            config,
        ) {
            debug!("layout: fitted {} lines at size {}", lines.len(), size);
            return Ok(place_lines(
                lines,
                rect,
                font_size,
                line_height,
                metrics,
                false,
            ));
        }
    }

    let font_size = min_size as f32;
    let line_height = metrics.vertical_extent(font_size) + config.line_spacing;
    let lines = wrap_with_hyphenation(text, font_size, max_width, metrics);
    warn!(
        "layout: text overflows {}x{} even at size {} ({} lines)",
        rect.width,
        rect.height,
        min_size,
        lines.len()
    );
    Ok(place_lines(
        lines,
        rect,
        font_size,
        line_height,
        metrics,
        true,
    ))
}

#[allow(clippy::too_many_arguments)]
fn fit_at_size<M: TextMeasure + ?Sized>(
    text: &str,
    rect: LayoutRect,
    font_size: f32,
    line_height: f32,
    max_width: f32,
    max_height: f32,
    metrics: &M,
    config: &LayoutConfig,
) -> Option<Vec<String>> {
    let fits_height = |count: usize| count as f32 * line_height <= max_height;

    let glyph_width = metrics.average_glyph_width(font_size);
    let max_chars = if glyph_width > 0.0 {
        (rect.width * config.estimate_fraction / glyph_width).floor() as usize
    } else {
        0
    };
    if max_chars > 0 {
        let lines = wrap_by_estimate(text, max_chars);
        if fits_height(lines.len())
            && lines
                .iter()
                .all(|line| metrics.text_width(line, font_size) <= max_width)
        {
            return Some(lines);
        }
    }

    let lines = wrap_with_hyphenation(text, font_size, max_width, metrics);
    fits_height(lines.len()).then_some(lines)
}

/// Centers every line horizontally and the whole block vertically.
fn place_lines<M: TextMeasure + ?Sized>(
    lines: Vec<String>,
    rect: LayoutRect,
    font_size: f32,
    line_height: f32,
    metrics: &M,
    overflow: bool,
) -> LayoutResult {
    let block_height = lines.len() as f32 * line_height;
    let top = (rect.height - block_height) / 2.0;
    let placements = lines
        .iter()
        .enumerate()
        .map(|(idx, line)| {
            let width = metrics.text_width(line, font_size);
            LinePlacement {
                text: line.clone(),
                x: rect.x + (rect.width - width) / 2.0,
                y: rect.y + top + idx as f32 * line_height,
                width,
            }
        })
        .collect();
    LayoutResult {
        font_size,
        lines,
        line_height,
        block_height,
        top,
        placements,
        overflow,
    }
}
