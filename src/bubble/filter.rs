use regex::Regex;

use super::TextFragment;
use crate::error::{Error, Result};

/// Post-OCR sanity filter applied before clustering.
#[derive(Debug, Clone)]
pub struct FilterConfig {
    /// Fragments must score strictly above this.
    pub min_confidence: i32,
    pub text_pattern: Option<Regex>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            min_confidence: 40,
            text_pattern: None,
        }
    }
}

impl FilterConfig {
    pub fn new(min_confidence: i32, text_pattern: Option<&str>) -> Result<Self> {
        let text_pattern = text_pattern
            .filter(|pattern| !pattern.trim().is_empty())
            .map(Regex::new)
            .transpose()
            .map_err(|err| Error::InvalidPattern(err.to_string()))?;
        Ok(Self {
            min_confidence,
            text_pattern,
        })
    }
}

pub fn filter_fragments(fragments: Vec<TextFragment>, config: &FilterConfig) -> Vec<TextFragment> {
    fragments
        .into_iter()
        .filter_map(|mut fragment| {
            let trimmed = fragment.text.trim();
            if trimmed.len() != fragment.text.len() {
                fragment.text = trimmed.to_string();
            }
            is_fragment_valid(&fragment, config).then_some(fragment)
        })
        .collect()
}

fn is_fragment_valid(fragment: &TextFragment, config: &FilterConfig) -> bool {
    if fragment.text.is_empty() {
        return false;
    }
    if fragment.width <= 0 || fragment.height <= 0 {
        return false;
    }
    // the far edges must be representable in pixel coordinates
    if fragment.x.checked_add(fragment.width).is_none()
        || fragment.y.checked_add(fragment.height).is_none()
    {
        return false;
    }
    if fragment.confidence <= config.min_confidence {
        return false;
    }
    match &config.text_pattern {
        Some(pattern) => pattern.is_match(&fragment.text),
        None => true,
    }
}
