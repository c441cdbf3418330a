pub mod bubble;
mod error;
pub mod layout;
pub mod logging;
pub mod settings;
mod test_util;

use serde::Serialize;
use tracing::info;

pub use bubble::{BoundsDocument, BubbleGroup, BubbleRecord, FinalBoundsDocument, TextFragment};
pub use error::{Error, Result};
pub use layout::{LayoutConfig, LayoutRect, LayoutResult, TextMeasure, layout_text};
pub use settings::Settings;

/// Turns the OCR fragments of one image into numbered bubble records.
pub fn group_document(document: BoundsDocument, settings: &Settings) -> Result<FinalBoundsDocument> {
    let filter = settings.filter_config()?;
    let groups = bubble::group_fragments(
        document.text_regions,
        &filter,
        &settings.cluster_config(),
        settings.max_bubbles,
    );
    let bubbles = bubble::to_records(groups);
    info!("bubbles: {} records", bubbles.len());
    Ok(FinalBoundsDocument {
        meta: document.meta,
        bubbles,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BubbleLayout {
    pub bubble_number: u32,
    pub layout: LayoutResult,
}

/// Lays out every bubble's text inside its own rectangle.
pub fn layout_document<M: TextMeasure + ?Sized>(
    document: &FinalBoundsDocument,
    metrics: &M,
    config: &LayoutConfig,
) -> Result<Vec<BubbleLayout>> {
    document
        .bubbles
        .iter()
        .map(|record| {
            let layout = layout_text(&record.text, record.rect(), metrics, config)?;
            info!(
                "layout: bubble {} at size {} ({} lines)",
                record.bubble_number,
                layout.font_size,
                layout.lines.len()
            );
            Ok(BubbleLayout {
                bubble_number: record.bubble_number,
                layout,
            })
        })
        .collect()
}
