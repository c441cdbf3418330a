use serde::{Deserialize, Serialize};

use super::{BubbleGroup, TextFragment};
use crate::error::{Error, Result};
use crate::layout::LayoutRect;

/// Provenance fields carried from the OCR stage through to the final file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bubble_number: Option<serde_json::Value>,
}

/// OCR output for one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundsDocument {
    #[serde(flatten)]
    pub meta: DocumentMeta,
    pub text_regions: Vec<TextFragment>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BubbleRecord {
    pub bubble_number: u32,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub text: String,
    pub text_regions: Vec<TextFragment>,
}

impl BubbleRecord {
    pub fn rect(&self) -> LayoutRect {
        LayoutRect {
            x: self.x as f32,
            y: self.y as f32,
            width: self.width as f32,
            height: self.height as f32,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinalBoundsDocument {
    #[serde(flatten)]
    pub meta: DocumentMeta,
    pub bubbles: Vec<BubbleRecord>,
}

/// Numbers groups from 1 in their current order.
pub fn to_records(groups: Vec<BubbleGroup>) -> Vec<BubbleRecord> {
    groups
        .into_iter()
        .enumerate()
        .map(|(idx, group)| {
            let bbox = group.bbox();
            let text = group.text();
            BubbleRecord {
                bubble_number: idx as u32 + 1,
                x: bbox.x,
                y: bbox.y,
                width: bbox.w,
                height: bbox.h,
                text,
                text_regions: group.into_fragments(),
            }
        })
        .collect()
}

/// A bubble record as read back from disk, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawBubbleRecord {
    pub bubble_number: Option<u32>,
    pub x: Option<i32>,
    pub y: Option<i32>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub text: Option<String>,
    pub text_regions: Option<Vec<TextFragment>>,
}

impl RawBubbleRecord {
    /// Checks every field a downstream step relies on. Nothing is defaulted:
    /// a record without geometry is an error, not a zero-sized bubble.
    pub fn validate(self, index: usize) -> Result<BubbleRecord> {
        let missing = |field| Error::MissingField { index, field };
        let bubble_number = self.bubble_number.ok_or_else(|| missing("bubble_number"))?;
        let x = self.x.ok_or_else(|| missing("x"))?;
        let y = self.y.ok_or_else(|| missing("y"))?;
        let width = self.width.ok_or_else(|| missing("width"))?;
        let height = self.height.ok_or_else(|| missing("height"))?;
        let text = self.text.ok_or_else(|| missing("text"))?;
        let text_regions = self.text_regions.ok_or_else(|| missing("text_regions"))?;

        for (field, value) in [("width", width), ("height", height)] {
            if value <= 0 {
                return Err(Error::InvalidField {
                    index,
                    field,
                    reason: format!("must be positive, got {}", value),
                });
            }
        }
        if text.trim().is_empty() {
            return Err(Error::InvalidField {
                index,
                field: "text",
                reason: "is empty".to_string(),
            });
        }

        Ok(BubbleRecord {
            bubble_number,
            x,
            y,
            width,
            height,
            text,
            text_regions,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawFinalBoundsDocument {
    #[serde(flatten)]
    pub meta: DocumentMeta,
    pub bubbles: Option<Vec<RawBubbleRecord>>,
}

impl RawFinalBoundsDocument {
    /// An absent `bubbles` list is an error; an explicit empty list is not.
    pub fn validate(self) -> Result<FinalBoundsDocument> {
        let bubbles = self
            .bubbles
            .ok_or(Error::MissingDocumentField { field: "bubbles" })?
            .into_iter()
            .enumerate()
            .map(|(index, raw)| raw.validate(index))
            .collect::<Result<Vec<_>>>()?;
        Ok(FinalBoundsDocument {
            meta: self.meta,
            bubbles,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bubble::fragment;
    use serde_json::json;

    #[test]
    fn records_are_numbered_from_one() {
        let groups = vec![
            BubbleGroup::new(vec![
                fragment(10, 10, 50, 10, "¿Dónde"),
                fragment(12, 24, 40, 10, "estás?"),
            ])
            .expect("group"),
            BubbleGroup::single(fragment(300, 40, 20, 10, "¡Aquí!")),
        ];
        let records = to_records(groups);
        assert_eq!(records[0].bubble_number, 1);
        assert_eq!(records[0].text, "¿Dónde estás?");
        assert_eq!(
            (records[0].x, records[0].y, records[0].width, records[0].height),
            (10, 10, 50, 24)
        );
        assert_eq!(records[0].text_regions.len(), 2);
        assert_eq!(records[1].bubble_number, 2);
    }

    #[test]
    fn missing_geometry_is_reported_by_name() {
        let doc: RawFinalBoundsDocument = serde_json::from_value(json!({
            "image": "spch-0.webp",
            "bubbles": [
                {"bubble_number": 1, "x": 0, "y": 0, "width": 10, "height": 10, "text": "ok", "text_regions": []},
                {"bubble_number": 2, "x": 0, "y": 0, "height": 10, "text": "no width"}
            ]
        }))
        .expect("parse");
        assert_eq!(
            doc.validate().unwrap_err(),
            Error::MissingField {
                index: 1,
                field: "width"
            }
        );
    }

    #[test]
    fn non_positive_size_is_invalid() {
        let raw = RawBubbleRecord {
            bubble_number: Some(1),
            x: Some(0),
            y: Some(0),
            width: Some(20),
            height: Some(0),
            text: Some("hola".to_string()),
            text_regions: Some(Vec::new()),
        };
        assert!(matches!(
            raw.validate(0),
            Err(Error::InvalidField {
                field: "height",
                ..
            })
        ));
    }

    #[test]
    fn missing_text_regions_are_not_defaulted() {
        let doc: RawFinalBoundsDocument = serde_json::from_value(json!({
            "bubbles": [{"bubble_number": 1, "x": 0, "y": 0, "width": 10, "height": 10, "text": "ok"}]
        }))
        .expect("parse");
        assert_eq!(
            doc.validate().unwrap_err(),
            Error::MissingField {
                index: 0,
                field: "text_regions"
            }
        );
    }

    #[test]
    fn bounds_document_requires_text_regions() {
        let parsed = serde_json::from_value::<BoundsDocument>(json!({"image": "spch-0.webp"}));
        assert!(parsed.is_err());
    }

    #[test]
    fn meta_round_trips_through_final_document() {
        let doc: BoundsDocument = serde_json::from_value(json!({
            "image": "spch-3.webp",
            "folder": "7",
            "bubble_number": "3",
            "text_regions": []
        }))
        .expect("parse");
        let final_doc = FinalBoundsDocument {
            meta: doc.meta,
            bubbles: Vec::new(),
        };
        let value = serde_json::to_value(&final_doc).expect("serialize");
        assert_eq!(
            value,
            json!({"image": "spch-3.webp", "folder": "7", "bubble_number": "3", "bubbles": []})
        );
    }
}
