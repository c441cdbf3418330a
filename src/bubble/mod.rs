mod cluster;
mod filter;
mod geom;
mod merge;
mod prioritize;
mod record;

use serde::{Deserialize, Serialize};
use tracing::info;

pub use cluster::{ClusterConfig, Dbscan, DensityClustering, cluster_fragments, cluster_with};
pub use filter::{FilterConfig, filter_fragments};
pub use geom::BBox;
pub use merge::merge_overlapping;
pub use prioritize::prioritize_largest;
pub use record::{
    BoundsDocument, BubbleRecord, DocumentMeta, FinalBoundsDocument, RawBubbleRecord,
    RawFinalBoundsDocument, to_records,
};

/// One OCR-detected text run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextFragment {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub text: String,
    pub confidence: i32,
}

impl TextFragment {
    pub fn bbox(&self) -> BBox {
        BBox {
            x: self.x,
            y: self.y,
            w: self.width,
            h: self.height,
        }
    }

    pub(crate) fn center(&self) -> (i32, i32) {
        (
            self.x.saturating_add(self.width / 2),
            self.y.saturating_add(self.height / 2),
        )
    }
}

/// Fragments judged to belong to one speech bubble.
///
/// The bounding box is derived from the members every time it is asked for,
/// so a group can never carry a stale box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BubbleGroup {
    fragments: Vec<TextFragment>,
}

impl BubbleGroup {
    /// Returns `None` for an empty fragment list; a group always has a box.
    pub fn new(fragments: Vec<TextFragment>) -> Option<Self> {
        if fragments.is_empty() {
            None
        } else {
            Some(Self { fragments })
        }
    }

    pub(crate) fn single(fragment: TextFragment) -> Self {
        Self {
            fragments: vec![fragment],
        }
    }

    pub fn fragments(&self) -> &[TextFragment] {
        &self.fragments
    }

    pub fn into_fragments(self) -> Vec<TextFragment> {
        self.fragments
    }

    pub fn bbox(&self) -> BBox {
        let mut iter = self.fragments.iter();
        // non-empty by construction
        let first = iter.next().map(TextFragment::bbox).unwrap_or_default();
        iter.fold(first, |acc, fragment| acc.union(&fragment.bbox()))
    }

    pub fn area(&self) -> i64 {
        self.bbox().area()
    }

    pub fn text(&self) -> String {
        self.fragments
            .iter()
            .map(|fragment| fragment.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub(crate) fn absorb(&mut self, other: BubbleGroup) {
        self.fragments.extend(other.fragments);
    }
}

/// Runs the whole grouping pipeline for one page: filter, cluster, merge,
/// then keep the `max_bubbles` largest groups.
pub fn group_fragments(
    fragments: Vec<TextFragment>,
    filter: &FilterConfig,
    cluster: &ClusterConfig,
    max_bubbles: usize,
) -> Vec<BubbleGroup> {
    let total = fragments.len();
    let fragments = filter_fragments(fragments, filter);
    info!(
        "bubbles: kept {} of {} fragments after filtering",
        fragments.len(),
        total
    );
    let groups = cluster_fragments(fragments, cluster);
    let clustered = groups.len();
    let groups = merge_overlapping(groups);
    info!(
        "bubbles: {} clusters, {} after merging overlaps",
        clustered,
        groups.len()
    );
    prioritize_largest(groups, max_bubbles)
}

#[cfg(test)]
pub(crate) fn fragment(x: i32, y: i32, width: i32, height: i32, text: &str) -> TextFragment {
    TextFragment {
        x,
        y,
        width,
        height,
        text: text.to_string(),
        confidence: 90,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    #[test]
    fn group_box_tracks_members() {
        let mut group = BubbleGroup::single(fragment(10, 10, 20, 10, "a"));
        assert_eq!(
            group.bbox(),
            BBox {
                x: 10,
                y: 10,
                w: 20,
                h: 10
            }
        );
        group.absorb(BubbleGroup::single(fragment(0, 30, 5, 5, "b")));
        assert_eq!(
            group.bbox(),
            BBox {
                x: 0,
                y: 10,
                w: 30,
                h: 25
            }
        );
        assert_eq!(group.text(), "a b");
    }

    #[test]
    fn empty_group_is_rejected() {
        assert!(BubbleGroup::new(Vec::new()).is_none());
    }

    #[test]
    fn pipeline_keeps_two_largest_bubbles() {
        let fragments = vec![
            fragment(100, 100, 120, 20, "HOLA"),
            fragment(100, 125, 100, 20, "AMIGO"),
            fragment(900, 100, 60, 20, "SI"),
            fragment(100, 900, 300, 40, "VAMOS"),
            fragment(900, 900, 40, 20, "x"),
        ];
        let groups = group_fragments(
            fragments,
            &FilterConfig::default(),
            &ClusterConfig::default(),
            2,
        );
        let texts: Vec<String> = groups.iter().map(BubbleGroup::text).collect();
        assert_eq!(texts, vec!["VAMOS", "HOLA AMIGO"]);
    }

    fn arb_fragments() -> impl Strategy<Value = Vec<TextFragment>> {
        prop::collection::vec((0..2000i32, 0..2000i32, 1..300i32, 1..120i32), 0..24).prop_map(
            |boxes| {
                boxes
                    .into_iter()
                    .enumerate()
                    .map(|(idx, (x, y, w, h))| fragment(x, y, w, h, &format!("f{idx}")))
                    .collect()
            },
        )
    }

    fn arb_cluster_config() -> impl Strategy<Value = ClusterConfig> {
        (1.0..600.0f64, 0.1..3.0f64, 0.1..3.0f64).prop_map(
            |(eps, vertical_weight, horizontal_penalty)| ClusterConfig {
                eps,
                vertical_weight,
                horizontal_penalty,
            },
        )
    }

    proptest! {
        #[test]
        fn clustered_then_merged_groups_partition_the_input(
            fragments in arb_fragments(),
            config in arb_cluster_config(),
        ) {
            let expected: BTreeSet<String> =
                fragments.iter().map(|fragment| fragment.text.clone()).collect();
            let groups = merge_overlapping(cluster_fragments(fragments, &config));

            let seen: Vec<String> = groups
                .iter()
                .flat_map(|group| group.fragments().iter().map(|f| f.text.clone()))
                .collect();
            let unique: BTreeSet<String> = seen.iter().cloned().collect();
            prop_assert_eq!(seen.len(), unique.len());
            prop_assert_eq!(unique, expected);
            prop_assert!(groups.iter().all(|group| !group.fragments().is_empty()));
            for (i, a) in groups.iter().enumerate() {
                for b in &groups[i + 1..] {
                    prop_assert!(!a.bbox().intersects(&b.bbox()));
                }
            }
        }
    }
}
