use super::BubbleGroup;

struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
        }
    }

    fn find(&mut self, idx: usize) -> usize {
        let mut root = idx;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut node = idx;
        while self.parent[node] != root {
            let next = self.parent[node];
            self.parent[node] = root;
            node = next;
        }
        root
    }

    /// Keeps the smaller index as root so components are named by their
    /// first member. Returns false when both were already joined.
    fn union(&mut self, a: usize, b: usize) -> bool {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return false;
        }
        let (keep, drop) = if ra < rb { (ra, rb) } else { (rb, ra) };
        self.parent[drop] = keep;
        true
    }
}

/// Collapses groups whose bounding boxes overlap.
///
/// Each round joins the connected components of the overlap graph. A merged
/// box can grow into a group it did not touch before, so rounds repeat until
/// none joins anything. The resulting partition does not depend on the order
/// pairs are visited; a merged group sits where its lowest-index member was
/// and lists fragments in member index order.
pub fn merge_overlapping(mut groups: Vec<BubbleGroup>) -> Vec<BubbleGroup> {
    loop {
        if groups.len() <= 1 {
            return groups;
        }
        let boxes: Vec<_> = groups.iter().map(BubbleGroup::bbox).collect();
        let mut sets = UnionFind::new(groups.len());
        let mut joined = false;
        for i in 0..boxes.len() {
            for j in (i + 1)..boxes.len() {
                if boxes[i].intersects(&boxes[j]) {
                    joined |= sets.union(i, j);
                }
            }
        }
        if !joined {
            return groups;
        }

        let mut merged: Vec<Option<BubbleGroup>> = Vec::with_capacity(groups.len());
        for (idx, group) in groups.into_iter().enumerate() {
            let root = sets.find(idx);
            if root == idx {
                merged.push(Some(group));
            } else {
                merged.push(None);
                if let Some(target) = merged[root].as_mut() {
                    target.absorb(group);
                }
            }
        }
        groups = merged.into_iter().flatten().collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bubble::{TextFragment, fragment};
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    fn group(fragments: Vec<TextFragment>) -> BubbleGroup {
        BubbleGroup::new(fragments).expect("non-empty")
    }

    fn partition(groups: &[BubbleGroup]) -> BTreeSet<BTreeSet<String>> {
        groups
            .iter()
            .map(|group| {
                group
                    .fragments()
                    .iter()
                    .map(|fragment| fragment.text.clone())
                    .collect()
            })
            .collect()
    }

    /// Restart-on-first-hit pairwise scan, merging the later group into the
    /// earlier one.
    fn rescan_merge(mut groups: Vec<BubbleGroup>) -> Vec<BubbleGroup> {
        'restart: loop {
            for i in 0..groups.len() {
                for j in (i + 1)..groups.len() {
                    if groups[i].bbox().intersects(&groups[j].bbox()) {
                        let absorbed = groups.remove(j);
                        groups[i].absorb(absorbed);
                        continue 'restart;
                    }
                }
            }
            return groups;
        }
    }

    #[test]
    fn zero_or_one_group_is_unchanged() {
        assert!(merge_overlapping(Vec::new()).is_empty());
        let single = vec![group(vec![fragment(0, 0, 10, 10, "a")])];
        assert_eq!(merge_overlapping(single.clone()), single);
    }

    #[test]
    fn overlapping_pair_merges_in_order() {
        let merged = merge_overlapping(vec![
            group(vec![fragment(0, 0, 20, 20, "a")]),
            group(vec![fragment(100, 100, 5, 5, "far")]),
            group(vec![fragment(10, 10, 20, 20, "b")]),
        ]);
        let texts: Vec<String> = merged.iter().map(BubbleGroup::text).collect();
        assert_eq!(texts, vec!["a b", "far"]);
    }

    #[test]
    fn grown_box_swallows_third_group() {
        // a and b overlap; neither touches c, but their union does
        let merged = merge_overlapping(vec![
            group(vec![fragment(0, 0, 30, 10, "a")]),
            group(vec![fragment(20, 5, 10, 30, "b")]),
            group(vec![fragment(2, 20, 10, 10, "c")]),
        ]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].text(), "a b c");
    }

    #[test]
    fn merge_is_idempotent() {
        let once = merge_overlapping(vec![
            group(vec![fragment(0, 0, 20, 20, "a")]),
            group(vec![fragment(15, 15, 20, 20, "b")]),
            group(vec![fragment(60, 0, 10, 10, "c")]),
        ]);
        assert_eq!(merge_overlapping(once.clone()), once);
    }

    fn arb_groups() -> impl Strategy<Value = Vec<BubbleGroup>> {
        prop::collection::vec((0..200i32, 0..200i32, 1..60i32, 1..60i32), 0..14).prop_map(
            |boxes| {
                boxes
                    .into_iter()
                    .enumerate()
                    .map(|(idx, (x, y, w, h))| {
                        group(vec![fragment(x, y, w, h, &format!("f{idx}"))])
                    })
                    .collect()
            },
        )
    }

    proptest! {
        #[test]
        fn output_boxes_are_disjoint_and_total(groups in arb_groups()) {
            let input = partition(&groups);
            let merged = merge_overlapping(groups);
            for (i, a) in merged.iter().enumerate() {
                for b in &merged[i + 1..] {
                    prop_assert!(!a.bbox().intersects(&b.bbox()));
                }
            }
            let seen: Vec<String> = merged
                .iter()
                .flat_map(|group| group.fragments().iter().map(|f| f.text.clone()))
                .collect();
            let unique: BTreeSet<String> = seen.iter().cloned().collect();
            prop_assert_eq!(seen.len(), unique.len());
            let expected: BTreeSet<String> = input.into_iter().flatten().collect();
            prop_assert_eq!(unique, expected);
        }

        #[test]
        fn partition_ignores_input_order(
            (groups, shuffled) in arb_groups()
                .prop_flat_map(|groups| (Just(groups.clone()), Just(groups).prop_shuffle()))
        ) {
            let expected = partition(&merge_overlapping(groups));
            prop_assert_eq!(partition(&merge_overlapping(shuffled.clone())), expected.clone());
            prop_assert_eq!(partition(&rescan_merge(shuffled)), expected);
        }

        #[test]
        fn merging_twice_changes_nothing(groups in arb_groups()) {
            let once = merge_overlapping(groups);
            prop_assert_eq!(merge_overlapping(once.clone()), once);
        }
    }
}
