use std::cmp::Reverse;

use super::BubbleGroup;

/// Keeps at most `max_count` groups, preferring the largest bounding boxes.
///
/// Under the cap the input comes back untouched. Over it, the survivors are
/// returned largest first (ties keep input order), which loses reading order;
/// callers that need it must re-sort by position.
pub fn prioritize_largest(groups: Vec<BubbleGroup>, max_count: usize) -> Vec<BubbleGroup> {
    if groups.len() <= max_count {
        return groups;
    }
    let mut ranked: Vec<(i64, BubbleGroup)> = groups
        .into_iter()
        .map(|group| (group.area(), group))
        .collect();
    ranked.sort_by_key(|(area, _)| Reverse(*area));
    ranked.truncate(max_count);
    ranked.into_iter().map(|(_, group)| group).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bubble::fragment;

    fn group_with_area(area: i32, label: &str) -> BubbleGroup {
        BubbleGroup::single(fragment(0, 0, area, 1, label))
    }

    #[test]
    fn keeps_largest_in_descending_order() {
        let groups = [10, 50, 30, 5, 80]
            .into_iter()
            .map(|area| group_with_area(area, &area.to_string()))
            .collect();
        let kept = prioritize_largest(groups, 2);
        let areas: Vec<i64> = kept.iter().map(BubbleGroup::area).collect();
        assert_eq!(areas, vec![80, 50]);
    }

    #[test]
    fn under_cap_preserves_order() {
        let groups: Vec<BubbleGroup> = vec![group_with_area(5, "a"), group_with_area(50, "b")];
        assert_eq!(prioritize_largest(groups.clone(), 2), groups);
    }

    #[test]
    fn ties_keep_input_order() {
        let kept = prioritize_largest(
            vec![
                group_with_area(20, "first"),
                group_with_area(1, "small"),
                group_with_area(20, "second"),
            ],
            2,
        );
        let texts: Vec<String> = kept.iter().map(BubbleGroup::text).collect();
        assert_eq!(texts, vec!["first", "second"]);
    }

    #[test]
    fn area_uses_union_box_not_fragment_sum() {
        let spread = BubbleGroup::new(vec![fragment(0, 0, 2, 2, "a"), fragment(8, 8, 2, 2, "b")])
            .expect("group");
        assert_eq!(spread.area(), 100);
        let kept = prioritize_largest(vec![group_with_area(50, "solid"), spread], 1);
        assert_eq!(kept[0].text(), "a b");
    }

    #[test]
    fn zero_cap_drops_everything() {
        assert!(prioritize_largest(vec![group_with_area(1, "a")], 0).is_empty());
    }
}
