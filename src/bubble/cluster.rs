use rstar::RTree;
use rstar::primitives::GeomWithData;
use std::collections::VecDeque;

use super::{BubbleGroup, TextFragment};

/// Parameters of the anisotropic proximity grouping.
///
/// Centers are scaled per axis before clustering: `horizontal_penalty < 1`
/// shrinks horizontal gaps and `vertical_weight > 1` stretches vertical ones,
/// so stacked lines of one bubble stay together while side-by-side bubbles
/// fall apart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusterConfig {
    pub eps: f64,
    pub vertical_weight: f64,
    pub horizontal_penalty: f64,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            eps: 225.0,
            vertical_weight: 1.5,
            horizontal_penalty: 0.75,
        }
    }
}

/// Density-based clustering over 2D points.
///
/// Returns one label per input point; `None` marks noise. Labels must be
/// dense and numbered in the order clusters are first discovered.
pub trait DensityClustering {
    fn cluster(&self, points: &[[f64; 2]], radius: f64, min_points: usize) -> Vec<Option<usize>>;
}

/// DBSCAN with an R-tree for neighborhood queries. A point counts itself
/// toward `min_points` and neighbors are taken at distance `<= radius`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Dbscan;

impl DensityClustering for Dbscan {
    fn cluster(&self, points: &[[f64; 2]], radius: f64, min_points: usize) -> Vec<Option<usize>> {
        let tree = RTree::bulk_load(
            points
                .iter()
                .enumerate()
                .map(|(idx, point)| GeomWithData::new(*point, idx))
                .collect(),
        );
        let radius = radius.max(0.0);
        let max_dist_2 = radius * radius;
        let min_points = min_points.max(1);
        let neighbors = |idx: usize| -> Vec<usize> {
            let mut found: Vec<usize> = tree
                .locate_within_distance(points[idx], max_dist_2)
                .map(|entry| entry.data)
                .collect();
            found.sort_unstable();
            found
        };

        let mut labels = vec![None; points.len()];
        let mut visited = vec![false; points.len()];
        let mut next_label = 0;

        for idx in 0..points.len() {
            if visited[idx] {
                continue;
            }
            visited[idx] = true;
            let seeds = neighbors(idx);
            if seeds.len() < min_points {
                continue;
            }
            let label = next_label;
            next_label += 1;
            labels[idx] = Some(label);

            let mut queue: VecDeque<usize> = seeds.into();
            while let Some(other) = queue.pop_front() {
                if labels[other].is_none() {
                    labels[other] = Some(label);
                }
                if visited[other] {
                    continue;
                }
                visited[other] = true;
                let expanded = neighbors(other);
                if expanded.len() >= min_points {
                    queue.extend(expanded);
                }
            }
        }
        labels
    }
}

pub fn cluster_fragments(fragments: Vec<TextFragment>, config: &ClusterConfig) -> Vec<BubbleGroup> {
    cluster_with(fragments, config, &Dbscan)
}

/// Groups fragments with any clustering backend. Group order follows the
/// cluster labels; fragments a backend reports as noise become singleton
/// groups after the labelled ones, so nothing is dropped.
pub fn cluster_with<C: DensityClustering + ?Sized>(
    fragments: Vec<TextFragment>,
    config: &ClusterConfig,
    clustering: &C,
) -> Vec<BubbleGroup> {
    if fragments.is_empty() {
        return Vec::new();
    }
    let points: Vec<[f64; 2]> = fragments
        .iter()
        .map(|fragment| {
            let (cx, cy) = fragment.center();
            [
                f64::from(cx) * config.horizontal_penalty,
                f64::from(cy) * config.vertical_weight,
            ]
        })
        .collect();
    let labels = clustering.cluster(&points, config.eps, 1);

    let mut members: Vec<Vec<TextFragment>> = Vec::new();
    let mut noise = Vec::new();
    for (fragment, label) in fragments.into_iter().zip(labels) {
        match label {
            Some(label) => {
                if members.len() <= label {
                    members.resize_with(label + 1, Vec::new);
                }
                members[label].push(fragment);
            }
            None => noise.push(fragment),
        }
    }

    members
        .into_iter()
        .filter_map(BubbleGroup::new)
        .chain(noise.into_iter().map(BubbleGroup::single))
        .collect()
}
