//! Redundancy removal and proximity merging over component boxes.
use super::component::Component;
use super::filter::Rejection;
use super::spatial::{BoxIndex, Bounds};
use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MergeOptions {
    /// Invalidate components whose box encloses more than `max_contained`
    /// other boxes.
    pub remove_containers: bool,
    pub max_contained: usize,
    /// Search and commit merge candidates.
    pub merge: bool,
    /// Lower bound of the search margin around each box.
    pub min_margin: u32,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            remove_containers: true,
            max_contained: 2,
            merge: true,
            min_margin: 10,
        }
    }
}

/// Two components judged to belong to the same region, `a < b`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct MergeCandidate {
    pub a: u32,
    pub b: u32,
}

/// Union of a group of transitively merged components.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextRegion {
    pub bounds: Bounds,
    /// Component ids, ascending.
    pub members: Vec<u32>,
}

/// Index over the boxes of valid components.
pub fn index_valid(components: &[Component]) -> BoxIndex {
    BoxIndex::bulk_load(
        components
            .iter()
            .filter(|c| c.valid)
            .map(|c| (c.bounds, c.id))
            .collect(),
    )
}

/// Invalidate valid components enclosing more than `max_contained` other
/// indexed boxes. Containment is judged against `index` as built, so the
/// outcome does not depend on visiting order. Returns the number invalidated.
pub fn remove_containers(
    components: &mut [Component],
    index: &BoxIndex,
    max_contained: usize,
) -> usize {
    let containers: Vec<usize> = components
        .par_iter()
        .enumerate()
        .filter(|(_, c)| c.valid)
        .filter(|(i, c)| {
            let contained = index
                .search(&c.bounds)
                .into_iter()
                .filter(|&id| id as usize != *i && c.bounds.contains(&components[id as usize].bounds))
                .count();
            contained > max_contained
        })
        .map(|(i, _)| i)
        .collect();
    for &i in &containers {
        let c = &mut components[i];
        c.rejection |= Rejection::CONTAINS_OTHERS;
        c.valid = false;
    }
    debug!("merge: {} container components removed", containers.len());
    containers.len()
}

/// Whether `c` should absorb neighbour `n`: the boxes overlap horizontally,
/// and vertically once `n` is extended by a quarter of its height, and both
/// overlaps reach a quarter of the larger extent.
fn mergeable(c: &Bounds, n: &Bounds) -> bool {
    let dx = c.x1.min(n.x1) - c.x0.max(n.x0) + 1;
    let dv = (n.height() / 4) as i32;
    let dy = c.y1.min(n.y1 + dv) - c.y0.max(n.y0 - dv) + 1;
    if dx <= 0 || dy <= 0 {
        return false;
    }
    let max_w = c.width().max(n.width()) as i32;
    let max_h = c.height().max(n.height()) as i32;
    dx * 4 >= max_w && dy * 4 >= max_h
}

/// Search merge partners for every valid component in a `w × h` frame.
/// Invalid components are neither queried nor accepted as partners.
pub fn merge_candidates(
    components: &[Component],
    index: &BoxIndex,
    min_margin: u32,
    w: usize,
    h: usize,
) -> Vec<MergeCandidate> {
    let mut pairs: Vec<MergeCandidate> = components
        .par_iter()
        .filter(|c| c.valid)
        .flat_map_iter(|c| {
            let margin = c.width.max(c.height).max(min_margin) as i32;
            let window = c.bounds.expand_within(margin, w, h);
            index
                .search(&window)
                .into_iter()
                .filter(move |&id| {
                    let n = &components[id as usize];
                    id != c.id && n.valid && mergeable(&c.bounds, &n.bounds)
                })
                .map(move |id| MergeCandidate {
                    a: id.min(c.id),
                    b: id.max(c.id),
                })
        })
        .collect();
    pairs.sort_unstable();
    pairs.dedup();
    debug!("merge: {} candidate pairs", pairs.len());
    pairs
}

fn find(parent: &mut [u32], mut i: u32) -> u32 {
    while parent[i as usize] != i {
        let up = parent[parent[i as usize] as usize];
        parent[i as usize] = up;
        i = up;
    }
    i
}

/// Union candidate pairs into regions. Every valid component lands in
/// exactly one region; members of multi-component regions get
/// `merge_parent` set to the lowest id of their group.
pub fn commit_merges(components: &mut [Component], candidates: &[MergeCandidate]) -> Vec<TextRegion> {
    let mut parent: Vec<u32> = (0..components.len() as u32).collect();
    for m in candidates {
        let (ra, rb) = (find(&mut parent, m.a), find(&mut parent, m.b));
        if ra != rb {
            // keep the lower id as root
            parent[ra.max(rb) as usize] = ra.min(rb);
        }
    }

    let mut slot = vec![usize::MAX; components.len()];
    let mut regions: Vec<TextRegion> = Vec::new();
    for i in 0..components.len() {
        if !components[i].valid {
            continue;
        }
        let root = find(&mut parent, i as u32) as usize;
        let bounds = components[i].bounds;
        if slot[root] == usize::MAX {
            slot[root] = regions.len();
            regions.push(TextRegion {
                bounds,
                members: vec![i as u32],
            });
        } else {
            let region = &mut regions[slot[root]];
            region.bounds = region.bounds.union(&bounds);
            region.members.push(i as u32);
        }
    }
    for region in regions.iter().filter(|r| r.members.len() > 1) {
        for &m in &region.members {
            components[m as usize].merge_parent = Some(region.members[0]);
        }
    }
    debug!(
        "merge: {} regions from {} pairs",
        regions.len(),
        candidates.len()
    );
    regions
}
