//! Axis-aligned boxes and a static, bulk-loaded R-tree over them.
//!
//! The tree is packed with the Sort-Tile-Recursive scheme: items are sorted
//! into vertical slices by centre x, each slice is sorted by centre y and
//! cut into nodes of [`NODE_CAPACITY`] entries. Upper levels repeat the same
//! packing over the node boxes until a single root remains. It is built once
//! per frame and only queried afterwards.
use serde::Serialize;

/// Inclusive pixel-space box.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Bounds {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl Bounds {
    pub const fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Inclusive width.
    #[inline]
    pub fn width(&self) -> u32 {
        (self.x1 - self.x0 + 1) as u32
    }

    /// Inclusive height.
    #[inline]
    pub fn height(&self) -> u32 {
        (self.y1 - self.y0 + 1) as u32
    }

    #[inline]
    pub fn intersects(&self, other: &Bounds) -> bool {
        self.x0 <= other.x1 && other.x0 <= self.x1 && self.y0 <= other.y1 && other.y0 <= self.y1
    }

    #[inline]
    pub fn contains(&self, other: &Bounds) -> bool {
        self.x0 <= other.x0 && self.y0 <= other.y0 && self.x1 >= other.x1 && self.y1 >= other.y1
    }

    #[inline]
    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    /// Grow by `margin` on every side, clamped to a `w × h` frame.
    pub fn expand_within(&self, margin: i32, w: usize, h: usize) -> Bounds {
        Bounds {
            x0: (self.x0 - margin).max(0),
            y0: (self.y0 - margin).max(0),
            x1: (self.x1 + margin).min(w as i32 - 1),
            y1: (self.y1 + margin).min(h as i32 - 1),
        }
    }

    /// Twice the centre, kept integral for sorting.
    #[inline]
    fn centre2(&self) -> (i32, i32) {
        (self.x0 + self.x1, self.y0 + self.y1)
    }
}

/// Maximum entries per tree node.
pub const NODE_CAPACITY: usize = 9;

#[derive(Clone, Copy, Debug)]
struct Node {
    bounds: Bounds,
    /// Child range in the level below (or in `items` for leaves).
    start: usize,
    end: usize,
}

/// Packed R-tree mapping boxes to `u32` ids.
#[derive(Clone, Debug, Default)]
pub struct BoxIndex {
    items: Vec<(Bounds, u32)>,
    /// `levels[0]` are the leaves; the last level holds the root.
    levels: Vec<Vec<Node>>,
}

impl BoxIndex {
    /// Build the tree in one pass over `items`.
    pub fn bulk_load(mut items: Vec<(Bounds, u32)>) -> Self {
        if items.is_empty() {
            return Self::default();
        }
        str_order(&mut items, |(b, _)| *b);
        let mut levels = vec![pack(&items, |(b, _)| *b)];
        while levels.last().map_or(0, Vec::len) > 1 {
            let mut below = levels.pop().unwrap_or_default();
            str_order(&mut below, |n| n.bounds);
            let above = pack(&below, |n| n.bounds);
            levels.push(below);
            levels.push(above);
        }
        Self { items, levels }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Ids of every box intersecting `query`, in tree order.
    pub fn search(&self, query: &Bounds) -> Vec<u32> {
        let mut out = Vec::new();
        let Some(top) = self.levels.len().checked_sub(1) else {
            return out;
        };
        let mut stack: Vec<(usize, usize)> = (0..self.levels[top].len()).map(|i| (top, i)).collect();
        while let Some((level, idx)) = stack.pop() {
            let node = &self.levels[level][idx];
            if !node.bounds.intersects(query) {
                continue;
            }
            if level == 0 {
                out.extend(
                    self.items[node.start..node.end]
                        .iter()
                        .filter(|(b, _)| b.intersects(query))
                        .map(|&(_, id)| id),
                );
            } else {
                stack.extend((node.start..node.end).map(|i| (level - 1, i)));
            }
        }
        out
    }
}

/// Reorder `entries` into Sort-Tile-Recursive order so that consecutive
/// runs of [`NODE_CAPACITY`] form spatially compact nodes.
fn str_order<T>(entries: &mut [T], bounds: impl Fn(&T) -> Bounds + Copy) {
    let n = entries.len();
    let leaves = n.div_ceil(NODE_CAPACITY);
    let slices = (leaves as f64).sqrt().ceil().max(1.0) as usize;
    let slice_len = slices * NODE_CAPACITY;
    entries.sort_by_key(|e| bounds(e).centre2().0);
    for slice in entries.chunks_mut(slice_len) {
        slice.sort_by_key(|e| bounds(e).centre2().1);
    }
}

fn pack<T>(entries: &[T], bounds: impl Fn(&T) -> Bounds) -> Vec<Node> {
    entries
        .chunks(NODE_CAPACITY)
        .enumerate()
        .map(|(i, chunk)| {
            let start = i * NODE_CAPACITY;
            let b = chunk
                .iter()
                .map(&bounds)
                .reduce(|a, b| a.union(&b))
                .unwrap_or(Bounds::new(0, 0, -1, -1));
            Node {
                bounds: b,
                start,
                end: start + chunk.len(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(n: i32) -> Vec<(Bounds, u32)> {
        let mut items = Vec::new();
        for y in 0..n {
            for x in 0..n {
                let id = (y * n + x) as u32;
                items.push((Bounds::new(x * 10, y * 10, x * 10 + 4, y * 10 + 4), id));
            }
        }
        items
    }

    #[test]
    fn inclusive_geometry() {
        let a = Bounds::new(0, 0, 3, 1);
        assert_eq!((a.width(), a.height()), (4, 2));
        assert!(a.intersects(&Bounds::new(3, 1, 5, 5)));
        assert!(!a.intersects(&Bounds::new(4, 0, 5, 5)));
        assert!(a.contains(&Bounds::new(1, 0, 3, 1)));
        assert_eq!(
            a.expand_within(2, 5, 5),
            Bounds::new(0, 0, 4, 3)
        );
    }

    #[test]
    fn search_matches_brute_force() {
        let items = grid(12);
        let index = BoxIndex::bulk_load(items.clone());
        assert_eq!(index.len(), 144);
        for query in [
            Bounds::new(0, 0, 4, 4),
            Bounds::new(5, 5, 9, 9),
            Bounds::new(12, 8, 47, 31),
            Bounds::new(-100, -100, 500, 500),
            Bounds::new(200, 200, 300, 300),
        ] {
            let mut got = index.search(&query);
            got.sort_unstable();
            let expected: Vec<u32> = items
                .iter()
                .filter(|(b, _)| b.intersects(&query))
                .map(|&(_, id)| id)
                .collect();
            assert_eq!(got, expected, "query {query:?}");
        }
    }

    #[test]
    fn empty_index_finds_nothing() {
        let index = BoxIndex::bulk_load(Vec::new());
        assert!(index.search(&Bounds::new(0, 0, 10, 10)).is_empty());
    }
}
