//! Boundary segment graph.
//!
//! The graph holds the pixel-boundary edges of a mask as axis-aligned
//! segments between integer grid vertices. Vertical edges lie on the
//! line between two columns wherever exactly one side is foreground.
//! Horizontal edges are merged so that every maximal straight run is a
//! single edge.
//!
//! Built from breakpoints, every vertex has two neighbours, except where
//! two foreground pixels touch only at a corner. That point becomes a
//! [`Pinch`] vertex with four neighbours, and the loop walk pairs its edges
//! so that the two foreground pixels stay connected through it.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use super::breakpoints::{line_breakpoints, Breakpoint};

/// A grid vertex. `x` is a column boundary, `y` a row boundary.
///
/// Vertices order by `x`, then `y`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Vertex {
    pub x: u32,
    pub y: u32,
}

impl Vertex {
    #[inline]
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// Which diagonal pair of pixels is foreground at a corner touch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Pinch {
    /// Top-left and bottom-right pixels.
    Falling,
    /// Top-right and bottom-left pixels.
    Rising,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Heading {
    North,
    East,
    South,
    West,
}

impl Heading {
    /// Direction of `to` as seen from `from`, for axis-aligned neighbours.
    fn between(from: Vertex, to: Vertex) -> Self {
        if to.x < from.x {
            Heading::West
        } else if to.x > from.x {
            Heading::East
        } else if to.y < from.y {
            Heading::North
        } else {
            Heading::South
        }
    }
}

impl Pinch {
    /// The edge leaving a pinch vertex that pairs with the edge arriving
    /// from `arrived`. Each pair cuts off one background quadrant.
    fn partner(self, arrived: Heading) -> Heading {
        use Heading::*;
        match (self, arrived) {
            (Pinch::Falling, North) => East,
            (Pinch::Falling, East) => North,
            (Pinch::Falling, West) => South,
            (Pinch::Falling, South) => West,
            (Pinch::Rising, North) => West,
            (Pinch::Rising, West) => North,
            (Pinch::Rising, East) => South,
            (Pinch::Rising, South) => East,
        }
    }
}

/// Undirected graph over grid vertices with sorted adjacency.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SegmentGraph {
    adjacency: BTreeMap<Vertex, BTreeSet<Vertex>>,
    pinches: BTreeMap<Vertex, Pinch>,
}

impl SegmentGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the boundary graph of a column-major RLE mask.
    pub fn from_counts(counts: &[u32], height: u32) -> Self {
        Self::from_breakpoints(&line_breakpoints(counts, height))
    }

    /// Builds the boundary graph from per-column breakpoints, which must be
    /// sorted by column.
    pub fn from_breakpoints(breakpoints: &[Breakpoint]) -> Self {
        let mut builder = GraphBuilder::default();
        let mut previous: Option<&Breakpoint> = None;

        for bp in breakpoints {
            match previous {
                Some(prev) if prev.column.saturating_add(1) == bp.column => {
                    builder.boundary(bp.column, &prev.points, &bp.points);
                }
                Some(prev) => {
                    builder.boundary(prev.column.saturating_add(1), &prev.points, &[]);
                    builder.boundary(bp.column, &[], &bp.points);
                }
                None => builder.boundary(bp.column, &[], &bp.points),
            }
            previous = Some(bp);
        }
        if let Some(last) = previous {
            builder.boundary(last.column.saturating_add(1), &last.points, &[]);
        }

        builder.graph
    }

    /// Adds an undirected edge. Self-loops are ignored.
    pub fn add_edge(&mut self, a: Vertex, b: Vertex) {
        if a == b {
            return;
        }
        self.adjacency.entry(a).or_default().insert(b);
        self.adjacency.entry(b).or_default().insert(a);
    }

    /// Removes an edge, dropping endpoints left without neighbours.
    pub(crate) fn remove_edge(&mut self, a: Vertex, b: Vertex) {
        for (from, to) in [(a, b), (b, a)] {
            if let Some(neighbours) = self.adjacency.get_mut(&from) {
                neighbours.remove(&to);
                if neighbours.is_empty() {
                    self.adjacency.remove(&from);
                }
            }
        }
    }

    /// Smallest vertex still in the graph.
    pub(crate) fn first_vertex(&self) -> Option<Vertex> {
        self.adjacency.keys().next().copied()
    }

    /// Smallest remaining neighbour of `v`.
    pub(crate) fn first_neighbour(&self, v: Vertex) -> Option<Vertex> {
        self.adjacency
            .get(&v)
            .and_then(|neighbours| neighbours.iter().next().copied())
    }

    /// Next vertex of a walk that reached `current` from `previous`.
    ///
    /// At a pinch the edge paired with the arriving one is taken; anywhere
    /// else this is the smallest remaining neighbour.
    pub(crate) fn next_neighbour(&self, previous: Option<Vertex>, current: Vertex) -> Option<Vertex> {
        let (Some(prev), Some(pinch)) = (previous, self.pinches.get(&current)) else {
            return self.first_neighbour(current);
        };
        let heading = pinch.partner(Heading::between(current, prev));
        self.adjacency
            .get(&current)?
            .iter()
            .copied()
            .find(|&n| Heading::between(current, n) == heading)
    }

    /// Marks `v` as a corner touch between two foreground pixels.
    pub fn add_pinch(&mut self, v: Vertex, pinch: Pinch) {
        self.pinches.insert(v, pinch);
    }

    pub fn pinch(&self, v: Vertex) -> Option<Pinch> {
        self.pinches.get(&v).copied()
    }

    pub fn pinch_count(&self) -> usize {
        self.pinches.len()
    }

    pub fn neighbours(&self, v: Vertex) -> Option<&BTreeSet<Vertex>> {
        self.adjacency.get(&v)
    }

    pub fn degree(&self, v: Vertex) -> usize {
        self.adjacency.get(&v).map_or(0, BTreeSet::len)
    }

    pub fn vertex_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(BTreeSet::len).sum::<usize>() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    pub fn vertices(&self) -> impl Iterator<Item = Vertex> + '_ {
        self.adjacency.keys().copied()
    }

    /// Every edge once, as `(smaller, larger)`.
    pub fn edges(&self) -> impl Iterator<Item = (Vertex, Vertex)> + '_ {
        self.adjacency.iter().flat_map(|(&a, neighbours)| {
            neighbours
                .iter()
                .copied()
                .filter(move |&b| a < b)
                .map(move |b| (a, b))
        })
    }
}

#[derive(Default)]
struct GraphBuilder {
    graph: SegmentGraph,
    /// Horizontal edges still being extended: row -> starting x.
    open: BTreeMap<u32, u32>,
}

impl GraphBuilder {
    /// Emits the edges on the boundary line `x`, given the toggles of the
    /// column to its left and to its right.
    fn boundary(&mut self, x: u32, left: &[u32], right: &[u32]) {
        let (mut i, mut j) = (0, 0);
        let mut vertical_start: Option<u32> = None;

        loop {
            let y = match (left.get(i), right.get(j)) {
                (Some(&l), Some(&r)) => l.min(r),
                (Some(&l), None) => l,
                (None, Some(&r)) => r,
                (None, None) => break,
            };
            let in_left = left.get(i) == Some(&y);
            let in_right = right.get(j) == Some(&y);
            let left_filled_above = i % 2 == 1;
            if in_left {
                i += 1;
            }
            if in_right {
                j += 1;
            }

            if in_left && in_right {
                let Some(top) = vertical_start else {
                    // Horizontal edge continues straight through this line.
                    continue;
                };
                // Both sides flip while they differ: the pixels meet at a
                // corner only.
                let corner = Vertex::new(x, y);
                if let Some(start) = self.open.insert(y, x) {
                    self.graph.add_edge(Vertex::new(start, y), corner);
                }
                self.graph.add_edge(Vertex::new(x, top), corner);
                vertical_start = Some(y);
                let pinch = if left_filled_above {
                    Pinch::Falling
                } else {
                    Pinch::Rising
                };
                self.graph.add_pinch(corner, pinch);
                continue;
            }

            if in_left {
                if let Some(start) = self.open.remove(&y) {
                    self.graph.add_edge(Vertex::new(start, y), Vertex::new(x, y));
                }
            } else {
                self.open.insert(y, x);
            }

            match vertical_start.take() {
                Some(top) => self.graph.add_edge(Vertex::new(x, top), Vertex::new(x, y)),
                None => vertical_start = Some(y),
            }
        }
    }
}
