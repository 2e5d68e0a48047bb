//! Loop extraction and hole orientation.

use serde::Serialize;
use std::fmt;
use std::fmt::Write as _;

use super::graph::{SegmentGraph, Vertex};
use crate::error::MasktraceError;

/// Point containment test used to decide loop nesting.
pub trait PointInPolygon {
    /// Returns true if `(x, y)` lies inside the closed `polygon`.
    fn contains(&self, polygon: &[Vertex], x: f64, y: f64) -> bool;
}

/// Nonzero winding rule containment.
#[derive(Clone, Copy, Debug, Default)]
pub struct NonzeroWinding;

/// Even-odd (crossing parity) containment.
#[derive(Clone, Copy, Debug, Default)]
pub struct EvenOdd;

impl PointInPolygon for NonzeroWinding {
    fn contains(&self, polygon: &[Vertex], x: f64, y: f64) -> bool {
        winding_number(polygon, x, y) != 0
    }
}

impl PointInPolygon for EvenOdd {
    fn contains(&self, polygon: &[Vertex], x: f64, y: f64) -> bool {
        let mut inside = false;
        for (a, b) in closed_edges(polygon) {
            let (ax, ay) = (a.x as f64, a.y as f64);
            let (bx, by) = (b.x as f64, b.y as f64);
            if (ay > y) != (by > y) {
                let cross_x = ax + (y - ay) * (bx - ax) / (by - ay);
                if x < cross_x {
                    inside = !inside;
                }
            }
        }
        inside
    }
}

fn closed_edges(polygon: &[Vertex]) -> impl Iterator<Item = (Vertex, Vertex)> + '_ {
    polygon
        .iter()
        .copied()
        .zip(polygon.iter().copied().cycle().skip(1))
}

/// Winding number of `polygon` around `(x, y)`.
///
/// Positive for loops that run clockwise in image coordinates (y down).
pub fn winding_number(polygon: &[Vertex], x: f64, y: f64) -> i32 {
    let mut winding = 0;
    for (a, b) in closed_edges(polygon) {
        let (ax, ay) = (a.x as f64, a.y as f64);
        let (bx, by) = (b.x as f64, b.y as f64);
        let side = (bx - ax) * (y - ay) - (x - ax) * (by - ay);
        if ay <= y {
            if by > y && side > 0.0 {
                winding += 1;
            }
        } else if by <= y && side < 0.0 {
            winding -= 1;
        }
    }
    winding
}

/// A closed boundary loop with its nesting depth.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TracedLoop {
    vertices: Vec<Vertex>,
    depth: usize,
}

impl TracedLoop {
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Number of earlier loops that contain this one.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Odd depth: the loop bounds a hole and winds the opposite way.
    pub fn is_hole(&self) -> bool {
        self.depth % 2 == 1
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn winding_number(&self, x: f64, y: f64) -> i32 {
        winding_number(&self.vertices, x, y)
    }

    /// Shoelace area in image coordinates. Outer boundaries come out
    /// negative and holes positive.
    pub fn signed_area(&self) -> i64 {
        let twice: i64 = closed_edges(&self.vertices)
            .map(|(a, b)| a.x as i64 * b.y as i64 - b.x as i64 * a.y as i64)
            .sum();
        twice / 2
    }

    /// Renders the loop as `M x0 y0 L x1 y1 ...`; closing is implicit.
    pub fn to_path_string(&self) -> String {
        let mut out = String::with_capacity(self.vertices.len() * 10);
        for (i, v) in self.vertices.iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            let command = if i == 0 { 'M' } else { 'L' };
            // Writing to a String cannot fail.
            let _ = write!(out, "{command} {} {}", v.x, v.y);
        }
        out
    }
}

impl fmt::Display for TracedLoop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_path_string())
    }
}

/// Splits the graph into closed vertex loops.
///
/// Each walk starts at the smallest remaining vertex and steps to the
/// smallest remaining neighbour, consuming edges as it goes. At a pinch
/// vertex the walk takes the edge paired with the one it arrived on, so
/// every loop is simple apart from touching itself or others at corners.
///
/// # Errors
/// [`MasktraceError::OpenLoop`] if a walk reaches a vertex with no unused
/// edge before getting back to its start.
pub fn extract_loops(mut graph: SegmentGraph) -> Result<Vec<Vec<Vertex>>, MasktraceError> {
    let mut loops = Vec::new();

    while let Some(start) = graph.first_vertex() {
        let mut vertices = vec![start];
        let mut previous = None;
        let mut current = start;

        loop {
            let Some(next) = graph.next_neighbour(previous, current) else {
                return Err(MasktraceError::OpenLoop {
                    x: current.x,
                    y: current.y,
                });
            };
            graph.remove_edge(current, next);
            if next == start {
                break;
            }
            vertices.push(next);
            previous = Some(current);
            current = next;
        }

        loops.push(vertices);
    }

    Ok(loops)
}

/// Assigns each loop its nesting depth and reverses the loops at odd
/// depth.
///
/// A loop is sampled half a pixel inside its first vertex; the depth is the
/// number of loops before it that contain the sample.
pub fn orient_loops<P: PointInPolygon + ?Sized>(
    loops: Vec<Vec<Vertex>>,
    containment: &P,
) -> Vec<TracedLoop> {
    let mut finished: Vec<TracedLoop> = Vec::with_capacity(loops.len());

    for mut vertices in loops {
        let Some(first) = vertices.first() else {
            continue;
        };
        let (sx, sy) = (first.x as f64 + 0.5, first.y as f64 + 0.5);
        let depth = finished
            .iter()
            .filter(|outer| containment.contains(&outer.vertices, sx, sy))
            .count();
        if depth % 2 == 1 {
            vertices.reverse();
        }
        finished.push(TracedLoop { vertices, depth });
    }

    finished
}

/// Extracts and orients every loop of `graph`.
pub fn assemble_paths<P: PointInPolygon + ?Sized>(
    graph: SegmentGraph,
    containment: &P,
) -> Result<Vec<TracedLoop>, MasktraceError> {
    Ok(orient_loops(extract_loops(graph)?, containment))
}
