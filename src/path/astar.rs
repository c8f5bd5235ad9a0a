use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use crate::foundation::core::GridPos;

/// Largest grid side [`find_path`] will search.
pub const MAX_GRID_SIZE: u32 = 1024;

const ORTHOGONAL_COST: f64 = 1.0;
const DIAGONAL_COST: f64 = std::f64::consts::SQRT_2;

const STEPS: [(i32, i32); 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];

/// Octile distance: the exact cost of an unobstructed 8-directional walk.
pub fn octile_distance(a: GridPos, b: GridPos) -> f64 {
    let dx = f64::from(a.x.abs_diff(b.x));
    let dy = f64::from(a.y.abs_diff(b.y));
    dx.max(dy) + (DIAGONAL_COST - 1.0) * dx.min(dy)
}

/// Total step cost of a cell path (orthogonal 1, diagonal √2).
pub fn path_cost(path: &[GridPos]) -> f64 {
    path.windows(2)
        .map(|w| {
            if w[0].x != w[1].x && w[0].y != w[1].y {
                DIAGONAL_COST
            } else {
                ORTHOGONAL_COST
            }
        })
        .sum()
}

#[derive(Clone, Copy, Debug)]
struct OpenEntry {
    f: f64,
    h: f64,
    seq: u64,
    pos: GridPos,
}

// Min-heap order on (f, h, seq): among equal f prefer the node closer to the goal, then the
// one pushed first.
impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| other.h.total_cmp(&self.h))
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

struct Grid<'a> {
    size: u32,
    start: GridPos,
    goal: GridPos,
    obstacles: &'a HashSet<GridPos>,
}

impl Grid<'_> {
    fn contains(&self, p: GridPos) -> bool {
        p.x >= 0 && p.y >= 0 && (p.x as u32) < self.size && (p.y as u32) < self.size
    }

    fn blocked(&self, p: GridPos) -> bool {
        p != self.start && p != self.goal && self.obstacles.contains(&p)
    }
}

/// Shortest obstacle-avoiding route on a `grid_size`×`grid_size` 8-directional grid.
///
/// Orthogonal steps cost 1 and diagonal steps √2. A diagonal step is only taken when both
/// orthogonal cells it passes between are free. `start` and `end` are never treated as
/// obstacles. Returns the cell sequence including both ends, or `None` when either end lies
/// outside the grid, `grid_size` exceeds [`MAX_GRID_SIZE`], or no route exists.
///
/// Among equally short routes the result is deterministic: the open node with the lowest
/// `f = g + h` is expanded first, ties going to the lower heuristic and then to the earlier
/// insertion.
pub fn find_path(
    start: GridPos,
    end: GridPos,
    grid_size: u32,
    obstacles: &HashSet<GridPos>,
) -> Option<Vec<GridPos>> {
    if grid_size > MAX_GRID_SIZE {
        tracing::trace!(grid_size, "grid too large for routing");
        return None;
    }
    let grid = Grid {
        size: grid_size,
        start,
        goal: end,
        obstacles,
    };
    if !grid.contains(start) || !grid.contains(end) {
        return None;
    }
    if start == end {
        return Some(vec![start]);
    }

    // Search state only grows with the explored region, not with the grid.
    let mut g_score: HashMap<GridPos, f64> = HashMap::new();
    let mut came_from: HashMap<GridPos, GridPos> = HashMap::new();
    let mut closed: HashSet<GridPos> = HashSet::new();
    let mut open = BinaryHeap::new();
    let mut seq = 0u64;

    g_score.insert(start, 0.0);
    let h0 = octile_distance(start, end);
    open.push(OpenEntry {
        f: h0,
        h: h0,
        seq,
        pos: start,
    });

    while let Some(OpenEntry { pos: current, .. }) = open.pop() {
        if current == end {
            return Some(reconstruct(&came_from, end));
        }
        if !closed.insert(current) {
            continue;
        }

        let g = g_score.get(&current).copied().unwrap_or(f64::INFINITY);
        for (dx, dy) in STEPS {
            let next = current.offset(dx, dy);
            if !grid.contains(next) || closed.contains(&next) || grid.blocked(next) {
                continue;
            }
            let diagonal = dx != 0 && dy != 0;
            if diagonal
                && (grid.blocked(current.offset(dx, 0)) || grid.blocked(current.offset(0, dy)))
            {
                continue;
            }
            let step = if diagonal {
                DIAGONAL_COST
            } else {
                ORTHOGONAL_COST
            };
            let tentative = g + step;
            if tentative >= g_score.get(&next).copied().unwrap_or(f64::INFINITY) {
                continue;
            }
            g_score.insert(next, tentative);
            came_from.insert(next, current);
            let h = octile_distance(next, end);
            seq += 1;
            open.push(OpenEntry {
                f: tentative + h,
                h,
                seq,
                pos: next,
            });
        }
    }

    None
}

fn reconstruct(came_from: &HashMap<GridPos, GridPos>, goal: GridPos) -> Vec<GridPos> {
    let mut path = vec![goal];
    let mut cur = goal;
    while let Some(&prev) = came_from.get(&cur) {
        cur = prev;
        path.push(cur);
    }
    path.reverse();
    path
}

#[cfg(test)]
#[path = "../../tests/unit/path/astar.rs"]
mod tests;
