//! Bounded multi-source traversal
//!
//! Level-synchronous breadth-first expansion from a set of seed nodes, limited to `depth` hops.

use super::common::{GraphView, NodeIndex};

/// Which way edges are followed during expansion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// source -> target
    Outgoing,
    /// target -> source
    Incoming,
}

/// All nodes reachable from `seeds` within `depth` hops following `direction`.
///
/// Seeds are always part of the result (hop 0). The result is sorted ascending and
/// free of duplicates. Seeds outside the view are ignored.
pub fn k_hop(
    view: &GraphView,
    seeds: &[NodeIndex],
    depth: usize,
    direction: Direction,
) -> Vec<NodeIndex> {
    let mut visited = vec![false; view.node_count];
    let mut frontier = Vec::with_capacity(seeds.len());

    for &seed in seeds {
        if seed < view.node_count && !visited[seed] {
            visited[seed] = true;
            frontier.push(seed);
        }
    }

    for _ in 0..depth {
        if frontier.is_empty() {
            break;
        }
        let mut next = Vec::new();
        for &idx in &frontier {
            let neighbors = match direction {
                Direction::Outgoing => view.successors(idx),
                Direction::Incoming => view.predecessors(idx),
            };
            for &neighbor in neighbors {
                if !visited[neighbor] {
                    visited[neighbor] = true;
                    next.push(neighbor);
                }
            }
        }
        frontier = next;
    }

    visited
        .iter()
        .enumerate()
        .filter_map(|(idx, &seen)| if seen { Some(idx) } else { None })
        .collect()
}

/// Union of the outgoing and incoming `depth`-hop sets around `seeds`.
///
/// The two walks are independent and run in parallel. Note this is not an undirected walk:
/// a node two hops away via one forward and one backward edge is not included.
pub fn k_hop_bidirectional(view: &GraphView, seeds: &[NodeIndex], depth: usize) -> Vec<NodeIndex> {
    let (outward, inward) = rayon::join(
        || k_hop(view, seeds, depth, Direction::Outgoing),
        || k_hop(view, seeds, depth, Direction::Incoming),
    );
    merge_sorted(&outward, &inward)
}

fn merge_sorted(a: &[NodeIndex], b: &[NodeIndex]) -> Vec<NodeIndex> {
    let mut merged = Vec::with_capacity(a.len() + b.len());
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        if a[i] < b[j] {
            merged.push(a[i]);
            i += 1;
        } else if b[j] < a[i] {
            merged.push(b[j]);
            j += 1;
        } else {
            merged.push(a[i]);
            i += 1;
            j += 1;
        }
    }
    merged.extend_from_slice(&a[i..]);
    merged.extend_from_slice(&b[j..]);
    merged
}
