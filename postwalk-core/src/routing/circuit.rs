//! Eulerian circuit extraction with Hierholzer's algorithm.

use fixedbitset::FixedBitSet;
use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::model::EdgeTraversal;
use crate::routing::augment::AugmentedGraph;

/// Walk an Eulerian circuit over the augmented graph, starting at `start`.
///
/// Stack-based sub-tour splicing: advance along the unused adjacency entry
/// with the lowest edge index, marking the entry's copy used (which consumes
/// the twin entry too); when a node has no unused entry left, pop it and
/// emit the traversal that reached it. Reversing the emissions yields the
/// circuit. Runs in time linear in the number of edge copies.
///
/// The circuit only covers the connected component containing `start`; the
/// caller is responsible for handing over a connected (component-restricted)
/// adjacency.
pub(crate) fn hierholzer(augmented: &AugmentedGraph, start: NodeIndex) -> Vec<EdgeTraversal> {
    let mut used = FixedBitSet::with_capacity(augmented.copies);
    // Per-node scan position; entries before it are permanently used.
    let mut cursor = vec![0usize; augmented.adjacency.len()];
    let mut stack: Vec<(NodeIndex, Option<EdgeIndex>)> = vec![(start, None)];
    let mut circuit = Vec::with_capacity(augmented.copies);

    while let Some(&(node, _)) = stack.last() {
        let entries = &augmented.adjacency[node.index()];
        let mut pos = cursor[node.index()];
        while pos < entries.len() && used.contains(entries[pos].copy) {
            pos += 1;
        }
        cursor[node.index()] = pos;

        if let Some(entry) = entries.get(pos) {
            used.insert(entry.copy);
            stack.push((entry.target, Some(entry.edge)));
        } else if let Some((popped, via)) = stack.pop() {
            if let (Some(edge), Some(&(parent, _))) = (via, stack.last()) {
                circuit.push(EdgeTraversal {
                    edge,
                    from: parent,
                    to: popped,
                });
            }
        }
    }

    circuit.reverse();
    circuit
}
