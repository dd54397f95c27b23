// Copyright © 2021-2023 HQS Quantum Simulations GmbH. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not use this file except
// in compliance with the License. You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software distributed under the
// License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either
// express or implied. See the License for the specific language governing permissions and
// limitations under the License.

//! Canonical relabeling of vertex-colored undirected graphs.
//!
//! Network graphs are small (a handful of tensors, a few dozen index vertices), so a
//! color-refinement partition with an individualization search over the smallest ambiguous
//! cell is exact and fast enough. The certificate of a candidate labeling is the relabeled
//! edge list together with the color sequence; the lexicographically least certificate wins,
//! which makes the result invariant under any relabeling of the input vertices.

/// A vertex-colored undirected graph in adjacency-list form.
#[derive(Debug, Clone)]
pub(crate) struct ColoredGraph {
    /// Sorted neighbor lists per vertex.
    pub(crate) adjacency: Vec<Vec<usize>>,
    /// Vertex colors as produced by the painter.
    pub(crate) colors: Vec<u64>,
}

type Certificate = (Vec<u64>, Vec<(usize, usize)>);

/// Computes a canonical labeling of the graph.
///
/// # Returns
///
/// * `Vec<usize>` - For every vertex its canonical position. Isomorphic graphs with equal
///   color multisets receive labelings that map them onto the same canonical graph.
pub(crate) fn canonical_labeling(graph: &ColoredGraph) -> Vec<usize> {
    if graph.adjacency.is_empty() {
        return Vec::new();
    }
    let classes = initial_classes(&graph.colors);
    search(graph, classes).0
}

/// Ranks raw colors into contiguous class ids ordered by color value.
fn initial_classes(colors: &[u64]) -> Vec<usize> {
    let mut sorted: Vec<u64> = colors.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    colors
        .iter()
        .map(|color| {
            sorted
                .binary_search(color)
                .expect("Internal bug: color missing from its own ranking")
        })
        .collect()
}

/// Refines the class partition until it is equitable.
///
/// Every vertex is re-keyed by its class and the sorted classes of its neighbors; new
/// contiguous class ids are assigned in signature order, so the refinement is invariant
/// under input relabeling.
fn refine(graph: &ColoredGraph, mut classes: Vec<usize>) -> Vec<usize> {
    loop {
        let mut signatures: Vec<(usize, Vec<usize>)> = Vec::with_capacity(classes.len());
        for (vertex, neighbors) in graph.adjacency.iter().enumerate() {
            let mut neighbor_classes: Vec<usize> =
                neighbors.iter().map(|&neighbor| classes[neighbor]).collect();
            neighbor_classes.sort_unstable();
            signatures.push((classes[vertex], neighbor_classes));
        }
        let mut unique: Vec<&(usize, Vec<usize>)> = signatures.iter().collect();
        unique.sort_unstable();
        unique.dedup();
        let refined: Vec<usize> = signatures
            .iter()
            .map(|signature| {
                unique
                    .binary_search(&signature)
                    .expect("Internal bug: signature missing from its own ranking")
            })
            .collect();
        let class_count = unique.len();
        let previous_count = count_classes(&classes);
        classes = refined;
        if class_count == previous_count {
            return classes;
        }
    }
}

fn count_classes(classes: &[usize]) -> usize {
    let mut sorted: Vec<usize> = classes.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    sorted.len()
}

fn search(graph: &ColoredGraph, classes: Vec<usize>) -> (Vec<usize>, Certificate) {
    let classes = refine(graph, classes);
    let vertex_count = graph.adjacency.len();
    if count_classes(&classes) == vertex_count {
        // discrete partition: contiguous class ids are the canonical positions
        let certificate = certificate(graph, &classes);
        return (classes, certificate);
    }

    let target = target_cell(&classes);
    let mut best: Option<(Vec<usize>, Certificate)> = None;
    for vertex in 0..vertex_count {
        if classes[vertex] != target {
            continue;
        }
        let mut branched = classes.clone();
        // individualize: a class id beyond every existing one singles the vertex out
        branched[vertex] = vertex_count;
        let candidate = search(graph, branched);
        best = match best {
            Some(incumbent) if incumbent.1 <= candidate.1 => Some(incumbent),
            _ => Some(candidate),
        };
    }
    best.expect("Internal bug: a non-discrete partition has a non-singleton cell")
}

/// Picks the smallest non-singleton cell, breaking ties by class id.
fn target_cell(classes: &[usize]) -> usize {
    let mut sizes: Vec<(usize, usize)> = Vec::new();
    for &class in classes {
        match sizes.iter_mut().find(|(id, _)| *id == class) {
            Some((_, size)) => *size += 1,
            None => sizes.push((class, 1)),
        }
    }
    sizes
        .into_iter()
        .filter(|&(_, size)| size > 1)
        .min_by_key(|&(id, size)| (size, id))
        .expect("Internal bug: a non-discrete partition has a non-singleton cell")
        .0
}

/// Encodes the graph under a candidate labeling.
fn certificate(graph: &ColoredGraph, labeling: &[usize]) -> Certificate {
    let vertex_count = graph.adjacency.len();
    let mut colors = vec![0u64; vertex_count];
    for (vertex, &position) in labeling.iter().enumerate() {
        colors[position] = graph.colors[vertex];
    }
    let mut edges: Vec<(usize, usize)> = Vec::new();
    for (vertex, neighbors) in graph.adjacency.iter().enumerate() {
        for &neighbor in neighbors {
            if vertex < neighbor {
                let left = labeling[vertex];
                let right = labeling[neighbor];
                edges.push((left.min(right), left.max(right)));
            }
        }
    }
    edges.sort_unstable();
    (colors, edges)
}
