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

use super::canonical_graph::{canonical_labeling, ColoredGraph};
use super::vertex_painter::VertexPainter;
use crate::expressions::{Expression, ParticleSymmetry, Symmetry, Tensor};
use crate::indices::{Index, IndexConventions};
use crate::{hash_combine, invariant_violation, ContraqtionError, StructuralHash};
use indexmap::{IndexMap, IndexSet};
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};

/// A product of tensors viewed as an index-connectivity graph.
///
/// Every unique index is a vertex connected to the slot groups of the tensors it appears
/// in. Indices appearing in exactly one slot are free (external); indices appearing in
/// exactly two slots are summed over. An index may never appear in more than two slots:
/// diagonals are disallowed at this layer.
///
/// The network produces a canonical renaming of its summation indices by coloring the
/// graph and relabeling it canonically, which makes fingerprints of networks stable under
/// any relabeling of summation indices.
///
/// # Example
///
/// ```rust
/// use contraqtion::networks::TensorNetwork;
/// use contraqtion::expressions::Tensor;
///
/// let network = TensorNetwork::from_tensors([
///     "t[i_1;a_1]".parse::<Tensor>().unwrap(),
///     "f[a_1;i_2]".parse::<Tensor>().unwrap(),
/// ])
/// .unwrap();
/// assert_eq!(network.summation_indices().len(), 1);
/// assert_eq!(network.external_indices().len(), 2);
/// ```
#[derive(Debug, Clone, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct TensorNetwork {
    /// The ordered tensor factors of the network.
    tensors: Vec<Tensor>,
}

pub(crate) struct NetworkGraph {
    graph: UnGraph<(), ()>,
    colors: Vec<u64>,
    index_nodes: IndexMap<Index, NodeIndex>,
}

impl TensorNetwork {
    /// Creates a new TensorNetwork from the factors of a product.
    ///
    /// # Arguments
    ///
    /// * `factors` - The factor expressions; all of them must be tensors.
    ///
    /// # Returns
    ///
    /// * `Ok(TensorNetwork)` - The new TensorNetwork.
    /// * `Err(ContraqtionError::NonTensorNetworkFactor)` - A factor is not a tensor.
    /// * `Err(ContraqtionError::IndexMultiplicityExceeded)` - An index occurs in more than
    ///   two slots.
    pub fn new(factors: &[Expression]) -> Result<Self, ContraqtionError> {
        let tensors = factors
            .iter()
            .map(|factor| {
                factor
                    .as_tensor()
                    .cloned()
                    .ok_or_else(|| ContraqtionError::NonTensorNetworkFactor {
                        kind: factor.kind_name().to_string(),
                    })
            })
            .collect::<Result<Vec<Tensor>, ContraqtionError>>()?;
        Self::from_tensors(tensors)
    }

    /// Creates a new TensorNetwork from tensors.
    ///
    /// # Arguments
    ///
    /// * `tensors` - The ordered tensor factors.
    ///
    /// # Returns
    ///
    /// * `Ok(TensorNetwork)` - The new TensorNetwork.
    /// * `Err(ContraqtionError::IndexMultiplicityExceeded)` - An index occurs in more than
    ///   two slots.
    pub fn from_tensors(
        tensors: impl IntoIterator<Item = Tensor>,
    ) -> Result<Self, ContraqtionError> {
        let network = Self {
            tensors: tensors.into_iter().collect(),
        };
        for (index, count) in network.index_multiplicities() {
            if count > 2 {
                return Err(ContraqtionError::IndexMultiplicityExceeded {
                    index: index.to_string(),
                    count,
                });
            }
        }
        Ok(network)
    }

    /// Returns the ordered tensor factors of the network.
    pub fn tensors(&self) -> &[Tensor] {
        &self.tensors
    }

    /// Counts the slots every index appears in, in first-appearance order.
    fn index_multiplicities(&self) -> IndexMap<Index, usize> {
        let mut multiplicities: IndexMap<Index, usize> = IndexMap::new();
        for tensor in &self.tensors {
            for index in tensor.indices() {
                *multiplicities.entry(index.clone()).or_insert(0) += 1;
            }
        }
        multiplicities
    }

    /// Returns the free (external) indices of the network, sorted by label.
    pub fn external_indices(&self) -> Vec<Index> {
        let mut externals: Vec<Index> = self
            .index_multiplicities()
            .into_iter()
            .filter(|&(_, count)| count == 1)
            .map(|(index, _)| index)
            .collect();
        externals.sort();
        externals
    }

    /// Returns the summation (internal) indices of the network, sorted by label.
    pub fn summation_indices(&self) -> Vec<Index> {
        let mut dummies: Vec<Index> = self
            .index_multiplicities()
            .into_iter()
            .filter(|&(_, count)| count == 2)
            .map(|(index, _)| index)
            .collect();
        dummies.sort();
        dummies
    }

    /// Computes the canonical renaming of the summation indices.
    ///
    /// The colored network graph is canonically relabeled; summation indices are then
    /// renamed, in the order of their canonical vertices, to the canonical label base of
    /// their space with ordinals starting after the largest ordinal any external index of
    /// the same space uses. External indices are never renamed.
    ///
    /// # Arguments
    ///
    /// * `conventions` - The label conventions choosing canonical bases.
    ///
    /// # Returns
    ///
    /// * `Ok(IndexMap<Index, Index>)` - The renaming, containing only indices that change.
    /// * `Err(ContraqtionError::UnregisteredSpace)` - A summation index runs over a space
    ///   with no canonical label base.
    pub fn canonical_index_renaming(
        &self,
        conventions: &IndexConventions,
    ) -> Result<IndexMap<Index, Index>, ContraqtionError> {
        let dummies = self.summation_indices();
        if dummies.is_empty() {
            return Ok(IndexMap::new());
        }
        let externals = self.external_indices();
        let named: IndexSet<Index> = externals.iter().cloned().collect();
        let network_graph = self.build_graph(&named, false);
        let labeling = canonical_labeling(&ColoredGraph {
            adjacency: adjacency_lists(&network_graph.graph),
            colors: network_graph.colors,
        });
        let mut ordered_dummies: Vec<(usize, Index)> = Vec::with_capacity(dummies.len());
        for dummy in dummies {
            match network_graph.index_nodes.get(&dummy) {
                Some(node) => ordered_dummies.push((labeling[node.index()], dummy)),
                None => {
                    return invariant_violation("summation index missing from the network graph")
                }
            }
        }
        ordered_dummies.sort_by_key(|entry| entry.0);

        let mut next_ordinal: IndexMap<u64, u32> = IndexMap::new();
        for external in &externals {
            let entry = next_ordinal.entry(external.space().color()).or_insert(0);
            *entry = (*entry).max(external.ordinal());
        }
        let mut renaming = IndexMap::new();
        for (_, dummy) in ordered_dummies {
            let space = *dummy.space();
            let base = conventions.canonical_base(&space)?;
            let counter = next_ordinal.entry(space.color()).or_insert(0);
            *counter += 1;
            let canonical =
                Index::with_protos(base, *counter, space, dummy.protos().to_vec())?;
            if canonical != dummy {
                renaming.insert(dummy, canonical);
            }
        }
        Ok(renaming)
    }

    /// Renames the summation indices of the network itself into canonical form.
    ///
    /// Tensor slots are re-sorted afterwards as far as their symmetries permit; any signs
    /// produced by the re-sorting are discarded, so this is a structural operation meant
    /// for fingerprinting, not an algebraic rewrite.
    ///
    /// # Arguments
    ///
    /// * `conventions` - The label conventions choosing canonical bases.
    ///
    /// # Returns
    ///
    /// * `Ok(IndexMap<Index, Index>)` - The applied renaming.
    /// * `Err(ContraqtionError::UnregisteredSpace)` - A summation index runs over a space
    ///   with no canonical label base.
    pub fn canonicalize_indices(
        &mut self,
        conventions: &IndexConventions,
    ) -> Result<IndexMap<Index, Index>, ContraqtionError> {
        let renaming = self.canonical_index_renaming(conventions)?;
        for tensor in &mut self.tensors {
            tensor.substitute_indices(&renaming);
            tensor.canonicalize_slots();
        }
        Ok(renaming)
    }

    /// Computes the canonical fingerprint of the network.
    ///
    /// The fingerprint is stable under relabeling of summation indices and under
    /// reordering of the tensor factors.
    ///
    /// # Returns
    ///
    /// * `Ok(u64)` - The fingerprint.
    /// * `Err(ContraqtionError::UnregisteredSpace)` - A summation index runs over a space
    ///   with no canonical label base.
    pub fn fingerprint(&self) -> Result<u64, ContraqtionError> {
        let mut canonical = self.clone();
        canonical.canonicalize_indices(&IndexConventions::current())?;
        let mut tensor_hashes: Vec<u64> = canonical
            .tensors
            .iter()
            .map(|tensor| tensor.structural_hash())
            .collect();
        tensor_hashes.sort_unstable();
        Ok(tensor_hashes
            .into_iter()
            .fold(0x7e4a_11c3_9d2f_8b61, hash_combine))
    }

    /// Builds the colored incidence graph of the network.
    ///
    /// Per tensor the graph holds a core vertex, slot group vertices (one per slot for
    /// nonsymmetric tensors, one per bra/ket otherwise), particle group vertices tying the
    /// k-th bra to the k-th ket group of particle-symmetric tensors, and edges from slot
    /// groups to the index vertices occupying them. Indices with proto-indices hang their
    /// bundle off the index vertex.
    fn build_graph(&self, named: &IndexSet<Index>, distinct_named: bool) -> NetworkGraph {
        let mut painter = VertexPainter::new(named.clone(), distinct_named);
        let mut graph: UnGraph<(), ()> = UnGraph::new_undirected();
        let mut colors: Vec<u64> = Vec::new();
        let mut index_nodes: IndexMap<Index, NodeIndex> = IndexMap::new();

        fn add_vertex(graph: &mut UnGraph<(), ()>, colors: &mut Vec<u64>, color: u64) -> NodeIndex {
            colors.push(color);
            graph.add_node(())
        }

        fn index_vertex(
            index: &Index,
            graph: &mut UnGraph<(), ()>,
            colors: &mut Vec<u64>,
            index_nodes: &mut IndexMap<Index, NodeIndex>,
            painter: &mut VertexPainter,
        ) -> NodeIndex {
            if let Some(&node) = index_nodes.get(index) {
                return node;
            }
            let color = painter.paint_index(index);
            let node = add_vertex(graph, colors, color);
            index_nodes.insert(index.clone(), node);
            if !index.protos().is_empty() {
                let bundle_color = painter.paint_proto_bundle(index.protos());
                let bundle = add_vertex(graph, colors, bundle_color);
                graph.add_edge(node, bundle, ());
                for proto in index.protos() {
                    let proto_node =
                        index_vertex(proto, graph, colors, index_nodes, painter);
                    graph.add_edge(bundle, proto_node, ());
                }
            }
            node
        }

        for tensor in &self.tensors {
            let core = add_vertex(&mut graph, &mut colors, painter.paint_tensor(tensor));
            let per_slot = tensor.symmetry() == Symmetry::Nonsymmetric;
            let braket_exchangeable = tensor.braket_symmetry() == crate::expressions::BraKetSymmetry::Symmetric;

            let bra_group_count = if per_slot { tensor.bra_rank() } else { 1.min(tensor.bra_rank()) };
            let ket_group_count = if per_slot { tensor.ket_rank() } else { 1.min(tensor.ket_rank()) };

            let bra_groups: Vec<NodeIndex> = (0..bra_group_count)
                .map(|id| add_vertex(&mut graph, &mut colors, painter.paint_bra_group(id)))
                .collect();
            // a bra-ket symmetric tensor paints its ket groups with the bra group colors,
            // making the two slot bundles exchangeable in the graph
            let ket_groups: Vec<NodeIndex> = (0..ket_group_count)
                .map(|id| {
                    let color = if braket_exchangeable {
                        painter.paint_bra_group(id)
                    } else {
                        painter.paint_ket_group(id)
                    };
                    add_vertex(&mut graph, &mut colors, color)
                })
                .collect();

            let tie_particles =
                tensor.particle_symmetry() == ParticleSymmetry::Symmetric && per_slot;
            let tied = if tie_particles {
                bra_groups.len().min(ket_groups.len())
            } else {
                0
            };
            for id in 0..tied {
                let particle =
                    add_vertex(&mut graph, &mut colors, painter.paint_particle_group(id));
                graph.add_edge(core, particle, ());
                graph.add_edge(particle, bra_groups[id], ());
                graph.add_edge(particle, ket_groups[id], ());
            }
            for &group in bra_groups.iter().skip(tied).chain(ket_groups.iter().skip(tied)) {
                graph.add_edge(core, group, ());
            }

            for (slot, index) in tensor.bra().iter().enumerate() {
                let group = bra_groups[if per_slot { slot } else { 0 }];
                let node = index_vertex(
                    index,
                    &mut graph,
                    &mut colors,
                    &mut index_nodes,
                    &mut painter,
                );
                graph.add_edge(group, node, ());
            }
            for (slot, index) in tensor.ket().iter().enumerate() {
                let group = ket_groups[if per_slot { slot } else { 0 }];
                let node = index_vertex(
                    index,
                    &mut graph,
                    &mut colors,
                    &mut index_nodes,
                    &mut painter,
                );
                graph.add_edge(group, node, ());
            }
            for (slot, index) in tensor.aux().iter().enumerate() {
                let aux_group =
                    add_vertex(&mut graph, &mut colors, painter.paint_aux_group(slot));
                graph.add_edge(core, aux_group, ());
                let node = index_vertex(
                    index,
                    &mut graph,
                    &mut colors,
                    &mut index_nodes,
                    &mut painter,
                );
                graph.add_edge(aux_group, node, ());
            }
        }

        NetworkGraph {
            graph,
            colors,
            index_nodes,
        }
    }
}

impl StructuralHash for TensorNetwork {}

/// Extracts sorted adjacency lists from a petgraph graph.
fn adjacency_lists(graph: &UnGraph<(), ()>) -> Vec<Vec<usize>> {
    let mut adjacency = vec![Vec::new(); graph.node_count()];
    for edge in graph.edge_references() {
        let source = edge.source().index();
        let target = edge.target().index();
        adjacency[source].push(target);
        adjacency[target].push(source);
    }
    for neighbors in &mut adjacency {
        neighbors.sort_unstable();
    }
    adjacency
}
