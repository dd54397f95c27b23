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

use crate::expressions::Tensor;
use crate::indices::{proto_indices_color, Index};
use crate::hash_combine;
use indexmap::{IndexMap, IndexSet};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Salt spreading raw color inputs over the full value range.
///
/// Raw inputs often differ only by small offsets; combining with the salt keeps colors
/// visually and numerically far apart without affecting distinctness.
const COLOR_SALT: u64 = 0x43d2_c59c_b15b_73f0;

/// The semantic payload of a network graph vertex.
///
/// Two vertices may share a color only when their payloads are interchangeable under a
/// network isomorphism; the painter consults the payload on every color collision.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum VertexData {
    /// A tensor core, identified by its label/arity/symmetry fingerprint.
    TensorCore(u64),
    /// The bra slot group with the given position.
    BraGroup(usize),
    /// The ket slot group with the given position.
    KetGroup(usize),
    /// The auxiliary slot group with the given position.
    AuxGroup(usize),
    /// The particle group tying the k-th bra slot to the k-th ket slot.
    ParticleGroup(usize),
    /// An index vertex.
    IndexVertex(Index),
    /// A proto-index bundle, identified by its combined proto color.
    ProtoBundle(u64),
}

/// Paints network graph vertices with colors that are equal exactly for interchangeable
/// vertices.
///
/// Named (externally fixed) indices are either pairwise distinct, when externals must not
/// be collapsed by symmetry, or share a color by space, during summation-index renaming.
/// When two semantically distinct vertices would receive the same raw color, the painter
/// re-salts deterministically until its memoization table holds no colliding pair.
pub(crate) struct VertexPainter {
    used_colors: IndexMap<u64, VertexData>,
    named_indices: IndexSet<Index>,
    distinct_named_indices: bool,
}

impl VertexPainter {
    pub(crate) fn new(named_indices: IndexSet<Index>, distinct_named_indices: bool) -> Self {
        Self {
            used_colors: IndexMap::new(),
            named_indices,
            distinct_named_indices,
        }
    }

    /// Paints a tensor core vertex.
    pub(crate) fn paint_tensor(&mut self, tensor: &Tensor) -> u64 {
        let fingerprint = tensor_fingerprint(tensor);
        self.ensure_uniqueness(to_color(fingerprint), VertexData::TensorCore(fingerprint))
    }

    /// Paints the bra slot group with the given position.
    pub(crate) fn paint_bra_group(&mut self, id: usize) -> u64 {
        self.ensure_uniqueness(to_color(id as u64 + 0xff), VertexData::BraGroup(id))
    }

    /// Paints the ket slot group with the given position.
    pub(crate) fn paint_ket_group(&mut self, id: usize) -> u64 {
        self.ensure_uniqueness(to_color(id as u64 + 0xff00), VertexData::KetGroup(id))
    }

    /// Paints the auxiliary slot group with the given position.
    pub(crate) fn paint_aux_group(&mut self, id: usize) -> u64 {
        self.ensure_uniqueness(to_color(id as u64 + 3 * 0x00ff_0000), VertexData::AuxGroup(id))
    }

    /// Paints the particle group with the given position.
    pub(crate) fn paint_particle_group(&mut self, id: usize) -> u64 {
        self.ensure_uniqueness(to_color(id as u64), VertexData::ParticleGroup(id))
    }

    /// Paints an index vertex.
    ///
    /// Anonymous (summation) indices are colored by their space; named indices by their
    /// position among the named indices, or by a space color shifted away from the
    /// anonymous range when named indices need not be distinct.
    pub(crate) fn paint_index(&mut self, index: &Index) -> u64 {
        let pre_color = match self.named_indices.get_index_of(index) {
            None => index.color(),
            Some(position) => {
                if self.distinct_named_indices {
                    position as u64
                } else {
                    index.color().wrapping_add(0xabcd)
                }
            }
        };
        let pre_color = pre_color.wrapping_add(0xaa);
        self.ensure_uniqueness(to_color(pre_color), VertexData::IndexVertex(index.clone()))
    }

    /// Paints a proto-index bundle vertex.
    pub(crate) fn paint_proto_bundle(&mut self, protos: &[Index]) -> u64 {
        let bundle_color = proto_indices_color(protos);
        self.ensure_uniqueness(to_color(bundle_color), VertexData::ProtoBundle(bundle_color))
    }

    fn ensure_uniqueness(&mut self, color: u64, data: VertexData) -> u64 {
        let mut color = color;
        while let Some(existing) = self.used_colors.get(&color) {
            if self.may_have_same_color(existing, &data) {
                return color;
            }
            color = hash_combine(color, COLOR_SALT);
        }
        self.used_colors.insert(color, data);
        color
    }

    fn may_have_same_color(&self, existing: &VertexData, data: &VertexData) -> bool {
        match (existing, data) {
            (VertexData::TensorCore(left), VertexData::TensorCore(right)) => left == right,
            (VertexData::BraGroup(left), VertexData::BraGroup(right)) => left == right,
            (VertexData::KetGroup(left), VertexData::KetGroup(right)) => left == right,
            (VertexData::AuxGroup(left), VertexData::AuxGroup(right)) => left == right,
            (VertexData::ParticleGroup(left), VertexData::ParticleGroup(right)) => left == right,
            (VertexData::ProtoBundle(left), VertexData::ProtoBundle(right)) => left == right,
            (VertexData::IndexVertex(left), VertexData::IndexVertex(right)) => {
                let left_position = self.named_indices.get_index_of(left);
                let right_position = self.named_indices.get_index_of(right);
                if self.distinct_named_indices && left_position != right_position {
                    // either one index is named and the other is not, or both are named
                    // but are different indices
                    return false;
                }
                left.color() == right.color()
            }
            _ => false,
        }
    }
}

/// Combines label hash, arity and symmetry tags into a tensor core fingerprint.
fn tensor_fingerprint(tensor: &Tensor) -> u64 {
    let arity = (tensor.bra_rank() + tensor.ket_rank() + tensor.aux_rank()) as u64;
    let tags = (tensor.symmetry() as u64)
        | ((tensor.braket_symmetry() as u64) << 8)
        | ((tensor.particle_symmetry() as u64) << 16);
    let mut hasher = DefaultHasher::new();
    tensor.label().hash(&mut hasher);
    hasher.finish() ^ arity ^ (tags << 32)
}

fn to_color(raw: u64) -> u64 {
    hash_combine(raw, COLOR_SALT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interchangeable_vertices_share_colors() {
        let mut painter = VertexPainter::new(IndexSet::new(), true);
        assert_eq!(painter.paint_bra_group(0), painter.paint_bra_group(0));
        assert_ne!(painter.paint_bra_group(0), painter.paint_bra_group(1));
        assert_ne!(painter.paint_bra_group(0), painter.paint_ket_group(0));
    }

    #[test]
    fn summation_indices_share_colors_by_space() {
        let mut painter = VertexPainter::new(IndexSet::new(), true);
        let i1: Index = "i_1".parse().unwrap();
        let i2: Index = "i_2".parse().unwrap();
        let a1: Index = "a_1".parse().unwrap();
        assert_eq!(painter.paint_index(&i1), painter.paint_index(&i2));
        assert_ne!(painter.paint_index(&i1), painter.paint_index(&a1));
    }

    #[test]
    fn named_indices_are_distinguished() {
        let i1: Index = "i_1".parse().unwrap();
        let i2: Index = "i_2".parse().unwrap();
        let named: IndexSet<Index> = [i1.clone(), i2.clone()].into_iter().collect();
        let mut painter = VertexPainter::new(named, true);
        assert_ne!(painter.paint_index(&i1), painter.paint_index(&i2));
    }
}
