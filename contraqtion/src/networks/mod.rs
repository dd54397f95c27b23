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

//! Module for representing products of tensors as index-connectivity graphs
//!
//! A [crate::networks::TensorNetwork] views the tensor factors of a product as a bipartite
//! graph between tensors and the indices occupying their slots. The network distinguishes
//! free (external) indices from summation indices, rejects indices of multiplicity above
//! two, and computes a canonical renaming of its summation indices by coloring the graph
//! and relabeling it canonically. Fingerprints derived from the canonical form are stable
//! under relabeling of summation indices and reordering of factors.

mod canonical_graph;
mod tensor_network;
mod vertex_painter;

pub use tensor_network::TensorNetwork;
