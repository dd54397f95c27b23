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

//! Module for representing abstract tensor indices and their spaces
//!
//! An [crate::indices::Index] is a textual label typed by an [crate::indices::IndexSpace],
//! the orbital region it runs over. Spaces form a fixed intersection lattice and carry spin
//! quantum numbers; each space has a stable integer color used as a hash input by the
//! tensor-network canonicalizer. Dimensions are never stored on a space: the optimizer
//! receives them through a caller-supplied oracle.
//!
//! [crate::indices::IndexConventions] maps label bases to spaces when indices are parsed
//! from literal labels, and chooses the canonical label base used when summation indices
//! are renamed.

mod conventions;
mod index_space;
mod tensor_index;

pub use conventions::{ConventionsGuard, IndexConventions};
pub use index_space::{IndexSpace, QuantumNumbers, SpaceType};
pub use tensor_index::{proto_indices_color, Index};
