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

pub use crate::expressions::{
    canonicalize, canonicalize_with, expand, BraKetSymmetry, Expression, Flatten,
    ParticleSymmetry, Product, Sum, Symmetry, Tensor, Variable,
};
pub use crate::indices::{
    Index, IndexConventions, IndexSpace, QuantumNumbers, SpaceType,
};
pub use crate::networks::TensorNetwork;
pub use crate::optimize::{optimize, single_term_opt, EvalSequence, CONTRACT};
pub use crate::{
    scalar_from_integer, scalar_from_rational, ContraqtionError, HermitianConjugate, Scalar,
    StructuralHash,
};
