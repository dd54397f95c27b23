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

//! Module for representing symbolic second-quantized expressions
//!
//! An [crate::expressions::Expression] is the closed variant over constants, symbolic
//! variables, tensors, sums and products. Tensors carry ordered bra, ket and auxiliary
//! index slots and symmetry tags; products carry an exact complex-rational prefactor and a
//! flatten policy.
//!
//! [crate::expressions::canonicalize] rewrites an expression into the deterministic
//! representative of its equivalence class, so that the structural hash of the canonical
//! form detects semantic equality. [crate::expressions::expand] distributes products over
//! sums.

mod algorithms;
mod canonicalization;
mod expression;
mod product;
mod sum;
mod tensor;

pub use algorithms::expand;
pub use canonicalization::{canonicalize, canonicalize_with};
pub use expression::{Expression, Variable};
pub use product::{Flatten, Product};
pub use sum::Sum;
pub use tensor::{BraKetSymmetry, ParticleSymmetry, Symmetry, Tensor};
