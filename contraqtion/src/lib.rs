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

//! contraqtion
//!
//! A library for symbolically manipulating and optimizing tensor contraction networks
//! as they appear in second-quantized many-body theories.
//!
//! The library provides an expression algebra ([crate::expressions::Expression]) of constants,
//! symbolic variables, tensors, sums and products, a canonicalizer that rewrites expressions
//! into unique representatives of their equivalence classes, a graph-based canonical form for
//! tensor networks ([crate::networks::TensorNetwork]) and a contraction-order optimizer
//! ([crate::optimize::optimize]) that minimizes the floating point operation count of a
//! product of tensors by dynamic programming over factor subsets.
//!
//! The optimizer is purely symbolic: it never allocates tensor data and never evaluates a
//! contraction. Index dimensions are supplied by the caller as an oracle mapping
//! [crate::indices::Index] to a positive integer, so that different physical regimes can be
//! explored without rebuilding the index-space model.

use num_complex::Complex;
use num_rational::Rational64;
use num_traits::Zero;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use thiserror::Error;

pub const CONTRAQTION_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Errors that can occur in contraqtion.
#[derive(Debug, Error, PartialEq)]
pub enum ContraqtionError {
    /// Error when optimization reaches an expression that cannot be scheduled.
    #[error("Optimization attempted on unsupported expression type: {kind}")]
    UnsupportedExpression {
        /// Name of the offending expression variant.
        kind: String,
    },
    /// Error when an index occurs more than twice in a tensor network.
    #[error("Index {index} occurs {count} times in the network, but at most two slots may share an index")]
    IndexMultiplicityExceeded {
        /// Label of the offending index.
        index: String,
        /// Number of slots the index occurs in.
        count: usize,
    },
    /// Error when the dimension oracle has no positive dimension for an index used in a contraction.
    #[error("The dimension oracle returned no positive dimension for index {index}")]
    MissingDimension {
        /// Label of the offending index.
        index: String,
    },
    /// Error when a tensor network is built from a factor that is not a tensor.
    #[error("Cannot build a tensor network from a factor of type {kind}")]
    NonTensorNetworkFactor {
        /// Name of the offending expression variant.
        kind: String,
    },
    /// Error when using from_str.
    #[error("The from_str function failed: {msg}")]
    FromStringFailed { msg: String },
    /// Error when a symmetry tag is not in the allowed set.
    #[error("The symmetry tag being set is not in [\"A\", \"S\", \"N\"] (permutational), [\"BS\", \"BC\", \"BN\"] (bra-ket) or [\"PS\", \"PN\"] (particle): {symmetry}")]
    IncorrectSymmetryEntry {
        /// Incorrect symmetry tag trying to be set.
        symmetry: String,
    },
    /// Error when an index label cannot be used to construct an index.
    #[error("Cannot construct an index from label base {base:?}: base must be non-empty and alphabetic")]
    InvalidIndexLabel {
        /// The rejected label base.
        base: String,
    },
    /// Error when the lattice meet of two index spaces is empty.
    #[error("Index spaces {left} and {right} have an empty intersection")]
    DisjointSpaces {
        /// Color of the left-hand space.
        left: u64,
        /// Color of the right-hand space.
        right: u64,
    },
    /// Error when an index space has no canonical label base registered.
    #[error("No canonical label base registered for index space with color {color}")]
    UnregisteredSpace {
        /// Color of the offending space.
        color: u64,
    },
    /// Error when an internal consistency check failed.
    #[error("Internal consistency check failed: {msg}")]
    InvariantViolation { msg: String },
}

/// Scalar prefactor type of the expression algebra.
///
/// Exact complex-rational arithmetic keeps constant folding, prefactor extraction and
/// adjoint conjugation free of floating point round-off.
pub type Scalar = Complex<Rational64>;

/// Creates a [Scalar] from an integer.
pub fn scalar_from_integer(value: i64) -> Scalar {
    Complex::new(Rational64::from_integer(value), Rational64::zero())
}

/// Creates a real [Scalar] from a numerator and a denominator.
///
/// # Panics
///
/// * `denominator` is zero.
pub fn scalar_from_rational(numerator: i64, denominator: i64) -> Scalar {
    Complex::new(Rational64::new(numerator, denominator), Rational64::zero())
}

/// Trait for types with a stable structural fingerprint.
///
/// The fingerprint depends only on the semantic content of the value, never on memory
/// addresses or on the path by which the value was inserted into a holder. It is used for
/// canonical ordering, graph coloring and intermediate detection.
pub trait StructuralHash: Hash {
    /// Returns the structural fingerprint of self.
    ///
    /// # Returns
    ///
    /// * `u64` - The structural fingerprint.
    fn structural_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }
}

/// Trait for types with a hermitian conjugate.
pub trait HermitianConjugate: Sized {
    /// Returns the hermitian conjugate of self.
    ///
    /// For tensors this exchanges the bra and ket index slots; for scalar quantities it is
    /// complex conjugation.
    ///
    /// # Returns
    ///
    /// * `Self` - The hermitian conjugate of self.
    fn hermitian_conjugate(&self) -> Self;
}

/// Reports a violated internal consistency check.
///
/// Debug builds assert immediately; release builds surface the violation as
/// [ContraqtionError::InvariantViolation] so that callers can discard the failed call and
/// keep their input unchanged.
pub(crate) fn invariant_violation<T>(msg: &str) -> Result<T, ContraqtionError> {
    debug_assert!(false, "Internal consistency check failed: {msg}");
    Err(ContraqtionError::InvariantViolation {
        msg: msg.to_string(),
    })
}

/// Combines a hash value with a seed.
///
/// Matches the boost-style combiner so that colors derived from combined hashes are stable
/// across runs.
pub(crate) fn hash_combine(seed: u64, value: u64) -> u64 {
    seed ^ (value
        .wrapping_add(0x9e37_79b9_7f4a_7c15)
        .wrapping_add(seed << 6)
        .wrapping_add(seed >> 2))
}

pub mod indices;

pub mod expressions;

pub mod networks;

pub mod optimize;

pub mod prelude;
