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

use super::{Expression, Flatten, Product, Sum};
use crate::indices::IndexConventions;
use crate::networks::TensorNetwork;
use crate::{ContraqtionError, Scalar, StructuralHash};
use num_traits::{One, Zero};
use std::cmp::Ordering;

/// Rewrites an expression into the deterministic representative of its equivalence class.
///
/// The pass flattens nested sums and products, folds constants into a single prefactor per
/// product, drops zero summands and unit factors, canonicalizes every child, renames
/// summation indices into the canonical sequence chosen by the tensor-network canonical
/// form, and sorts children deterministically. Any sign produced by reordering
/// antisymmetric index slots is folded into the enclosing prefactor. Canonicalization is
/// idempotent, so structural hashing of canonical forms detects semantic equality.
///
/// Summation indices are renamed using the current default [IndexConventions]; use
/// [canonicalize_with] to pass conventions explicitly.
///
/// # Arguments
///
/// * `expression` - The expression to canonicalize.
///
/// # Returns
///
/// * `Ok(Expression)` - The canonical representative.
/// * `Err(ContraqtionError::IndexMultiplicityExceeded)` - A product contains an index in
///   more than two slots.
/// * `Err(ContraqtionError::UnregisteredSpace)` - A summation index runs over a space with
///   no canonical label base.
pub fn canonicalize(expression: &Expression) -> Result<Expression, ContraqtionError> {
    canonicalize_with(expression, &IndexConventions::current())
}

/// Rewrites an expression into its canonical representative under explicit conventions.
///
/// # Arguments
///
/// * `expression` - The expression to canonicalize.
/// * `conventions` - The label conventions choosing canonical summation-index bases.
///
/// # Returns
///
/// * `Ok(Expression)` - The canonical representative.
/// * `Err(ContraqtionError)` - See [canonicalize].
pub fn canonicalize_with(
    expression: &Expression,
    conventions: &IndexConventions,
) -> Result<Expression, ContraqtionError> {
    let mut canonical = expression.clone();
    let byproduct = canonicalize_in_place(&mut canonical, conventions)?;
    if let Some(scalar) = byproduct {
        canonical = match canonical {
            Expression::Constant(constant) => Expression::Constant(constant * scalar),
            Expression::Product(mut product) => {
                product.scale(scalar);
                Expression::Product(product)
            }
            other => Expression::Product(Product::from_factors(scalar, [other], Flatten::No)),
        };
    }
    Ok(collapse(canonical))
}

/// Canonical order of sibling expressions: structural hash first, the rendered form as a
/// structural tie-break.
pub(crate) fn canonical_order(left: &Expression, right: &Expression) -> Ordering {
    left.structural_hash()
        .cmp(&right.structural_hash())
        .then_with(|| left.to_string().cmp(&right.to_string()))
}

/// Sort class of a product factor. Scalars fold away before sorting; variables order
/// before tensors, composites last.
fn factor_class(factor: &Expression) -> u8 {
    match factor {
        Expression::Constant(_) | Expression::Variable(_) => 0,
        Expression::Tensor(_) => 1,
        Expression::Sum(_) => 2,
        Expression::Product(_) => 3,
    }
}

/// Collapses trivial holders: an empty sum to zero, an empty product to its prefactor, a
/// one-element holder to its element.
fn collapse(expression: Expression) -> Expression {
    match expression {
        Expression::Sum(sum) => {
            if sum.is_empty() {
                Expression::Constant(Scalar::zero())
            } else if sum.len() == 1 {
                sum.summands()[0].clone()
            } else {
                Expression::Sum(sum)
            }
        }
        Expression::Product(product) => {
            if product.scalar().is_zero() {
                Expression::Constant(Scalar::zero())
            } else if product.is_empty() {
                Expression::Constant(product.scalar())
            } else if let Some(inner) = product.trivial_factor() {
                inner.clone()
            } else {
                Expression::Product(product)
            }
        }
        other => other,
    }
}

fn canonicalize_in_place(
    expression: &mut Expression,
    conventions: &IndexConventions,
) -> Result<Option<Scalar>, ContraqtionError> {
    match expression {
        Expression::Constant(_) | Expression::Variable(_) => Ok(None),
        Expression::Tensor(tensor) => Ok(tensor.canonicalize_slots()),
        Expression::Sum(sum) => {
            let mut canonical = Sum::new();
            for summand in sum.summands() {
                // flattening and zero-pruning happen in append
                canonical.append(canonicalize_with(summand, conventions)?);
            }
            let mut summands: Vec<Expression> = canonical.summands().to_vec();
            summands.sort_by(canonical_order);
            *expression = collapse(Expression::Sum(Sum::from_summands(summands)));
            Ok(None)
        }
        Expression::Product(product) => {
            let mut canonical = Product::new();
            canonical.scale(product.scalar());
            for factor in product.factors() {
                // child canonicalization folds child byproducts into child prefactors,
                // which the flattening append pulls up into this product
                canonical.append(canonicalize_with(factor, conventions)?, Flatten::Yes);
            }
            if canonical.scalar().is_zero() {
                *expression = Expression::Constant(Scalar::zero());
                return Ok(None);
            }
            let sign = rename_summation_indices(&mut canonical, conventions)?;
            canonical.scale(sign);
            sort_factors(&mut canonical);
            *expression = collapse(Expression::Product(canonical));
            Ok(None)
        }
    }
}

/// Renames the summation indices of a product to the canonical sequence chosen by the
/// tensor-network canonical form, re-sorting tensor slots afterwards.
///
/// # Returns
///
/// * `Ok(Scalar)` - The sign collected from re-sorting antisymmetric slots.
fn rename_summation_indices(
    product: &mut Product,
    conventions: &IndexConventions,
) -> Result<Scalar, ContraqtionError> {
    let tensors: Vec<_> = product
        .factors()
        .iter()
        .filter_map(|factor| factor.as_tensor().cloned())
        .collect();
    if tensors.is_empty() {
        return Ok(Scalar::one());
    }
    let network = TensorNetwork::from_tensors(tensors)?;
    let renaming = network.canonical_index_renaming(conventions)?;
    let mut sign = Scalar::one();
    if renaming.is_empty() {
        return Ok(sign);
    }
    for factor in product.factors_mut() {
        if let Expression::Tensor(tensor) = factor {
            tensor.substitute_indices(&renaming);
            if let Some(slot_sign) = tensor.canonicalize_slots() {
                sign *= slot_sign;
            }
        }
    }
    Ok(sign)
}

/// Sorts product factors by class, then canonically; the sort is stable, so factors the
/// order cannot distinguish keep their user order.
fn sort_factors(product: &mut Product) {
    product.sort_factors_by(|left, right| {
        factor_class(left)
            .cmp(&factor_class(right))
            .then_with(|| canonical_order(left, right))
    });
}
