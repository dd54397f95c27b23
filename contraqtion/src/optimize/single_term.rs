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

use super::cost::{common_indices, contraction_cost, diff_indices};
use crate::expressions::{Expression, Flatten, Product};
use crate::indices::Index;
use crate::networks::TensorNetwork;
use crate::{invariant_violation, ContraqtionError, Scalar};
use num_traits::One;

/// A reverse-Polish encoding of a binary contraction tree.
///
/// Every element is either a factor position in `[0, N)` or the sentinel `-1`, which
/// applies a binary contraction to the two topmost stack entries. A well-formed plan over
/// `N` factors holds every position exactly once and the sentinel exactly `N - 1` times.
pub type EvalSequence = Vec<i32>;

/// Sentinel marking a binary contraction in an [EvalSequence].
pub const CONTRACT: i32 = -1;

/// Enumerates the non-trivial, unique bipartitions of the bits of `n`.
///
/// Each unordered pair of disjoint non-empty subsets covering `n` is visited exactly once;
/// numbers with fewer than two bits set have no such pair.
///
/// # Arguments
///
/// * `n` - The bit set to bipartition.
/// * `visit` - Called with both halves of every bipartition.
fn bipartitions<F>(n: usize, mut visit: F)
where
    F: FnMut(usize, usize),
{
    if n == 0 {
        return;
    }
    let half = n / 2;
    for lower in 1..=half {
        let left = n & lower;
        let right = (n - lower) & n;
        if (left | right) == n {
            visit(left, right);
        }
    }
}

/// The optimization state of one factor subset.
#[derive(Debug, Clone, Default)]
struct OptimizationStep {
    /// Free indices remaining upon evaluating the subset, sorted by label.
    indices: Vec<Index>,
    /// The operation count of the best evaluation of the subset.
    flops: f64,
    /// The evaluation sequence of the best evaluation of the subset.
    sequence: EvalSequence,
}

/// Finds the binary contraction tree of a tensor network minimizing the operation count.
///
/// Dynamic programming over the power set of the factors: for every subset the cheapest
/// bipartition is chosen, where later equal-cost bipartitions displace earlier ones.
/// Together with the enumeration order this makes the result the equal-cost plan that
/// keeps the original factor order as far as possible, and re-running the optimization
/// yields a byte-identical plan.
///
/// # Arguments
///
/// * `network` - The tensor network to schedule.
/// * `index_dimension` - The oracle mapping an index to its positive dimension.
///
/// # Returns
///
/// * `Ok(EvalSequence)` - The optimal contraction plan in reverse-Polish form.
/// * `Err(ContraqtionError::MissingDimension)` - The oracle returned no positive dimension
///   for a contracted index.
pub fn single_term_opt<F>(
    network: &TensorNetwork,
    index_dimension: &F,
) -> Result<EvalSequence, ContraqtionError>
where
    F: Fn(&Index) -> u64,
{
    let factor_count = network.tensors().len();
    if factor_count == 0 {
        return Ok(EvalSequence::new());
    }
    if factor_count == 1 {
        return Ok(vec![0]);
    }
    if factor_count == 2 {
        return Ok(vec![0, 1, CONTRACT]);
    }

    let mut factor_indices: Vec<Vec<Index>> = Vec::with_capacity(factor_count);
    for tensor in network.tensors() {
        let mut slots: Vec<Index> = tensor.indices().cloned().collect();
        slots.sort_by(Index::label_cmp);
        factor_indices.push(slots);
    }

    let full_set = (1usize << factor_count) - 1;
    let mut table: Vec<OptimizationStep> = vec![OptimizationStep::default(); full_set + 1];

    // singleton subsets are filled in ascending order, so the k-th power of two belongs
    // to the k-th factor
    let mut singleton_position = 0usize;
    for subset in 1..=full_set {
        let mut best_cost = f64::INFINITY;
        let mut best_parts = (0usize, 0usize);
        let mut best_indices: Vec<Index> = Vec::new();
        let mut oracle_error: Option<ContraqtionError> = None;

        bipartitions(subset, |left, right| {
            let commons = common_indices(&table[left].indices, &table[right].indices);
            let diffs = diff_indices(&table[left].indices, &table[right].indices);
            let contraction = match contraction_cost(index_dimension, &commons, &diffs) {
                Ok(cost) => cost,
                Err(error) => {
                    oracle_error.get_or_insert(error);
                    return;
                }
            };
            let cost = contraction + table[left].flops + table[right].flops;
            // `<=` lets the later of two equal-cost bipartitions win
            if cost <= best_cost {
                best_cost = cost;
                best_parts = (left, right);
                best_indices = diffs;
            }
        });
        if let Some(error) = oracle_error {
            return Err(error);
        }

        if subset.is_power_of_two() {
            table[subset].flops = 0.0;
            table[subset].indices = std::mem::take(&mut factor_indices[singleton_position]);
            table[subset].sequence = vec![singleton_position as i32];
            singleton_position += 1;
        } else {
            let first = &table[best_parts.0].sequence;
            let second = &table[best_parts.1].sequence;
            let mut sequence: EvalSequence = Vec::with_capacity(first.len() + second.len() + 1);
            if first[0] < second[0] {
                sequence.extend_from_slice(first);
                sequence.extend_from_slice(second);
            } else {
                sequence.extend_from_slice(second);
                sequence.extend_from_slice(first);
            }
            sequence.push(CONTRACT);
            table[subset] = OptimizationStep {
                indices: best_indices,
                flops: best_cost,
                sequence,
            };
        }
    }

    Ok(std::mem::take(&mut table[full_set].sequence))
}

/// Optimizes a product by scheduling its tensor factors and rebuilding a parenthesized
/// product.
///
/// The scalar prefactor and any non-tensor factors (symbolic variables) are extracted
/// first and re-attached to the outermost product of the result; only tensor factors take
/// part in the dynamic program. Products with fewer than three factors are returned with
/// their flattening disabled but otherwise unchanged.
///
/// # Arguments
///
/// * `product` - The product to optimize.
/// * `index_dimension` - The oracle mapping an index to its positive dimension.
///
/// # Returns
///
/// * `Ok(Expression)` - The parenthesized product.
/// * `Err(ContraqtionError::IndexMultiplicityExceeded)` - An index occurs in more than two
///   tensor slots.
/// * `Err(ContraqtionError::MissingDimension)` - The oracle returned no positive dimension
///   for a contracted index.
pub(crate) fn optimize_product<F>(
    product: &Product,
    index_dimension: &F,
) -> Result<Expression, ContraqtionError>
where
    F: Fn(&Index) -> u64,
{
    let tensors: Vec<Expression> = product
        .factors()
        .iter()
        .filter(|factor| factor.is_tensor())
        .cloned()
        .collect();
    if product.len() < 3 || tensors.len() < 2 {
        return Ok(Expression::Product(Product::from_factors(
            product.scalar(),
            product.factors().iter().cloned(),
            Flatten::No,
        )));
    }

    let network = TensorNetwork::new(&tensors)?;
    let plan = single_term_opt(&network, index_dimension)?;

    let mut stack: Vec<Expression> = Vec::new();
    for step in plan {
        if step == CONTRACT {
            let right = match stack.pop() {
                Some(expression) => expression,
                None => return invariant_violation("contraction plan underflows its stack"),
            };
            let left = match stack.pop() {
                Some(expression) => expression,
                None => return invariant_violation("contraction plan underflows its stack"),
            };
            stack.push(Expression::Product(Product::from_factors(
                Scalar::one(),
                [left, right],
                Flatten::No,
            )));
        } else {
            stack.push(tensors[step as usize].clone());
        }
    }
    let tree = match stack.pop() {
        Some(expression) => expression,
        None => return invariant_violation("contraction plan left an empty stack"),
    };
    let mut outer = match tree {
        Expression::Product(outer) => outer,
        other => Product::from_factors(Scalar::one(), [other], Flatten::No),
    };

    for variable in product
        .factors()
        .iter()
        .rev()
        .filter(|factor| factor.is_variable())
    {
        outer.prepend(variable.clone(), Flatten::No);
    }
    outer.scale(product.scalar());
    Ok(Expression::Product(outer))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bipartitions_of_four_bits() {
        let mut pairs = Vec::new();
        bipartitions(0b1011, |left, right| pairs.push((left, right)));
        assert_eq!(pairs, vec![(0b0001, 0b1010), (0b0010, 0b1001), (0b0011, 0b1000)]);
    }

    #[test]
    fn single_bits_have_no_bipartition() {
        for n in [0usize, 0b10, 0b100] {
            let mut called = false;
            bipartitions(n, |_, _| called = true);
            assert!(!called);
        }
    }
}
