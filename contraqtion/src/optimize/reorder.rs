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

use crate::expressions::{canonicalize, Expression, Sum};
use crate::{ContraqtionError, StructuralHash};
use indexmap::IndexMap;
use std::collections::HashSet;

/// Creates clusters out of positions of summands that share common intermediates.
///
/// An intermediate is a contracted sub-product of an optimized summand, identified by the
/// structural hash of its canonical form, so that intermediates match across summands even
/// when their summation indices are labeled differently. Summands sharing at least one
/// intermediate fall into the same cluster, transitively.
///
/// # Arguments
///
/// * `sum` - The sum to find clusters in; summands are expected to be optimized
///   (parenthesized) products.
///
/// # Returns
///
/// * `Ok(Vec<Vec<usize>>)` - The clusters of summand positions, each ascending, ordered by
///   descending cluster size and then by the smallest member.
/// * `Err(ContraqtionError)` - Canonicalizing an intermediate failed.
pub fn clusters(sum: &Sum) -> Result<Vec<Vec<usize>>, ContraqtionError> {
    let summand_count = sum.len();
    let mut parents: Vec<usize> = (0..summand_count).collect();

    fn root(parents: &mut Vec<usize>, position: usize) -> usize {
        let mut position = position;
        while parents[position] != position {
            parents[position] = parents[parents[position]];
            position = parents[position];
        }
        position
    }

    let mut first_seen: IndexMap<u64, usize> = IndexMap::new();
    for (position, summand) in sum.summands().iter().enumerate() {
        for fingerprint in intermediate_fingerprints(summand)? {
            match first_seen.get(&fingerprint) {
                Some(&other) => {
                    let left = root(&mut parents, position);
                    let right = root(&mut parents, other);
                    parents[left.max(right)] = left.min(right);
                }
                None => {
                    first_seen.insert(fingerprint, position);
                }
            }
        }
    }

    let mut members: IndexMap<usize, Vec<usize>> = IndexMap::new();
    for position in 0..summand_count {
        let cluster_root = root(&mut parents, position);
        members.entry(cluster_root).or_default().push(position);
    }
    let mut clusters: Vec<Vec<usize>> = members.into_values().collect();
    clusters.sort_by_key(|cluster| (std::cmp::Reverse(cluster.len()), cluster[0]));
    Ok(clusters)
}

/// Reorders summands so that terms having common intermediates appear closer.
///
/// Members of a cluster stay in their original relative order; clusters are emitted by
/// descending size and then by their smallest original position. The rewrite is a pure
/// permutation and never changes the value of the sum.
///
/// # Arguments
///
/// * `sum` - The sum to reorder.
///
/// # Returns
///
/// * `Ok(Sum)` - The reordered sum.
/// * `Err(ContraqtionError)` - Canonicalizing an intermediate failed.
pub fn reorder(sum: &Sum) -> Result<Sum, ContraqtionError> {
    let permutation: Vec<usize> = clusters(sum)?.into_iter().flatten().collect();
    Ok(sum.permuted(&permutation))
}

/// Collects the canonical fingerprints of the contracted sub-products of a summand.
fn intermediate_fingerprints(summand: &Expression) -> Result<HashSet<u64>, ContraqtionError> {
    let mut fingerprints = HashSet::new();
    collect(summand, true, &mut fingerprints)?;
    Ok(fingerprints)
}

fn collect(
    expression: &Expression,
    is_root: bool,
    fingerprints: &mut HashSet<u64>,
) -> Result<(), ContraqtionError> {
    match expression {
        Expression::Product(product) => {
            if !is_root && product.len() >= 2 {
                fingerprints.insert(canonicalize(expression)?.structural_hash());
            }
            for factor in product.factors() {
                collect(factor, false, fingerprints)?;
            }
        }
        Expression::Sum(sum) => {
            for summand in sum.summands() {
                collect(summand, false, fingerprints)?;
            }
        }
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expressions::{Flatten, Product, Tensor};
    use crate::Scalar;
    use num_traits::One;

    fn tensor(form: &str) -> Expression {
        form.parse::<Tensor>().unwrap().into()
    }

    fn parenthesized(factors: [Expression; 2]) -> Expression {
        Expression::Product(Product::from_factors(Scalar::one(), factors, Flatten::No))
    }

    #[test]
    fn summands_sharing_an_intermediate_cluster_together() {
        let shared = parenthesized([tensor("t[i_1;a_1]"), tensor("f[a_1;i_2]")]);
        let first = parenthesized([shared.clone(), tensor("u[i_2;i_1]")]);
        let second = parenthesized([tensor("w[i_2;i_1]"), tensor("v[i_1;i_2]")]);
        let third = parenthesized([shared, tensor("x[i_2;i_1]")]);
        let sum = Sum::from_summands([first, second, third]);

        let found = clusters(&sum).unwrap();
        assert_eq!(found, vec![vec![0, 2], vec![1]]);

        let reordered = reorder(&sum).unwrap();
        assert_eq!(reordered.len(), 3);
        assert_eq!(reordered.get(0), sum.get(0));
        assert_eq!(reordered.get(1), sum.get(2));
        assert_eq!(reordered.get(2), sum.get(1));
    }
}
