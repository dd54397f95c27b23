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

use crate::indices::Index;
use crate::ContraqtionError;
use itertools::{EitherOrBoth, Itertools};

/// Returns the indices common to both sorted index sets.
///
/// # Arguments
///
/// * `left` - Index set sorted by label.
/// * `right` - Index set sorted by label.
///
/// # Returns
///
/// * `Vec<Index>` - The intersection, sorted by label.
pub fn common_indices(left: &[Index], right: &[Index]) -> Vec<Index> {
    debug_assert!(left.windows(2).all(|w| w[0] <= w[1]));
    debug_assert!(right.windows(2).all(|w| w[0] <= w[1]));
    left.iter()
        .merge_join_by(right.iter(), |a, b| a.label_cmp(b))
        .filter_map(|pair| match pair {
            EitherOrBoth::Both(index, _) => Some(index.clone()),
            _ => None,
        })
        .collect()
}

/// Returns the symmetric difference of both sorted index sets.
///
/// These are the free indices remaining after contracting two factors with the given index
/// sets.
///
/// # Arguments
///
/// * `left` - Index set sorted by label.
/// * `right` - Index set sorted by label.
///
/// # Returns
///
/// * `Vec<Index>` - The symmetric difference, sorted by label.
pub fn diff_indices(left: &[Index], right: &[Index]) -> Vec<Index> {
    debug_assert!(left.windows(2).all(|w| w[0] <= w[1]));
    debug_assert!(right.windows(2).all(|w| w[0] <= w[1]));
    left.iter()
        .merge_join_by(right.iter(), |a, b| a.label_cmp(b))
        .filter_map(|pair| match pair {
            EitherOrBoth::Left(index) => Some(index.clone()),
            EitherOrBoth::Right(index) => Some(index.clone()),
            EitherOrBoth::Both(_, _) => None,
        })
        .collect()
}

/// Estimates the floating point operations of a single binary contraction.
///
/// The estimate is the product of the dimensions of every distinct index of the contracted
/// pair, contracted and free ones alike; a contraction without any index costs nothing.
///
/// # Arguments
///
/// * `index_dimension` - The oracle mapping an index to its dimension.
/// * `commons` - The indices summed over by the contraction.
/// * `diffs` - The free indices of the contraction result.
///
/// # Returns
///
/// * `Ok(f64)` - The operation count estimate.
/// * `Err(ContraqtionError::MissingDimension)` - The oracle returned no positive dimension
///   for an index.
pub fn contraction_cost<F>(
    index_dimension: &F,
    commons: &[Index],
    diffs: &[Index],
) -> Result<f64, ContraqtionError>
where
    F: Fn(&Index) -> u64,
{
    let mut cost = 1.0;
    let mut counted = false;
    for index in commons.iter().chain(diffs.iter()) {
        let dimension = index_dimension(index);
        if dimension == 0 {
            return Err(ContraqtionError::MissingDimension {
                index: index.to_string(),
            });
        }
        counted = true;
        cost *= dimension as f64;
    }
    if counted {
        Ok(cost)
    } else {
        Ok(0.0)
    }
}
