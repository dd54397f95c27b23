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

use super::Expression;
use crate::StructuralHash;
use serde::{Deserialize, Serialize};

/// An ordered sum of expressions.
///
/// A Sum owns its summands exclusively; appending flattens nested sums and prunes zero
/// summands, so an empty Sum carries the semantics of the constant zero.
///
/// # Example
///
/// ```rust
/// use contraqtion::expressions::{Expression, Sum, Tensor};
///
/// let mut sum = Sum::new();
/// sum.append("t[i_1;a_1]".parse::<Tensor>().unwrap().into());
/// sum.append(Expression::Sum(Sum::new()));
/// assert_eq!(sum.len(), 1);
/// ```
#[derive(Debug, Clone, Hash, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Sum {
    /// The ordered summands.
    summands: Vec<Expression>,
}

impl Sum {
    /// Creates an empty Sum.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a Sum from an iterator of summands.
    ///
    /// # Arguments
    ///
    /// * `summands` - The summands to append, flattening nested sums.
    ///
    /// # Returns
    ///
    /// * `Sum` - The new Sum.
    pub fn from_summands(summands: impl IntoIterator<Item = Expression>) -> Self {
        let mut sum = Sum::new();
        for summand in summands {
            sum.append(summand);
        }
        sum
    }

    /// Returns the ordered summands.
    pub fn summands(&self) -> &[Expression] {
        &self.summands
    }

    /// Returns the summand at the given position.
    pub fn get(&self, position: usize) -> Option<&Expression> {
        self.summands.get(position)
    }

    /// Returns the number of summands.
    pub fn len(&self) -> usize {
        self.summands.len()
    }

    /// Returns true if the Sum has no summands.
    pub fn is_empty(&self) -> bool {
        self.summands.is_empty()
    }

    /// Appends a summand, flattening nested sums and pruning zeros.
    ///
    /// # Arguments
    ///
    /// * `summand` - The expression to append.
    pub fn append(&mut self, summand: Expression) {
        match summand {
            Expression::Sum(inner) => self.summands.extend(inner.summands),
            summand if summand.is_zero() => {}
            summand => self.summands.push(summand),
        }
    }

    /// Prepends a summand, flattening nested sums and pruning zeros.
    ///
    /// # Arguments
    ///
    /// * `summand` - The expression to prepend.
    pub fn prepend(&mut self, summand: Expression) {
        match summand {
            Expression::Sum(inner) => {
                self.summands.splice(0..0, inner.summands);
            }
            summand if summand.is_zero() => {}
            summand => self.summands.insert(0, summand),
        }
    }

    /// Removes and returns the summand at the given position.
    ///
    /// # Arguments
    ///
    /// * `position` - The position of the summand to remove.
    ///
    /// # Returns
    ///
    /// * `Option<Expression>` - The removed summand, or None when out of range.
    pub fn erase(&mut self, position: usize) -> Option<Expression> {
        if position < self.summands.len() {
            Some(self.summands.remove(position))
        } else {
            None
        }
    }

    /// Reorders the summands by the given permutation of positions.
    ///
    /// # Arguments
    ///
    /// * `permutation` - For every output position, the input position to take.
    pub(crate) fn permuted(&self, permutation: &[usize]) -> Sum {
        Sum {
            summands: permutation
                .iter()
                .map(|&position| self.summands[position].clone())
                .collect(),
        }
    }
}

impl StructuralHash for Sum {}

impl FromIterator<Expression> for Sum {
    fn from_iter<I: IntoIterator<Item = Expression>>(iter: I) -> Self {
        Sum::from_summands(iter)
    }
}
