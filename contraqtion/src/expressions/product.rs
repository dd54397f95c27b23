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
use crate::{Scalar, StructuralHash};
use num_traits::One;
use serde::{Deserialize, Serialize};

/// Policy deciding whether appending a product to a product merges or nests it.
///
/// Flattening is the default for user-built products; the optimizer builds its binary
/// contraction trees with `Flatten::No` so that the chosen parenthesization survives.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Flatten {
    /// Merge the appended product into the holder.
    #[default]
    Yes,
    /// Keep the appended product as a single nested factor.
    No,
}

/// A scalar prefactor together with an ordered sequence of factor expressions.
///
/// Scalars never appear among the factors: appending a constant folds it into the
/// prefactor, so an empty Product carries the semantics of its prefactor (one by default).
/// A Product with a unit prefactor and a single factor is semantically equal to that
/// factor; [Expression] equality and hashing honor this.
///
/// # Example
///
/// ```rust
/// use contraqtion::expressions::{Flatten, Product, Tensor};
/// use contraqtion::scalar_from_integer;
///
/// let mut product = Product::new();
/// product.append(scalar_from_integer(3).into(), Flatten::Yes);
/// product.append("t[i_1;a_1]".parse::<Tensor>().unwrap().into(), Flatten::Yes);
/// assert_eq!(product.scalar(), scalar_from_integer(3));
/// assert_eq!(product.len(), 1);
/// ```
#[derive(Debug, Clone, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// The scalar prefactor.
    scalar: Scalar,
    /// The ordered factors.
    factors: Vec<Expression>,
}

impl Product {
    /// Creates an empty Product with a unit prefactor.
    pub fn new() -> Self {
        Self {
            scalar: Scalar::one(),
            factors: Vec::new(),
        }
    }

    /// Creates a Product from a prefactor and an iterator of factors.
    ///
    /// # Arguments
    ///
    /// * `scalar` - The scalar prefactor.
    /// * `factors` - The factors to append.
    /// * `flatten` - Whether nested products are merged or kept as single factors.
    ///
    /// # Returns
    ///
    /// * `Product` - The new Product.
    pub fn from_factors(
        scalar: Scalar,
        factors: impl IntoIterator<Item = Expression>,
        flatten: Flatten,
    ) -> Self {
        let mut product = Product::new();
        product.scale(scalar);
        for factor in factors {
            product.append(factor, flatten);
        }
        product
    }

    /// Returns the scalar prefactor.
    pub fn scalar(&self) -> Scalar {
        self.scalar
    }

    /// Multiplies the prefactor by the given scalar.
    ///
    /// # Arguments
    ///
    /// * `scalar` - The scalar to multiply into the prefactor.
    pub fn scale(&mut self, scalar: Scalar) {
        self.scalar *= scalar;
    }

    /// Returns the ordered factors.
    pub fn factors(&self) -> &[Expression] {
        &self.factors
    }

    /// Returns the factor at the given position.
    pub fn get(&self, position: usize) -> Option<&Expression> {
        self.factors.get(position)
    }

    /// Returns the number of factors.
    pub fn len(&self) -> usize {
        self.factors.len()
    }

    /// Returns true if the Product has no factors.
    pub fn is_empty(&self) -> bool {
        self.factors.is_empty()
    }

    /// Appends a factor.
    ///
    /// Constants are folded into the prefactor; nested products are merged or nested
    /// according to the flatten policy.
    ///
    /// # Arguments
    ///
    /// * `factor` - The expression to append.
    /// * `flatten` - Whether a nested product is merged into self.
    pub fn append(&mut self, factor: Expression, flatten: Flatten) {
        match factor {
            Expression::Constant(constant) => self.scale(constant),
            Expression::Product(inner) if flatten == Flatten::Yes => {
                self.scale(inner.scalar);
                for inner_factor in inner.factors {
                    self.append(inner_factor, flatten);
                }
            }
            factor => self.factors.push(factor),
        }
    }

    /// Prepends a factor.
    ///
    /// # Arguments
    ///
    /// * `factor` - The expression to prepend.
    /// * `flatten` - Whether a nested product is merged into self.
    pub fn prepend(&mut self, factor: Expression, flatten: Flatten) {
        match factor {
            Expression::Constant(constant) => self.scale(constant),
            Expression::Product(inner) if flatten == Flatten::Yes => {
                self.scale(inner.scalar);
                self.factors.splice(0..0, inner.factors);
            }
            factor => self.factors.insert(0, factor),
        }
    }

    /// Removes and returns the factor at the given position.
    ///
    /// # Arguments
    ///
    /// * `position` - The position of the factor to remove.
    ///
    /// # Returns
    ///
    /// * `Option<Expression>` - The removed factor, or None when out of range.
    pub fn erase(&mut self, position: usize) -> Option<Expression> {
        if position < self.factors.len() {
            Some(self.factors.remove(position))
        } else {
            None
        }
    }

    /// Iterates mutably over the factors.
    pub(crate) fn factors_mut(&mut self) -> impl Iterator<Item = &mut Expression> {
        self.factors.iter_mut()
    }

    /// Replaces the scalar prefactor.
    pub(crate) fn set_scalar(&mut self, scalar: Scalar) {
        self.scalar = scalar;
    }

    /// Sorts the factors with a stable comparator.
    pub(crate) fn sort_factors_by<F>(&mut self, compare: F)
    where
        F: FnMut(&Expression, &Expression) -> std::cmp::Ordering,
    {
        self.factors.sort_by(compare);
    }

    /// Returns the single factor of a unit-prefactor single-factor Product.
    ///
    /// # Returns
    ///
    /// * `Option<&Expression>` - The factor the Product is semantically equal to, or None.
    pub fn trivial_factor(&self) -> Option<&Expression> {
        if self.scalar.is_one() && self.factors.len() == 1 {
            self.factors.first()
        } else {
            None
        }
    }
}

impl Default for Product {
    fn default() -> Self {
        Self::new()
    }
}

impl StructuralHash for Product {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scalar_from_integer;
    use crate::expressions::Tensor;

    #[test]
    fn constants_fold_into_the_prefactor() {
        let mut product = Product::new();
        product.append(scalar_from_integer(2).into(), Flatten::Yes);
        product.append(scalar_from_integer(3).into(), Flatten::Yes);
        assert_eq!(product.scalar(), scalar_from_integer(6));
        assert!(product.is_empty());
    }

    #[test]
    fn flatten_policy() {
        let tensor: Expression = "t[i_1;a_1]".parse::<Tensor>().unwrap().into();
        let inner = Product::from_factors(
            scalar_from_integer(2),
            [tensor.clone(), tensor.clone()],
            Flatten::Yes,
        );

        let mut merged = Product::new();
        merged.append(Expression::Product(inner.clone()), Flatten::Yes);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged.scalar(), scalar_from_integer(2));

        let mut nested = Product::new();
        nested.append(Expression::Product(inner), Flatten::No);
        assert_eq!(nested.len(), 1);
        assert_eq!(nested.scalar(), scalar_from_integer(1));
    }
}
