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

//! Module for contraction-order optimization
//!
//! [crate::optimize::optimize] rewrites an expression so that every product carries an
//! explicit binary parenthesization chosen to minimize the floating point operation count
//! under a caller-supplied dimension oracle. The scheduling itself is a dynamic program
//! over factor subsets ([crate::optimize::single_term_opt]) producing a reverse-Polish
//! contraction plan; sums recurse into their summands and are afterwards reordered so that
//! terms sharing expensive intermediates appear adjacent
//! ([crate::optimize::reorder]).
//!
//! The optimizer is deterministic: equal inputs with the same oracle produce byte-identical
//! plans, and among equal-cost plans the one preserving the user's factor order wins.

mod cost;
mod reorder;
mod single_term;

pub use cost::{common_indices, contraction_cost, diff_indices};
pub use reorder::{clusters, reorder};
pub use single_term::{single_term_opt, EvalSequence, CONTRACT};

use crate::expressions::{Expression, Flatten, Product, Sum};
use crate::indices::Index;
use crate::ContraqtionError;
use num_traits::One;
use crate::Scalar;

/// Optimizes an expression for evaluation cost.
///
/// Tensors are returned as clones; products are rewritten with the minimum-cost binary
/// parenthesization; sums recurse into their summands and reorder them by shared
/// intermediates. The result has the same mathematical value as the input, and optimizing
/// it again returns it unchanged.
///
/// # Arguments
///
/// * `expression` - The expression to optimize.
/// * `index_dimension` - The oracle mapping an index to its positive dimension.
///
/// # Returns
///
/// * `Ok(Expression)` - The optimized expression.
/// * `Err(ContraqtionError::UnsupportedExpression)` - The expression is neither a tensor,
///   a product nor a sum.
/// * `Err(ContraqtionError::IndexMultiplicityExceeded)` - A product contains an index in
///   more than two tensor slots.
/// * `Err(ContraqtionError::MissingDimension)` - The oracle returned no positive dimension
///   for a contracted index.
pub fn optimize<F>(
    expression: &Expression,
    index_dimension: &F,
) -> Result<Expression, ContraqtionError>
where
    F: Fn(&Index) -> u64,
{
    match expression {
        Expression::Tensor(_) => Ok(expression.clone()),
        Expression::Product(product) => single_term::optimize_product(product, index_dimension),
        Expression::Sum(sum) => {
            let mut optimized = Sum::new();
            for summand in sum.summands() {
                optimized.append(optimize(summand, index_dimension)?);
            }
            Ok(Expression::Sum(reorder(&optimized)?))
        }
        other => Err(ContraqtionError::UnsupportedExpression {
            kind: other.kind_name().to_string(),
        }),
    }
}

/// Omits the first factor from the top-level product of the given expression.
///
/// Intended to drop projector-like leading tensors from amplitude equations as a
/// preparatory step for their evaluation. Expressions that are not products are returned
/// unchanged.
///
/// # Arguments
///
/// * `expression` - The expression to shorten.
///
/// # Returns
///
/// * `Expression` - The expression without the leading factor.
pub fn tail_factor(expression: &Expression) -> Expression {
    match expression {
        Expression::Product(product) => Expression::Product(Product::from_factors(
            product.scalar(),
            product.factors().iter().skip(1).cloned(),
            Flatten::No,
        )),
        other => other.clone(),
    }
}

/// Pulls the scalar prefactors of nested products up to the top-level product.
///
/// If the expression is not a product, it is left unchanged.
///
/// # Arguments
///
/// * `expression` - The expression to hoist scalars in.
pub fn pull_scalar(expression: &mut Expression) {
    fn pull(product: &mut Product) -> Scalar {
        let mut pulled = Scalar::one();
        for factor in product.factors_mut() {
            if let Expression::Product(inner) = factor {
                pulled *= pull(inner);
                pulled *= inner.scalar();
                inner.set_scalar(Scalar::one());
            }
        }
        pulled
    }
    if let Expression::Product(product) = expression {
        let pulled = pull(product);
        product.scale(pulled);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expressions::Tensor;
    use crate::scalar_from_integer;

    fn tensor(form: &str) -> Expression {
        form.parse::<Tensor>().unwrap().into()
    }

    #[test]
    fn scalar_atoms_are_unsupported() {
        let dims = |_: &Index| 10;
        let error = optimize(&Expression::from(scalar_from_integer(2)), &dims).unwrap_err();
        assert_eq!(
            error,
            ContraqtionError::UnsupportedExpression {
                kind: "Constant".to_string()
            }
        );
    }

    #[test]
    fn pull_scalar_hoists_nested_prefactors() {
        let inner = Product::from_factors(
            scalar_from_integer(2),
            [tensor("t[i_1;a_1]")],
            Flatten::No,
        );
        let mut expression = Expression::Product(Product::from_factors(
            scalar_from_integer(3),
            [Expression::Product(inner), tensor("f[a_1;i_1]")],
            Flatten::No,
        ));
        pull_scalar(&mut expression);
        let product = expression.as_product().expect("product expected");
        assert_eq!(product.scalar(), scalar_from_integer(6));
        match product.factors()[0].as_product() {
            Some(inner) => assert_eq!(inner.scalar(), scalar_from_integer(1)),
            None => panic!("nested product expected"),
        }
    }

    #[test]
    fn tail_factor_drops_the_leading_factor() {
        let expression = Expression::product_of([
            tensor("s[i_1;a_1]"),
            tensor("t[i_1;a_2]"),
            tensor("f[a_2;a_1]"),
        ]);
        let tail = tail_factor(&expression);
        assert_eq!(tail.as_product().expect("product expected").len(), 2);
    }
}
