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

/// Recursively distributes products over sums.
///
/// Every product containing a sum factor is expanded into a sum of products until no
/// product holds a sum; hosts use this between operator contraction and optimization, since
/// the optimizer schedules one product at a time.
///
/// # Arguments
///
/// * `expression` - The expression to expand.
///
/// # Returns
///
/// * `Expression` - The expanded expression.
pub fn expand(expression: &Expression) -> Expression {
    match expression {
        Expression::Sum(sum) => Expression::Sum(Sum::from_summands(
            sum.summands().iter().map(expand),
        )),
        Expression::Product(product) => {
            let factors: Vec<Expression> = product.factors().iter().map(expand).collect();
            match factors.iter().position(|factor| factor.is_sum()) {
                Some(position) => {
                    let sum = factors[position]
                        .as_sum()
                        .expect("Internal bug: position points at a sum factor")
                        .clone();
                    let mut expanded = Sum::new();
                    for summand in sum.summands() {
                        let mut summand_factors = factors.clone();
                        summand_factors[position] = summand.clone();
                        expanded.append(expand(&Expression::Product(Product::from_factors(
                            product.scalar(),
                            summand_factors,
                            Flatten::Yes,
                        ))));
                    }
                    Expression::Sum(expanded)
                }
                None => Expression::Product(Product::from_factors(
                    product.scalar(),
                    factors,
                    Flatten::Yes,
                )),
            }
        }
        other => other.clone(),
    }
}
